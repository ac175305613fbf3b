use super::{SignedBytes, SigningDispatcher};
use crate::algo::{Address, Transaction};
use crate::error::{SigningError, SigningResult};
use crate::log_debug;

impl SigningDispatcher {
    /// Sign with the secret key of whichever account has authority over `from`
    pub async fn sign_by_sk(&self, from: &Address, tx: &Transaction) -> SigningResult<SignedBytes> {
        let authority = self.resolve(from)?.address;

        let key = self
            .keys
            .secret_key(&authority)
            .await?
            .ok_or_else(|| SigningError::key_not_found(authority))?;

        log_debug!("signer", "Signing with secret key", from = from, authorizer = authority);
        tx.sign(&key)
    }
}
