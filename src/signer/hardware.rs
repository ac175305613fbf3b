use super::{SignedBytes, SigningDispatcher};
use crate::account::AccountKind;
use crate::algo::{Address, Transaction};
use crate::error::{SigningError, SigningResult};
use crate::hardware::{extract_signature, ledger_path};
use crate::log_info;

impl SigningDispatcher {
    /// Sign on the hardware device backing `from`.
    ///
    /// Device and transport errors are returned as-is; nothing is retried.
    pub async fn sign_by_ledger(&self, from: &Address, tx: &Transaction) -> SigningResult<SignedBytes> {
        let account = self
            .accounts
            .find(from)
            .ok_or_else(|| SigningError::account_not_found(from))?;

        let slot = match account.kind {
            AccountKind::Ledger { slot } => slot,
            ref other => return Err(SigningError::unsupported_account_kind(from, other.name())),
        };

        let path = ledger_path(slot)?.to_device_string();
        let payload_hex = hex::encode(tx.to_bytes()?);
        log_info!("signer", "Requesting hardware signature", from = from, slot = slot, path = path);

        let raw = {
            let mut session = self.hardware.open().await?;
            session.sign(&path, &payload_hex).await?
        };

        let signature = extract_signature(&raw)?;
        tx.attach_signature(from, signature)
    }
}
