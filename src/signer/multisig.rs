// Multisig aggregation: each call adds one member's signature to a shared
// envelope. The member is matched by public key; an envelope without a slot
// for the member is rejected and left as it was.

use super::{SignedBytes, SigningDispatcher};
use crate::account::AccountKind;
use crate::algo::{self, Address, SignedTransaction, Transaction, SIGNATURE_LEN};
use crate::error::{SigningError, SigningResult};
use crate::log_debug;

impl SigningDispatcher {
    /// Empty envelope for `txn`, whose sender must resolve to a multisig account
    pub fn create_multisig_transaction(&self, txn: &Transaction) -> SigningResult<SignedBytes> {
        let account = self.resolve(&txn.sender)?;
        let params = account
            .multisig_params()
            .ok_or_else(|| SigningError::not_multisig(account.address))?;

        log_debug!(
            "multisig",
            "Creating multisig envelope",
            sender = txn.sender,
            threshold = params.threshold,
            members = params.addrs.len()
        );
        algo::create_multisig_transaction(txn, params)
    }

    /// Add `signator`'s signature to `envelope`.
    ///
    /// `txn` is the transaction to sign for key-backed members; the
    /// envelope's own transaction is used when it is absent.
    pub async fn sign_multisig(
        &self,
        envelope: &[u8],
        signator: &Address,
        txn: Option<&Transaction>,
    ) -> SigningResult<SignedBytes> {
        let account = self
            .accounts
            .find(signator)
            .ok_or_else(|| SigningError::signator_not_found(signator))?;

        match account.kind {
            AccountKind::Ledger { .. } => self.sign_multisig_by_ledger(envelope, signator).await,
            AccountKind::Key => self.sign_multisig_by_sk(envelope, signator, txn).await,
            ref other => Err(SigningError::unsupported_account_kind(signator, other.name())),
        }
    }

    async fn sign_multisig_by_sk(
        &self,
        envelope: &[u8],
        signator: &Address,
        txn: Option<&Transaction>,
    ) -> SigningResult<SignedBytes> {
        let decoded = SignedTransaction::decode(envelope)?;
        let sender = self.resolve(&decoded.txn.sender)?;

        let txn = match txn {
            Some(txn) if *txn != decoded.txn => {
                return Err(SigningError::invalid_transaction(
                    "Supplied transaction does not match the multisig envelope",
                ))
            }
            Some(txn) => txn,
            None => &decoded.txn,
        };

        let key = self
            .keys
            .secret_key(signator)
            .await?
            .ok_or_else(|| SigningError::key_not_found(signator))?;

        log_debug!(
            "multisig",
            "Adding key signature",
            signator = signator,
            sender = sender.address,
            kind = sender.kind.name()
        );

        let signed = SignedTransaction::decode(&txn.sign(&key)?)?;
        let signature = signed
            .sig
            .ok_or_else(|| SigningError::internal("Signed copy carries no signature"))?;
        splice_signature(&decoded, signator, signature)
    }

    async fn sign_multisig_by_ledger(&self, envelope: &[u8], signator: &Address) -> SigningResult<SignedBytes> {
        let decoded = SignedTransaction::decode(envelope)?;

        let signed = SignedTransaction::decode(&self.sign_by_ledger(signator, &decoded.txn).await?)?;
        let signature = signed
            .sig
            .ok_or_else(|| SigningError::internal("Hardware-signed copy carries no signature"))?;

        log_debug!("multisig", "Adding hardware signature", signator = signator);
        splice_signature(&decoded, signator, signature)
    }
}

/// Write `signature` into every slot whose key is `signator`'s.
///
/// Returns the re-encoded envelope; `envelope` itself is never modified.
pub fn splice_signature(
    envelope: &SignedTransaction,
    signator: &Address,
    signature: [u8; SIGNATURE_LEN],
) -> SigningResult<SignedBytes> {
    let mut updated = envelope.clone();
    let msig = updated
        .msig
        .as_mut()
        .ok_or_else(|| SigningError::invalid_transaction("Envelope carries no multisig signature block"))?;

    let mut matched = false;
    for subsig in msig.subsigs.iter_mut().filter(|s| s.address() == *signator) {
        subsig.signature = Some(signature);
        matched = true;
    }

    if !matched {
        return Err(SigningError::multisig_key_missing(signator));
    }
    updated.encode()
}
