// Transactions and their signed encodings
//
// The canonical encoding is bincode over the field order below. Signatures
// cover the "TX" domain prefix followed by that encoding.

use serde::{Deserialize, Serialize};

use super::address::Address;
use super::keys::{verify_signature, SecretKey, SIGNATURE_LEN};
use super::multisig::MultisigSig;
use crate::error::{SigningError, SigningResult};

/// Domain separation prefix for transaction signatures
pub const TX_PREFIX: &[u8] = b"TX";

/// An unsigned payment transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: Address,
    pub receiver: Address,
    pub amount: u64,
    pub fee: u64,
    pub first_valid: u64,
    pub last_valid: u64,
    #[serde(default)]
    pub genesis_id: String,
    #[serde(with = "crate::serde_bytes::hex32")]
    pub genesis_hash: [u8; 32],
    #[serde(default)]
    pub note: Vec<u8>,
    /// Hands signing authority for `sender` to another address
    #[serde(default)]
    pub rekey_to: Option<Address>,
}

impl Transaction {
    /// Canonical encoding, as sent to a hardware device
    pub fn to_bytes(&self) -> SigningResult<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn decode_unsigned(bytes: &[u8]) -> SigningResult<Self> {
        bincode::deserialize(bytes)
            .map_err(|e| SigningError::invalid_transaction(format!("undecodable transaction: {}", e)))
    }

    /// The message a signature commits to
    pub fn bytes_to_sign(&self) -> SigningResult<Vec<u8>> {
        let body = self.to_bytes()?;
        let mut message = Vec::with_capacity(TX_PREFIX.len() + body.len());
        message.extend_from_slice(TX_PREFIX);
        message.extend_from_slice(&body);
        Ok(message)
    }

    /// Standard signed encoding using `key`
    pub fn sign(&self, key: &SecretKey) -> SigningResult<Vec<u8>> {
        let signature = key.sign(&self.bytes_to_sign()?);
        self.attach_signature(&key.address(), signature)
    }

    /// Wrap an externally produced signature by `signer`
    pub fn attach_signature(&self, signer: &Address, signature: [u8; SIGNATURE_LEN]) -> SigningResult<Vec<u8>> {
        SignedTransaction {
            txn: self.clone(),
            sig: Some(signature),
            msig: None,
            sgnr: self.authorizer_field(signer),
        }
        .encode()
    }

    /// `sgnr` is only recorded when someone other than the sender signs
    pub(crate) fn authorizer_field(&self, signer: &Address) -> Option<Address> {
        (*signer != self.sender).then_some(*signer)
    }
}

/// A transaction with a single signature or a multisig envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub txn: Transaction,
    #[serde(default, with = "crate::serde_bytes::hex64_option")]
    pub sig: Option<[u8; SIGNATURE_LEN]>,
    #[serde(default)]
    pub msig: Option<MultisigSig>,
    #[serde(default)]
    pub sgnr: Option<Address>,
}

impl SignedTransaction {
    pub fn encode(&self) -> SigningResult<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn decode(bytes: &[u8]) -> SigningResult<Self> {
        bincode::deserialize(bytes)
            .map_err(|e| SigningError::invalid_transaction(format!("undecodable signed transaction: {}", e)))
    }

    /// Address whose key authorizes this transaction
    pub fn authorizer(&self) -> Address {
        self.sgnr.unwrap_or(self.txn.sender)
    }

    /// Single-signature check against the authorizer's public key
    pub fn verify(&self) -> SigningResult<bool> {
        let Some(sig) = self.sig else {
            return Ok(false);
        };
        Ok(verify_signature(&self.authorizer(), &self.txn.bytes_to_sign()?, &sig))
    }

    /// All present subsignatures verify and the threshold is met
    pub fn verify_multisig(&self) -> SigningResult<bool> {
        match &self.msig {
            Some(msig) => Ok(msig.verify(&self.txn.bytes_to_sign()?)),
            None => Ok(false),
        }
    }
}
