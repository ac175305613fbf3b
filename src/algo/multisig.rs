// Multisig accounts and envelopes
//
// A multisig account is defined by (version, threshold, ordered member
// addresses). Its envelope keeps one subsignature slot per member, in the
// same order.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512_256};

use super::address::{Address, PUBLIC_KEY_LEN};
use super::keys::{verify_signature, SIGNATURE_LEN};
use super::transaction::{SignedTransaction, Transaction};
use crate::error::{SigningError, SigningResult};

pub const MULTISIG_VERSION: u8 = 1;
const MULTISIG_ADDR_PREFIX: &[u8] = b"MultisigAddr";

/// Parameters of a multisig account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultisigParams {
    pub version: u8,
    pub threshold: u8,
    pub addrs: Vec<Address>,
}

impl MultisigParams {
    pub fn new(threshold: u8, addrs: Vec<Address>) -> SigningResult<Self> {
        let params = Self {
            version: MULTISIG_VERSION,
            threshold,
            addrs,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> SigningResult<()> {
        if self.version != MULTISIG_VERSION {
            return Err(SigningError::invalid_multisig_params(format!(
                "unsupported multisig version {}",
                self.version
            )));
        }
        if self.addrs.is_empty() {
            return Err(SigningError::invalid_multisig_params("multisig has no members"));
        }
        if self.threshold == 0 || usize::from(self.threshold) > self.addrs.len() {
            return Err(SigningError::invalid_multisig_params(format!(
                "threshold {} out of range for {} members",
                self.threshold,
                self.addrs.len()
            )));
        }
        Ok(())
    }

    /// Address of the multisig account itself
    pub fn address(&self) -> SigningResult<Address> {
        self.validate()?;

        let mut hasher = Sha512_256::new();
        hasher.update(MULTISIG_ADDR_PREFIX);
        hasher.update([self.version, self.threshold]);
        for member in &self.addrs {
            hasher.update(member.public_key());
        }

        let mut digest = [0u8; PUBLIC_KEY_LEN];
        digest.copy_from_slice(&hasher.finalize());
        Ok(Address::from_public_key(digest))
    }
}

/// One member slot of a multisig envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultisigSubsig {
    #[serde(with = "crate::serde_bytes::hex32")]
    pub public_key: [u8; PUBLIC_KEY_LEN],
    #[serde(default, with = "crate::serde_bytes::hex64_option")]
    pub signature: Option<[u8; SIGNATURE_LEN]>,
}

impl MultisigSubsig {
    pub fn address(&self) -> Address {
        Address::from_public_key(self.public_key)
    }
}

/// Multisig signature block attached to a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultisigSig {
    pub version: u8,
    pub threshold: u8,
    pub subsigs: Vec<MultisigSubsig>,
}

impl MultisigSig {
    /// Empty slots for every member of `params`
    pub fn from_params(params: &MultisigParams) -> Self {
        Self {
            version: params.version,
            threshold: params.threshold,
            subsigs: params
                .addrs
                .iter()
                .map(|addr| MultisigSubsig {
                    public_key: *addr.public_key(),
                    signature: None,
                })
                .collect(),
        }
    }

    pub fn signature_count(&self) -> usize {
        self.subsigs.iter().filter(|s| s.signature.is_some()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.signature_count() >= usize::from(self.threshold)
    }

    /// True when every filled slot verifies over `message` and enough are filled
    pub fn verify(&self, message: &[u8]) -> bool {
        let all_valid = self.subsigs.iter().all(|subsig| match &subsig.signature {
            Some(sig) => verify_signature(&subsig.address(), message, sig),
            None => true,
        });
        all_valid && self.is_complete()
    }
}

/// Build an envelope for `txn` with no signatures yet
pub fn create_multisig_transaction(txn: &Transaction, params: &MultisigParams) -> SigningResult<Vec<u8>> {
    let msig_address = params.address()?;
    SignedTransaction {
        txn: txn.clone(),
        sig: None,
        msig: Some(MultisigSig::from_params(params)),
        sgnr: txn.authorizer_field(&msig_address),
    }
    .encode()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::keys::SecretKey;
    use crate::algo::sample_transaction;
    use crate::error::ErrorCode;

    fn members() -> Vec<SecretKey> {
        (1..=3u8).map(|i| SecretKey::from_seed(&[i; 32])).collect()
    }

    fn params(threshold: u8) -> MultisigParams {
        MultisigParams::new(threshold, members().iter().map(SecretKey::address).collect()).unwrap()
    }

    #[test]
    fn test_params_validation() {
        let addrs: Vec<Address> = members().iter().map(SecretKey::address).collect();

        let err = MultisigParams::new(0, addrs.clone()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidMultisigParams);

        let err = MultisigParams::new(4, addrs).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidMultisigParams);

        let err = MultisigParams::new(1, vec![]).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidMultisigParams);
    }

    #[test]
    fn test_address_depends_on_threshold_and_order() {
        let two = params(2);
        let three = params(3);
        assert_ne!(two.address().unwrap(), three.address().unwrap());

        let mut reversed = two.clone();
        reversed.addrs.reverse();
        assert_ne!(two.address().unwrap(), reversed.address().unwrap());
    }

    #[test]
    fn test_envelope_starts_empty() {
        let params = params(2);
        let msig_address = params.address().unwrap();
        let txn = sample_transaction(msig_address);

        let envelope = SignedTransaction::decode(&create_multisig_transaction(&txn, &params).unwrap()).unwrap();
        let msig = envelope.msig.unwrap();

        assert_eq!(msig.subsigs.len(), 3);
        assert_eq!(msig.signature_count(), 0);
        assert!(!msig.is_complete());
        assert_eq!(envelope.sgnr, None);
        assert_eq!(envelope.txn, txn);
    }

    #[test]
    fn test_rekeyed_sender_records_multisig_authorizer() {
        let params = params(2);
        let txn = sample_transaction(Address::from_public_key([0x77; 32]));

        let envelope = SignedTransaction::decode(&create_multisig_transaction(&txn, &params).unwrap()).unwrap();
        assert_eq!(envelope.sgnr, Some(params.address().unwrap()));
    }

    #[test]
    fn test_verify_counts_threshold() {
        let keys = members();
        let params = params(2);
        let txn = sample_transaction(params.address().unwrap());
        let message = txn.bytes_to_sign().unwrap();

        let mut msig = MultisigSig::from_params(&params);
        msig.subsigs[0].signature = Some(keys[0].sign(&message));
        assert!(!msig.verify(&message));

        msig.subsigs[2].signature = Some(keys[2].sign(&message));
        assert!(msig.verify(&message));

        // A signature in the wrong slot must not verify
        msig.subsigs[1].signature = Some(keys[0].sign(&message));
        assert!(!msig.verify(&message));
    }
}
