// Ed25519 signing keys
// Accepts either the 32-byte seed or the 64-byte `seed || public key` form
// that wallets export.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use std::fmt;
use zeroize::Zeroizing;

use super::address::{Address, PUBLIC_KEY_LEN};
use crate::error::{SigningError, SigningResult};

pub const SEED_LEN: usize = 32;
pub const KEYPAIR_LEN: usize = 64;
pub const SIGNATURE_LEN: usize = 64;

/// A secret signing key, zeroized when dropped
#[derive(Clone)]
pub struct SecretKey {
    inner: SigningKey,
}

impl SecretKey {
    pub fn from_seed(seed: &[u8; SEED_LEN]) -> Self {
        Self {
            inner: SigningKey::from_bytes(seed),
        }
    }

    /// Parse raw key bytes; a 64-byte key must carry its own public key
    pub fn from_bytes(bytes: &[u8]) -> SigningResult<Self> {
        match bytes.len() {
            SEED_LEN => {
                let mut seed = Zeroizing::new([0u8; SEED_LEN]);
                seed.copy_from_slice(bytes);
                Ok(Self::from_seed(&seed))
            }
            KEYPAIR_LEN => {
                let mut keypair = Zeroizing::new([0u8; KEYPAIR_LEN]);
                keypair.copy_from_slice(bytes);
                let inner = SigningKey::from_keypair_bytes(&keypair)?;
                Ok(Self { inner })
            }
            other => Err(SigningError::crypto_error(format!(
                "secret key must be {} or {} bytes, got {}",
                SEED_LEN, KEYPAIR_LEN, other
            ))),
        }
    }

    pub fn from_hex(hex_str: &str) -> SigningResult<Self> {
        let bytes = Zeroizing::new(hex::decode(hex_str.trim())?);
        Self::from_bytes(&bytes)
    }

    /// Export in the 64-byte `seed || public key` form
    pub fn to_keypair_bytes(&self) -> Zeroizing<[u8; KEYPAIR_LEN]> {
        Zeroizing::new(self.inner.to_keypair_bytes())
    }

    pub fn address(&self) -> Address {
        Address::from_public_key(self.inner.verifying_key().to_bytes())
    }

    pub fn sign(&self, message: &[u8]) -> [u8; SIGNATURE_LEN] {
        self.inner.sign(message).to_bytes()
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey")
            .field("address", &self.address())
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Check an Ed25519 signature against the public key an address encodes
pub fn verify_signature(address: &Address, message: &[u8], signature: &[u8; SIGNATURE_LEN]) -> bool {
    let public_key: &[u8; PUBLIC_KEY_LEN] = address.public_key();
    let Ok(verifying_key) = VerifyingKey::from_bytes(public_key) else {
        return false;
    };
    verifying_key
        .verify(message, &Signature::from_bytes(signature))
        .is_ok()
}
