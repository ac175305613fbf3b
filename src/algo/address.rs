// Account addresses
// Base32 (no padding) of the 32-byte Ed25519 public key followed by the last
// four bytes of its SHA-512/256 digest.

use data_encoding::BASE32_NOPAD;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha512_256};
use std::fmt;
use std::str::FromStr;

use crate::error::{SigningError, SigningResult};

pub const PUBLIC_KEY_LEN: usize = 32;
const CHECKSUM_LEN: usize = 4;

/// Length of the textual form of an address
pub const ADDRESS_LEN: usize = 58;

/// An account address, stored as the raw public key it encodes
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; PUBLIC_KEY_LEN]);

impl Address {
    pub const fn from_public_key(public_key: [u8; PUBLIC_KEY_LEN]) -> Self {
        Self(public_key)
    }

    pub fn public_key(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.0
    }

    /// Encode as the 58-character checksummed string
    pub fn encode(&self) -> String {
        let mut address_bytes = Vec::with_capacity(PUBLIC_KEY_LEN + CHECKSUM_LEN);
        address_bytes.extend_from_slice(&self.0);
        address_bytes.extend_from_slice(&checksum(&self.0));
        BASE32_NOPAD.encode(&address_bytes)
    }

    /// Decode and verify a checksummed address string
    pub fn decode(s: &str) -> SigningResult<Self> {
        let trimmed = s.trim();
        if trimmed.len() != ADDRESS_LEN {
            return Err(SigningError::invalid_address(format!(
                "expected {} characters, got {}",
                ADDRESS_LEN,
                trimmed.len()
            )));
        }

        let decoded = BASE32_NOPAD.decode(trimmed.as_bytes())?;
        if decoded.len() != PUBLIC_KEY_LEN + CHECKSUM_LEN {
            return Err(SigningError::invalid_address("decoded address has wrong length"));
        }

        let (key, check) = decoded.split_at(PUBLIC_KEY_LEN);
        let mut public_key = [0u8; PUBLIC_KEY_LEN];
        public_key.copy_from_slice(key);

        if checksum(&public_key)[..] != *check {
            return Err(SigningError::invalid_address(format!(
                "checksum mismatch for {}",
                trimmed
            )));
        }

        Ok(Self(public_key))
    }
}

fn checksum(public_key: &[u8; PUBLIC_KEY_LEN]) -> [u8; CHECKSUM_LEN] {
    let hash = Sha512_256::digest(public_key);
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&hash[hash.len() - CHECKSUM_LEN..]);
    out
}

impl FromStr for Address {
    type Err = SigningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.encode())
    }
}

// Text in JSON, raw key bytes in the canonical binary encoding.
impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.encode())
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Address::decode(&s).map_err(serde::de::Error::custom)
        } else {
            <[u8; PUBLIC_KEY_LEN]>::deserialize(deserializer).map(Address)
        }
    }
}
