//! Serde helpers for byte arrays
//!
//! Fixed-size keys and signatures travel as hex strings, both in the JSON
//! request surface and inside the canonical transaction encoding.

use serde::{Deserialize, Deserializer, Serializer};

fn decode_fixed<const N: usize, E: serde::de::Error>(s: &str) -> Result<[u8; N], E> {
    let bytes = hex::decode(s).map_err(E::custom)?;
    let len = bytes.len();
    bytes
        .try_into()
        .map_err(|_| E::custom(format!("expected {} bytes, got {}", N, len)))
}

/// Serialize/deserialize [u8; 32] as hex string
pub mod hex32 {
    use super::*;

    pub fn serialize<S>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; 32], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        decode_fixed::<32, D::Error>(&s)
    }
}

/// Serialize/deserialize Option<[u8; 64]> as hex string
pub mod hex64_option {
    use super::*;

    pub fn serialize<S>(bytes: &Option<[u8; 64]>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match bytes {
            Some(b) => serializer.serialize_some(&hex::encode(b)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<[u8; 64]>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt: Option<String> = Option::deserialize(deserializer)?;
        opt.map(|s| decode_fixed::<64, D::Error>(&s)).transpose()
    }
}
