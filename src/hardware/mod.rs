//! Hardware Wallet Transport
//!
//! The dispatcher talks to signing devices through two small traits:
//! a `HardwareTransport` that opens sessions, and a `HardwareSession` that
//! signs one payload at a derivation path. A session is released when it is
//! dropped, so an early return on error never leaves a device open.
//!
//! Device round trips are user-mediated and have no timeout here; callers
//! that need cancellation wrap the future themselves.

mod path;

pub use path::*;

use async_trait::async_trait;

use crate::algo::SIGNATURE_LEN;
use crate::error::{SigningError, SigningResult};

/// Opens sessions with a connected signing device
#[async_trait]
pub trait HardwareTransport: Send + Sync {
    async fn open(&self) -> SigningResult<Box<dyn HardwareSession>>;
}

/// An open session with a signing device
///
/// Implementations release the underlying connection in `Drop`.
#[async_trait]
pub trait HardwareSession: Send {
    /// Ask the device to sign `payload_hex` with the key at `path`.
    ///
    /// Returns the raw device response; only its first 64 bytes are the
    /// signature.
    async fn sign(&mut self, path: &str, payload_hex: &str) -> SigningResult<Vec<u8>>;
}

/// Take the Ed25519 signature from the front of a device response
pub fn extract_signature(raw: &[u8]) -> SigningResult<[u8; SIGNATURE_LEN]> {
    if raw.len() < SIGNATURE_LEN {
        return Err(SigningError::hardware(format!(
            "device returned {} bytes, expected at least {}",
            raw.len(),
            SIGNATURE_LEN
        ))
        .with_details(format!("response {}", hex::encode(raw))));
    }

    let mut signature = [0u8; SIGNATURE_LEN];
    signature.copy_from_slice(&raw[..SIGNATURE_LEN]);
    Ok(signature)
}

/// Transport for environments with no device attached
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableTransport;

#[async_trait]
impl HardwareTransport for UnavailableTransport {
    async fn open(&self) -> SigningResult<Box<dyn HardwareSession>> {
        Err(SigningError::hardware("No hardware wallet transport is available"))
    }
}
