//! Hardware Derivation Paths
//!
//! Devices address their internal keys with BIP-32 style paths. Accounts
//! backed by a device only record a slot; the rest of the path is fixed:
//! `44'/283'/{slot}'/0/0`.

use std::fmt;

use crate::error::{SigningError, SigningResult};

/// Hardened offset for BIP-32 derivation
pub const HARDENED: u32 = 0x8000_0000;

pub const BIP44_PURPOSE: u32 = 44;
/// SLIP-0044 coin type for Algorand
pub const ALGORAND_COIN_TYPE: u32 = 283;

/// Error types for derivation paths
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PathError {
    #[error("Hardware slot {0} exceeds maximum value")]
    SlotOutOfRange(u32),
}

impl From<PathError> for SigningError {
    fn from(err: PathError) -> Self {
        SigningError::invalid_input(err.to_string())
    }
}

/// Single component of a derivation path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivationComponent {
    pub index: u32,
    pub hardened: bool,
}

impl DerivationComponent {
    pub fn hardened(index: u32) -> Self {
        Self { index, hardened: true }
    }

    pub fn normal(index: u32) -> Self {
        Self { index, hardened: false }
    }
}

impl fmt::Display for DerivationComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hardened {
            write!(f, "{}'", self.index)
        } else {
            write!(f, "{}", self.index)
        }
    }
}

/// A derivation path such as `44'/283'/0'/0/0`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivationPath {
    pub components: Vec<DerivationComponent>,
}

impl DerivationPath {
    /// Path without the `m/` prefix, the form devices expect
    pub fn to_device_string(&self) -> String {
        self.components
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m")?;
        for component in &self.components {
            write!(f, "/{}", component)?;
        }
        Ok(())
    }
}

/// Device path for a hardware-backed account slot
pub fn ledger_path(slot: u32) -> SigningResult<DerivationPath> {
    if slot >= HARDENED {
        return Err(PathError::SlotOutOfRange(slot).into());
    }

    Ok(DerivationPath {
        components: vec![
            DerivationComponent::hardened(BIP44_PURPOSE),
            DerivationComponent::hardened(ALGORAND_COIN_TYPE),
            DerivationComponent::hardened(slot),
            DerivationComponent::normal(0),
            DerivationComponent::normal(0),
        ],
    })
}
