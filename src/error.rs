//! Unified error types for the signing dispatcher
//!
//! Every failure in resolution, signing or envelope handling is a
//! `SigningError` carrying an `ErrorCode`, so callers can branch on the kind
//! and the FFI layer can serialize it unchanged.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Main error type for all signing operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl SigningError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Convenience constructors
    pub fn account_not_found(address: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::AccountNotFound,
            format!("Address {} is not in the list of accounts", address),
        )
    }

    pub fn rekey_target_not_found(address: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::AccountNotFound,
            format!("Rekeyed signing address {} is not in the list of accounts", address),
        )
    }

    pub fn key_not_found(address: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::KeyNotFound,
            format!("Private key not found for {}", address),
        )
    }

    pub fn signator_not_found(address: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::SignatorNotFound,
            format!("Signator account {} not found", address),
        )
    }

    pub fn not_multisig(address: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::NotMultisig,
            format!("Address is not multisig: {}", address),
        )
    }

    pub fn multisig_key_missing(address: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::MultisigKeyMissing,
            format!("Multisig key is missing for address {}", address),
        )
    }

    pub fn unsupported_account_kind(address: impl fmt::Display, kind: &str) -> Self {
        Self::new(
            ErrorCode::UnsupportedAccountKind,
            format!("Account {} ({}) cannot sign transactions", address, kind),
        )
    }

    pub fn hardware(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::HardwareError, msg)
    }

    pub fn invalid_address(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidAddress, msg)
    }

    pub fn invalid_transaction(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidTransaction, msg)
    }

    pub fn invalid_multisig_params(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidMultisigParams, msg)
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, msg)
    }

    pub fn crypto_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::CryptoError, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, msg)
    }
}

impl fmt::Display for SigningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for SigningError {}

/// Error codes for categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // Resolution errors
    AccountNotFound,
    SignatorNotFound,
    UnsupportedAccountKind,

    // Key material
    KeyNotFound,
    HardwareError,

    // Multisig
    NotMultisig,
    MultisigKeyMissing,
    InvalidMultisigParams,

    // Input errors
    InvalidInput,
    InvalidAddress,
    InvalidTransaction,

    // Crypto / codec errors
    CryptoError,
    EncodingError,
    JsonError,
    HexError,

    // Internal
    Internal,
}

/// Result type alias for signing operations
pub type SigningResult<T> = Result<T, SigningError>;

// Conversions from common error types

impl From<serde_json::Error> for SigningError {
    fn from(e: serde_json::Error) -> Self {
        SigningError::new(ErrorCode::JsonError, e.to_string())
    }
}

impl From<hex::FromHexError> for SigningError {
    fn from(e: hex::FromHexError) -> Self {
        SigningError::new(ErrorCode::HexError, e.to_string())
    }
}

impl From<bincode::Error> for SigningError {
    fn from(e: bincode::Error) -> Self {
        SigningError::new(ErrorCode::EncodingError, e.to_string())
    }
}

impl From<data_encoding::DecodeError> for SigningError {
    fn from(e: data_encoding::DecodeError) -> Self {
        SigningError::new(ErrorCode::InvalidAddress, format!("Base32 error: {}", e))
    }
}

impl From<ed25519_dalek::SignatureError> for SigningError {
    fn from(e: ed25519_dalek::SignatureError) -> Self {
        SigningError::new(ErrorCode::CryptoError, format!("Ed25519 error: {}", e))
    }
}

impl From<std::io::Error> for SigningError {
    fn from(e: std::io::Error) -> Self {
        SigningError::new(ErrorCode::Internal, e.to_string())
    }
}
