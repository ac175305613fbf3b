//! Wallet Signing Dispatcher
//!
//! Routes transactions to the right signing strategy for an Algorand-style
//! wallet account.
//!
//! # Architecture
//!
//! This crate provides:
//! - **account**: account records and one-hop rekey resolution
//! - **algo**: addresses, keys, transactions and multisig envelopes
//! - **signer**: the dispatcher with key, hardware and multisig signers
//! - **hardware**: device transport traits and derivation paths
//! - **keystore** / **notify**: injected collaborators
//! - **api** / **ffi**: JSON request handling and C-ABI exports
//!
//! # FFI Usage
//!
//! All public FFI functions are in the `ffi` module and follow this pattern:
//! - Input: JSON string (null-terminated C string)
//! - Output: JSON string (must be freed with `signer_free_string`)
//!
//! # Security
//!
//! Secret keys are zeroized when dropped and never appear in log output.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use wallet_signer::{Account, AccountKind, InMemoryAccounts, InMemoryKeyStore, SecretKey, SigningDispatcher};
//!
//! let key = SecretKey::from_seed(&[7; 32]);
//! let from = key.address();
//! let accounts = InMemoryAccounts::new([Account::new(from, AccountKind::Key)]);
//! let dispatcher = SigningDispatcher::new(Arc::new(accounts), Arc::new(InMemoryKeyStore::new().with_key(key)));
//!
//! let signed = dispatcher.dispatch_sign(&from, &from, &txn).await?;
//! ```

pub mod account;
pub mod algo;
pub mod api;
pub mod config;
pub mod error;
pub mod ffi;
pub mod hardware;
pub mod keystore;
pub mod notify;
pub mod serde_bytes;
pub mod signer;
pub mod utils;

// Re-export key types for convenience
pub use account::{Account, AccountKind, AccountRepository, InMemoryAccounts};
pub use algo::{
    create_multisig_transaction, Address, MultisigParams, MultisigSig, SecretKey, SignedTransaction, Transaction,
};
pub use config::SignerConfig;
pub use error::{ErrorCode, SigningError, SigningResult};
pub use hardware::{extract_signature, HardwareSession, HardwareTransport};
pub use keystore::{InMemoryKeyStore, KeyStore};
pub use notify::{LogNotifier, Notifier};
pub use signer::{SignedBytes, SigningDispatcher};

pub use ffi::{
    signer_cosign_multisig_transaction, signer_create_multisig_transaction, signer_free_string,
    signer_sign_transaction,
};
