//! Transaction Library
//!
//! Addresses, Ed25519 keys, transactions, signed encodings and multisig
//! envelopes for Algorand-style accounts. The signing dispatcher only talks
//! to these types; it never touches curve arithmetic or byte layouts itself.

mod address;
mod keys;
mod multisig;
mod transaction;

pub use address::*;
pub use keys::*;
pub use multisig::*;
pub use transaction::*;

#[cfg(test)]
pub(crate) use transaction::tests::sample_transaction;
