//! Secret Key Storage
//!
//! Key lookup is a capability the dispatcher is handed; storage, encryption
//! and unlocking belong to the wallet. Lookups may suspend (e.g. waiting on
//! an unlock prompt), hence the async trait.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::algo::{Address, SecretKey};
use crate::error::SigningResult;

#[async_trait]
pub trait KeyStore: Send + Sync {
    /// `Ok(None)` when the wallet holds no key for `address`
    async fn secret_key(&self, address: &Address) -> SigningResult<Option<SecretKey>>;
}

/// Keys held in process memory, indexed by the address they sign for
#[derive(Debug, Default)]
pub struct InMemoryKeyStore {
    keys: HashMap<Address, SecretKey>,
}

impl InMemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `key` under the address it derives
    pub fn insert(&mut self, key: SecretKey) -> Address {
        let address = key.address();
        self.keys.insert(address, key);
        address
    }

    pub fn with_key(mut self, key: SecretKey) -> Self {
        self.insert(key);
        self
    }
}

#[async_trait]
impl KeyStore for InMemoryKeyStore {
    async fn secret_key(&self, address: &Address) -> SigningResult<Option<SecretKey>> {
        Ok(self.keys.get(address).cloned())
    }
}
