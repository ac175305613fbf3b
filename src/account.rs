//! Account Records and Resolution
//!
//! The dispatcher reads account records through an injected
//! `AccountRepository`; it never owns or mutates them. Resolution follows a
//! rekey pointer exactly once: a second pointer on the target is ignored.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::algo::{Address, MultisigParams};
use crate::error::{SigningError, SigningResult};

/// What governs signing for an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AccountKind {
    /// Secret key held by the key store
    Key,
    /// Key lives on a hardware device at `slot`
    Ledger { slot: u32 },
    /// Multisig account; members sign individually
    Multisig { params: MultisigParams },
    /// Tracked but not signable from this wallet
    WatchOnly,
}

impl AccountKind {
    pub fn name(&self) -> &'static str {
        match self {
            AccountKind::Key => "key",
            AccountKind::Ledger { .. } => "ledger",
            AccountKind::Multisig { .. } => "multisig",
            AccountKind::WatchOnly => "watch-only",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub address: Address,
    #[serde(flatten)]
    pub kind: AccountKind,
    #[serde(default)]
    pub rekeyed_to: Option<Address>,
}

impl Account {
    pub fn new(address: Address, kind: AccountKind) -> Self {
        Self {
            address,
            kind,
            rekeyed_to: None,
        }
    }

    pub fn rekeyed(mut self, to: Address) -> Self {
        self.rekeyed_to = Some(to);
        self
    }

    pub fn multisig_params(&self) -> Option<&MultisigParams> {
        match &self.kind {
            AccountKind::Multisig { params } => Some(params),
            _ => None,
        }
    }
}

/// Read-only view of the wallet's accounts
pub trait AccountRepository: Send + Sync {
    fn find(&self, address: &Address) -> Option<Account>;
}

/// Account set held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryAccounts {
    accounts: HashMap<Address, Account>,
}

impl InMemoryAccounts {
    pub fn new(accounts: impl IntoIterator<Item = Account>) -> Self {
        Self {
            accounts: accounts
                .into_iter()
                .map(|account| (account.address, account))
                .collect(),
        }
    }
}

impl AccountRepository for InMemoryAccounts {
    fn find(&self, address: &Address) -> Option<Account> {
        self.accounts.get(address).cloned()
    }
}

/// Find the account whose authority signs for `address`
pub fn resolve(repository: &dyn AccountRepository, address: &Address) -> SigningResult<Account> {
    let account = repository
        .find(address)
        .ok_or_else(|| SigningError::account_not_found(address))?;

    match account.rekeyed_to {
        Some(target) if target != *address => repository
            .find(&target)
            .ok_or_else(|| SigningError::rekey_target_not_found(target)),
        _ => Ok(account),
    }
}
