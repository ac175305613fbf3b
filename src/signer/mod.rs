//! Signing Dispatcher
//!
//! Routes a transaction to one of three signing strategies based on the
//! account that has authority over the sender:
//! - **key**: secret key from the key store
//! - **ledger**: hardware device at the account's slot
//! - **multisig**: wrap in an envelope and add one co-signer's signature
//!
//! `dispatch_sign` returns typed errors. `sign_transaction` is the
//! user-facing entry: it reports failures to the notifier and yields `None`.

mod hardware;
mod key;
mod multisig;

pub use multisig::splice_signature;

use std::sync::Arc;

use crate::account::{self, Account, AccountKind, AccountRepository};
use crate::algo::{self, Address, Transaction};
use crate::config::SignerConfig;
use crate::error::{SigningError, SigningResult};
use crate::hardware::{HardwareTransport, UnavailableTransport};
use crate::keystore::KeyStore;
use crate::notify::{LogNotifier, Notifier};
use crate::{log_debug, log_warn};

/// Encoded signed transaction or multisig envelope
pub type SignedBytes = Vec<u8>;

#[derive(Clone)]
pub struct SigningDispatcher {
    accounts: Arc<dyn AccountRepository>,
    keys: Arc<dyn KeyStore>,
    hardware: Arc<dyn HardwareTransport>,
    notifier: Arc<dyn Notifier>,
    config: SignerConfig,
}

impl SigningDispatcher {
    /// Dispatcher with no hardware transport and log-based notifications
    pub fn new(accounts: Arc<dyn AccountRepository>, keys: Arc<dyn KeyStore>) -> Self {
        Self {
            accounts,
            keys,
            hardware: Arc::new(UnavailableTransport),
            notifier: Arc::new(LogNotifier),
            config: SignerConfig::default(),
        }
    }

    pub fn with_hardware(mut self, transport: Arc<dyn HardwareTransport>) -> Self {
        self.hardware = transport;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_config(mut self, config: SignerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &SignerConfig {
        &self.config
    }

    /// Account with signing authority for `address` (one rekey hop)
    pub fn resolve(&self, address: &Address) -> SigningResult<Account> {
        account::resolve(self.accounts.as_ref(), address)
    }

    /// Sign `tx` on behalf of `from`.
    ///
    /// `signator` only matters when `from` resolves to a multisig account:
    /// it names the member contributing a signature to the envelope.
    pub async fn dispatch_sign(
        &self,
        from: &Address,
        signator: &Address,
        tx: &Transaction,
    ) -> SigningResult<SignedBytes> {
        let account = self.resolve(from)?;
        log_debug!(
            "signer",
            "Dispatching signature",
            from = from,
            authorizer = account.address,
            kind = account.kind.name()
        );

        match &account.kind {
            AccountKind::Ledger { .. } => self.sign_by_ledger(&account.address, tx).await,
            AccountKind::Multisig { params } => {
                let envelope = algo::create_multisig_transaction(tx, params)?;
                self.sign_multisig(&envelope, signator, Some(tx)).await
            }
            // The key signer resolves again from the sender's own address
            AccountKind::Key => self.sign_by_sk(from, tx).await,
            AccountKind::WatchOnly => Err(SigningError::unsupported_account_kind(
                account.address,
                account.kind.name(),
            )),
        }
    }

    /// Like `dispatch_sign`, but failures go to the notifier
    pub async fn sign_transaction(
        &self,
        from: &Address,
        signator: &Address,
        tx: &Transaction,
    ) -> Option<SignedBytes> {
        match self.dispatch_sign(from, signator, tx).await {
            Ok(signed) => Some(signed),
            Err(error) => {
                log_warn!("signer", "Signing failed", from = from, code = format!("{:?}", error.code));
                if self.config.report_errors {
                    self.notifier.report_error(&error);
                }
                None
            }
        }
    }
}
