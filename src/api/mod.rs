//! Request Handling
//!
//! JSON-shaped requests shared by the FFI layer and the CLI. Each request
//! carries a snapshot of the wallet (accounts and hex secret keys); a fresh
//! dispatcher is built over it for every call, with no hardware transport
//! attached.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::account::{Account, InMemoryAccounts};
use crate::algo::{Address, SecretKey, SignedTransaction, Transaction};
use crate::config::SignerConfig;
use crate::error::{SigningError, SigningResult};
use crate::hardware::UnavailableTransport;
use crate::keystore::InMemoryKeyStore;
use crate::log_info;
use crate::signer::SigningDispatcher;

/// Accounts and secret keys a request is evaluated against
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WalletSnapshot {
    #[serde(default)]
    pub accounts: Vec<Account>,
    /// Address -> hex secret (32-byte seed or 64-byte keypair)
    #[serde(default)]
    pub keys: BTreeMap<String, String>,
}

impl WalletSnapshot {
    /// Decode every key, rejecting one filed under an address it doesn't derive
    pub fn key_store(&self) -> SigningResult<InMemoryKeyStore> {
        let mut store = InMemoryKeyStore::new();
        for (address, secret_hex) in &self.keys {
            let expected: Address = address.parse()?;
            let derived = store.insert(SecretKey::from_hex(secret_hex)?);
            if derived != expected {
                return Err(SigningError::invalid_input(format!(
                    "Secret key filed under {} belongs to {}",
                    expected, derived
                )));
            }
        }
        Ok(store)
    }

    pub fn dispatcher(&self, config: &SignerConfig) -> SigningResult<SigningDispatcher> {
        let accounts = InMemoryAccounts::new(self.accounts.iter().cloned());
        Ok(
            SigningDispatcher::new(Arc::new(accounts), Arc::new(self.key_store()?))
                .with_hardware(Arc::new(UnavailableTransport))
                .with_config(config.clone()),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignRequest {
    pub wallet: WalletSnapshot,
    pub from: Address,
    /// Co-signer for multisig senders; defaults to `from`
    #[serde(default)]
    pub signator: Option<Address>,
    pub txn: Transaction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMultisigRequest {
    pub wallet: WalletSnapshot,
    pub txn: Transaction,
}

/// Add one member's signature to an existing envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CosignRequest {
    pub wallet: WalletSnapshot,
    /// Hex-encoded multisig envelope
    pub envelope: String,
    pub signator: Address,
}

/// Hex-encoded signed transaction or envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobResponse {
    pub blob: String,
    /// Signatures present when the blob is a multisig envelope
    pub signature_count: Option<usize>,
}

impl BlobResponse {
    fn from_bytes(bytes: &[u8]) -> SigningResult<Self> {
        let signature_count = SignedTransaction::decode(bytes)?
            .msig
            .map(|msig| msig.signature_count());
        Ok(Self {
            blob: hex::encode(bytes),
            signature_count,
        })
    }
}

/// Standard API response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<SigningError>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: SigningError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }

    pub fn from_result(result: SigningResult<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(error) => Self::err(error),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            r#"{"success":false,"error":{"code":"internal","message":"Serialization failed"}}"#.to_string()
        })
    }
}

pub async fn handle_sign_request(request: &SignRequest, config: &SignerConfig) -> SigningResult<BlobResponse> {
    let dispatcher = request.wallet.dispatcher(config)?;
    let signator = request.signator.unwrap_or(request.from);

    log_info!("api", "Sign request", from = request.from, signator = signator);
    let signed = dispatcher.dispatch_sign(&request.from, &signator, &request.txn).await?;
    BlobResponse::from_bytes(&signed)
}

pub fn handle_create_multisig_request(
    request: &CreateMultisigRequest,
    config: &SignerConfig,
) -> SigningResult<BlobResponse> {
    let dispatcher = request.wallet.dispatcher(config)?;

    log_info!("api", "Create multisig request", sender = request.txn.sender);
    BlobResponse::from_bytes(&dispatcher.create_multisig_transaction(&request.txn)?)
}

pub async fn handle_cosign_request(request: &CosignRequest, config: &SignerConfig) -> SigningResult<BlobResponse> {
    let dispatcher = request.wallet.dispatcher(config)?;
    let envelope = hex::decode(request.envelope.trim())?;

    log_info!("api", "Cosign request", signator = request.signator);
    let signed = dispatcher.sign_multisig(&envelope, &request.signator, None).await?;
    BlobResponse::from_bytes(&signed)
}

fn parse_request<T: for<'de> Deserialize<'de>>(json: &str) -> SigningResult<T> {
    serde_json::from_str(json).map_err(|e| SigningError::invalid_input(format!("Malformed request: {}", e)))
}

/// Parse and handle a `SignRequest`
pub async fn sign_json(json: &str, config: &SignerConfig) -> ApiResponse<BlobResponse> {
    let result = match parse_request::<SignRequest>(json) {
        Ok(request) => handle_sign_request(&request, config).await,
        Err(e) => Err(e),
    };
    ApiResponse::from_result(result)
}

pub fn create_multisig_json(json: &str, config: &SignerConfig) -> ApiResponse<BlobResponse> {
    let result = parse_request::<CreateMultisigRequest>(json)
        .and_then(|request| handle_create_multisig_request(&request, config));
    ApiResponse::from_result(result)
}

pub async fn cosign_json(json: &str, config: &SignerConfig) -> ApiResponse<BlobResponse> {
    let result = match parse_request::<CosignRequest>(json) {
        Ok(request) => handle_cosign_request(&request, config).await,
        Err(e) => Err(e),
    };
    ApiResponse::from_result(result)
}
