//! FFI Layer
//!
//! All C-ABI exports are defined here. Every function follows the same
//! pattern:
//! - Input: JSON request (null-terminated C string)
//! - Output: `ApiResponse` JSON (must be freed with `signer_free_string`)
//!
//! Each call runs the async request handler to completion on its own
//! single-threaded Tokio runtime, so exports must be called from threads
//! that are not already inside a Tokio runtime; such calls return an
//! `internal` error response. Configuration comes from the environment.

use std::ffi::{CStr, CString};
use std::future::Future;
use std::os::raw::c_char;

use crate::api::{self, ApiResponse};
use crate::config::SignerConfig;
use crate::error::{SigningError, SigningResult};

// =============================================================================
// Memory Management
// =============================================================================

/// Free a string returned by any signer_* function
///
/// # Safety
/// The pointer must have been returned by a signer_* function
#[unsafe(no_mangle)]
pub extern "C" fn signer_free_string(s: *mut c_char) {
    if s.is_null() {
        return;
    }
    unsafe {
        let _ = CString::from_raw(s);
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Convert C string to an owned Rust string, returning error JSON if invalid
fn parse_input(input: *const c_char) -> Result<String, *mut c_char> {
    if input.is_null() {
        return Err(error_response(SigningError::invalid_input("Null input pointer")));
    }

    let c_str = unsafe { CStr::from_ptr(input) };
    match c_str.to_str() {
        Ok(s) => Ok(s.to_owned()),
        Err(_) => Err(error_response(SigningError::invalid_input("Invalid UTF-8 string"))),
    }
}

fn error_response(error: SigningError) -> *mut c_char {
    let response: ApiResponse<()> = ApiResponse::err(error);
    string_to_ptr(response.to_json())
}

/// Convert Rust string to C string pointer
fn string_to_ptr(s: String) -> *mut c_char {
    match CString::new(s) {
        Ok(c_str) => c_str.into_raw(),
        Err(_) => {
            const FALLBACK: &CStr =
                c"{\"success\":false,\"error\":{\"code\":\"internal\",\"message\":\"String conversion failed\"}}";
            FALLBACK.to_owned().into_raw()
        }
    }
}

fn load_config() -> SignerConfig {
    let config = SignerConfig::default().with_env();
    config.apply();
    config
}

/// Runs `future` on a fresh runtime. Fails instead of panicking when the
/// calling thread is already driving a Tokio runtime.
fn block_on<F: Future<Output = String>>(future: F) -> SigningResult<String> {
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(SigningError::internal(
            "signer_* functions must not be called from inside a Tokio runtime",
        ));
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    Ok(runtime.block_on(future))
}

/// Shared body of every export: parse, configure, run
fn run_request<F, Fut>(input: *const c_char, handler: F) -> *mut c_char
where
    F: FnOnce(String, SignerConfig) -> Fut,
    Fut: Future<Output = String>,
{
    let json = match parse_input(input) {
        Ok(json) => json,
        Err(response) => return response,
    };

    match block_on(handler(json, load_config())) {
        Ok(response) => string_to_ptr(response),
        Err(e) => error_response(e),
    }
}

// =============================================================================
// Signing Operations
// =============================================================================

/// Sign a transaction for an account in the supplied wallet snapshot
///
/// # Input
/// ```json
/// {
///   "wallet": { "accounts": [...], "keys": { "<address>": "<hex secret>" } },
///   "from": "<address>",
///   "signator": "<address>",
///   "txn": { ... }
/// }
/// ```
///
/// # Output
/// ```json
/// { "success": true, "data": { "blob": "<hex>", "signature_count": null } }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn signer_sign_transaction(input: *const c_char) -> *mut c_char {
    run_request(input, |json, config| async move { api::sign_json(&json, &config).await.to_json() })
}

/// Build an unsigned multisig envelope for a transaction whose sender is a
/// multisig account
///
/// # Input
/// ```json
/// { "wallet": { ... }, "txn": { ... } }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn signer_create_multisig_transaction(input: *const c_char) -> *mut c_char {
    run_request(input, |json, config| async move { api::create_multisig_json(&json, &config).to_json() })
}

/// Add one member's signature to a hex-encoded multisig envelope
///
/// # Input
/// ```json
/// { "wallet": { ... }, "envelope": "<hex>", "signator": "<address>" }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn signer_cosign_multisig_transaction(input: *const c_char) -> *mut c_char {
    run_request(input, |json, config| async move { api::cosign_json(&json, &config).await.to_json() })
}
