//! Signer Configuration
//!
//! Settings shared by every dispatcher instance:
//! - Debug logging switch
//! - Whether the notifying entry point reports errors
//!
//! Hardware derivation constants are fixed in `hardware::ledger_path` and
//! are not configurable.

use serde::{Deserialize, Serialize};

use crate::error::SigningResult;

const ENV_DEBUG: &str = "WALLET_SIGNER_DEBUG";
const ENV_REPORT_ERRORS: &str = "WALLET_SIGNER_REPORT_ERRORS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SignerConfig {
    /// Emit debug-level log lines
    pub debug_logging: bool,
    /// Forward failures of `sign_transaction` to the notifier
    pub report_errors: bool,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            debug_logging: false,
            report_errors: true,
        }
    }
}

impl SignerConfig {
    pub fn from_json(json: &str) -> SigningResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Overlay `WALLET_SIGNER_*` environment variables
    pub fn with_env(mut self) -> Self {
        if let Ok(value) = std::env::var(ENV_DEBUG) {
            self.debug_logging = parse_flag(&value);
        }
        if let Ok(value) = std::env::var(ENV_REPORT_ERRORS) {
            self.report_errors = parse_flag(&value);
        }
        self
    }

    /// Apply process-wide settings (currently the debug log switch)
    pub fn apply(&self) {
        if self.debug_logging {
            crate::utils::logging::enable_debug();
        } else {
            crate::utils::logging::disable_debug();
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
