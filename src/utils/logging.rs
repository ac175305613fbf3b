//! Structured Logging with Sensitive Data Redaction
//!
//! Log lines go to stderr as `timestamp LEVEL [module] message | k=v ...`.
//! Field values are redacted by key name:
//! - Secret keys and seeds are never printed
//! - Addresses are shortened to prefix...suffix
//! - Payload and signature hex is reduced to its length

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

pub fn enable_debug() {
    DEBUG_ENABLED.store(true, Ordering::SeqCst);
}

pub fn disable_debug() {
    DEBUG_ENABLED.store(false, Ordering::SeqCst);
}

pub fn is_debug_enabled() -> bool {
    DEBUG_ENABLED.load(Ordering::SeqCst)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// How a field value is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Redaction {
    Secret,
    Address,
    Blob,
    Plain,
}

const SECRET_KEYS: &[&str] = &["secret", "sk", "seed", "mnemonic", "password", "private", "key_hex"];
const ADDRESS_KEYS: &[&str] = &["address", "from", "signator", "sender", "authorizer", "rekey", "receiver"];
const BLOB_KEYS: &[&str] = &["payload", "blob", "envelope", "signature", "sig"];

fn classify(key: &str) -> Redaction {
    let key_lower = key.to_lowercase();
    let matches = |names: &[&str]| {
        names.iter().any(|name| {
            // short names must match a whole `_`-separated segment
            if name.len() <= 3 {
                key_lower.split('_').any(|segment| segment == *name)
            } else {
                key_lower.contains(name)
            }
        })
    };

    if matches(SECRET_KEYS) {
        Redaction::Secret
    } else if matches(ADDRESS_KEYS) {
        Redaction::Address
    } else if matches(BLOB_KEYS) {
        Redaction::Blob
    } else {
        Redaction::Plain
    }
}

/// Structured log entry
#[derive(Debug)]
pub struct LogEntry {
    pub level: LogLevel,
    pub module: &'static str,
    pub message: String,
    pub fields: Vec<(&'static str, String)>,
}

impl LogEntry {
    pub fn new(level: LogLevel, module: &'static str, message: impl Into<String>) -> Self {
        Self {
            level,
            module,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// Add a field, redacted according to its key
    pub fn field(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        let raw = value.to_string();
        let shown = match classify(key) {
            Redaction::Secret => redact_secret(&raw),
            Redaction::Address => shorten_address(&raw),
            Redaction::Blob => describe_blob(&raw),
            Redaction::Plain => raw,
        };
        self.fields.push((key, shown));
        self
    }

    pub fn render(&self) -> String {
        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ");
        let mut line = format!("[{}] {} [{}] {}", timestamp, self.level, self.module, self.message);
        if !self.fields.is_empty() {
            let fields = self
                .fields
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join(" ");
            line.push_str(" | ");
            line.push_str(&fields);
        }
        line
    }

    pub fn log(self) {
        if self.level == LogLevel::Debug && !is_debug_enabled() {
            return;
        }
        eprintln!("{}", self.render());
    }
}

fn redact_secret(value: &str) -> String {
    if value.is_empty() {
        "[EMPTY]".to_string()
    } else {
        "[REDACTED]".to_string()
    }
}

/// Show first 6 and last 4 characters of an address
fn shorten_address(address: &str) -> String {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return "[EMPTY]".to_string();
    }
    if trimmed.len() <= 13 || !trimmed.is_ascii() {
        return trimmed.to_string();
    }
    format!("{}...{}", &trimmed[..6], &trimmed[trimmed.len() - 4..])
}

fn describe_blob(value: &str) -> String {
    if value.len() <= 16 {
        value.to_string()
    } else {
        format!("[{}chars]", value.len())
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! log_at {
    ($level:ident, $module:expr, $msg:expr $(, $key:ident = $value:expr)*) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::$level,
            $module,
            $msg
        )
        $(.field(stringify!($key), &$value))*
        .log()
    };
}

#[macro_export]
macro_rules! log_debug {
    ($($args:tt)*) => { $crate::log_at!(Debug, $($args)*) };
}

#[macro_export]
macro_rules! log_info {
    ($($args:tt)*) => { $crate::log_at!(Info, $($args)*) };
}

#[macro_export]
macro_rules! log_warn {
    ($($args:tt)*) => { $crate::log_at!(Warn, $($args)*) };
}

#[macro_export]
macro_rules! log_error {
    ($($args:tt)*) => { $crate::log_at!(Error, $($args)*) };
}
