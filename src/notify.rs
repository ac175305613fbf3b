//! User-facing error notification
//!
//! `SigningDispatcher::sign_transaction` hands failures to a `Notifier`
//! instead of returning them; the wallet decides how to show them.

use crate::error::SigningError;
use crate::log_error;

pub trait Notifier: Send + Sync {
    fn report_error(&self, error: &SigningError);
}

/// Reports through the structured logger
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn report_error(&self, error: &SigningError) {
        log_error!("notify", error.message.clone(), code = format!("{:?}", error.code));
    }
}
