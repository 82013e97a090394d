//! Recording notifier for unit testing.

use std::sync::{Arc, Mutex};

use super::Notifier;
use crate::error::NotifyError;

/// Records every message; optionally rejects them all.
#[derive(Debug, Clone, Default)]
pub struct MockNotifier {
    sent: Arc<Mutex<Vec<String>>>,
    reject_status: Option<u16>,
}

impl MockNotifier {
    /// Create a notifier that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a notifier that answers every send with `status`.
    pub fn rejecting(status: u16) -> Self {
        Self {
            reject_status: Some(status),
            ..Self::default()
        }
    }

    /// Messages passed to `send`, in order (including rejected ones).
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

impl Notifier for MockNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(text.to_string());
        match self.reject_status {
            Some(status) => Err(NotifyError::Rejected {
                status,
                body: "mock rejection".to_string(),
            }),
            None => Ok(()),
        }
    }
}
