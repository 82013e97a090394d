//! Alert delivery.

pub mod mock;
pub mod telegram;

pub use mock::MockNotifier;
pub use telegram::TelegramNotifier;

use crate::error::NotifyError;

/// Message sent once when the poller starts.
pub const STARTUP_MESSAGE: &str = "🤖 Stock Alert Bot started and is running...";

/// Sink for text notifications.
#[allow(async_fn_in_trait)]
pub trait Notifier {
    /// Deliver one message. Never retried by the caller.
    async fn send(&self, text: &str) -> Result<(), NotifyError>;
}
