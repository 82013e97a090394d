//! Telegram Bot API notifier.

use std::time::Instant;

use tracing::{debug, instrument};
use url::Url;

use super::Notifier;
use crate::config::Config;
use crate::error::NotifyError;
use crate::metrics;

/// Sends messages to one chat through `sendMessage`.
#[derive(Clone)]
pub struct TelegramNotifier {
    /// HTTP client for API requests.
    http: reqwest::Client,
    /// Fully built `sendMessage` endpoint (contains the token).
    endpoint: Url,
    /// Destination chat.
    chat_id: String,
}

impl std::fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("chat_id", &self.chat_id)
            .finish_non_exhaustive()
    }
}

impl TelegramNotifier {
    /// Create a notifier from config.
    pub fn new(config: &Config) -> Result<Self, NotifyError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .connect_timeout(config.http_timeout())
            .build()
            .map_err(|e| NotifyError::Transport(e.without_url()))?;

        Ok(Self {
            http,
            endpoint: send_message_url(&config.telegram_api_url, &config.telegram_token)?,
            chat_id: config.chat_id.clone(),
        })
    }

    /// Get the destination chat.
    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }
}

impl Notifier for TelegramNotifier {
    #[instrument(skip(self, text), fields(chat_id = %self.chat_id))]
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let start = Instant::now();

        let response = self
            .http
            .post(self.endpoint.clone())
            .form(&[("chat_id", self.chat_id.as_str()), ("text", text)])
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.without_url()))?;

        metrics::record_http_latency(start, "telegram");

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!("Message delivered");
        Ok(())
    }
}

/// Build `{api}/bot{token}/sendMessage`.
pub fn send_message_url(api_url: &str, token: &str) -> Result<Url, NotifyError> {
    let mut url = Url::parse(api_url)?;
    url.path_segments_mut()
        .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .push(&format!("bot{}", token))
        .push("sendMessage");
    Ok(url)
}
