//! Client for pushing payloads to a running display server.
//!
//! Used by the CLI to publish without opening a WebSocket.

use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::error::{BoardError, BoardResult};

#[derive(Clone)]
pub struct DisplayNotifier {
    client: reqwest::Client,
    base_url: String,
}

impl DisplayNotifier {
    /// Create a notifier with a custom base URL.
    pub fn with_url(base_url: &str) -> Self {
        debug!(base_url = %base_url, "DisplayNotifier initialized");
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(5))
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Publish a payload. The server persists it and broadcasts it to
    /// every connected display.
    pub async fn push(&self, payload: &Value) -> BoardResult<()> {
        let url = format!("{}/internal/refresh", self.base_url);
        debug!(url = %url, "Pushing payload to display server");

        let response = self.client.post(&url).json(payload).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let message = response.text().await.unwrap_or_default();
        Err(BoardError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        let notifier = DisplayNotifier::with_url("http://display.local:4000/");
        assert_eq!(notifier.base_url(), "http://display.local:4000");
    }
}
