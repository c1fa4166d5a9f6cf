//! Telegram chat transport -- `sendMessage` with Markdown parse mode.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use super::ChatTransport;
use crate::error::NotifyError;

const DEFAULT_BASE_URL: &str = "https://api.telegram.org";
const CHANNEL: &str = "telegram";

pub struct TelegramChat {
    client: Client,
    base_url: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramChat {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
        }
    }

    /// Point the client at a different endpoint (tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl ChatTransport for TelegramChat {
    async fn send_markdown(&self, text: &str) -> Result<(), NotifyError> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.bot_token);
        let payload = json!({
            "chat_id": self.chat_id,
            "text": text,
            "parse_mode": "Markdown",
        });

        let resp = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|source| NotifyError::Http {
                channel: CHANNEL,
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(NotifyError::Api {
                channel: CHANNEL,
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chat(base_url: String) -> TelegramChat {
        TelegramChat::new("123:abc", "42").with_base_url(base_url)
    }

    #[tokio::test]
    async fn posts_markdown_message() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/bot123:abc/sendMessage")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "chat_id": "42",
                "text": "🔔 Reminder: Car Insurance in 7 days",
                "parse_mode": "Markdown",
            })))
            .with_status(200)
            .with_body(r#"{"ok":true}"#)
            .create_async()
            .await;

        chat(server.url())
            .send_markdown("🔔 Reminder: Car Insurance in 7 days")
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn api_rejection_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/bot123:abc/sendMessage")
            .with_status(400)
            .with_body(r#"{"ok":false,"description":"Bad Request: chat not found"}"#)
            .create_async()
            .await;

        let err = chat(server.url()).send_markdown("hi").await.unwrap_err();
        match err {
            NotifyError::Api {
                channel,
                status,
                message,
            } => {
                assert_eq!(channel, "telegram");
                assert_eq!(status, 400);
                assert!(message.contains("chat not found"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }
}
