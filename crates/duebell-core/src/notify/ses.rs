//! AWS SESv2 email transport.
//!
//! One call: `POST /v2/email/outbound-emails` with a Simple
//! subject+plaintext content, signed with SigV4. AWS credentials come
//! from the standard environment variables so the job runs unchanged
//! under any AWS-style host scheduler.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde_json::json;

use super::{sigv4, EmailTransport};
use crate::error::NotifyError;

const CHANNEL: &str = "email";
const SEND_PATH: &str = "/v2/email/outbound-emails";

#[derive(Debug)]
pub struct SesMailer {
    client: Client,
    base_url: String,
    region: String,
    from: String,
    to: String,
    access_key: String,
    secret_key: String,
}

impl SesMailer {
    /// Build a mailer for the given region/sender/recipient, reading
    /// `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY` from the environment.
    ///
    /// # Errors
    /// Returns `NotConfigured` when either credential variable is unset,
    /// so the caller can self-disable the channel.
    pub fn from_env(
        region: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Result<Self, NotifyError> {
        let read = |name: &str| {
            std::env::var(name)
                .ok()
                .filter(|v| !v.is_empty())
                .ok_or_else(|| NotifyError::NotConfigured {
                    channel: CHANNEL,
                    message: format!("{name} is not set"),
                })
        };
        let access_key = read("AWS_ACCESS_KEY_ID")?;
        let secret_key = read("AWS_SECRET_ACCESS_KEY")?;
        let region = region.into();
        Ok(Self {
            client: Client::new(),
            base_url: format!("https://email.{region}.amazonaws.com"),
            region,
            from: from.into(),
            to: to.into(),
            access_key,
            secret_key,
        })
    }

    /// Build a mailer with explicit credentials (tests).
    pub fn with_credentials(
        region: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        let region = region.into();
        Self {
            client: Client::new(),
            base_url: format!("https://email.{region}.amazonaws.com"),
            region,
            from: from.into(),
            to: to.into(),
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }

    /// Point the client at a different endpoint (tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn host(&self) -> &str {
        self.base_url
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&self.base_url)
            .trim_end_matches('/')
    }
}

#[async_trait]
impl EmailTransport for SesMailer {
    async fn send(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        let payload = json!({
            "FromEmailAddress": self.from,
            "Destination": { "ToAddresses": [self.to] },
            "Content": {
                "Simple": {
                    "Subject": { "Data": subject, "Charset": "UTF-8" },
                    "Body": { "Text": { "Data": body, "Charset": "UTF-8" } },
                }
            }
        });
        let payload_bytes = serde_json::to_vec(&payload).map_err(|e| NotifyError::Api {
            channel: CHANNEL,
            status: 0,
            message: format!("payload serialization failed: {e}"),
        })?;

        let amz_date = Utc::now().format("%Y%m%dT%H%M%SZ").to_string();
        let host = self.host().to_string();
        let headers = [
            ("content-type", "application/json"),
            ("host", host.as_str()),
            ("x-amz-date", amz_date.as_str()),
        ];
        let authorization = sigv4::authorization_header(
            &sigv4::SigningParams {
                access_key: &self.access_key,
                secret_key: &self.secret_key,
                region: &self.region,
                service: "ses",
                amz_date: &amz_date,
            },
            "POST",
            SEND_PATH,
            "",
            &headers,
            &payload_bytes,
        );

        let resp = self
            .client
            .post(format!("{}{SEND_PATH}", self.base_url))
            .header("content-type", "application/json")
            .header("x-amz-date", &amz_date)
            .header("authorization", authorization)
            .body(payload_bytes)
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
