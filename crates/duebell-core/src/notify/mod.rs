//! Outbound notification channels.
//!
//! Two transports: a chat message with light markup (Telegram) and a
//! subject+plaintext email (AWS SES). Both are best-effort: a failed
//! send is logged by the job loop and the pass continues.

pub mod ses;
pub mod sigv4;
pub mod telegram;

use async_trait::async_trait;

use crate::error::NotifyError;

pub use ses::SesMailer;
pub use telegram::TelegramChat;

/// Send a text message (Markdown parse mode) to the preconfigured chat.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_markdown(&self, text: &str) -> Result<(), NotifyError>;
}

/// Send a subject + plaintext body from the preconfigured sender to the
/// preconfigured recipient.
#[async_trait]
pub trait EmailTransport: Send + Sync {
    async fn send(&self, subject: &str, body: &str) -> Result<(), NotifyError>;
}
