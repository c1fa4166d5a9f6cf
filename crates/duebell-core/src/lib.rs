//! # duebell Core Library
//!
//! Core business logic for duebell, a scheduled due-date reminder job:
//! it reads a spreadsheet of dated obligations, classifies each row as
//! due-soon, overdue, or inert against the current date, and dispatches
//! alerts over Telegram and email. Per-item acknowledgment state lives
//! in a local SQLite store so handled items never alert again.
//!
//! ## Architecture
//!
//! - **Evaluator**: a pure sequential pass over the sheet snapshot
//!   producing [`NotificationEvent`]s
//! - **Storage**: SQLite-backed status store and TOML-based configuration
//! - **Sheet**: Google Sheets snapshot source behind the [`SheetSource`]
//!   trait, credentials resolved from the OS keyring per pass
//! - **Notify**: Telegram and AWS SES transports behind trait seams
//! - **Job**: one-shot orchestration with operator paging on failure
//!
//! All external collaborators are constructor-injected trait objects so
//! tests substitute in-memory doubles.

pub mod error;
pub mod evaluate;
pub mod job;
pub mod notify;
pub mod secrets;
pub mod sheet;
pub mod storage;

pub use error::{ConfigError, CoreError, NotifyError, SheetError, StoreError};
pub use evaluate::{evaluate_sheet, item_id, NotificationEvent};
pub use job::{handle_action, ActionAck, ReminderJob, RunSummary};
pub use notify::{ChatTransport, EmailTransport, SesMailer, TelegramChat};
pub use secrets::{KeyringSecrets, SecretsProvider, SheetCredentials};
pub use sheet::{GoogleSheets, HeaderMap, RowView, SheetSource};
pub use storage::{Config, ReminderStatus, StatusDb, StatusStore};
