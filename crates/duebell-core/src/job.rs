//! One-shot reminder pass orchestration.
//!
//! `ReminderJob` owns the injected collaborators (sheet source, status
//! store, optional chat and email transports) and runs the fetch ->
//! evaluate -> dispatch sequence to completion. Transport failures are
//! logged and the pass continues; infrastructure failures page the
//! operator over chat and then surface to the caller so the host
//! scheduler records the failed run.

use chrono::NaiveDate;
use log::{error, info};
use serde::Serialize;

use crate::error::{CoreError, StoreError};
use crate::evaluate::{evaluate_sheet, NotificationEvent};
use crate::notify::{ChatTransport, EmailTransport, SesMailer, TelegramChat};
use crate::secrets::KeyringSecrets;
use crate::sheet::{GoogleSheets, SheetSource};
use crate::storage::{Config, ReminderStatus, StatusDb, StatusStore};

/// Outcome of a successful pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// Data rows in the snapshot (header excluded).
    pub rows: usize,
    /// Notification events produced by the evaluator.
    pub events: usize,
    pub chat_sent: usize,
    pub chat_failures: usize,
    pub email_sent: usize,
    pub email_failures: usize,
}

/// Acknowledgment returned by the inbound-interaction entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionAck {
    pub received: bool,
}

/// React to an inbound user interaction (e.g. a chat button press).
///
/// Placeholder entry point: accepts any opaque event and acknowledges
/// it. The actual acknowledgment flow is not implemented yet; items are
/// currently marked handled through the `ack` CLI command instead.
pub fn handle_action(event: serde_json::Value) -> Result<ActionAck, CoreError> {
    info!("action handler invoked with event: {event}");
    Ok(ActionAck { received: true })
}

pub struct ReminderJob {
    sheet: Box<dyn SheetSource>,
    store: Box<dyn StatusStore>,
    chat: Option<Box<dyn ChatTransport>>,
    email: Option<Box<dyn EmailTransport>>,
}

impl ReminderJob {
    pub fn new(
        sheet: Box<dyn SheetSource>,
        store: Box<dyn StatusStore>,
        chat: Option<Box<dyn ChatTransport>>,
        email: Option<Box<dyn EmailTransport>>,
    ) -> Self {
        Self {
            sheet,
            store,
            chat,
            email,
        }
    }

    /// Wire up the production collaborators from the loaded config.
    /// Chat and email channels self-disable (with a logged notice) when
    /// their settings are missing; the spreadsheet id is required.
    pub fn from_config(config: &Config) -> Result<Self, CoreError> {
        let spreadsheet_id = config.spreadsheet_id()?;
        let sheet = GoogleSheets::new(
            spreadsheet_id,
            config.sheet.credentials_key.clone(),
            Box::new(KeyringSecrets),
        );
        let store = StatusDb::open(&config.store.table)?;

        let chat: Option<Box<dyn ChatTransport>> = match config.chat_settings() {
            Some((token, chat_id)) => Some(Box::new(TelegramChat::new(token, chat_id))),
            None => {
                info!("telegram settings not set, chat alerts disabled");
                None
            }
        };
        let email: Option<Box<dyn EmailTransport>> = match config.email_settings() {
            Some((from, to)) => match SesMailer::from_env(config.email.region.clone(), from, to) {
                Ok(mailer) => Some(Box::new(mailer)),
                Err(e) => {
                    info!("email alerts disabled: {e}");
                    None
                }
            },
            None => {
                info!("email settings not set, email alerts disabled");
                None
            }
        };

        Ok(Self::new(Box::new(sheet), Box::new(store), chat, email))
    }

    /// Run one evaluation pass. On any infrastructure error the
    /// operator is paged over chat (best effort) before the error is
    /// returned.
    pub async fn run_once(&self, today: NaiveDate) -> Result<RunSummary, CoreError> {
        info!("starting reminder check for {today}");
        match self.run_pass(today).await {
            Ok(summary) => {
                info!(
                    "reminder check finished: {} rows, {} events, {} chat / {} email sent",
                    summary.rows, summary.events, summary.chat_sent, summary.email_sent
                );
                Ok(summary)
            }
            Err(e) => {
                error!("reminder pass failed: {e}");
                if let Some(chat) = &self.chat {
                    let page = format!("🔴 CRITICAL ERROR in reminder run: {e}");
                    if let Err(page_err) = chat.send_markdown(&page).await {
                        error!("operator page failed too: {page_err}");
                    }
                }
                Err(e)
            }
        }
    }

    /// Evaluate without sending or writing: the status store is wrapped
    /// read-only and no transport is touched. Returns the events that a
    /// real pass would dispatch.
    pub async fn preview(&self, today: NaiveDate) -> Result<Vec<NotificationEvent>, CoreError> {
        let values = self.sheet.fetch_all_values().await?;
        let events = evaluate_sheet(&values, today, &ReadOnly(self.store.as_ref()))?;
        Ok(events)
    }

    async fn run_pass(&self, today: NaiveDate) -> Result<RunSummary, CoreError> {
        let values = self.sheet.fetch_all_values().await?;
        let rows = values.len().saturating_sub(1);
        info!("found {rows} records in the spreadsheet");

        let events = evaluate_sheet(&values, today, self.store.as_ref())?;

        let mut summary = RunSummary {
            rows,
            events: events.len(),
            ..RunSummary::default()
        };
        for event in &events {
            if let Some(chat) = &self.chat {
                match chat.send_markdown(&event.chat_text()).await {
                    Ok(()) => summary.chat_sent += 1,
                    Err(e) => {
                        error!("chat alert failed for '{}': {e}", event.subject());
                        summary.chat_failures += 1;
                    }
                }
            }
            if let Some(email) = &self.email {
                match email.send(&event.subject(), &event.email_body()).await {
                    Ok(()) => summary.email_sent += 1,
                    Err(e) => {
                        error!("email alert failed for '{}': {e}", event.subject());
                        summary.email_failures += 1;
                    }
                }
            }
        }
        Ok(summary)
    }
}

/// Store view that answers reads and swallows writes (dry runs).
struct ReadOnly<'a>(&'a dyn StatusStore);

impl StatusStore for ReadOnly<'_> {
    fn get(&self, item_id: &str) -> Result<Option<ReminderStatus>, StoreError> {
        self.0.get(item_id)
    }

    fn put(&self, _item_id: &str, _status: ReminderStatus) -> Result<(), StoreError> {
        Ok(())
    }

    fn list(&self) -> Result<Vec<(String, ReminderStatus)>, StoreError> {
        self.0.list()
    }
}
