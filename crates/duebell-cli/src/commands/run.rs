//! The scheduled entry point: one evaluation pass over the sheet.

use chrono::NaiveDate;
use duebell_core::evaluate::DATE_FORMAT;
use duebell_core::{Config, ReminderJob};

pub fn run(date: Option<String>, dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let today = match date {
        Some(s) => NaiveDate::parse_from_str(&s, DATE_FORMAT)
            .map_err(|_| format!("invalid --date '{s}' (expected MM/DD/YYYY)"))?,
        None => chrono::Local::now().date_naive(),
    };

    let job = ReminderJob::from_config(&config)?;
    let runtime = tokio::runtime::Runtime::new()?;

    if dry_run {
        let events = runtime.block_on(job.preview(today))?;
        if events.is_empty() {
            println!("No reminders would fire for {today}.");
        }
        for event in &events {
            println!("{}", event.chat_text());
        }
        return Ok(());
    }

    let summary = runtime.block_on(job.run_once(today))?;
    println!(
        "Processed {} rows: {} events, {} chat / {} email alerts sent.",
        summary.rows, summary.events, summary.chat_sent, summary.email_sent
    );
    if summary.chat_failures + summary.email_failures > 0 {
        eprintln!(
            "warning: {} chat / {} email sends failed (see log)",
            summary.chat_failures, summary.email_failures
        );
    }
    Ok(())
}
