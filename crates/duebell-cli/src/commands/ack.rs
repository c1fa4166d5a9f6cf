//! Out-of-band acknowledgment: the external actor that flips an item to
//! Handled so the evaluator never alerts on it again.

use duebell_core::{item_id, Config, ReminderStatus, StatusDb, StatusStore};

pub fn run(item_name: &str, due_date: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let db = StatusDb::open(&config.store.table)?;
    let id = item_id(item_name, due_date);
    db.put(&id, ReminderStatus::Handled)?;
    println!("Marked '{id}' as Handled.");
    Ok(())
}
