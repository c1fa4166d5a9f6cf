use clap::Subcommand;
use duebell_core::{Config, StatusDb, StatusStore};

#[derive(Subcommand)]
pub enum StatusAction {
    /// List all tracked items and their status
    List,
}

pub fn run(action: StatusAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        StatusAction::List => {
            let config = Config::load_or_default();
            let db = StatusDb::open(&config.store.table)?;
            let items = db.list()?;
            if items.is_empty() {
                println!("No tracked items yet.");
            }
            for (item_id, status) in items {
                println!("{:<8} {item_id}", status.as_str());
            }
        }
    }
    Ok(())
}
