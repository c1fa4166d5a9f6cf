use clap::Subcommand;
use duebell_core::secrets::keyring_store;
use duebell_core::{Config, SheetCredentials};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Store the sheet credential bundle in the OS keyring
    SetSheetKey {
        /// API key, or a JSON bundle like {"api_key": "..."}
        value: String,
    },
    /// Show whether a credential bundle is stored
    Show,
    /// Remove the stored bundle
    Clear,
}

pub fn run(action: AuthAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let key = &config.sheet.credentials_key;
    match action {
        AuthAction::SetSheetKey { value } => {
            // Validate before storing so a typo'd bundle fails here, not
            // mid-pass at 6am.
            SheetCredentials::parse(&value)?;
            keyring_store::set(key, &value)?;
            println!("Stored sheet credentials under '{key}'.");
        }
        AuthAction::Show => match keyring_store::get(key)? {
            Some(_) => println!("Sheet credentials present under '{key}'."),
            None => println!("No sheet credentials stored under '{key}'."),
        },
        AuthAction::Clear => {
            keyring_store::delete(key)?;
            println!("Removed sheet credentials under '{key}'.");
        }
    }
    Ok(())
}
