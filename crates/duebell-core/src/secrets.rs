//! Credential storage for the spreadsheet source.
//!
//! Production secrets live in the OS keyring under the `duebell` service
//! name; the sheet client resolves them by the configured key on every
//! pass, so rotated credentials take effect without a restart.

use serde::Deserialize;

use crate::error::SheetError;

/// Credential bundle used to authenticate to the spreadsheet source.
#[derive(Debug, Clone, Deserialize)]
pub struct SheetCredentials {
    pub api_key: String,
}

impl SheetCredentials {
    /// Parse a stored bundle. Accepts the JSON form
    /// `{"api_key": "..."}` or a bare key for hand-entered values.
    pub fn parse(raw: &str) -> Result<Self, SheetError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SheetError::Credentials("stored bundle is empty".into()));
        }
        if trimmed.starts_with('{') {
            serde_json::from_str(trimmed)
                .map_err(|e| SheetError::Credentials(format!("malformed bundle: {e}")))
        } else {
            Ok(Self {
                api_key: trimmed.to_string(),
            })
        }
    }
}

/// Fetch-by-name credential lookup.
pub trait SecretsProvider: Send + Sync {
    fn fetch(&self, name: &str) -> Result<SheetCredentials, SheetError>;
}

/// Thin wrapper around the OS keyring for credential storage.
pub mod keyring_store {
    const SERVICE: &str = "duebell";

    pub fn get(key: &str) -> Result<Option<String>, Box<dyn std::error::Error>> {
        let entry = keyring::Entry::new(SERVICE, key)?;
        match entry.get_password() {
            Ok(pw) => Ok(Some(pw)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn set(key: &str, value: &str) -> Result<(), Box<dyn std::error::Error>> {
        let entry = keyring::Entry::new(SERVICE, key)?;
        entry.set_password(value)?;
        Ok(())
    }

    pub fn delete(key: &str) -> Result<(), Box<dyn std::error::Error>> {
        let entry = keyring::Entry::new(SERVICE, key)?;
        match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// OS-keyring-backed secrets provider.
#[derive(Debug, Default)]
pub struct KeyringSecrets;

impl SecretsProvider for KeyringSecrets {
    fn fetch(&self, name: &str) -> Result<SheetCredentials, SheetError> {
        let raw = keyring_store::get(name)
            .map_err(|e| SheetError::Credentials(format!("keyring read failed: {e}")))?
            .ok_or_else(|| SheetError::Credentials(format!("no secret stored under '{name}'")))?;
        SheetCredentials::parse(&raw)
    }
}
