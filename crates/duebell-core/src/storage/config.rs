//! TOML-based application configuration.
//!
//! Stores the job settings:
//! - Spreadsheet id and the secrets-provider key for its credentials
//! - Status-store table name
//! - Telegram chat settings (optional; channel self-disables when unset)
//! - Email sender/recipient and AWS region (optional; same self-disable)
//!
//! Configuration is stored at `~/.config/duebell/config.toml`. Every
//! option can be overridden from the environment (`DUEBELL_*` variables),
//! matching how the job is configured when run under a host scheduler.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::ConfigError;

/// Spreadsheet source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetConfig {
    /// Google spreadsheet id. Required to run a pass.
    #[serde(default)]
    pub spreadsheet_id: Option<String>,
    /// Secrets-provider key holding the credential bundle.
    #[serde(default = "default_credentials_key")]
    pub credentials_key: String,
}

/// Status-store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Table name inside the status database.
    #[serde(default = "default_status_table")]
    pub table: String,
}

/// Telegram chat channel configuration. Both fields must be set for the
/// channel to be active.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default)]
    pub bot_token: Option<String>,
    #[serde(default)]
    pub chat_id: Option<String>,
}

/// Email channel configuration. `from` and `to` must both be set for the
/// channel to be active.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default = "default_region")]
    pub region: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/duebell/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sheet: SheetConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub email: EmailConfig,
}

// Default functions
fn default_credentials_key() -> String {
    "google-sheets-api-key".into()
}
fn default_status_table() -> String {
    "reminder_status".into()
}
fn default_region() -> String {
    "us-east-1".into()
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: None,
            credentials_key: default_credentials_key(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            table: default_status_table(),
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            from: None,
            to: None,
            region: default_region(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sheet: SheetConfig::default(),
            store: StoreConfig::default(),
            chat: ChatConfig::default(),
            email: EmailConfig::default(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() {
            return Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: "config key is empty".into(),
            });
        }

        let unknown = |k: &str| ConfigError::InvalidValue {
            key: k.to_string(),
            message: "unknown config key".into(),
        };

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(|| unknown(key))?;
                let existing = obj.get(part).ok_or_else(|| unknown(key))?;

                let new_value = match existing {
                    // Optional string fields deserialize as null until set.
                    serde_json::Value::Null | serde_json::Value::String(_) => {
                        serde_json::Value::String(value.into())
                    }
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| ConfigError::InvalidValue {
                            key: key.to_string(),
                            message: e.to_string(),
                        })?,
                    ),
                    serde_json::Value::Number(_) => value
                        .parse::<u64>()
                        .map(|n| serde_json::Value::Number(n.into()))
                        .map_err(|e| ConfigError::InvalidValue {
                            key: key.to_string(),
                            message: e.to_string(),
                        })?,
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        return Err(ConfigError::InvalidValue {
                            key: key.to_string(),
                            message: "cannot set a whole section".into(),
                        })
                    }
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(|| unknown(key))?;
        }

        Err(unknown(key))
    }

    /// Path of the config file inside the data directory.
    pub fn path() -> Result<PathBuf, std::io::Error> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or write and return the default, then apply
    /// `DUEBELL_*` environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/duebell/config.toml"),
            message: e.to_string(),
        })?;
        let mut cfg = match std::fs::read_to_string(&path) {
            Ok(content) => {
                toml::from_str::<Config>(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.clone(),
                    message: e.to_string(),
                })?
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                cfg
            }
        };
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path().map_err(|e| ConfigError::SaveFailed {
            path: PathBuf::from("~/.config/duebell/config.toml"),
            message: e.to_string(),
        })?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Overlay `DUEBELL_*` environment variables onto the loaded file.
    pub fn apply_env_overrides(&mut self) {
        let env = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

        if let Some(v) = env("DUEBELL_SPREADSHEET_ID") {
            self.sheet.spreadsheet_id = Some(v);
        }
        if let Some(v) = env("DUEBELL_SECRETS_KEY") {
            self.sheet.credentials_key = v;
        }
        if let Some(v) = env("DUEBELL_STATUS_TABLE") {
            self.store.table = v;
        }
        if let Some(v) = env("DUEBELL_TELEGRAM_BOT_TOKEN") {
            self.chat.bot_token = Some(v);
        }
        if let Some(v) = env("DUEBELL_TELEGRAM_CHAT_ID") {
            self.chat.chat_id = Some(v);
        }
        if let Some(v) = env("DUEBELL_FROM_EMAIL") {
            self.email.from = Some(v);
        }
        if let Some(v) = env("DUEBELL_TO_EMAIL") {
            self.email.to = Some(v);
        }
        if let Some(v) = env("DUEBELL_AWS_REGION") {
            self.email.region = v;
        }
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key and persist. Returns error if key is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.save()?;
        Ok(())
    }

    /// Spreadsheet id, or the error the job should report when unset.
    pub fn spreadsheet_id(&self) -> Result<&str, ConfigError> {
        self.sheet
            .spreadsheet_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::MissingKey("sheet.spreadsheet_id".into()))
    }

    /// Telegram settings when the chat channel is fully configured.
    pub fn chat_settings(&self) -> Option<(&str, &str)> {
        match (self.chat.bot_token.as_deref(), self.chat.chat_id.as_deref()) {
            (Some(token), Some(chat_id)) if !token.is_empty() && !chat_id.is_empty() => {
                Some((token, chat_id))
            }
            _ => None,
        }
    }

    /// Sender/recipient when the email channel is fully configured.
    pub fn email_settings(&self) -> Option<(&str, &str)> {
        match (self.email.from.as_deref(), self.email.to.as_deref()) {
            (Some(from), Some(to)) if !from.is_empty() && !to.is_empty() => Some((from, to)),
            _ => None,
        }
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}
