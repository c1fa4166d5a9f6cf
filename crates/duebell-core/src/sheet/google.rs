//! Google Sheets source.
//!
//! Fetches the whole first sheet (`values.get`, range `A:ZZ`) through
//! the Sheets v4 REST API. The API key is resolved from the secrets
//! provider on every fetch so rotated keys take effect mid-deployment.

use async_trait::async_trait;
use reqwest::Client;

use super::SheetSource;
use crate::error::SheetError;
use crate::secrets::SecretsProvider;

const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com";
const RANGE: &str = "A:ZZ";

/// Google Sheets v4 client.
pub struct GoogleSheets {
    client: Client,
    base_url: String,
    spreadsheet_id: String,
    credentials_key: String,
    secrets: Box<dyn SecretsProvider>,
}

impl GoogleSheets {
    pub fn new(
        spreadsheet_id: impl Into<String>,
        credentials_key: impl Into<String>,
        secrets: Box<dyn SecretsProvider>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            spreadsheet_id: spreadsheet_id.into(),
            credentials_key: credentials_key.into(),
            secrets,
        }
    }

    /// Point the client at a different endpoint (tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl SheetSource for GoogleSheets {
    async fn fetch_all_values(&self) -> Result<Vec<Vec<String>>, SheetError> {
        let creds = self.secrets.fetch(&self.credentials_key)?;

        let url = format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.base_url, self.spreadsheet_id, RANGE
        );
        let resp = self
            .client
            .get(&url)
            .query(&[("key", creds.api_key.as_str()), ("majorDimension", "ROWS")])
            .send()
            .await?;

        let status = resp.status();
        let body: serde_json::Value = resp.json().await?;

        if !status.is_success() {
            let message = body["error"]["message"]
                .as_str()
                .unwrap_or("unknown error")
                .to_string();
            return Err(SheetError::Api {
                status: status.as_u16(),
                message,
            });
        }
        if let Some(err) = body.get("error") {
            return Err(SheetError::Api {
                status: status.as_u16(),
                message: err.to_string(),
            });
        }

        // An entirely empty sheet has no "values" key at all.
        let Some(rows) = body.get("values") else {
            return Ok(Vec::new());
        };
        let rows = rows
            .as_array()
            .ok_or_else(|| SheetError::MalformedResponse("'values' is not an array".into()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let cells = row
                .as_array()
                .ok_or_else(|| SheetError::MalformedResponse("row is not an array".into()))?;
            out.push(
                cells
                    .iter()
                    .map(|c| match c.as_str() {
                        Some(s) => s.to_string(),
                        None => c.to_string(),
                    })
                    .collect(),
            );
        }
        Ok(out)
    }
}
