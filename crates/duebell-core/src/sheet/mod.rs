//! Spreadsheet snapshot access.
//!
//! Rows come back as raw text, first row = header labels. Columns are
//! looked up by header label rather than position, so reordered or
//! missing columns degrade to empty values instead of failing.

pub mod google;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::SheetError;

pub use google::GoogleSheets;

/// Read-only fetch of all rows as raw text.
#[async_trait]
pub trait SheetSource: Send + Sync {
    async fn fetch_all_values(&self) -> Result<Vec<Vec<String>>, SheetError>;
}

/// Mapping from header label to column index, built from the first row.
#[derive(Debug, Clone)]
pub struct HeaderMap {
    index: HashMap<String, usize>,
}

impl HeaderMap {
    pub fn from_row(headers: &[String]) -> Self {
        let index = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), i))
            .collect();
        Self { index }
    }

    pub fn column(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }
}

/// One data row viewed through the header map.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    headers: &'a HeaderMap,
    cells: &'a [String],
}

impl<'a> RowView<'a> {
    pub fn new(headers: &'a HeaderMap, cells: &'a [String]) -> Self {
        Self { headers, cells }
    }

    /// Cell under `label`, or empty string when the column is absent or
    /// the row is too short.
    pub fn field(&self, label: &str) -> &'a str {
        self.headers
            .column(label)
            .and_then(|i| self.cells.get(i))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Like [`field`](Self::field) but defaults to `N/A`, for display
    /// fields carried into notification bodies.
    pub fn display_field(&self, label: &str) -> &'a str {
        self.headers
            .column(label)
            .and_then(|i| self.cells.get(i))
            .map(String::as_str)
            .unwrap_or("N/A")
    }
}
