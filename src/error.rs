//! Error types.
//!
//! Application code (commands, config, file handling) uses `anyhow` through the `Error` and
//! `Result` aliases. Loading a dataset has its own typed error, `LoadError`, so that callers can
//! tell a malformed amount apart from an unreadable file.

use thiserror::Error;

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building the canonical sales table.
#[derive(Debug, Error)]
pub enum LoadError {
    /// A row's amount or boxes-shipped field could not be parsed.
    #[error("Line {line}, column '{column}' (value '{value}'): {message}")]
    DataFormat {
        line: u64,
        column: &'static str,
        value: String,
        message: String,
    },

    /// The CSV itself was malformed, e.g. a row with a missing column.
    #[error("Invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    /// The source could not be read.
    #[error("Unable to read the sales data: {0}")]
    Io(#[from] std::io::Error),

    /// The source had no header row.
    #[error("The sales data is empty")]
    EmptySource,
}

impl LoadError {
    pub(crate) fn data_format(
        line: u64,
        column: &'static str,
        value: impl Into<String>,
        message: impl ToString,
    ) -> Self {
        LoadError::DataFormat {
            line,
            column,
            value: value.into(),
            message: message.to_string(),
        }
    }

    /// Returns true if this is a row-level `DataFormat` error.
    pub fn is_data_format(&self) -> bool {
        matches!(self, LoadError::DataFormat { .. })
    }
}
