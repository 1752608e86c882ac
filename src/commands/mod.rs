//! Command handlers for the bars CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod export;
mod init;
mod options;
mod report;

use crate::cache::DatasetCache;
use crate::model::SalesTable;
use crate::{utils, Config, Result};
use anyhow::Context;
use serde::Serialize;
use std::fmt::Debug;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

pub use export::export;
pub use init::init;
pub use options::{options, Options};
pub use report::{report, ReportSummary};

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Loads the sales table from `source`, or from the configured source when it is `None`.
async fn load_table(
    config: &Config,
    source: Option<&Path>,
    cache: &mut DatasetCache,
) -> Result<Arc<SalesTable>> {
    let path = source
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.source());
    let table = cache.load(&path, config.amount_policy()).await?;
    let stats = table.stats();
    if stats.dropped() > 0 {
        info!(
            "Dropped {} of {} rows from {} ({} bad dates, {} bad amounts)",
            stats.dropped(),
            stats.rows_read,
            path.display(),
            stats.dropped_dates,
            stats.dropped_amounts
        );
    }
    Ok(table)
}

/// Writes `value` as pretty JSON to `output`, or to stdout when `output` is `None`.
async fn emit_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Unable to serialize output")?;
    match output {
        Some(path) => utils::write(path, json).await,
        None => {
            println!("{json}");
            Ok(())
        }
    }
}
