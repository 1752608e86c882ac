use crate::error::LoadError;
use crate::model::sale::{Parsed, RawSale};
use crate::model::Sale;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::io::Read;
use tracing::{debug, warn};

/// What to do with a row whose amount (or boxes shipped) cannot be parsed.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountPolicy {
    /// Leave the row out of the table and log a warning, the same way bad dates are handled.
    #[default]
    Drop,
    /// Fail the whole load with a `LoadError::DataFormat`.
    Fail,
}

serde_plain::derive_display_from_serialize!(AmountPolicy);
serde_plain::derive_fromstr_from_deserialize!(AmountPolicy);

/// Counts describing what happened while loading the sales data.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Serialize)]
pub struct LoadStats {
    /// Data rows read from the source, not counting the header.
    pub rows_read: usize,
    /// Rows that made it into the table.
    pub rows_kept: usize,
    /// Rows left out because the date could not be parsed.
    pub dropped_dates: usize,
    /// Rows left out because the amount or boxes shipped could not be parsed.
    pub dropped_amounts: usize,
}

impl LoadStats {
    /// Rows left out for any reason.
    pub fn dropped(&self) -> usize {
        self.dropped_dates + self.dropped_amounts
    }
}

/// The canonical sales table: every well-formed row of the source, in source order.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct SalesTable {
    rows: Vec<Sale>,
    stats: LoadStats,
}

impl SalesTable {
    /// Parses CSV sales data from `reader`.
    ///
    /// Rows with an unparseable date are dropped. Rows with an unparseable amount are dropped or
    /// fail the load depending on `policy`.
    pub fn from_reader<R: Read>(reader: R, policy: AmountPolicy) -> Result<Self, LoadError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_reader(reader);
        if rdr.headers()?.is_empty() {
            return Err(LoadError::EmptySource);
        }

        let mut stats = LoadStats::default();
        let mut rows = Vec::new();

        for (ix, result) in rdr.deserialize::<RawSale>().enumerate() {
            // +2: one for the header row and one because lines are 1-based.
            let line = ix as u64 + 2;
            stats.rows_read += 1;
            let raw = result?;
            match raw.parse(line) {
                Ok(Parsed::Sale(sale)) => rows.push(sale),
                Ok(Parsed::BadDate(date)) => {
                    debug!("Dropping line {line}, unparseable date '{date}'");
                    stats.dropped_dates += 1;
                }
                Err(e) => match policy {
                    AmountPolicy::Fail => return Err(e),
                    AmountPolicy::Drop => {
                        warn!("Dropping row: {e}");
                        stats.dropped_amounts += 1;
                    }
                },
            }
        }

        stats.rows_kept = rows.len();
        debug!(
            "Loaded {} of {} sales rows ({} bad dates, {} bad amounts)",
            stats.rows_kept, stats.rows_read, stats.dropped_dates, stats.dropped_amounts
        );
        Ok(Self { rows, stats })
    }

    /// Creates a table directly from already-parsed sales.
    pub fn new(rows: Vec<Sale>) -> Self {
        let stats = LoadStats {
            rows_read: rows.len(),
            rows_kept: rows.len(),
            ..LoadStats::default()
        };
        Self { rows, stats }
    }

    pub fn rows(&self) -> &[Sale] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn stats(&self) -> LoadStats {
        self.stats
    }

    /// The distinct countries in the table, sorted.
    pub fn countries(&self) -> BTreeSet<String> {
        self.rows.iter().map(|s| s.country().to_string()).collect()
    }

    /// The distinct products in the table, sorted.
    pub fn products(&self) -> BTreeSet<String> {
        self.rows.iter().map(|s| s.product().to_string()).collect()
    }
}
