//! A load-once cache for the canonical sales table.
//!
//! The table is parsed the first time a source is requested and the same `Arc<SalesTable>` is
//! handed out afterwards. An entry is keyed by the source's canonical path and remembers the
//! file's length and modification time, so a source that changes on disk is reloaded
//! automatically. `invalidate` and `clear` force a reload.

use crate::model::{AmountPolicy, SalesTable};
use crate::Result;
use anyhow::Context;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, trace};

/// Identifies one version of a source file.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
struct SourceKey {
    len: u64,
    modified: Option<SystemTime>,
    policy: AmountPolicy,
}

#[derive(Debug)]
struct Entry {
    key: SourceKey,
    table: Arc<SalesTable>,
}

/// Memoizes parsed sales tables by source path. Owned by the host process.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: HashMap<PathBuf, Entry>,
    loads: usize,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the table for `path`, parsing the file only if it is not cached or has changed
    /// since it was cached.
    pub async fn load(&mut self, path: &Path, policy: AmountPolicy) -> Result<Arc<SalesTable>> {
        let canonical = tokio::fs::canonicalize(path)
            .await
            .with_context(|| format!("Unable to find the sales data at {}", path.display()))?;
        let key = source_key(&canonical, policy).await?;

        if let Some(entry) = self.entries.get(&canonical) {
            if entry.key == key {
                trace!("Using cached sales data for {}", canonical.display());
                return Ok(entry.table.clone());
            }
            debug!("Sales data at {} changed, reloading", canonical.display());
        }

        let bytes = tokio::fs::read(&canonical)
            .await
            .with_context(|| format!("Unable to read the sales data at {}", canonical.display()))?;
        let table = SalesTable::from_reader(bytes.as_slice(), policy)
            .with_context(|| format!("Unable to load the sales data at {}", canonical.display()))?;
        let table = Arc::new(table);
        self.loads += 1;
        debug!(
            "Loaded {} sales rows from {}",
            table.len(),
            canonical.display()
        );

        self.entries.insert(
            canonical,
            Entry {
                key,
                table: table.clone(),
            },
        );
        Ok(table)
    }

    /// Forgets the cached table for `path`. Returns true if there was one.
    pub async fn invalidate(&mut self, path: &Path) -> bool {
        let canonical = tokio::fs::canonicalize(path)
            .await
            .unwrap_or_else(|_| path.to_path_buf());
        self.entries.remove(&canonical).is_some()
    }

    /// Forgets every cached table.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// The number of tables currently cached.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// How many times a source has actually been parsed.
    pub fn loads(&self) -> usize {
        self.loads
    }
}

async fn source_key(path: &Path, policy: AmountPolicy) -> Result<SourceKey> {
    let metadata = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("Unable to read metadata for {}", path.display()))?;
    Ok(SourceKey {
        len: metadata.len(),
        modified: metadata.modified().ok(),
        policy,
    })
}
