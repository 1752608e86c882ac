use crate::commands::Out;
use crate::model::AmountPolicy;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the home directory, the exports directory and an initial `config.json` that points at
/// `source`.
///
/// # Arguments
/// - `bars_home` - The directory that will be the home directory, e.g. `$HOME/beans-to-bars`
/// - `source` - The sales CSV, e.g. `Chocolate Sales.csv`
/// - `amount_policy` - How rows with malformed amounts are treated when loading
///
/// # Errors
/// - Returns an error if any file operations fail.
pub async fn init(
    bars_home: &Path,
    source: &Path,
    amount_policy: AmountPolicy,
) -> Result<Out<()>> {
    let config = Config::create(bars_home, source, amount_policy)
        .await
        .context("Unable to create the home directory and config")?;
    Ok(format!(
        "Successfully created the beans-to-bars config at {}",
        config.config_path().display()
    )
    .into())
}
