use crate::args::OptionsArgs;
use crate::cache::DatasetCache;
use crate::commands::{emit_json, load_table, Out};
use crate::model::LoadStats;
use crate::{Config, Result};
use serde::Serialize;
use std::collections::BTreeSet;

/// The values the country and product checklists can hold.
#[derive(Debug, Clone, Serialize)]
pub struct Options {
    pub countries: BTreeSet<String>,
    pub products: BTreeSet<String>,
    pub stats: LoadStats,
}

/// Lists the distinct countries and products in the sales data, printing them as JSON.
pub async fn options(
    config: &Config,
    args: &OptionsArgs,
    cache: &mut DatasetCache,
) -> Result<Out<Options>> {
    let table = load_table(config, args.source(), cache).await?;
    let options = Options {
        countries: table.countries(),
        products: table.products(),
        stats: table.stats(),
    };
    emit_json(&options, None).await?;
    Ok(Out::new(
        format!(
            "Found {} countries and {} products",
            options.countries.len(),
            options.products.len()
        ),
        options,
    ))
}
