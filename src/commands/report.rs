use crate::args::ReportArgs;
use crate::cache::DatasetCache;
use crate::commands::{emit_json, load_table, Out};
use crate::geo::StaticResolver;
use crate::report::Report;
use crate::{Config, Result};
use serde::Serialize;
use std::path::PathBuf;
use tracing::warn;

/// What `bars report` did.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    /// Rows in the filtered view.
    pub rows: usize,
    pub failed_sections: usize,
    /// Countries in the view that could not be placed on the map.
    pub unresolved_countries: Vec<String>,
    /// `None` when the report went to stdout.
    pub output: Option<PathBuf>,
}

/// Builds the `Report` for the selected countries and products and writes it as JSON.
pub async fn report(
    config: &Config,
    args: &ReportArgs,
    cache: &mut DatasetCache,
) -> Result<Out<ReportSummary>> {
    let table = load_table(config, args.source(), cache).await?;
    let selection = args.filters().selection(&table);
    let view = selection.apply(&table);

    let report = Report::build(&selection, &view, &StaticResolver::new());
    let unresolved_countries = report
        .country_totals
        .data()
        .map(|totals| {
            totals
                .unresolved()
                .into_iter()
                .map(String::from)
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    if !unresolved_countries.is_empty() {
        warn!(
            "No country code found for {}, they are left off the map",
            unresolved_countries.join(", ")
        );
    }

    emit_json(&report, args.output()).await?;

    let summary = ReportSummary {
        rows: view.len(),
        failed_sections: report.failed_sections(),
        unresolved_countries,
        output: args.output().map(PathBuf::from),
    };
    Ok(Out::new(
        format!("Built a report over {} of {} rows", view.len(), table.len()),
        summary,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::FilterArgs;
    use crate::model::AmountPolicy;
    use crate::test::SAMPLE_CSV;
    use crate::utils;
    use tempfile::TempDir;

    async fn setup(dir: &TempDir) -> Config {
        let source = dir.path().join("sales.csv");
        utils::write(&source, SAMPLE_CSV).await.unwrap();
        Config::create(dir.path().join("home"), &source, AmountPolicy::Drop)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_report_to_file() {
        let dir = TempDir::new().unwrap();
        let config = setup(&dir).await;
        let output = dir.path().join("report.json");
        let args = ReportArgs::new(
            FilterArgs::new(vec!["UK".to_string(), "India".to_string()], vec![]),
            None,
            Some(output.clone()),
        );

        let mut cache = DatasetCache::new();
        let out = report(&config, &args, &mut cache).await.unwrap();
        let summary = out.structure().unwrap();
        assert_eq!(summary.rows, 5);
        assert_eq!(summary.failed_sections, 0);
        assert!(summary.unresolved_countries.is_empty());

        let json: serde_json::Value =
            serde_json::from_str(&utils::read(&output).await.unwrap()).unwrap();
        assert_eq!(json["rows"], 5);
        assert_eq!(json["top_country"]["data"]["country"], "UK");
    }

    #[tokio::test]
    async fn test_report_uses_cache() {
        let dir = TempDir::new().unwrap();
        let config = setup(&dir).await;
        let args = ReportArgs::new(
            FilterArgs::default(),
            None,
            Some(dir.path().join("report.json")),
        );

        let mut cache = DatasetCache::new();
        report(&config, &args, &mut cache).await.unwrap();
        report(&config, &args, &mut cache).await.unwrap();
        assert_eq!(cache.loads(), 1);
    }

    #[tokio::test]
    async fn test_report_source_override() {
        let dir = TempDir::new().unwrap();
        let config = setup(&dir).await;
        let other = dir.path().join("other.csv");
        utils::write(
            &other,
            "Sales Person,Country,Product,Date,Amount,Boxes Shipped\n\
             A,Narnia,Orange Choco,05-Jan-22,$100,1\n",
        )
        .await
        .unwrap();
        let args = ReportArgs::new(
            FilterArgs::default(),
            Some(other),
            Some(dir.path().join("report.json")),
        );

        let mut cache = DatasetCache::new();
        let out = report(&config, &args, &mut cache).await.unwrap();
        let summary = out.structure().unwrap();
        assert_eq!(summary.rows, 1);
        assert_eq!(summary.unresolved_countries, vec!["Narnia"]);
    }
}
