use crate::args::ExportArgs;
use crate::cache::DatasetCache;
use crate::commands::{load_table, Out};
use crate::{export, Config, Result};
use std::path::PathBuf;

/// Writes the selected rows to `chocolate_sales.csv` and returns its path.
pub async fn export(
    config: &Config,
    args: &ExportArgs,
    cache: &mut DatasetCache,
) -> Result<Out<PathBuf>> {
    let table = load_table(config, args.source(), cache).await?;
    let selection = args.filters().selection(&table);
    let view = selection.apply(&table);

    let dir = args
        .out_dir()
        .map(PathBuf::from)
        .unwrap_or_else(|| config.export_dir());
    let path = export::export_file(&view, &dir).await?;
    Ok(Out::new(
        format!("Exported {} rows to {}", view.len(), path.display()),
        path,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::FilterArgs;
    use crate::export::EXPORT_FILE_NAME;
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
    async fn test_export_to_configured_dir() {
        let dir = TempDir::new().unwrap();
        let config = setup(&dir).await;
        let args = ExportArgs::new(
            FilterArgs::new(vec![], vec!["Peanut Butter Cubes".to_string()]),
            None,
            None,
        );

        let mut cache = DatasetCache::new();
        let out = export(&config, &args, &mut cache).await.unwrap();
        let path = out.structure().unwrap();
        assert_eq!(path, &config.export_dir().join(EXPORT_FILE_NAME));

        let text = utils::read(path).await.unwrap();
        assert!(text.starts_with("Sales Person,Country,Product,Date,Amount,Boxes Shipped\n"));
        assert!(text.lines().skip(1).all(|l| l.contains("Peanut Butter Cubes")));
    }

    #[tokio::test]
    async fn test_export_to_out_dir() {
        let dir = TempDir::new().unwrap();
        let config = setup(&dir).await;
        let out_dir = dir.path().join("elsewhere");
        let args = ExportArgs::new(FilterArgs::default(), None, Some(out_dir.clone()));

        let mut cache = DatasetCache::new();
        let out = export(&config, &args, &mut cache).await.unwrap();
        assert_eq!(out.structure().unwrap(), &out_dir.join(EXPORT_FILE_NAME));
        let text = utils::read(&out_dir.join(EXPORT_FILE_NAME)).await.unwrap();
        assert_eq!(text.lines().count(), 11);
    }
}
