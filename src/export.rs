//! Serializes a filtered view back to the CSV format it was loaded from.

use crate::filter::FilteredView;
use crate::model::HEADERS;
use crate::{utils, Result};
use anyhow::Context;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The file name of the raw data download.
pub const EXPORT_FILE_NAME: &str = "chocolate_sales.csv";

/// Writes the rows of `view` as CSV, header first. Derived fields are not written.
pub fn write_csv<W: Write>(view: &FilteredView<'_>, writer: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(HEADERS)
        .context("Unable to write the CSV header")?;
    for sale in view.iter() {
        wtr.serialize(sale.to_raw())
            .context("Unable to write a CSV row")?;
    }
    wtr.flush().context("Unable to flush the CSV writer")?;
    Ok(())
}

/// Returns the UTF-8 CSV bytes for `view`.
pub fn to_csv_bytes(view: &FilteredView<'_>) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_csv(view, &mut buf)?;
    Ok(buf)
}

/// Writes `view` to `dir/chocolate_sales.csv`, creating `dir` if needed, and returns the path.
pub async fn export_file(view: &FilteredView<'_>, dir: &Path) -> Result<PathBuf> {
    utils::make_dir(dir).await?;
    let path = dir.join(EXPORT_FILE_NAME);
    let bytes = to_csv_bytes(view)?;
    utils::write(&path, bytes).await?;
    debug!("Exported {} rows to {}", view.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Selection;
    use crate::model::{Amount, AmountPolicy, Sale, SalesTable};
    use crate::test::{date, sample_table};
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use tempfile::TempDir;

    #[test]
    fn test_round_trip() {
        let table = sample_table();
        let selection = Selection::new(["India", "Australia", "UK"], table.products());
        let view = selection.apply(&table);
        let bytes = to_csv_bytes(&view).unwrap();

        let reloaded = SalesTable::from_reader(bytes.as_slice(), AmountPolicy::Fail).unwrap();
        assert_eq!(reloaded.len(), view.len());
        for (a, b) in view.iter().zip(reloaded.rows()) {
            assert_eq!(a.sales_person(), b.sales_person());
            assert_eq!(a.country(), b.country());
            assert_eq!(a.product(), b.product());
            assert_eq!(a.date(), b.date());
            assert_eq!(a.amount().value(), b.amount().value());
            assert_eq!(a.boxes_shipped(), b.boxes_shipped());
        }
        let total: Decimal = reloaded.rows().iter().map(|s| s.amount().value()).sum();
        assert_eq!(total, view.total_amount());
    }

    #[test]
    fn test_round_trip_keeps_precision() {
        let amounts = ["10.125", "12345678901234567.89", "0.005"];
        let table = SalesTable::new(
            amounts
                .iter()
                .map(|a| {
                    let amount = Amount::new(Decimal::from_str(a).unwrap());
                    Sale::new("Test Rep", "USA", "Orange Choco", date(2022, 1, 3), amount, 1)
                })
                .collect(),
        );
        let bytes = to_csv_bytes(&FilteredView::unfiltered(&table)).unwrap();

        let reloaded = SalesTable::from_reader(bytes.as_slice(), AmountPolicy::Fail).unwrap();
        let values: Vec<String> = reloaded
            .rows()
            .iter()
            .map(|s| s.amount().value().to_string())
            .collect();
        assert_eq!(values, amounts);
    }

    #[test]
    fn test_format() {
        let table = sample_table();
        let view = Selection::new(["UK"], ["Mint Chip Choco"]).apply(&table);
        let text = String::from_utf8(to_csv_bytes(&view).unwrap()).unwrap();
        assert_eq!(
            text,
            "Sales Person,Country,Product,Date,Amount,Boxes Shipped\n\
             Jehu Rudeforth,UK,Mint Chip Choco,04-Jan-22,\"$5,320.00\",180\n"
        );
    }

    #[test]
    fn test_empty_view_has_header() {
        let table = sample_table();
        let view = Selection::default().apply(&table);
        let text = String::from_utf8(to_csv_bytes(&view).unwrap()).unwrap();
        assert_eq!(
            text,
            "Sales Person,Country,Product,Date,Amount,Boxes Shipped\n"
        );
    }

    #[tokio::test]
    async fn test_export_file() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("exports");
        let table = sample_table();
        let view = FilteredView::unfiltered(&table);
        let path = export_file(&view, &out).await.unwrap();
        assert_eq!(path.file_name().unwrap(), EXPORT_FILE_NAME);
        let text = utils::read(&path).await.unwrap();
        assert_eq!(text.lines().count(), 11);
    }
}
