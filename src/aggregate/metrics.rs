use super::ratio;
use crate::filter::FilteredView;
use rust_decimal::Decimal;
use serde::Serialize;

/// The headline numbers shown above the charts.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize)]
pub struct KeyMetrics {
    pub total_sales: Decimal,
    pub total_boxes: u64,
    /// Total sales divided by total boxes. Zero when no boxes were shipped.
    pub revenue_per_box: Decimal,
}

pub fn key_metrics(view: &FilteredView<'_>) -> KeyMetrics {
    let total_sales = view.total_amount();
    let total_boxes = view.total_boxes();
    KeyMetrics {
        total_sales,
        total_boxes,
        revenue_per_box: ratio(total_sales, total_boxes).unwrap_or(Decimal::ZERO),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Selection;
    use crate::model::SalesTable;
    use crate::test::{date, dec, sale, sample_table, scenario_table};

    #[test]
    fn test_scenario() {
        let table = scenario_table();
        let metrics = key_metrics(&FilteredView::unfiltered(&table));
        assert_eq!(metrics.total_sales, dec(150));
        assert_eq!(metrics.total_boxes, 15);
        assert_eq!(metrics.revenue_per_box, dec(10));
    }

    #[test]
    fn test_sample() {
        let table = sample_table();
        let metrics = key_metrics(&FilteredView::unfiltered(&table));
        assert_eq!(metrics.total_sales, dec(61390));
        assert_eq!(metrics.total_boxes, 1163);
    }

    #[test]
    fn test_no_boxes() {
        let table = SalesTable::new(vec![sale("UK", "Orange Choco", date(2022, 1, 3), 40, 0)]);
        let metrics = key_metrics(&FilteredView::unfiltered(&table));
        assert_eq!(metrics.total_sales, dec(40));
        assert_eq!(metrics.revenue_per_box, Decimal::ZERO);
    }

    #[test]
    fn test_empty_view() {
        let table = sample_table();
        let metrics = key_metrics(&Selection::default().apply(&table));
        assert_eq!(metrics, KeyMetrics::default());
    }
}
