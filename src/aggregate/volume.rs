use super::{ratio, ResultTable};
use crate::filter::FilteredView;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Revenue and volume for one product in one year.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct ProductGrowth {
    pub year: i32,
    pub product: String,
    pub amount: Decimal,
    pub boxes_shipped: u64,
    /// `amount / boxes_shipped`, `None` when no boxes were shipped.
    pub revenue_per_box: Option<Decimal>,
}

/// Revenue and volume for one product across the whole view.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct ProductVolume {
    pub product: String,
    pub amount: Decimal,
    pub boxes_shipped: u64,
    /// `amount / boxes_shipped`, `None` when no boxes were shipped.
    pub ratio: Option<Decimal>,
}

/// A padded axis range: from 90% of the smallest value to 110% of the largest.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct AxisRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl AxisRange {
    /// Computes the padded range of `values`, or `None` if there are none.
    pub fn padded<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = Decimal>,
    {
        let mut values = values.into_iter();
        let first = values.next()?;
        let (min, max) = values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
        Some(Self {
            min: min * Decimal::new(9, 1),
            max: max * Decimal::new(11, 1),
        })
    }
}

/// The year-by-year product growth scatter: one point per (year, product), with axis ranges that
/// stay fixed across the animation frames.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize)]
pub struct Growth {
    pub points: ResultTable<ProductGrowth>,
    pub boxes_range: Option<AxisRange>,
    pub amount_range: Option<AxisRange>,
}

#[derive(Default)]
struct Sums {
    amount: Decimal,
    boxes: u64,
}

impl Sums {
    fn add(&mut self, amount: Decimal, boxes: u32) {
        self.amount += amount;
        self.boxes += u64::from(boxes);
    }
}

/// Sales, boxes and revenue per box for each (year, product), ordered by year then product.
pub fn yearly_product_growth(view: &FilteredView<'_>) -> Growth {
    let mut sums: BTreeMap<(i32, &str), Sums> = BTreeMap::new();
    for sale in view.iter() {
        sums.entry((sale.year(), sale.product()))
            .or_default()
            .add(sale.amount().value(), sale.boxes_shipped());
    }
    let points: ResultTable<ProductGrowth> = sums
        .into_iter()
        .map(|((year, product), s)| ProductGrowth {
            year,
            product: product.to_string(),
            amount: s.amount,
            boxes_shipped: s.boxes,
            revenue_per_box: ratio(s.amount, s.boxes),
        })
        .collect();
    Growth {
        boxes_range: AxisRange::padded(points.iter().map(|p| Decimal::from(p.boxes_shipped))),
        amount_range: AxisRange::padded(points.iter().map(|p| p.amount)),
        points,
    }
}

/// Sales, boxes and revenue per box for each product, in alphabetical order.
pub fn product_volume_ratio(view: &FilteredView<'_>) -> ResultTable<ProductVolume> {
    let mut sums: BTreeMap<&str, Sums> = BTreeMap::new();
    for sale in view.iter() {
        sums.entry(sale.product())
            .or_default()
            .add(sale.amount().value(), sale.boxes_shipped());
    }
    sums.into_iter()
        .map(|(product, s)| ProductVolume {
            product: product.to_string(),
            amount: s.amount,
            boxes_shipped: s.boxes,
            ratio: ratio(s.amount, s.boxes),
        })
        .collect()
}
