//! The aggregation pipeline.
//!
//! Every operation here is a pure function of a `FilteredView` that produces a small, immutable
//! `ResultTable` (or a single summary value) for one chart. None of them panic or fail on an
//! empty view: they return an empty table or `None`.
//!
//! Sums are exact `Decimal` accumulations. Any ratio goes through [`ratio`], which returns `None`
//! instead of dividing by zero.

mod metrics;
mod ranking;
mod totals;
mod volume;
mod weekday;

pub use metrics::{key_metrics, KeyMetrics};
pub use ranking::{
    product_composition, top_country, top_country_products, top_products, top_sales_days,
    DayTotal, GaugeBands, ProductShare, ProductTotal, TopCountry, COMPOSITION_LIMIT,
    TOP_COMBOS_LIMIT, TOP_DAYS_LIMIT, TOP_PRODUCTS_LIMIT,
};
pub use totals::{
    country_product_hierarchy, country_totals, daily_totals, monthly_totals, CountryProductTotal,
    CountryTotal, DailyTotal, MonthlyTotal,
};
pub use volume::{
    product_volume_ratio, yearly_product_growth, AxisRange, Growth, ProductGrowth, ProductVolume,
};
pub use weekday::{weekday_distribution, weekday_name, WeekdayStats, WEEKDAY_ORDER};

use chrono::Month;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::hash::Hash;

/// The canonical display order of months for charts keyed by month name.
pub const MONTH_ORDER: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

/// Divides `numerator` by a box count. Returns `None` when `denominator` is zero.
pub fn ratio(numerator: Decimal, denominator: u64) -> Option<Decimal> {
    ratio_of(numerator, Decimal::from(denominator))
}

/// Divides `numerator` by `denominator`. Returns `None` when `denominator` is zero.
pub(crate) fn ratio_of(numerator: Decimal, denominator: Decimal) -> Option<Decimal> {
    if denominator.is_zero() {
        return None;
    }
    numerator.checked_div(denominator)
}

/// An ordered, immutable sequence of result rows for one chart.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResultTable<R> {
    rows: Vec<R>,
}

impl<R> Default for ResultTable<R> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<R> ResultTable<R> {
    pub(crate) fn new(rows: Vec<R>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<R> FromIterator<R> for ResultTable<R> {
    fn from_iter<T: IntoIterator<Item = R>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a, R> IntoIterator for &'a ResultTable<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Accumulates values per key while remembering the order in which keys were first seen.
#[derive(Debug)]
pub(crate) struct Grouped<K, V> {
    index: HashMap<K, usize>,
    groups: Vec<(K, V)>,
}

impl<K, V> Grouped<K, V>
where
    K: Eq + Hash + Clone,
    V: Default,
{
    pub(crate) fn new() -> Self {
        Self {
            index: HashMap::new(),
            groups: Vec::new(),
        }
    }

    /// Returns the accumulator for `key`, creating it if this is the first time `key` is seen.
    pub(crate) fn entry(&mut self, key: K) -> &mut V {
        let ix = match self.index.get(&key) {
            Some(&ix) => ix,
            None => {
                self.groups.push((key.clone(), V::default()));
                self.index.insert(key, self.groups.len() - 1);
                self.groups.len() - 1
            }
        };
        &mut self.groups[ix].1
    }

    /// The groups in first-encountered order.
    pub(crate) fn into_vec(self) -> Vec<(K, V)> {
        self.groups
    }
}

/// Sorts `groups` by descending measure and keeps the first `n`. The sort is stable, so ties
/// keep the order `groups` came in.
pub(crate) fn top_n<K>(mut groups: Vec<(K, Decimal)>, n: usize) -> Vec<(K, Decimal)> {
    groups.sort_by(|a, b| b.1.cmp(&a.1));
    groups.truncate(n);
    groups
}

pub(crate) fn serialize_month<S>(month: &Month, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(month.name())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio() {
        assert_eq!(ratio(Decimal::from(150), 15), Some(Decimal::from(10)));
        assert_eq!(ratio(Decimal::from(150), 0), None);
        assert_eq!(ratio(Decimal::ZERO, 0), None);
    }

    #[test]
    fn test_grouped_keeps_first_seen_order() {
        let mut g: Grouped<&str, i32> = Grouped::new();
        *g.entry("b") += 1;
        *g.entry("a") += 2;
        *g.entry("b") += 3;
        assert_eq!(g.into_vec(), vec![("b", 4), ("a", 2)]);
    }

    #[test]
    fn test_top_n_ties_are_stable() {
        let groups = vec![
            ("first", Decimal::from(5)),
            ("big", Decimal::from(9)),
            ("second", Decimal::from(5)),
            ("small", Decimal::from(1)),
        ];
        let top = top_n(groups, 3);
        let keys: Vec<&str> = top.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["big", "first", "second"]);
    }

    #[test]
    fn test_top_n_shorter_than_limit() {
        let top = top_n(vec![("a", Decimal::ONE)], 10);
        assert_eq!(top.len(), 1);
        assert!(top_n(Vec::<(&str, Decimal)>::new(), 10).is_empty());
    }

    #[test]
    fn test_month_order() {
        let names: Vec<&str> = MONTH_ORDER.iter().map(|m| m.name()).collect();
        assert_eq!(names[0], "January");
        assert_eq!(names[11], "December");
    }
}
