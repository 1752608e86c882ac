use super::totals::{country_sums, day_sums};
use super::{ratio_of, top_n, CountryProductTotal, Grouped, ResultTable};
use crate::filter::FilteredView;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

pub const TOP_COMBOS_LIMIT: usize = 15;
pub const TOP_PRODUCTS_LIMIT: usize = 10;
pub const TOP_DAYS_LIMIT: usize = 10;
pub const COMPOSITION_LIMIT: usize = 10;

/// The label format for the top sales days chart, e.g. `Feb 24, 2022`.
const DAY_LABEL_FORMAT: &str = "%b %d, %Y";

/// Sales for one product.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct ProductTotal {
    pub product: String,
    pub amount: Decimal,
}

/// Sales for one day, with a display label.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct DayTotal {
    pub date: NaiveDate,
    pub label: String,
    pub amount: Decimal,
}

/// A slice of the product composition pie.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct ProductShare {
    pub product: String,
    pub amount: Decimal,
    /// Fraction of the pie, `None` when the pie sums to zero.
    pub share: Option<Decimal>,
}

/// The country with the most sales.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct TopCountry {
    pub country: String,
    /// The winning country's sales.
    pub amount: Decimal,
    /// Sales across every country in the view.
    pub total: Decimal,
    pub gauge: GaugeBands,
}

/// Gauge layout for the top country indicator: an axis from zero to half of total sales, split
/// into two equal bands, with a threshold marker at the winning amount.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct GaugeBands {
    pub axis_max: Decimal,
    pub low_band: (Decimal, Decimal),
    pub high_band: (Decimal, Decimal),
    pub threshold: Decimal,
}

impl GaugeBands {
    fn new(total: Decimal, threshold: Decimal) -> Self {
        let quarter = total * Decimal::new(25, 2);
        let half = total * Decimal::new(5, 1);
        Self {
            axis_max: half,
            low_band: (Decimal::ZERO, quarter),
            high_band: (quarter, half),
            threshold,
        }
    }
}

/// The 15 (country, product) pairs with the most sales, largest first.
///
/// Ties keep the order in which the pairs first appear in the view.
pub fn top_country_products(view: &FilteredView<'_>) -> ResultTable<CountryProductTotal> {
    let mut groups: Grouped<(&str, &str), Decimal> = Grouped::new();
    for sale in view.iter() {
        *groups.entry((sale.country(), sale.product())) += sale.amount().value();
    }
    top_n(groups.into_vec(), TOP_COMBOS_LIMIT)
        .into_iter()
        .map(|((country, product), amount)| CountryProductTotal {
            country: country.to_string(),
            product: product.to_string(),
            amount,
        })
        .collect()
}

/// Sales per product in alphabetical order, so that ranking ties go to the first name.
fn product_groups(view: &FilteredView<'_>) -> Vec<(String, Decimal)> {
    let mut groups: BTreeMap<&str, Decimal> = BTreeMap::new();
    for sale in view.iter() {
        *groups.entry(sale.product()).or_default() += sale.amount().value();
    }
    groups
        .into_iter()
        .map(|(product, amount)| (product.to_string(), amount))
        .collect()
}

/// The 10 best-selling products, largest first. Ties are alphabetical.
pub fn top_products(view: &FilteredView<'_>) -> ResultTable<ProductTotal> {
    top_n(product_groups(view), TOP_PRODUCTS_LIMIT)
        .into_iter()
        .map(|(product, amount)| ProductTotal { product, amount })
        .collect()
}

/// The 10 days with the most sales, largest first. Ties keep chronological order.
pub fn top_sales_days(view: &FilteredView<'_>) -> ResultTable<DayTotal> {
    top_n(day_sums(view).into_iter().collect(), TOP_DAYS_LIMIT)
        .into_iter()
        .map(|(date, amount)| DayTotal {
            date,
            label: date.format(DAY_LABEL_FORMAT).to_string(),
            amount,
        })
        .collect()
}

/// The 10 best-selling products as pie slices, ranked like [`top_products`]. Products beyond the tenth are left out rather than
/// collected into an "other" slice, so shares are relative to the top 10 only.
pub fn product_composition(view: &FilteredView<'_>) -> ResultTable<ProductShare> {
    let top = top_n(product_groups(view), COMPOSITION_LIMIT);
    let pie: Decimal = top.iter().map(|(_, amount)| *amount).sum();
    top.into_iter()
        .map(|(product, amount)| ProductShare {
            product,
            amount,
            share: ratio_of(amount, pie),
        })
        .collect()
}

/// The single country with the most sales, or `None` for an empty view.
///
/// Countries are compared in alphabetical order and the first one with the highest sales wins.
pub fn top_country(view: &FilteredView<'_>) -> Option<TopCountry> {
    let sums = country_sums(view);
    let total: Decimal = sums.values().copied().sum();
    let mut best: Option<(String, Decimal)> = None;
    for (country, amount) in sums {
        match &best {
            Some((_, top)) if *top >= amount => {}
            _ => best = Some((country, amount)),
        }
    }
    best.map(|(country, amount)| TopCountry {
        country,
        amount,
        total,
        gauge: GaugeBands::new(total, amount),
    })
}
