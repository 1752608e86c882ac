use super::{serialize_month, ResultTable};
use crate::filter::FilteredView;
use crate::geo::{CountryResolver, Iso3};
use chrono::{Datelike, Month, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Sales for one calendar month of one year.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct MonthlyTotal {
    pub year: i32,
    #[serde(serialize_with = "serialize_month")]
    pub month: Month,
    pub amount: Decimal,
}

/// Sales for one day.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub amount: Decimal,
}

/// Sales for one country, with its ISO3 code when the country could be resolved.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct CountryTotal {
    pub country: String,
    pub iso3: Option<Iso3>,
    pub amount: Decimal,
}

/// Sales for one country and product pair.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct CountryProductTotal {
    pub country: String,
    pub product: String,
    pub amount: Decimal,
}

/// Sales per (year, month) in chronological order.
pub fn monthly_totals(view: &FilteredView<'_>) -> ResultTable<MonthlyTotal> {
    let mut sums: BTreeMap<(i32, u32), (Month, Decimal)> = BTreeMap::new();
    for sale in view.iter() {
        let entry = sums
            .entry((sale.year(), sale.date().month()))
            .or_insert((sale.month(), Decimal::ZERO));
        entry.1 += sale.amount().value();
    }
    sums.into_iter()
        .map(|((year, _), (month, amount))| MonthlyTotal {
            year,
            month,
            amount,
        })
        .collect()
}

/// Sales per day in chronological order.
pub fn daily_totals(view: &FilteredView<'_>) -> ResultTable<DailyTotal> {
    day_sums(view)
        .into_iter()
        .map(|(date, amount)| DailyTotal { date, amount })
        .collect()
}

pub(crate) fn day_sums(view: &FilteredView<'_>) -> BTreeMap<NaiveDate, Decimal> {
    let mut sums = BTreeMap::new();
    for sale in view.iter() {
        *sums.entry(sale.date()).or_insert(Decimal::ZERO) += sale.amount().value();
    }
    sums
}

/// Sales per country in alphabetical order, each with its resolved ISO3 code.
///
/// A country that `resolver` cannot resolve is kept with `iso3: None`. Use
/// `ResultTable::<CountryTotal>::resolved` to get the rows that can be drawn on a map.
pub fn country_totals<R>(view: &FilteredView<'_>, resolver: &R) -> ResultTable<CountryTotal>
where
    R: CountryResolver + ?Sized,
{
    country_sums(view)
        .into_iter()
        .map(|(country, amount)| {
            let iso3 = resolver.resolve(&country);
            if iso3.is_none() {
                debug!("No ISO3 code for country '{country}'");
            }
            CountryTotal {
                country,
                iso3,
                amount,
            }
        })
        .collect()
}

pub(crate) fn country_sums(view: &FilteredView<'_>) -> BTreeMap<String, Decimal> {
    let mut sums = BTreeMap::new();
    for sale in view.iter() {
        *sums
            .entry(sale.country().to_string())
            .or_insert(Decimal::ZERO) += sale.amount().value();
    }
    sums
}

impl ResultTable<CountryTotal> {
    /// The rows with a resolved ISO3 code, for the choropleth.
    pub fn resolved(&self) -> ResultTable<CountryTotal> {
        self.iter().filter(|row| row.iso3.is_some()).cloned().collect()
    }

    /// The countries that could not be resolved.
    pub fn unresolved(&self) -> Vec<&str> {
        self.iter()
            .filter(|row| row.iso3.is_none())
            .map(|row| row.country.as_str())
            .collect()
    }
}

/// Sales for every (country, product) pair, ordered by country then product. Not truncated.
pub fn country_product_hierarchy(view: &FilteredView<'_>) -> ResultTable<CountryProductTotal> {
    let mut sums: BTreeMap<(&str, &str), Decimal> = BTreeMap::new();
    for sale in view.iter() {
        *sums
            .entry((sale.country(), sale.product()))
            .or_insert(Decimal::ZERO) += sale.amount().value();
    }
    sums.into_iter()
        .map(|((country, product), amount)| CountryProductTotal {
            country: country.to_string(),
            product: product.to_string(),
            amount,
        })
        .collect()
}
