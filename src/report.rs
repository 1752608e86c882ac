//! Assembles every aggregate for one filtered view into a single `Report`.
//!
//! Each chart gets its own `Section`. Sections are computed independently: one that comes out
//! empty, or that panics inside a collaborator such as a `CountryResolver`, is reported as a
//! placeholder while every other section is still produced.

use crate::aggregate::{
    self, CountryProductTotal, CountryTotal, DailyTotal, DayTotal, Growth, KeyMetrics,
    MonthlyTotal, ProductShare, ProductTotal, ProductVolume, ResultTable, TopCountry,
    WeekdayStats, MONTH_ORDER,
};
use crate::filter::{FilteredView, Selection};
use crate::geo::CountryResolver;
use serde::Serialize;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

/// The outcome of computing one chart's data.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum Section<T> {
    /// The chart has data.
    Ready(T),
    /// There is nothing to draw for the current selection.
    Empty,
    /// Computing the data failed; the chart should show a placeholder.
    Failed { reason: String },
}

impl<T> Section<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            Section::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Section::Ready(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Section::Empty)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Section::Failed { .. })
    }
}

/// Runs `compute` in isolation. `None` means empty; a panic means failed.
fn section<T>(name: &str, compute: impl FnOnce() -> Option<T>) -> Section<T> {
    match panic::catch_unwind(AssertUnwindSafe(compute)) {
        Ok(Some(data)) => Section::Ready(data),
        Ok(None) => {
            debug!("The {name} section is empty");
            Section::Empty
        }
        Err(payload) => {
            let reason = panic_message(payload.as_ref());
            warn!("The {name} section failed: {reason}");
            Section::Failed { reason }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        String::from("unknown error")
    }
}

fn non_empty<R>(table: ResultTable<R>) -> Option<ResultTable<R>> {
    (!table.is_empty()).then_some(table)
}

/// Everything a dashboard needs to draw one rendering pass.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub selection: Selection,
    /// The number of rows in the filtered view.
    pub rows: usize,
    pub metrics: Section<KeyMetrics>,
    /// Month names in display order, for charts keyed by month.
    pub month_order: Vec<&'static str>,
    pub monthly_totals: Section<ResultTable<MonthlyTotal>>,
    pub daily_totals: Section<ResultTable<DailyTotal>>,
    pub top_country_products: Section<ResultTable<CountryProductTotal>>,
    /// Every country, including those without an ISO3 code.
    pub country_totals: Section<ResultTable<CountryTotal>>,
    /// Only the countries that can be drawn on a map.
    pub choropleth: Section<ResultTable<CountryTotal>>,
    pub top_products: Section<ResultTable<ProductTotal>>,
    pub weekday_distribution: Section<ResultTable<WeekdayStats>>,
    pub top_sales_days: Section<ResultTable<DayTotal>>,
    pub yearly_product_growth: Section<Growth>,
    pub product_volume_ratio: Section<ResultTable<ProductVolume>>,
    pub product_composition: Section<ResultTable<ProductShare>>,
    pub country_product_hierarchy: Section<ResultTable<CountryProductTotal>>,
    pub top_country: Section<TopCountry>,
}

impl Report {
    /// Computes every section for `view`, which is the result of applying `selection`.
    pub fn build<R>(selection: &Selection, view: &FilteredView<'_>, resolver: &R) -> Self
    where
        R: CountryResolver + ?Sized,
    {
        let country_totals = section("country totals", || {
            non_empty(aggregate::country_totals(view, resolver))
        });
        let choropleth = match &country_totals {
            Section::Ready(totals) => section("choropleth", || non_empty(totals.resolved())),
            Section::Empty => Section::Empty,
            Section::Failed { reason } => Section::Failed {
                reason: reason.clone(),
            },
        };

        let report = Self {
            selection: selection.clone(),
            rows: view.len(),
            metrics: section("key metrics", || Some(aggregate::key_metrics(view))),
            month_order: MONTH_ORDER.iter().map(|m| m.name()).collect(),
            monthly_totals: section("monthly totals", || {
                non_empty(aggregate::monthly_totals(view))
            }),
            daily_totals: section("daily totals", || non_empty(aggregate::daily_totals(view))),
            top_country_products: section("top country products", || {
                non_empty(aggregate::top_country_products(view))
            }),
            country_totals,
            choropleth,
            top_products: section("top products", || non_empty(aggregate::top_products(view))),
            weekday_distribution: section("weekday distribution", || {
                non_empty(aggregate::weekday_distribution(view))
            }),
            top_sales_days: section("top sales days", || {
                non_empty(aggregate::top_sales_days(view))
            }),
            yearly_product_growth: section("yearly product growth", || {
                let growth = aggregate::yearly_product_growth(view);
                (!growth.points.is_empty()).then_some(growth)
            }),
            product_volume_ratio: section("product volume ratio", || {
                non_empty(aggregate::product_volume_ratio(view))
            }),
            product_composition: section("product composition", || {
                non_empty(aggregate::product_composition(view))
            }),
            country_product_hierarchy: section("country product hierarchy", || {
                non_empty(aggregate::country_product_hierarchy(view))
            }),
            top_country: section("top country", || aggregate::top_country(view)),
        };
        debug!(
            "Built report over {} rows, {} failed sections",
            report.rows,
            report.failed_sections()
        );
        report
    }

    /// The number of sections that failed to compute.
    pub fn failed_sections(&self) -> usize {
        [
            self.metrics.is_failed(),
            self.monthly_totals.is_failed(),
            self.daily_totals.is_failed(),
            self.top_country_products.is_failed(),
            self.country_totals.is_failed(),
            self.choropleth.is_failed(),
            self.top_products.is_failed(),
            self.weekday_distribution.is_failed(),
            self.top_sales_days.is_failed(),
            self.yearly_product_growth.is_failed(),
            self.product_volume_ratio.is_failed(),
            self.product_composition.is_failed(),
            self.country_product_hierarchy.is_failed(),
            self.top_country.is_failed(),
        ]
        .into_iter()
        .filter(|failed| *failed)
        .count()
    }
}
