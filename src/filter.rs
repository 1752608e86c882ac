//! The filter engine: applies the user's country and product selections to the canonical table.

use crate::model::{Sale, SalesTable};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The set of countries and products a user has selected.
///
/// An empty set excludes everything. It does not mean "no filter". Use `Selection::all` to get
/// the default selection of every value present in a table.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    countries: BTreeSet<String>,
    products: BTreeSet<String>,
}

impl Selection {
    pub fn new<C, P, S1, S2>(countries: C, products: P) -> Self
    where
        C: IntoIterator<Item = S1>,
        P: IntoIterator<Item = S2>,
        S1: Into<String>,
        S2: Into<String>,
    {
        Self {
            countries: countries.into_iter().map(Into::into).collect(),
            products: products.into_iter().map(Into::into).collect(),
        }
    }

    /// Selects every country and product that appears in `table`.
    pub fn all(table: &SalesTable) -> Self {
        Self {
            countries: table.countries(),
            products: table.products(),
        }
    }

    pub fn countries(&self) -> &BTreeSet<String> {
        &self.countries
    }

    pub fn products(&self) -> &BTreeSet<String> {
        &self.products
    }

    /// Returns true if `sale` passes both filters.
    pub fn matches(&self, sale: &Sale) -> bool {
        self.countries.contains(sale.country()) && self.products.contains(sale.product())
    }

    /// Returns the rows of `table` that match this selection, in table order.
    pub fn apply<'a>(&self, table: &'a SalesTable) -> FilteredView<'a> {
        FilteredView {
            rows: table.rows().iter().filter(|s| self.matches(s)).collect(),
        }
    }
}

/// The subset of the canonical table that matches a `Selection`.
///
/// The view borrows from the table and lives only as long as one rendering pass.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct FilteredView<'a> {
    rows: Vec<&'a Sale>,
}

impl<'a> FilteredView<'a> {
    /// A view over every row of `table`.
    pub fn unfiltered(table: &'a SalesTable) -> Self {
        Self {
            rows: table.rows().iter().collect(),
        }
    }

    pub fn rows(&self) -> &[&'a Sale] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Sale> + '_ {
        self.rows.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum of the amounts of every row in the view.
    pub fn total_amount(&self) -> Decimal {
        self.iter().map(|s| s.amount().value()).sum()
    }

    /// Sum of the boxes shipped of every row in the view.
    pub fn total_boxes(&self) -> u64 {
        self.iter().map(|s| u64::from(s.boxes_shipped())).sum()
    }
}
