use crate::error::LoadError;
use crate::model::Amount;
use chrono::{Datelike, Month, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The date format used by the sales data, e.g. `04-Jan-22`.
pub const DATE_FORMAT: &str = "%d-%b-%y";

pub(crate) const SALES_PERSON_STR: &str = "Sales Person";
pub(crate) const COUNTRY_STR: &str = "Country";
pub(crate) const PRODUCT_STR: &str = "Product";
pub(crate) const DATE_STR: &str = "Date";
pub(crate) const AMOUNT_STR: &str = "Amount";
pub(crate) const BOXES_SHIPPED_STR: &str = "Boxes Shipped";

/// The header row of the sales data, in column order.
pub const HEADERS: [&str; 6] = [
    SALES_PERSON_STR,
    COUNTRY_STR,
    PRODUCT_STR,
    DATE_STR,
    AMOUNT_STR,
    BOXES_SHIPPED_STR,
];

/// A row exactly as it appears in the CSV, before any parsing.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub(crate) struct RawSale {
    #[serde(rename = "Sales Person")]
    pub(crate) sales_person: String,
    #[serde(rename = "Country")]
    pub(crate) country: String,
    #[serde(rename = "Product")]
    pub(crate) product: String,
    #[serde(rename = "Date")]
    pub(crate) date: String,
    #[serde(rename = "Amount")]
    pub(crate) amount: String,
    #[serde(rename = "Boxes Shipped")]
    pub(crate) boxes_shipped: String,
}

/// The outcome of parsing a `RawSale`.
#[derive(Debug)]
pub(crate) enum Parsed {
    Sale(Sale),
    /// The date could not be parsed; the row is silently left out of the table.
    BadDate(String),
}

impl RawSale {
    /// Parses the row found at `line` (1-based, counting the header) into a `Sale`.
    pub(crate) fn parse(self, line: u64) -> Result<Parsed, LoadError> {
        let amount = Amount::from_str(&self.amount)
            .map_err(|e| LoadError::data_format(line, AMOUNT_STR, &self.amount, e))?;
        let boxes_shipped = parse_boxes(&self.boxes_shipped)
            .map_err(|e| LoadError::data_format(line, BOXES_SHIPPED_STR, &self.boxes_shipped, e))?;

        let date = match NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT) {
            Ok(date) => date,
            Err(_) => return Ok(Parsed::BadDate(self.date)),
        };

        Ok(Parsed::Sale(Sale::new(
            self.sales_person.trim(),
            self.country.trim(),
            self.product.trim(),
            date,
            amount,
            boxes_shipped,
        )))
    }
}

fn parse_boxes(s: &str) -> Result<u32, std::num::ParseIntError> {
    s.trim().replace(',', "").parse::<u32>()
}

/// A single transaction from the canonical sales table, with its derived fields.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Sale {
    sales_person: String,
    country: String,
    product: String,
    date: NaiveDate,
    amount: Amount,
    boxes_shipped: u32,
    #[serde(serialize_with = "crate::aggregate::serialize_month")]
    month: Month,
    year: i32,
    revenue_per_box: Option<Decimal>,
}

impl Sale {
    /// Creates a sale and computes its derived fields.
    pub fn new(
        sales_person: impl Into<String>,
        country: impl Into<String>,
        product: impl Into<String>,
        date: NaiveDate,
        amount: Amount,
        boxes_shipped: u32,
    ) -> Self {
        // `month()` is always 1..=12.
        let month = Month::try_from(date.month() as u8).unwrap_or(Month::January);
        let revenue_per_box = crate::aggregate::ratio(amount.value(), u64::from(boxes_shipped));
        Self {
            sales_person: sales_person.into(),
            country: country.into(),
            product: product.into(),
            date,
            amount,
            boxes_shipped,
            month,
            year: date.year(),
            revenue_per_box,
        }
    }

    pub fn sales_person(&self) -> &str {
        &self.sales_person
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn boxes_shipped(&self) -> u32 {
        self.boxes_shipped
    }

    pub fn month(&self) -> Month {
        self.month
    }

    /// The English name of the month, e.g. `January`.
    pub fn month_name(&self) -> &'static str {
        self.month.name()
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Amount divided by boxes shipped, `None` when no boxes were shipped.
    pub fn revenue_per_box(&self) -> Option<Decimal> {
        self.revenue_per_box
    }

    /// Converts the sale back into its CSV form.
    pub(crate) fn to_raw(&self) -> RawSale {
        RawSale {
            sales_person: self.sales_person.clone(),
            country: self.country.clone(),
            product: self.product.clone(),
            date: self.date.format(DATE_FORMAT).to_string(),
            amount: Amount::new(self.amount.value()).to_string(),
            boxes_shipped: self.boxes_shipped.to_string(),
        }
    }
}
