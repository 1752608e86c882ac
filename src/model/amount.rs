//! Amount type for handling currency values with optional dollar signs and commas.
//!
//! This module provides the `Amount` type which wraps `Decimal` and is the parse-or-fail boundary
//! for the `Amount` column of the sales data.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Represents how dollar amounts were (or should be) formatted.
///
/// # Examples
///  - `AmountFormat{ dollar: true, commas: true }` -> `$60,000.00`
///  - `AmountFormat{ dollar: false, commas: true }` -> `60,000.00`
///  - `AmountFormat{ dollar: false, commas: false }` -> `60000.00`
///  - `AmountFormat{ dollar: true, commas: false }` -> `$60000.00`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct AmountFormat {
    /// Whether a dollar sign is present in the formatting.
    dollar: bool,
    /// Whether commas are present as thousands separators in the formatting.
    commas: bool,
}

impl Default for AmountFormat {
    fn default() -> Self {
        DEFAULT_FORMAT
    }
}

/// The default format has a dollar sign and commas: e.g. `$60,000.00`.
const DEFAULT_FORMAT: AmountFormat = AmountFormat {
    dollar: true,
    commas: true,
};

/// The largest amount a single row may carry: one quintillion dollars. Sums of bounded amounts
/// cannot overflow a `Decimal` for any table that fits in memory.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA764_0000, 0x0DE0_B6B3, 0, false, 0);

/// Represents a non-negative dollar amount from the sales data.
///
/// Formatting is considered significant for the purposes of equality, so for numeric comparisons,
/// you should access the `Decimal` value and use that.
///
/// # Examples
///
/// Parsing with dollar sign and thousands separators:
/// ```
/// # use beans_to_bars::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("$5,320.00").unwrap();
/// assert_eq!(amount.to_string(), "$5,320.00");
/// ```
///
/// Anything that is not a number once `$` and `,` are removed is rejected:
/// ```
/// # use beans_to_bars::model::Amount;
/// # use std::str::FromStr;
/// assert!(Amount::from_str("$12.ab").is_err());
/// assert!(Amount::from_str("-$50.00").is_err());
/// ```
///
/// Sub-cent digits are kept when rendering:
/// ```
/// # use beans_to_bars::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("$1234.125").unwrap();
/// assert_eq!(amount.to_string(), "$1234.125");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount {
    /// The parsed numerical value.
    value: Decimal,
    /// The way the numerical value was parsed from, or should be written to, a `String`.
    format: AmountFormat,
}

impl Amount {
    /// Creates a new Amount from a Decimal value with default `String` formatting.
    pub const fn new(value: Decimal) -> Self {
        Self {
            value,
            format: DEFAULT_FORMAT,
        }
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.value().is_zero()
    }
}

/// An error that can occur when parsing strings into `Amount` values.
pub enum AmountError {
    /// Nothing was left to parse.
    Empty,
    /// The residual after removing `$` and `,` was not a number.
    Invalid(rust_decimal::Error),
    /// The value parsed but was below zero.
    Negative(Decimal),
    /// The value parsed but was above `MAX_AMOUNT`.
    TooLarge(Decimal),
}

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::Empty => f.write_str("Empty"),
            AmountError::Invalid(e) => Debug::fmt(e, f),
            AmountError::Negative(d) => write!(f, "Negative({d})"),
            AmountError::TooLarge(d) => write!(f, "TooLarge({d})"),
        }
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::Empty => f.write_str("the amount is empty"),
            AmountError::Invalid(e) => Display::fmt(e, f),
            AmountError::Negative(d) => write!(f, "the amount {d} is negative"),
            AmountError::TooLarge(d) => write!(f, "the amount {d} is larger than {MAX_AMOUNT}"),
        }
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AmountError::Invalid(e) => Some(e),
            _ => None,
        }
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        let (dollar, without_dollar) = match trimmed.strip_prefix('$') {
            Some(after_dollar) => (true, after_dollar.trim_start()),
            None => (false, trimmed),
        };

        // Remove commas (thousand separators)
        let without_commas = without_dollar.replace(',', "");
        let commas = without_commas.len() < without_dollar.len();

        if without_commas.is_empty() {
            return Err(AmountError::Empty);
        }

        let value = Decimal::from_str(&without_commas).map_err(AmountError::Invalid)?;
        if value.is_sign_negative() && !value.is_zero() {
            return Err(AmountError::Negative(value));
        }
        if value > MAX_AMOUNT {
            return Err(AmountError::TooLarge(value));
        }

        Ok(Amount {
            value,
            format: AmountFormat { dollar, commas },
        })
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (sign, num) = if self.value.is_sign_negative() && !self.value.is_zero() {
            ("-", self.value.abs())
        } else {
            ("", self.value)
        };

        let dol = if self.format.dollar { "$" } else { "" };

        // At least two decimal places, and never fewer than the value carries.
        let digits = if num.scale() < 2 {
            format!("{num:.2}")
        } else {
            num.to_string()
        };

        if self.format.commas {
            write!(f, "{sign}{dol}{}", group_thousands(&digits))
        } else {
            write!(f, "{sign}{dol}{digits}")
        }
    }
}

/// Inserts a comma between each group of three digits left of the decimal point.
fn group_thousands(digits: &str) -> String {
    let (int, frac) = match digits.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (digits, None),
    };
    let mut grouped = String::with_capacity(digits.len() + int.len() / 3);
    for (ix, c) in int.chars().enumerate() {
        if ix > 0 && (int.len() - ix) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if let Some(frac) = frac {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_with_dollar_sign() {
        let amount = Amount::from_str("$50.00").unwrap();
        assert_eq!(amount.value(), dec("50.00"));
    }

    #[test]
    fn test_parse_without_dollar_sign() {
        let amount = Amount::from_str("50.00").unwrap();
        assert_eq!(amount.value(), dec("50.00"));
    }

    #[test]
    fn test_parse_dataset_style() {
        // The source data pads the value after the dollar sign.
        let amount = Amount::from_str("$5,320.00 ").unwrap();
        assert_eq!(amount.value(), dec("5320"));
        let amount = Amount::from_str("$ 7,896.00").unwrap();
        assert_eq!(amount.value(), dec("7896"));
    }

    #[test]
    fn test_parse_multiple_commas() {
        let amount = Amount::from_str("$1,234,567.89").unwrap();
        assert_eq!(amount.value(), dec("1234567.89"));
    }

    #[test]
    fn test_parse_empty_string() {
        assert!(matches!(Amount::from_str(""), Err(AmountError::Empty)));
        assert!(matches!(Amount::from_str(" $ "), Err(AmountError::Empty)));
    }

    #[test]
    fn test_parse_garbage() {
        let err = Amount::from_str("$12.ab").unwrap_err();
        assert!(matches!(err, AmountError::Invalid(_)));
        assert!(Amount::from_str("n/a").is_err());
    }

    #[test]
    fn test_parse_negative() {
        let err = Amount::from_str("-50.00").unwrap_err();
        assert!(matches!(err, AmountError::Negative(_)));
        assert!(err.to_string().contains("negative"));
    }

    #[test]
    fn test_parse_too_large() {
        let err = Amount::from_str("$50,000,000,000,000,000,000,000,000,000").unwrap_err();
        assert!(matches!(err, AmountError::TooLarge(_)));
        assert!(err.to_string().contains("larger than"));
        assert_eq!(MAX_AMOUNT, dec("1000000000000000000"));
        assert!(Amount::from_str("$1,000,000,000,000,000,000").is_ok());
        assert!(Amount::from_str("$1,000,000,000,000,000,000.01").is_err());
    }

    #[test]
    fn test_parse_zero() {
        let amount = Amount::from_str("$0.00").unwrap();
        assert!(amount.is_zero());
    }

    #[test]
    fn test_display_default() {
        let amount = Amount::new(dec("1234.5"));
        assert_eq!(amount.to_string(), "$1,234.50");
    }

    #[test]
    fn test_display_zero() {
        let amount = Amount::new(Decimal::ZERO);
        assert_eq!(amount.to_string(), "$0.00");
    }

    #[test]
    fn test_retain_format() {
        let s = "1000000.00";
        assert_eq!(Amount::from_str(s).unwrap().to_string(), s);
        let s = "$1000000.00";
        assert_eq!(Amount::from_str(s).unwrap().to_string(), s);
        let s = "1,000,000.00";
        assert_eq!(Amount::from_str(s).unwrap().to_string(), s);
    }

    #[test]
    fn test_display_keeps_precision() {
        assert_eq!(Amount::new(dec("10.125")).to_string(), "$10.125");
        assert_eq!(
            Amount::new(dec("12345678901234567.89")).to_string(),
            "$12,345,678,901,234,567.89"
        );
        assert_eq!(Amount::new(dec("999")).to_string(), "$999.00");
        assert_eq!(Amount::new(dec("100000")).to_string(), "$100,000.00");
        let s = "1000.125";
        assert_eq!(Amount::from_str(s).unwrap().to_string(), s);
    }

    #[test]
    fn test_equality_is_format_sensitive() {
        let a = Amount::from_str("$5,000.00").unwrap();
        let b = Amount::from_str("5000.00").unwrap();
        assert_ne!(a, b);
        assert_eq!(a.value(), b.value());
    }

    #[test]
    fn test_serde() {
        let amount = Amount::new(dec("50.00"));
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "\"$50.00\"");
        let back: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(back.value(), dec("50"));
    }
}
