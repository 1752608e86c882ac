use super::totals::day_sums;
use super::{ratio_of, ResultTable};
use crate::filter::FilteredView;
use chrono::{Datelike, Weekday};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

/// The fixed display order of weekdays.
pub const WEEKDAY_ORDER: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// The English name of a weekday, e.g. `Monday`.
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn serialize_weekday<S>(weekday: &Weekday, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(weekday_name(*weekday))
}

/// Box plot statistics of daily sales for one weekday.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct WeekdayStats {
    #[serde(serialize_with = "serialize_weekday")]
    pub weekday: Weekday,
    /// The number of distinct dates that fell on this weekday.
    pub days: usize,
    pub min: Decimal,
    pub q1: Decimal,
    pub median: Decimal,
    pub q3: Decimal,
    pub max: Decimal,
    pub mean: Decimal,
}

impl WeekdayStats {
    /// `daily` must be non-empty and sorted ascending.
    fn from_sorted(weekday: Weekday, daily: &[Decimal]) -> Option<Self> {
        let min = *daily.first()?;
        let max = *daily.last()?;
        let sum: Decimal = daily.iter().copied().sum();
        Some(Self {
            weekday,
            days: daily.len(),
            min,
            q1: quantile(daily, Decimal::new(25, 2))?,
            median: quantile(daily, Decimal::new(5, 1))?,
            q3: quantile(daily, Decimal::new(75, 2))?,
            max,
            mean: ratio_of(sum, Decimal::from(daily.len()))?,
        })
    }
}

/// Linear interpolation between the closest ranks of `sorted`.
fn quantile(sorted: &[Decimal], p: Decimal) -> Option<Decimal> {
    let last = sorted.len().checked_sub(1)?;
    let pos = Decimal::from(last) * p;
    let lo = pos.floor();
    let ix = lo.to_usize()?;
    let frac = pos - lo;
    let below = *sorted.get(ix)?;
    match sorted.get(ix + 1) {
        Some(above) if !frac.is_zero() => Some(below + (*above - below) * frac),
        _ => Some(below),
    }
}

/// Daily sales grouped by weekday, Monday first. Sales are summed per date first, so each
/// data point in a weekday's distribution is one calendar day. Weekdays with no sales days are
/// omitted.
pub fn weekday_distribution(view: &FilteredView<'_>) -> ResultTable<WeekdayStats> {
    let mut by_weekday: [Vec<Decimal>; 7] = Default::default();
    for (date, amount) in day_sums(view) {
        by_weekday[date.weekday().num_days_from_monday() as usize].push(amount);
    }
    WEEKDAY_ORDER
        .iter()
        .zip(by_weekday.iter_mut())
        .filter_map(|(weekday, daily)| {
            daily.sort();
            WeekdayStats::from_sorted(*weekday, daily)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Selection;
    use crate::test::{dec, sample_table};

    #[test]
    fn test_quantile() {
        let values = [dec(3990), dec(4501), dec(13685)];
        assert_eq!(quantile(&values, Decimal::new(5, 1)), Some(dec(4501)));
        assert_eq!(
            quantile(&values, Decimal::new(25, 2)),
            Some(Decimal::new(42455, 1))
        );
        assert_eq!(quantile(&values, Decimal::new(75, 2)), Some(dec(9093)));
        assert_eq!(quantile(&[dec(7)], Decimal::new(75, 2)), Some(dec(7)));
        assert_eq!(quantile(&[], Decimal::new(5, 1)), None);
    }

    #[test]
    fn test_weekday_distribution() {
        let table = sample_table();
        let stats = weekday_distribution(&FilteredView::unfiltered(&table));
        let days: Vec<&str> = stats.iter().map(|s| weekday_name(s.weekday)).collect();
        assert_eq!(days, vec!["Monday", "Tuesday", "Wednesday", "Thursday"]);

        let monday = &stats.rows()[0];
        assert_eq!(monday.days, 2);
        assert_eq!(monday.median, Decimal::new(76265, 1));

        let thursday = &stats.rows()[3];
        assert_eq!(thursday.days, 3);
        assert_eq!(thursday.min, dec(3990));
        assert_eq!(thursday.median, dec(4501));
        assert_eq!(thursday.max, dec(13685));
        assert_eq!(thursday.mean, dec(7392));
    }

    #[test]
    fn test_same_day_sales_are_one_point() {
        // Two sales on 2022-01-04 are summed into a single Tuesday.
        let table = sample_table();
        let stats = weekday_distribution(&FilteredView::unfiltered(&table));
        let tuesday = &stats.rows()[1];
        assert_eq!(tuesday.days, 2);
        assert_eq!(tuesday.max, dec(8155));
        assert_eq!(tuesday.min, dec(3080));
    }

    #[test]
    fn test_serializes_weekday_name() {
        let table = sample_table();
        let stats = weekday_distribution(&FilteredView::unfiltered(&table));
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json[0]["weekday"], "Monday");
    }

    #[test]
    fn test_empty_view() {
        let table = sample_table();
        let view = Selection::default().apply(&table);
        assert!(weekday_distribution(&view).is_empty());
    }
}
