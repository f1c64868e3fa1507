use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::StatsError;

/// Calendar unit used to group transactions into buckets
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Week,
    Month,
    Year,
}

impl Granularity {
    pub const ALL: [Granularity; 4] = [
        Granularity::Day,
        Granularity::Week,
        Granularity::Month,
        Granularity::Year,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
            Granularity::Year => "year",
        }
    }

    /// Parse an optional period specifier. There is no implicit default:
    /// a missing value is rejected the same way as an unknown one.
    pub fn require(value: Option<&str>) -> Result<Self, StatsError> {
        match value {
            Some(v) => v.parse(),
            None => Err(StatsError::InvalidGranularity(
                "period is required".to_string(),
            )),
        }
    }

    /// The immutable bucketing rule for this granularity
    pub fn rule(&self) -> &'static PeriodRule {
        &PERIOD_RULES[self]
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(Granularity::Day),
            "week" => Ok(Granularity::Week),
            "month" => Ok(Granularity::Month),
            "year" => Ok(Granularity::Year),
            other => Err(StatsError::InvalidGranularity(format!(
                "unsupported period '{other}', expected one of: day, week, month, year"
            ))),
        }
    }
}

/// Identifies one calendar bucket. Keys of the same granularity order
/// chronologically; keys of different granularities are never mixed in
/// one result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, ToSchema)]
#[serde(untagged)]
pub enum PeriodKey {
    Day { date: NaiveDate },
    Week { year: i32, week: u32 },
    Month { year: i32, month: u32 },
    Year { year: i32 },
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodKey::Day { date } => write!(f, "{date}"),
            PeriodKey::Week { year, week } => write!(f, "{year}-W{week:02}"),
            PeriodKey::Month { year, month } => write!(f, "{year}-{month:02}"),
            PeriodKey::Year { year } => write!(f, "{year}"),
        }
    }
}

/// How one granularity turns a date into a bucket key
pub struct PeriodRule {
    pub bucket: fn(NaiveDate) -> PeriodKey,
}

fn day_key(date: NaiveDate) -> PeriodKey {
    PeriodKey::Day { date }
}

// ISO 8601 week, keyed by the ISO week-numbering year (2024-12-30 is 2025-W01)
fn week_key(date: NaiveDate) -> PeriodKey {
    let iso = date.iso_week();
    PeriodKey::Week {
        year: iso.year(),
        week: iso.week(),
    }
}

fn month_key(date: NaiveDate) -> PeriodKey {
    PeriodKey::Month {
        year: date.year(),
        month: date.month(),
    }
}

fn year_key(date: NaiveDate) -> PeriodKey {
    PeriodKey::Year { year: date.year() }
}

lazy_static! {
    /// Read-only granularity table, built once on first use
    static ref PERIOD_RULES: BTreeMap<Granularity, PeriodRule> = Granularity::ALL
        .into_iter()
        .map(|granularity| {
            let rule = match granularity {
                Granularity::Day => PeriodRule { bucket: day_key },
                Granularity::Week => PeriodRule { bucket: week_key },
                Granularity::Month => PeriodRule { bucket: month_key },
                Granularity::Year => PeriodRule { bucket: year_key },
            };
            (granularity, rule)
        })
        .collect();
}

/// Map a date to the bucket it belongs to under `granularity`
pub fn bucket_key(date: NaiveDate, granularity: Granularity) -> PeriodKey {
    (granularity.rule().bucket)(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_known_granularities() {
        for g in Granularity::ALL {
            assert_eq!(g.as_str().parse::<Granularity>().unwrap(), g);
        }
    }

    #[test]
    fn test_parse_unknown_granularity_fails() {
        let err = "fortnight".parse::<Granularity>().unwrap_err();
        assert!(matches!(err, StatsError::InvalidGranularity(_)));
        assert!(err.to_string().contains("fortnight"));
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert!("Month".parse::<Granularity>().is_err());
    }

    #[test]
    fn test_require_rejects_missing_period() {
        let err = Granularity::require(None).unwrap_err();
        assert!(matches!(err, StatsError::InvalidGranularity(_)));
        assert_eq!(Granularity::require(Some("week")).unwrap(), Granularity::Week);
    }

    #[test]
    fn test_year_and_month_keys() {
        let d = date(2024, 3, 17);
        assert_eq!(bucket_key(d, Granularity::Year), PeriodKey::Year { year: 2024 });
        assert_eq!(
            bucket_key(d, Granularity::Month),
            PeriodKey::Month {
                year: 2024,
                month: 3
            }
        );
    }

    #[test]
    fn test_day_key_is_the_date() {
        let d = date(2024, 2, 29);
        assert_eq!(bucket_key(d, Granularity::Day), PeriodKey::Day { date: d });
    }

    #[test]
    fn test_week_key_follows_iso_8601() {
        // 2024-01-01 is a Monday, first ISO week of 2024
        assert_eq!(
            bucket_key(date(2024, 1, 1), Granularity::Week),
            PeriodKey::Week { year: 2024, week: 1 }
        );
        // 2021-01-03 is a Sunday still in 2020-W53
        assert_eq!(
            bucket_key(date(2021, 1, 3), Granularity::Week),
            PeriodKey::Week { year: 2020, week: 53 }
        );
        // 2024-12-30 belongs to the first week of 2025
        assert_eq!(
            bucket_key(date(2024, 12, 30), Granularity::Week),
            PeriodKey::Week { year: 2025, week: 1 }
        );
    }

    #[test]
    fn test_keys_order_chronologically() {
        let a = bucket_key(date(2023, 12, 1), Granularity::Month);
        let b = bucket_key(date(2024, 1, 1), Granularity::Month);
        let c = bucket_key(date(2024, 11, 1), Granularity::Month);
        assert!(a < b && b < c);
    }

    #[test]
    fn test_rule_table_covers_every_granularity() {
        let d = date(2024, 5, 5);
        for g in Granularity::ALL {
            let matches_granularity = match (g, (g.rule().bucket)(d)) {
                (Granularity::Day, PeriodKey::Day { date }) => date == d,
                (Granularity::Week, PeriodKey::Week { year, week }) => (year, week) == (2024, 18),
                (Granularity::Month, PeriodKey::Month { year, month }) => (year, month) == (2024, 5),
                (Granularity::Year, PeriodKey::Year { year }) => year == 2024,
                _ => false,
            };
            assert!(matches_granularity, "{g}");
        }
    }

    #[test]
    fn test_key_serializes_flat() {
        let json = serde_json::to_value(PeriodKey::Month {
            year: 2024,
            month: 2,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"year": 2024, "month": 2}));

        let json = serde_json::to_value(PeriodKey::Day {
            date: date(2024, 1, 2),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"date": "2024-01-02"}));
    }
}
