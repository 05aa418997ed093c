//! Period-bucketed revenue and the top sales leaderboard.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};

use innkeep_core::DomainError;

use crate::sale::Sale;

/// Number of sales returned by the `max` leaderboard.
pub const TOP_SALES_LIMIT: usize = 5;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Grouping requested by a stats query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Week,
    Month,
    Year,
    /// Not a bucket: the highest-value sales.
    Max,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
            Period::Max => "max",
        }
    }
}

impl FromStr for Period {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            "year" => Ok(Period::Year),
            "max" => Ok(Period::Max),
            other => Err(DomainError::validation(format!(
                "invalid period '{other}' (expected week, month, year or max)"
            ))),
        }
    }
}

/// Bucket a sale falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BucketKey {
    /// Week number only; the year is deliberately not part of the key.
    Week(u32),
    Month { year: i32, month: u32 },
    Year(i32),
}

impl BucketKey {
    fn for_sale(period: Period, sale: &Sale) -> Option<Self> {
        match period {
            Period::Week => Some(BucketKey::Week(week_of_year(sale.date))),
            Period::Month => Some(BucketKey::Month {
                year: sale.date.year(),
                month: sale.date.month(),
            }),
            Period::Year => Some(BucketKey::Year(sale.date.year())),
            Period::Max => None,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            BucketKey::Week(_) => "week",
            BucketKey::Month { .. } => "month",
            BucketKey::Year(_) => "year",
        }
    }
}

impl core::fmt::Display for BucketKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BucketKey::Week(w) => write!(f, "{w}"),
            BucketKey::Month { year, month } => write!(f, "{year}-{month}"),
            BucketKey::Year(y) => write!(f, "{y}"),
        }
    }
}

/// Revenue summed over one bucket.
///
/// Serializes as `{"<period>": key, "value": total}`, e.g. `{"month": "2024-5", "value": 150}`.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodTotal {
    pub key: BucketKey,
    pub value: f64,
}

impl Serialize for PeriodTotal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        match &self.key {
            BucketKey::Week(w) => map.serialize_entry(self.key.label(), w)?,
            BucketKey::Month { .. } => map.serialize_entry(self.key.label(), &self.key.to_string())?,
            BucketKey::Year(y) => map.serialize_entry(self.key.label(), y)?,
        }
        map.serialize_entry("value", &self.value)?;
        map.end()
    }
}

/// Result of a stats query.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum SalesStats {
    Totals(Vec<PeriodTotal>),
    Top(Vec<Sale>),
}

/// Compute the stats for `period` over `sales`.
///
/// Totals only contain buckets with at least one sale, in ascending key order.
pub fn group_by(sales: &[Sale], period: Period) -> SalesStats {
    if period == Period::Max {
        return SalesStats::Top(top_sales(sales, TOP_SALES_LIMIT));
    }

    let mut buckets: BTreeMap<BucketKey, f64> = BTreeMap::new();
    for sale in sales {
        if let Some(key) = BucketKey::for_sale(period, sale) {
            *buckets.entry(key).or_insert(0.0) += sale.value;
        }
    }

    SalesStats::Totals(
        buckets
            .into_iter()
            .map(|(key, value)| PeriodTotal { key, value })
            .collect(),
    )
}

/// The `limit` highest-value sales, descending; equal values keep their input order.
pub fn top_sales(sales: &[Sale], limit: usize) -> Vec<Sale> {
    let mut ranked = sales.to_vec();
    // `sort_by` is stable, which is what keeps ties in input order.
    ranked.sort_by(|a, b| b.value.total_cmp(&a.value));
    ranked.truncate(limit);
    ranked
}

/// Week bucket: `ceil((elapsed_days + weekday_of_jan1 + 1) / 7)`.
///
/// `elapsed_days` is the fractional number of days since January 1st 00:00 UTC of the
/// date's year and `weekday_of_jan1` counts from Sunday = 0.
pub fn week_of_year(date: DateTime<Utc>) -> u32 {
    let ordinal0 = date.ordinal0();
    let millis_into_day =
        f64::from(date.num_seconds_from_midnight()) * 1000.0 + f64::from(date.nanosecond() / 1_000_000);
    let elapsed_days = f64::from(ordinal0) + millis_into_day / MILLIS_PER_DAY;

    let weekday = date.weekday().num_days_from_sunday();
    let jan1_weekday = (weekday + 7 - ordinal0 % 7) % 7;

    ((elapsed_days + f64::from(jan1_weekday) + 1.0) / 7.0).ceil() as u32
}
