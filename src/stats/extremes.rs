use std::cmp::Ordering;
use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use super::aggregate::PeriodBucket;
use super::period::{bucket_key, Granularity, PeriodKey};
use super::StatsError;
use crate::transaction::models::{Transaction, TransactionType};

/// Expense total of one period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ExtremeRecord {
    #[serde(flatten)]
    pub key: PeriodKey,
    #[schema(example = 40.00)]
    pub total: Decimal,
}

/// Least and most expensive periods. Both are `None` when there was nothing
/// to compare, which is not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct Extremes {
    pub min: Option<ExtremeRecord>,
    pub max: Option<ExtremeRecord>,
}

/// Find the least and most expensive periods among `transactions`.
///
/// `granularity` is the raw period specifier supplied by the caller; it has
/// no default and a missing value fails like an unknown one.
pub fn find_extremes(
    transactions: &[Transaction],
    granularity: Option<&str>,
) -> Result<Extremes, StatsError> {
    let granularity = Granularity::require(granularity)?;
    Ok(find_extremes_by(transactions, granularity))
}

/// Typed variant of [`find_extremes`]. Only dated expense transactions count.
pub fn find_extremes_by(transactions: &[Transaction], granularity: Granularity) -> Extremes {
    let mut totals: BTreeMap<PeriodKey, Decimal> = BTreeMap::new();

    for t in transactions {
        if t.get_type() != Some(TransactionType::Expense) {
            continue;
        }
        if let Some(date) = t.date {
            *totals.entry(bucket_key(date, granularity)).or_default() += t.amount;
        }
    }

    let records: Vec<ExtremeRecord> = totals
        .into_iter()
        .map(|(key, total)| ExtremeRecord { key, total })
        .collect();
    pick(&records)
}

/// Extremes over already aggregated buckets, compared by `expense_total`
pub fn extremes_of_buckets(buckets: &[PeriodBucket]) -> Extremes {
    let records: Vec<ExtremeRecord> = buckets
        .iter()
        .map(|b| ExtremeRecord {
            key: b.key,
            total: b.expense_total,
        })
        .collect();
    pick(&records)
}

// Ties on the total go to the earliest period, for both ends.
fn pick(records: &[ExtremeRecord]) -> Extremes {
    let min = records
        .iter()
        .min_by(|a, b| a.total.cmp(&b.total).then_with(|| a.key.cmp(&b.key)));
    let max = records.iter().min_by(|a, b| match b.total.cmp(&a.total) {
        Ordering::Equal => a.key.cmp(&b.key),
        other => other,
    });

    Extremes {
        min: min.cloned(),
        max: max.cloned(),
    }
}
