use std::collections::{BTreeMap, HashSet};

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::aggregate::{aggregate, PeriodBucket};
use super::period::Granularity;
use crate::category::models::Category;
use crate::transaction::models::Transaction;

/// Totals of one category plus its per-period series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdown {
    pub income_total: Decimal,
    pub expense_total: Decimal,
    pub net_total: Decimal,
    /// Buckets keyed by granularity name ("day", "week", "month", "year")
    #[schema(value_type = Object)]
    pub periodic: BTreeMap<Granularity, Vec<PeriodBucket>>,
}

/// Build per-category stats over `transactions`.
///
/// A category is reported only when some transaction anywhere references it
/// (`referenced` holds those ids), independently of whether any of them made
/// it into `transactions`. Included categories with nothing in the current set
/// get zero totals and empty series.
///
/// Entries are keyed by category name; when names repeat, the category that
/// comes last in name order wins.
pub fn breakdown_by_category(
    transactions: &[Transaction],
    categories: &[Category],
    referenced: &HashSet<Uuid>,
) -> BTreeMap<String, CategoryBreakdown> {
    let mut ordered: Vec<&Category> = categories.iter().collect();
    ordered.sort_by(|a, b| a.name.cmp(&b.name));

    let mut result = BTreeMap::new();

    for category in ordered {
        if !referenced.contains(&category.id) {
            continue;
        }

        let periodic: BTreeMap<Granularity, Vec<PeriodBucket>> = Granularity::ALL
            .into_iter()
            .map(|g| (g, aggregate(transactions, g, Some(category.id))))
            .collect();

        // Every dated transaction lands in exactly one daily bucket
        let daily = &periodic[&Granularity::Day];
        let income_total: Decimal = daily.iter().map(|b| b.income_total).sum();
        let expense_total: Decimal = daily.iter().map(|b| b.expense_total).sum();

        result.insert(
            category.name.clone(),
            CategoryBreakdown {
                income_total,
                expense_total,
                net_total: income_total - expense_total,
                periodic,
            },
        );
    }

    result
}
