use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::aggregate::PeriodBucket;
use super::breakdown::CategoryBreakdown;
use super::extremes::ExtremeRecord;
use super::period::Granularity;
use crate::transaction::models::{TransactionPredicate, TransactionType};

/// Query parameters shared by the stats endpoints
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct StatsQuery {
    /// Bucket size: day, week, month or year (required by periodic and extremes)
    #[param(example = "month")]
    pub period: Option<String>,
    /// Only transactions of this category
    pub category_id: Option<Uuid>,
    /// Only transactions of this type
    #[param(example = "expense")]
    pub transaction_type: Option<TransactionType>,
    /// Earliest date (inclusive)
    pub start_date: Option<NaiveDate>,
    /// Latest date (inclusive)
    pub end_date: Option<NaiveDate>,
    /// Minimum amount (inclusive)
    pub min_amount: Option<Decimal>,
    /// Maximum amount (inclusive)
    pub max_amount: Option<Decimal>,
}

impl StatsQuery {
    pub fn predicate(&self) -> TransactionPredicate {
        TransactionPredicate {
            category_id: self.category_id,
            transaction_type: self.transaction_type,
            start_date: self.start_date,
            end_date: self.end_date,
            min_amount: self.min_amount,
            max_amount: self.max_amount,
        }
    }
}

/// Full statistics for the filtered transaction set
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsOverview {
    /// Number of dated transactions considered
    #[schema(example = 42)]
    pub transaction_count: usize,
    #[schema(example = 3000.00)]
    pub income_total: Decimal,
    #[schema(example = 1250.40)]
    pub expense_total: Decimal,
    /// income_total - expense_total
    #[schema(example = 1749.60)]
    pub balance: Decimal,
    /// Per-category stats keyed by category name
    pub by_category: BTreeMap<String, CategoryBreakdown>,
    pub daily: Vec<PeriodBucket>,
    pub weekly: Vec<PeriodBucket>,
    pub monthly: Vec<PeriodBucket>,
    pub yearly: Vec<PeriodBucket>,
}

/// Least and most expensive periods
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtremesResponse {
    pub period: Granularity,
    /// Absent when there are no expenses in range
    pub least_expensive: Option<ExtremeRecord>,
    /// Absent when there are no expenses in range
    pub most_expensive: Option<ExtremeRecord>,
}
