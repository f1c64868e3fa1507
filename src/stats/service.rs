use std::collections::HashSet;

use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::aggregate::{aggregate, PeriodBucket};
use super::breakdown::breakdown_by_category;
use super::extremes::{find_extremes_by, Extremes};
use super::models::{StatsOverview, StatsQuery};
use super::period::Granularity;
use crate::category::models::Category;
use crate::category::service::CategoryService;
use crate::errors::AppError;
use crate::transaction::models::{Transaction, TransactionPredicate, TransactionType};
use crate::transaction::service::TransactionService;

/// Loads the owner's transactions and runs the stats engine over them.
/// Every query is scoped to the authenticated user.
pub struct StatsService;

impl StatsService {
    /// Overview of totals, per-category breakdown and all four period series
    pub async fn overview(
        pool: &PgPool,
        user_id: Uuid,
        query: &StatsQuery,
    ) -> Result<StatsOverview, AppError> {
        // One snapshot of everything the user owns answers both "is this
        // category referenced at all" and the filtered totals.
        let all =
            TransactionService::fetch_matching(pool, user_id, &TransactionPredicate::default())
                .await?;
        let categories = CategoryService::list_for_user(pool, user_id).await?;

        let referenced: HashSet<Uuid> = all.iter().filter_map(|t| t.category_id).collect();
        let predicate = query.predicate();
        let current: Vec<Transaction> = all
            .into_iter()
            .filter(|t| t.date.is_some() && predicate.matches(t))
            .collect();

        debug!(
            %user_id,
            transactions = current.len(),
            categories = categories.len(),
            "building stats overview"
        );

        Ok(assemble_overview(&current, &categories, &referenced))
    }

    /// Buckets for one granularity; `categoryId` in the query restricts them
    pub async fn periodic(
        pool: &PgPool,
        user_id: Uuid,
        query: &StatsQuery,
    ) -> Result<Vec<PeriodBucket>, AppError> {
        let granularity = Granularity::require(query.period.as_deref())?;
        let transactions = Self::load_dated(pool, user_id, query).await?;

        Ok(aggregate(&transactions, granularity, query.category_id))
    }

    /// Least and most expensive periods
    pub async fn extremes(
        pool: &PgPool,
        user_id: Uuid,
        query: &StatsQuery,
    ) -> Result<(Granularity, Extremes), AppError> {
        // Validate before touching the store
        let granularity = Granularity::require(query.period.as_deref())?;
        let transactions = Self::load_dated(pool, user_id, query).await?;

        Ok((granularity, find_extremes_by(&transactions, granularity)))
    }

    async fn load_dated(
        pool: &PgPool,
        user_id: Uuid,
        query: &StatsQuery,
    ) -> Result<Vec<Transaction>, AppError> {
        let mut transactions =
            TransactionService::fetch_matching(pool, user_id, &query.predicate()).await?;
        transactions.retain(|t| t.date.is_some());
        Ok(transactions)
    }
}

/// Wire engine outputs into the overview payload. `current` must already be
/// filtered; `referenced` holds every category id used by any transaction.
pub fn assemble_overview(
    current: &[Transaction],
    categories: &[Category],
    referenced: &HashSet<Uuid>,
) -> StatsOverview {
    let sum_of = |kind: TransactionType| -> Decimal {
        current
            .iter()
            .filter(|t| t.date.is_some() && t.get_type() == Some(kind))
            .map(|t| t.amount)
            .sum()
    };
    let income_total = sum_of(TransactionType::Income);
    let expense_total = sum_of(TransactionType::Expense);

    StatsOverview {
        transaction_count: current.iter().filter(|t| t.date.is_some()).count(),
        income_total,
        expense_total,
        balance: income_total - expense_total,
        by_category: breakdown_by_category(current, categories, referenced),
        daily: aggregate(current, Granularity::Day, None),
        weekly: aggregate(current, Granularity::Week, None),
        monthly: aggregate(current, Granularity::Month, None),
        yearly: aggregate(current, Granularity::Year, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;

    fn tx(category_id: Option<Uuid>, date: Option<&str>, amount: Decimal, kind: &str) -> Transaction {
        let now = Utc::now();
        Transaction {
            id: Uuid::new_v4(),
            owner_id: Uuid::nil(),
            category_id,
            amount,
            transaction_type: kind.to_string(),
            date: date.map(|d| d.parse::<NaiveDate>().unwrap()),
            description: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_overview_totals_and_series() {
        let now = Utc::now();
        let food = Category {
            id: Uuid::new_v4(),
            owner_id: Uuid::nil(),
            name: "Food".to_string(),
            created_at: now,
            updated_at: now,
        };
        let current = vec![
            tx(None, Some("2024-01-10"), dec!(100), "income"),
            tx(Some(food.id), Some("2024-01-15"), dec!(30), "expense"),
            tx(None, Some("2024-02-01"), dec!(50), "expense"),
            tx(None, None, dec!(999), "income"),
        ];
        let referenced: HashSet<Uuid> = [food.id].into_iter().collect();

        let overview = assemble_overview(&current, &[food], &referenced);

        assert_eq!(overview.transaction_count, 3);
        assert_eq!(overview.income_total, dec!(100));
        assert_eq!(overview.expense_total, dec!(80));
        assert_eq!(overview.balance, dec!(20));
        assert_eq!(overview.monthly.len(), 2);
        assert_eq!(overview.yearly.len(), 1);
        assert_eq!(overview.daily.len(), 3);
        assert_eq!(overview.by_category["Food"].expense_total, dec!(30));
    }

    #[test]
    fn test_overview_of_nothing_is_empty() {
        let overview = assemble_overview(&[], &[], &HashSet::new());

        assert_eq!(overview.transaction_count, 0);
        assert!(overview.balance.is_zero());
        assert!(overview.by_category.is_empty());
        assert!(overview.daily.is_empty() && overview.yearly.is_empty());
    }
}
