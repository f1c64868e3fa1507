use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::period::{bucket_key, Granularity, PeriodKey};
use crate::transaction::models::{Transaction, TransactionType};

/// Income, expense and net totals of one calendar period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PeriodBucket {
    #[serde(flatten)]
    pub key: PeriodKey,
    #[schema(example = 100.00)]
    pub income_total: Decimal,
    #[schema(example = 30.00)]
    pub expense_total: Decimal,
    /// Always `income_total - expense_total`
    #[schema(example = 70.00)]
    pub net_total: Decimal,
}

#[derive(Debug, Default, Clone, Copy)]
struct Totals {
    income: Decimal,
    expense: Decimal,
}

impl Totals {
    fn add(&mut self, t: &Transaction) {
        match t.get_type() {
            Some(TransactionType::Income) => self.income += t.amount,
            Some(TransactionType::Expense) => self.expense += t.amount,
            None => {}
        }
    }
}

/// Group `transactions` into calendar buckets and total each one.
///
/// With `category_filter` set, only transactions of that category contribute.
/// Undated transactions are skipped. Only buckets holding at least one
/// contributing transaction are returned, ascending by period.
pub fn aggregate(
    transactions: &[Transaction],
    granularity: Granularity,
    category_filter: Option<Uuid>,
) -> Vec<PeriodBucket> {
    let mut buckets: BTreeMap<PeriodKey, Totals> = BTreeMap::new();

    for t in transactions {
        if category_filter.is_some() && t.category_id != category_filter {
            continue;
        }
        let Some(date) = t.date else {
            continue;
        };
        buckets
            .entry(bucket_key(date, granularity))
            .or_default()
            .add(t);
    }

    buckets
        .into_iter()
        .map(|(key, totals)| PeriodBucket {
            key,
            income_total: totals.income,
            expense_total: totals.expense,
            net_total: totals.income - totals.expense,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;

    fn tx(date: &str, amount: Decimal, kind: &str) -> Transaction {
        let now = Utc::now();
        Transaction {
            id: Uuid::new_v4(),
            owner_id: Uuid::nil(),
            category_id: None,
            amount,
            transaction_type: kind.to_string(),
            date: Some(date.parse::<NaiveDate>().unwrap()),
            description: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn sample() -> Vec<Transaction> {
        vec![
            tx("2024-01-10", dec!(100), "income"),
            tx("2024-01-15", dec!(30), "expense"),
            tx("2024-02-01", dec!(50), "expense"),
        ]
    }

    #[test]
    fn test_monthly_scenario() {
        let buckets = aggregate(&sample(), Granularity::Month, None);

        assert_eq!(
            buckets,
            vec![
                PeriodBucket {
                    key: PeriodKey::Month {
                        year: 2024,
                        month: 1
                    },
                    income_total: dec!(100),
                    expense_total: dec!(30),
                    net_total: dec!(70),
                },
                PeriodBucket {
                    key: PeriodKey::Month {
                        year: 2024,
                        month: 2
                    },
                    income_total: dec!(0),
                    expense_total: dec!(50),
                    net_total: dec!(-50),
                },
            ]
        );
    }

    #[test]
    fn test_empty_input_yields_no_buckets() {
        assert!(aggregate(&[], Granularity::Month, None).is_empty());
    }

    #[test]
    fn test_buckets_are_sparse() {
        let transactions = vec![
            tx("2024-01-05", dec!(1), "expense"),
            tx("2024-06-05", dec!(2), "expense"),
        ];
        let buckets = aggregate(&transactions, Granularity::Month, None);

        assert_eq!(buckets.len(), 2);
    }

    #[test]
    fn test_output_is_ordered_regardless_of_input_order() {
        let mut transactions = vec![
            tx("2025-03-01", dec!(5), "income"),
            tx("2023-07-01", dec!(7), "expense"),
            tx("2024-01-01", dec!(1.10), "income"),
            tx("2024-12-31", dec!(2.20), "expense"),
        ];
        let forward = aggregate(&transactions, Granularity::Year, None);
        transactions.reverse();
        let backward = aggregate(&transactions, Granularity::Year, None);

        assert_eq!(forward, backward);
        let years: Vec<PeriodKey> = forward.iter().map(|b| b.key).collect();
        assert_eq!(
            years,
            vec![
                PeriodKey::Year { year: 2023 },
                PeriodKey::Year { year: 2024 },
                PeriodKey::Year { year: 2025 },
            ]
        );
    }

    #[test]
    fn test_mass_is_preserved_for_every_granularity() {
        let transactions = vec![
            tx("2023-12-31", dec!(10.01), "income"),
            tx("2024-01-01", dec!(0.10), "expense"),
            tx("2024-01-01", dec!(0.20), "expense"),
            tx("2024-02-29", dec!(99.99), "income"),
            tx("2024-03-04", dec!(12.34), "expense"),
        ];
        let income: Decimal = dec!(110.00);
        let expense: Decimal = dec!(12.64);

        for g in Granularity::ALL {
            let buckets = aggregate(&transactions, g, None);
            let bucket_income: Decimal = buckets.iter().map(|b| b.income_total).sum();
            let bucket_expense: Decimal = buckets.iter().map(|b| b.expense_total).sum();

            assert_eq!(bucket_income, income, "income for {g}");
            assert_eq!(bucket_expense, expense, "expense for {g}");
            for b in &buckets {
                assert_eq!(b.net_total, b.income_total - b.expense_total);
            }
        }
    }

    #[test]
    fn test_decimal_sums_have_no_drift() {
        let transactions = vec![
            tx("2024-01-01", dec!(0.1), "income"),
            tx("2024-01-02", dec!(0.2), "income"),
            tx("2024-01-03", dec!(0.3), "expense"),
        ];
        let buckets = aggregate(&transactions, Granularity::Month, None);

        assert_eq!(buckets[0].income_total, dec!(0.3));
        assert!(buckets[0].net_total.is_zero());
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let transactions = sample();
        assert_eq!(
            aggregate(&transactions, Granularity::Week, None),
            aggregate(&transactions, Granularity::Week, None)
        );
    }

    #[test]
    fn test_category_filter_applies_before_bucketing() {
        let groceries = Uuid::new_v4();
        let mut transactions = sample();
        transactions[1].category_id = Some(groceries);
        transactions.push(tx("2024-01-20", dec!(8), "expense"));

        let buckets = aggregate(&transactions, Granularity::Month, Some(groceries));

        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].income_total, dec!(0));
        assert_eq!(buckets[0].expense_total, dec!(30));
    }

    #[test]
    fn test_undated_and_unknown_types_are_skipped() {
        let mut undated = tx("2024-01-01", dec!(40), "income");
        undated.date = None;
        let transactions = vec![
            undated,
            tx("2024-01-01", dec!(3), "transfer"),
            tx("2024-01-01", dec!(2), "expense"),
        ];
        let buckets = aggregate(&transactions, Granularity::Day, None);

        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].income_total, dec!(0));
        assert_eq!(buckets[0].expense_total, dec!(2));
    }

    #[test]
    fn test_weekly_buckets_split_on_iso_weeks() {
        let transactions = vec![
            tx("2024-01-07", dec!(1), "expense"), // Sunday, W01
            tx("2024-01-08", dec!(2), "expense"), // Monday, W02
        ];
        let buckets = aggregate(&transactions, Granularity::Week, None);

        assert_eq!(buckets[0].key, PeriodKey::Week { year: 2024, week: 1 });
        assert_eq!(buckets[1].key, PeriodKey::Week { year: 2024, week: 2 });
    }

    #[test]
    fn test_bucket_serializes_flat_key_and_totals() {
        let buckets = aggregate(&sample(), Granularity::Month, None);
        let json = serde_json::to_value(&buckets[0]).unwrap();

        assert_eq!(json["year"], 2024);
        assert_eq!(json["month"], 1);
        assert_eq!(json["incomeTotal"], "100");
        assert_eq!(json["netTotal"], "70");
    }
}
