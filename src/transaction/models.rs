use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Transaction type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money received
    Income,
    /// Money spent
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "income" => Some(TransactionType::Income),
            "expense" => Some(TransactionType::Expense),
            _ => None,
        }
    }
}

// Amounts live in a NUMERIC(10, 2) column
const AMOUNT_INTEGER_LIMIT: u32 = 100_000_000;
const AMOUNT_DECIMAL_PLACES: u32 = 2;

fn amount_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Amounts are stored exactly: non-negative, at most 8 integer digits and
/// 2 decimal places. Trailing zeros do not count as decimal places.
fn validate_stored_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(amount_error(
            "amount_must_not_be_negative",
            "Amount must not be negative",
        ));
    }
    if *amount >= Decimal::from(AMOUNT_INTEGER_LIMIT) {
        return Err(amount_error(
            "amount_too_large",
            "Amount must be less than 100000000",
        ));
    }
    if amount.normalize().scale() > AMOUNT_DECIMAL_PLACES {
        return Err(amount_error(
            "amount_too_precise",
            "Amount must have at most 2 decimal places",
        ));
    }
    Ok(())
}

/// Database model for transactions
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Transaction {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub category_id: Option<Uuid>,
    pub amount: Decimal,
    pub transaction_type: String,
    /// Undated transactions are kept but never bucketed
    pub date: Option<NaiveDate>,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// `None` for a stored type this version does not know about
    pub fn get_type(&self) -> Option<TransactionType> {
        TransactionType::parse(&self.transaction_type)
    }
}

/// Transaction information returned in responses
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    /// Unique transaction identifier
    pub id: Uuid,
    /// Category this transaction belongs to (absent when uncategorized)
    pub category_id: Option<Uuid>,
    /// Transaction amount (never negative)
    #[schema(example = 50.00)]
    pub amount: Decimal,
    /// Transaction type (income or expense)
    #[schema(example = "expense")]
    pub transaction_type: String,
    /// Calendar date of the transaction
    #[schema(example = "2024-01-15")]
    pub date: Option<NaiveDate>,
    /// Free-form description
    #[schema(example = "Weekly groceries")]
    pub description: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl From<Transaction> for TransactionResponse {
    fn from(t: Transaction) -> Self {
        Self {
            id: t.id,
            category_id: t.category_id,
            amount: t.amount,
            transaction_type: t.transaction_type,
            date: t.date,
            description: t.description,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

/// Request body for creating a transaction
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionDto {
    /// Transaction amount (0 to 99999999.99, at most 2 decimal places)
    #[validate(custom(function = "validate_stored_amount"))]
    #[schema(example = 50.00)]
    pub amount: Decimal,

    /// Transaction type
    pub transaction_type: TransactionType,

    /// Category this transaction belongs to (optional)
    pub category_id: Option<Uuid>,

    /// Date of the transaction; undated transactions are left out of stats
    #[schema(example = "2024-01-15")]
    pub date: Option<NaiveDate>,

    /// Optional description (max 500 chars)
    #[validate(length(max = 500, message = "Description cannot exceed 500 characters"))]
    #[serde(default)]
    #[schema(example = "Weekly groceries")]
    pub description: String,
}

/// Request body for updating a transaction (PATCH - all fields optional)
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransactionDto {
    /// Transaction amount
    #[schema(example = 75.00)]
    pub amount: Option<Decimal>,

    /// Transaction type
    pub transaction_type: Option<TransactionType>,

    /// Category ID (use null to make the transaction uncategorized)
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<Uuid>)]
    pub category_id: Option<Option<Uuid>>,

    /// Transaction date
    pub date: Option<NaiveDate>,

    /// Description
    #[validate(length(max = 500, message = "Description cannot exceed 500 characters"))]
    #[schema(example = "Updated description")]
    pub description: Option<String>,
}

impl UpdateTransactionDto {
    /// Validate amount if provided
    pub fn validate_amount(&self) -> Result<(), ValidationError> {
        if let Some(amount) = &self.amount {
            validate_stored_amount(amount)?;
        }
        Ok(())
    }
}

// Distinguishes an explicit `null` (Some(None)) from an absent field (None)
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Sort order for transaction listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
pub enum TransactionOrdering {
    #[serde(rename = "date")]
    DateAsc,
    #[default]
    #[serde(rename = "-date")]
    DateDesc,
    #[serde(rename = "amount")]
    AmountAsc,
    #[serde(rename = "-amount")]
    AmountDesc,
}

impl TransactionOrdering {
    /// ORDER BY clause; `created_at` keeps equal rows in a stable order
    pub fn order_clause(&self) -> &'static str {
        match self {
            TransactionOrdering::DateAsc => "t.date ASC NULLS FIRST, t.created_at ASC",
            TransactionOrdering::DateDesc => "t.date DESC NULLS LAST, t.created_at DESC",
            TransactionOrdering::AmountAsc => "t.amount ASC, t.created_at ASC",
            TransactionOrdering::AmountDesc => "t.amount DESC, t.created_at DESC",
        }
    }
}

/// Store-level predicate shared by listings and stats queries.
/// Date and amount bounds are inclusive.
#[derive(Debug, Clone, Default)]
pub struct TransactionPredicate {
    pub category_id: Option<Uuid>,
    pub transaction_type: Option<TransactionType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
}

impl TransactionPredicate {
    /// Same semantics as the SQL filter, for data already in memory
    pub fn matches(&self, t: &Transaction) -> bool {
        if let Some(category_id) = self.category_id {
            if t.category_id != Some(category_id) {
                return false;
            }
        }
        if let Some(kind) = self.transaction_type {
            if t.get_type() != Some(kind) {
                return false;
            }
        }
        if let Some(start) = self.start_date {
            if !t.date.is_some_and(|d| d >= start) {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if !t.date.is_some_and(|d| d <= end) {
                return false;
            }
        }
        if let Some(min) = self.min_amount {
            if t.amount < min {
                return false;
            }
        }
        if let Some(max) = self.max_amount {
            if t.amount > max {
                return false;
            }
        }
        true
    }
}

/// Query parameters for listing transactions
#[derive(Debug, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFilters {
    /// Filter by category
    pub category_id: Option<Uuid>,
    /// Filter by type (income, expense)
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
    /// Sort order: date, -date, amount, -amount
    #[serde(default)]
    #[param(example = "-date")]
    pub ordering: TransactionOrdering,

    /// Maximum results (1-100)
    #[validate(range(min = 1, max = 100))]
    #[serde(default = "default_limit")]
    #[param(example = 50)]
    pub limit: i64,

    /// Number of results to skip
    #[validate(range(min = 0))]
    #[serde(default)]
    #[param(example = 0)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

impl TransactionFilters {
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

/// Paginated response wrapper
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedTransactionResponse {
    /// List of transactions
    pub data: Vec<TransactionResponse>,
    /// Total count matching filters
    #[schema(example = 100)]
    pub total: i64,
    /// Limit used
    #[schema(example = 50)]
    pub limit: i64,
    /// Offset used
    #[schema(example = 0)]
    pub offset: i64,
}

/// Path parameters for transaction ID
#[derive(Debug, Deserialize, IntoParams)]
pub struct TransactionIdPath {
    /// Transaction UUID
    pub id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn transaction(amount: Decimal, kind: &str, date: Option<NaiveDate>) -> Transaction {
        let now = Utc::now();
        Transaction {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            category_id: None,
            amount,
            transaction_type: kind.to_string(),
            date,
            description: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_unknown_stored_type_has_no_kind() {
        assert_eq!(
            transaction(dec!(1), "income", None).get_type(),
            Some(TransactionType::Income)
        );
        assert_eq!(transaction(dec!(1), "transfer", None).get_type(), None);
    }

    #[test]
    fn test_predicate_bounds_are_inclusive() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let t = transaction(dec!(25.00), "expense", Some(day));
        let predicate = TransactionPredicate {
            start_date: Some(day),
            end_date: Some(day),
            min_amount: Some(dec!(25)),
            max_amount: Some(dec!(25.00)),
            ..Default::default()
        };

        assert!(predicate.matches(&t));
    }

    #[test]
    fn test_predicate_date_bound_excludes_undated() {
        let predicate = TransactionPredicate {
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..Default::default()
        };

        assert!(!predicate.matches(&transaction(dec!(5), "income", None)));
        assert!(TransactionPredicate::default().matches(&transaction(dec!(5), "income", None)));
    }

    #[test]
    fn test_predicate_category_excludes_uncategorized() {
        let category_id = Uuid::new_v4();
        let predicate = TransactionPredicate {
            category_id: Some(category_id),
            ..Default::default()
        };
        let mut t = transaction(dec!(5), "expense", None);

        assert!(!predicate.matches(&t));
        t.category_id = Some(category_id);
        assert!(predicate.matches(&t));
    }

    #[test]
    fn test_update_dto_distinguishes_null_category() {
        let cleared: UpdateTransactionDto =
            serde_json::from_value(serde_json::json!({ "categoryId": null })).unwrap();
        let untouched: UpdateTransactionDto = serde_json::from_value(serde_json::json!({})).unwrap();

        assert_eq!(cleared.category_id, Some(None));
        assert_eq!(untouched.category_id, None);
    }

    #[test]
    fn test_create_dto_rejects_negative_amount() {
        let dto: CreateTransactionDto = serde_json::from_value(serde_json::json!({
            "amount": "-1.00",
            "transactionType": "expense"
        }))
        .unwrap();

        assert!(dto.validate().is_err());
    }

    fn create_dto(amount: &str) -> CreateTransactionDto {
        serde_json::from_value(serde_json::json!({
            "amount": amount,
            "transactionType": "expense"
        }))
        .unwrap()
    }

    fn update_dto(amount: &str) -> UpdateTransactionDto {
        serde_json::from_value(serde_json::json!({ "amount": amount })).unwrap()
    }

    #[test]
    fn test_create_dto_rejects_amounts_the_column_cannot_hold() {
        // Would be rounded to 1.01 on insert
        assert!(create_dto("1.005").validate().is_err());
        // Overflows NUMERIC(10, 2)
        assert!(create_dto("123456789.00").validate().is_err());
        assert!(create_dto("100000000").validate().is_err());

        assert!(create_dto("99999999.99").validate().is_ok());
        assert!(create_dto("1.50").validate().is_ok());
        assert!(create_dto("1.5000").validate().is_ok());
        assert!(create_dto("0").validate().is_ok());
    }

    #[test]
    fn test_create_dto_amount_error_message() {
        let err = create_dto("1.005").validate().unwrap_err();
        assert!(err.to_string().contains("2 decimal places"));
    }

    #[test]
    fn test_update_dto_rejects_amounts_the_column_cannot_hold() {
        assert!(update_dto("1.005").validate_amount().is_err());
        assert!(update_dto("123456789.00").validate_amount().is_err());
        assert!(update_dto("-0.01").validate_amount().is_err());

        assert!(update_dto("12.34").validate_amount().is_ok());
        let untouched: UpdateTransactionDto = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(untouched.validate_amount().is_ok());
    }

    #[test]
    fn test_ordering_parses_signed_names() {
        let ordering: TransactionOrdering = serde_json::from_str("\"-amount\"").unwrap();
        assert_eq!(ordering, TransactionOrdering::AmountDesc);
        assert_eq!(TransactionOrdering::default(), TransactionOrdering::DateDesc);
    }
}
