use sqlx::PgPool;
use uuid::Uuid;

use super::models::{
    CreateTransactionDto, Transaction, TransactionFilters, TransactionPredicate,
    UpdateTransactionDto,
};
use crate::category::service::CategoryService;
use crate::errors::AppError;

const TRANSACTION_COLUMNS: &str = "t.id, t.owner_id, t.category_id, t.amount, t.transaction_type, \
     t.date, t.description, t.created_at, t.updated_at";

// Binds: $1 owner, $2 category, $3 type, $4 start date, $5 end date,
// $6 min amount, $7 max amount
const FILTER_CLAUSE: &str = r#"
    WHERE t.owner_id = $1
      AND ($2::uuid IS NULL OR t.category_id = $2)
      AND ($3::text IS NULL OR t.transaction_type = $3)
      AND ($4::date IS NULL OR t.date >= $4)
      AND ($5::date IS NULL OR t.date <= $5)
      AND ($6::numeric IS NULL OR t.amount >= $6)
      AND ($7::numeric IS NULL OR t.amount <= $7)
"#;

/// Service layer for transaction business logic.
pub struct TransactionService;

impl TransactionService {
    /// Reject categories the user does not own
    async fn ensure_category_access(
        pool: &PgPool,
        user_id: Uuid,
        category_id: Option<Uuid>,
    ) -> Result<(), AppError> {
        if let Some(category_id) = category_id {
            if !CategoryService::verify_ownership(pool, category_id, user_id).await? {
                return Err(AppError::NotFound(
                    "Category not found or access denied".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Create a transaction owned by the user
    pub async fn create_transaction(
        pool: &PgPool,
        user_id: Uuid,
        dto: CreateTransactionDto,
    ) -> Result<Transaction, AppError> {
        Self::ensure_category_access(pool, user_id, dto.category_id).await?;

        sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions
                (owner_id, category_id, amount, transaction_type, date, description)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, owner_id, category_id, amount, transaction_type, date,
                      description, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(dto.category_id)
        .bind(dto.amount)
        .bind(dto.transaction_type.as_str())
        .bind(dto.date)
        .bind(dto.description.trim())
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))
    }

    /// Get a single transaction by ID
    pub async fn get_transaction(
        pool: &PgPool,
        user_id: Uuid,
        transaction_id: Uuid,
    ) -> Result<Transaction, AppError> {
        let sql = format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions t WHERE t.id = $1 AND t.owner_id = $2"
        );

        sqlx::query_as::<_, Transaction>(&sql)
            .bind(transaction_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?
            .ok_or_else(|| AppError::NotFound("Transaction not found".to_string()))
    }

    /// Update a transaction; absent fields keep their current value
    pub async fn update_transaction(
        pool: &PgPool,
        user_id: Uuid,
        transaction_id: Uuid,
        dto: UpdateTransactionDto,
    ) -> Result<Transaction, AppError> {
        let old = Self::get_transaction(pool, user_id, transaction_id).await?;

        let new_category_id = match dto.category_id {
            Some(Some(id)) => {
                Self::ensure_category_access(pool, user_id, Some(id)).await?;
                Some(id)
            }
            Some(None) => None,
            None => old.category_id,
        };
        let new_amount = dto.amount.unwrap_or(old.amount);
        let new_type = dto
            .transaction_type
            .map(|t| t.as_str().to_string())
            .unwrap_or(old.transaction_type);
        let new_date = dto.date.or(old.date);
        let new_description = dto
            .description
            .map(|d| d.trim().to_string())
            .unwrap_or(old.description);

        sqlx::query_as::<_, Transaction>(
            r#"
            UPDATE transactions SET
                category_id = $2,
                amount = $3,
                transaction_type = $4,
                date = $5,
                description = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, owner_id, category_id, amount, transaction_type, date,
                      description, created_at, updated_at
            "#,
        )
        .bind(transaction_id)
        .bind(new_category_id)
        .bind(new_amount)
        .bind(&new_type)
        .bind(new_date)
        .bind(&new_description)
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))
    }

    /// Delete a transaction
    pub async fn delete_transaction(
        pool: &PgPool,
        user_id: Uuid,
        transaction_id: Uuid,
    ) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = $1 AND owner_id = $2")
            .bind(transaction_id)
            .bind(user_id)
            .execute(pool)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Transaction not found".to_string()));
        }

        Ok(())
    }

    /// List transactions with filters, ordering and pagination
    pub async fn list_transactions(
        pool: &PgPool,
        user_id: Uuid,
        filters: &TransactionFilters,
    ) -> Result<(Vec<Transaction>, i64), AppError> {
        let limit = filters.limit.min(100);
        let offset = filters.offset;
        let predicate = filters.predicate();

        let list_sql = format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions t {FILTER_CLAUSE} \
             ORDER BY {} LIMIT $8 OFFSET $9",
            filters.ordering.order_clause()
        );
        let transactions = sqlx::query_as::<_, Transaction>(&list_sql)
            .bind(user_id)
            .bind(predicate.category_id)
            .bind(predicate.transaction_type.map(|t| t.as_str()))
            .bind(predicate.start_date)
            .bind(predicate.end_date)
            .bind(predicate.min_amount)
            .bind(predicate.max_amount)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        let count_sql = format!("SELECT COUNT(*) FROM transactions t {FILTER_CLAUSE}");
        let total = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(user_id)
            .bind(predicate.category_id)
            .bind(predicate.transaction_type.map(|t| t.as_str()))
            .bind(predicate.start_date)
            .bind(predicate.end_date)
            .bind(predicate.min_amount)
            .bind(predicate.max_amount)
            .fetch_one(pool)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        Ok((transactions, total))
    }

    /// Every transaction matching `predicate`, unpaginated
    pub async fn fetch_matching(
        pool: &PgPool,
        user_id: Uuid,
        predicate: &TransactionPredicate,
    ) -> Result<Vec<Transaction>, AppError> {
        let sql = format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions t {FILTER_CLAUSE} \
             ORDER BY t.date ASC, t.created_at ASC"
        );

        sqlx::query_as::<_, Transaction>(&sql)
            .bind(user_id)
            .bind(predicate.category_id)
            .bind(predicate.transaction_type.map(|t| t.as_str()))
            .bind(predicate.start_date)
            .bind(predicate.end_date)
            .bind(predicate.min_amount)
            .bind(predicate.max_amount)
            .fetch_all(pool)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))
    }
}
