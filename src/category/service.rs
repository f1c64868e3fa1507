use sqlx::PgPool;
use uuid::Uuid;

use super::models::{normalize_name, Category, CategoryWithCount, CreateCategoryDto, UpdateCategoryDto};
use crate::errors::AppError;

/// Service layer for category business logic.
pub struct CategoryService;

impl CategoryService {
    /// Check whether the user already has another category with this name
    async fn name_taken(
        pool: &PgPool,
        owner_id: Uuid,
        name: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM categories
            WHERE owner_id = $1 AND name = $2 AND ($3::uuid IS NULL OR id <> $3)
            "#,
        )
        .bind(owner_id)
        .bind(name)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

        Ok(count > 0)
    }

    /// Verify the category exists and belongs to the user
    pub async fn verify_ownership(
        pool: &PgPool,
        category_id: Uuid,
        owner_id: Uuid,
    ) -> Result<bool, AppError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1 AND owner_id = $2)",
        )
        .bind(category_id)
        .bind(owner_id)
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))
    }

    /// Get category by ID with ownership check
    pub async fn get_by_id(
        pool: &PgPool,
        category_id: Uuid,
        owner_id: Uuid,
    ) -> Result<CategoryWithCount, AppError> {
        // LEFT JOIN so categories without transactions report 0
        sqlx::query_as::<_, CategoryWithCount>(
            r#"
            SELECT
                c.id, c.owner_id, c.name, c.created_at, c.updated_at,
                COUNT(t.id) as transaction_count
            FROM categories c
            LEFT JOIN transactions t ON c.id = t.category_id
            WHERE c.id = $1 AND c.owner_id = $2
            GROUP BY c.id, c.owner_id, c.name, c.created_at, c.updated_at
            "#,
        )
        .bind(category_id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))
    }

    /// Get all categories for user, ordered by name
    pub async fn get_all_for_user(
        pool: &PgPool,
        owner_id: Uuid,
    ) -> Result<Vec<CategoryWithCount>, AppError> {
        sqlx::query_as::<_, CategoryWithCount>(
            r#"
            SELECT
                c.id, c.owner_id, c.name, c.created_at, c.updated_at,
                COUNT(t.id) as transaction_count
            FROM categories c
            LEFT JOIN transactions t ON c.id = t.category_id
            WHERE c.owner_id = $1
            GROUP BY c.id, c.owner_id, c.name, c.created_at, c.updated_at
            ORDER BY c.name ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))
    }

    /// Plain category rows for the user, ordered by name
    pub async fn list_for_user(pool: &PgPool, owner_id: Uuid) -> Result<Vec<Category>, AppError> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT id, owner_id, name, created_at, updated_at
            FROM categories
            WHERE owner_id = $1
            ORDER BY name ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))
    }

    /// Create a new category
    pub async fn create(
        pool: &PgPool,
        dto: &CreateCategoryDto,
        owner_id: Uuid,
    ) -> Result<Category, AppError> {
        let name = normalize_name(&dto.name)
            .ok_or_else(|| AppError::ValidationError("Name cannot be empty".to_string()))?;

        if Self::name_taken(pool, owner_id, &name, None).await? {
            return Err(AppError::Conflict(format!(
                "Category '{name}' already exists"
            )));
        }

        sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (owner_id, name)
            VALUES ($1, $2)
            RETURNING id, owner_id, name, created_at, updated_at
            "#,
        )
        .bind(owner_id)
        .bind(&name)
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::on_unique_violation(e, format!("Category '{name}' already exists")))
    }

    /// Update an existing category
    pub async fn update(
        pool: &PgPool,
        category_id: Uuid,
        dto: &UpdateCategoryDto,
        owner_id: Uuid,
    ) -> Result<CategoryWithCount, AppError> {
        // First verify the category exists and user has access
        let existing = Self::get_by_id(pool, category_id, owner_id).await?;

        let new_name = match &dto.name {
            Some(n) => normalize_name(n)
                .ok_or_else(|| AppError::ValidationError("Name cannot be empty".to_string()))?,
            None => return Ok(existing),
        };

        if Self::name_taken(pool, owner_id, &new_name, Some(category_id)).await? {
            return Err(AppError::Conflict(format!(
                "Category '{new_name}' already exists"
            )));
        }

        let updated = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, owner_id, name, created_at, updated_at
            "#,
        )
        .bind(category_id)
        .bind(&new_name)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            AppError::on_unique_violation(e, format!("Category '{new_name}' already exists"))
        })?;

        Ok(CategoryWithCount {
            id: updated.id,
            owner_id: updated.owner_id,
            name: updated.name,
            created_at: updated.created_at,
            updated_at: updated.updated_at,
            transaction_count: existing.transaction_count,
        })
    }

    /// Delete a category. Its transactions stay and become uncategorized
    /// (`ON DELETE SET NULL`).
    pub async fn delete(pool: &PgPool, category_id: Uuid, owner_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1 AND owner_id = $2")
            .bind(category_id)
            .bind(owner_id)
            .execute(pool)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Category not found".to_string()));
        }

        Ok(())
    }
}
