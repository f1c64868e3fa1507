use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Database entity for categories
#[derive(Debug, Clone, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Extended model with the number of transactions referencing the category
#[derive(Debug, Clone, FromRow)]
pub struct CategoryWithCount {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub transaction_count: i64,
}

/// Category information returned in responses
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    /// Unique category identifier
    pub id: Uuid,
    /// Category name
    #[schema(example = "Groceries")]
    pub name: String,
    /// Computed: number of transactions in this category
    #[schema(example = 12)]
    pub transaction_count: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl CategoryResponse {
    pub fn from_category_with_count(cat: CategoryWithCount) -> Self {
        Self {
            id: cat.id,
            name: cat.name,
            transaction_count: cat.transaction_count,
            created_at: cat.created_at,
            updated_at: cat.updated_at,
        }
    }

    pub fn from_category(cat: Category, transaction_count: i64) -> Self {
        Self {
            id: cat.id,
            name: cat.name,
            transaction_count,
            created_at: cat.created_at,
            updated_at: cat.updated_at,
        }
    }
}

/// Request body for creating a category
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryDto {
    /// Category name (1-50 characters, unique per user)
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    #[schema(example = "Groceries")]
    pub name: String,
}

/// Request body for updating a category (PATCH - all fields optional)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCategoryDto {
    /// Category name
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    #[schema(example = "Food & Dining")]
    pub name: Option<String>,
}

/// Trim a category name, rejecting names that are only whitespace
pub fn normalize_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Path parameters for category ID
#[derive(Debug, Deserialize, IntoParams)]
pub struct CategoryIdPath {
    /// Category UUID
    pub id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name_trims() {
        assert_eq!(normalize_name("  Rent "), Some("Rent".to_string()));
        assert_eq!(normalize_name("   "), None);
    }

    #[test]
    fn test_create_dto_length_limits() {
        let ok = CreateCategoryDto {
            name: "Groceries".to_string(),
        };
        let too_long = CreateCategoryDto {
            name: "x".repeat(51),
        };
        let empty = CreateCategoryDto {
            name: String::new(),
        };

        assert!(ok.validate().is_ok());
        assert!(too_long.validate().is_err());
        assert!(empty.validate().is_err());
    }
}
