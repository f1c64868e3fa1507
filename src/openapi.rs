use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::auth::models::{
    AuthTokenResponse, CreateUserDto, LoginDto, RefreshTokenDto, UserResponseDto,
};
use crate::category::models::{CategoryResponse, CreateCategoryDto, UpdateCategoryDto};
use crate::errors::ErrorResponse;
use crate::stats::models::{ExtremesResponse, StatsOverview};
use crate::stats::{CategoryBreakdown, ExtremeRecord, Granularity, PeriodBucket, PeriodKey};
use crate::transaction::models::{
    CreateTransactionDto, PaginatedTransactionResponse, TransactionOrdering, TransactionResponse,
    TransactionType, UpdateTransactionDto,
};

/// Security scheme modifier for Bearer token authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT access token"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation configuration
#[derive(OpenApi)]
#[openapi(
    info(
        title = "SpendStats API",
        version = "1.0.0",
        description = "Income and expense tracking with per-period statistics",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development server"),
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Auth", description = "Authentication and user management"),
        (name = "Categories", description = "Transaction category management"),
        (name = "Transactions", description = "Income and expense records"),
        (name = "Stats", description = "Daily, weekly, monthly and yearly aggregates")
    ),
    paths(
        crate::routes::health_check,
        // Auth endpoints
        crate::auth::handlers::register,
        crate::auth::handlers::login,
        crate::auth::handlers::refresh,
        crate::auth::handlers::logout,
        crate::auth::handlers::me,
        // Category endpoints
        crate::category::handlers::list_categories,
        crate::category::handlers::get_category,
        crate::category::handlers::create_category,
        crate::category::handlers::update_category,
        crate::category::handlers::delete_category,
        // Transaction endpoints
        crate::transaction::handlers::list_transactions,
        crate::transaction::handlers::get_transaction,
        crate::transaction::handlers::create_transaction,
        crate::transaction::handlers::update_transaction,
        crate::transaction::handlers::delete_transaction,
        // Stats endpoints
        crate::stats::handlers::get_stats,
        crate::stats::handlers::get_periodic,
        crate::stats::handlers::get_extremes,
    ),
    components(
        schemas(
            ErrorResponse,
            // Auth schemas
            CreateUserDto,
            LoginDto,
            RefreshTokenDto,
            UserResponseDto,
            AuthTokenResponse,
            // Category schemas
            CategoryResponse,
            CreateCategoryDto,
            UpdateCategoryDto,
            // Transaction schemas
            TransactionType,
            TransactionOrdering,
            TransactionResponse,
            PaginatedTransactionResponse,
            CreateTransactionDto,
            UpdateTransactionDto,
            // Stats schemas
            Granularity,
            PeriodKey,
            PeriodBucket,
            ExtremeRecord,
            CategoryBreakdown,
            StatsOverview,
            ExtremesResponse,
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;
