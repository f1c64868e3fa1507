use actix_web::{get, web, HttpResponse, Responder};
use sqlx::PgPool;

use crate::{auth, category, stats, transaction};

/// Health check endpoint that verifies database connectivity
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service and database are up"),
        (status = 503, description = "Database unreachable")
    )
)]
#[get("/health")]
pub async fn health_check(pool: web::Data<PgPool>) -> impl Responder {
    match sqlx::query("SELECT 1").execute(pool.get_ref()).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "healthy",
            "database": "connected"
        })),
        Err(_) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "database": "disconnected"
        })),
    }
}

/// Routes that are not rate limited
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check)
        .service(auth::logout)
        .service(auth::me)
        // Category endpoints
        .service(category::list_categories)
        .service(category::get_category)
        .service(category::create_category)
        .service(category::update_category)
        .service(category::delete_category)
        // Stats live under /transactions/stats and must be registered before /transactions/{id}
        .service(stats::get_stats)
        .service(stats::get_periodic)
        .service(stats::get_extremes)
        // Transaction endpoints
        .service(transaction::list_transactions)
        .service(transaction::get_transaction)
        .service(transaction::create_transaction)
        .service(transaction::update_transaction)
        .service(transaction::delete_transaction);
}

/// Credential endpoints, wrapped in a rate limiter by the server
pub fn configure_auth(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::register)
        .service(auth::login)
        .service(auth::refresh);
}
