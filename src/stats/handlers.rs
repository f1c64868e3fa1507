use actix_web::{get, web, HttpResponse};
use sqlx::PgPool;

use crate::errors::{AppError, ErrorResponse};
use crate::extractors::AuthenticatedUser;

use super::aggregate::PeriodBucket;
use super::models::{ExtremesResponse, StatsOverview, StatsQuery};
use super::service::StatsService;

/// GET /transactions/stats - Totals, category breakdown and daily/weekly/monthly/yearly series
#[utoipa::path(
    get,
    path = "/transactions/stats",
    tag = "Stats",
    params(StatsQuery),
    responses(
        (status = 200, description = "Statistics for the filtered transactions", body = StatsOverview),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[get("/transactions/stats")]
pub async fn get_stats(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUser,
    query: web::Query<StatsQuery>,
) -> Result<HttpResponse, AppError> {
    let overview = StatsService::overview(pool.get_ref(), auth.user_id, &query).await?;

    Ok(HttpResponse::Ok().json(overview))
}

/// GET /transactions/stats/periodic - Buckets for a single period size
#[utoipa::path(
    get,
    path = "/transactions/stats/periodic",
    tag = "Stats",
    params(StatsQuery),
    responses(
        (status = 200, description = "Buckets ascending by period", body = Vec<PeriodBucket>),
        (status = 400, description = "Missing or unsupported period", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[get("/transactions/stats/periodic")]
pub async fn get_periodic(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUser,
    query: web::Query<StatsQuery>,
) -> Result<HttpResponse, AppError> {
    let buckets = StatsService::periodic(pool.get_ref(), auth.user_id, &query).await?;

    Ok(HttpResponse::Ok().json(buckets))
}

/// GET /transactions/stats/extremes - Least and most expensive periods
#[utoipa::path(
    get,
    path = "/transactions/stats/extremes",
    tag = "Stats",
    params(StatsQuery),
    responses(
        (status = 200, description = "Extreme periods by expense total", body = ExtremesResponse),
        (status = 400, description = "Missing or unsupported period", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[get("/transactions/stats/extremes")]
pub async fn get_extremes(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUser,
    query: web::Query<StatsQuery>,
) -> Result<HttpResponse, AppError> {
    let (period, extremes) = StatsService::extremes(pool.get_ref(), auth.user_id, &query).await?;

    Ok(HttpResponse::Ok().json(ExtremesResponse {
        period,
        least_expensive: extremes.min,
        most_expensive: extremes.max,
    }))
}
