use axum::{extract::State, response::Json};

use crate::services::sales::{DailySales, DayAmountInput};
use crate::{ApiResponse, ApiResult, AppState};

/// Weekly baseline sales, one row per weekday
#[utoipa::path(
    get,
    path = "/api/v1/sales",
    responses(
        (status = 200, description = "Seven rows, Monday through Sunday", body = ApiResponse<Vec<DailySales>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Sales"
)]
pub async fn get_sales(State(state): State<AppState>) -> ApiResult<Vec<DailySales>> {
    let week = state.services.sales.weekly().await?;
    Ok(Json(ApiResponse::success(week)))
}

/// Upsert baseline sales for the listed days
#[utoipa::path(
    put,
    path = "/api/v1/sales",
    request_body = Vec<DayAmountInput>,
    responses(
        (status = 200, description = "Updated week", body = ApiResponse<Vec<DailySales>>),
        (status = 400, description = "Unknown day or negative amount", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Sales"
)]
pub async fn put_sales(
    State(state): State<AppState>,
    Json(entries): Json<Vec<DayAmountInput>>,
) -> ApiResult<Vec<DailySales>> {
    let week = state.services.sales.set_weekly(entries).await?;
    Ok(Json(ApiResponse::success(week)))
}
