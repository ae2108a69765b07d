use axum::{extract::State, response::Json};

use crate::entities::product_upt;
use crate::services::upts::UptInput;
use crate::{ApiResponse, ApiResult, AppState};

/// Units-per-thousand factors for every configured product
#[utoipa::path(
    get,
    path = "/api/v1/upt",
    responses(
        (status = 200, description = "Factors ordered by product name", body = ApiResponse<Vec<product_upt::Model>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "UPT"
)]
pub async fn list_upts(State(state): State<AppState>) -> ApiResult<Vec<product_upt::Model>> {
    let rows = state.services.upts.list().await?;
    Ok(Json(ApiResponse::success(rows)))
}

/// Set the factor for one product
#[utoipa::path(
    put,
    path = "/api/v1/upt",
    request_body = UptInput,
    responses(
        (status = 200, description = "Stored factor", body = ApiResponse<product_upt::Model>),
        (status = 400, description = "Unknown product or non-positive factor", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "UPT"
)]
pub async fn put_upt(
    State(state): State<AppState>,
    Json(input): Json<UptInput>,
) -> ApiResult<product_upt::Model> {
    let row = state.services.upts.set(input).await?;
    Ok(Json(ApiResponse::success(row)))
}

/// Set several factors in one call; all of them or none
#[utoipa::path(
    put,
    path = "/api/v1/upt/bulk",
    request_body = Vec<UptInput>,
    responses(
        (status = 200, description = "Stored factors, in request order", body = ApiResponse<Vec<product_upt::Model>>),
        (status = 400, description = "Any entry invalid; nothing written", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "UPT"
)]
pub async fn put_upts_bulk(
    State(state): State<AppState>,
    Json(inputs): Json<Vec<UptInput>>,
) -> ApiResult<Vec<product_upt::Model>> {
    let rows = state.services.upts.set_bulk(inputs).await?;
    Ok(Json(ApiResponse::success(rows)))
}
