use axum::{extract::State, response::Json};

use crate::services::salesmix::{SalesMixReport, SalesMixUpload};
use crate::{ApiResponse, ApiResult, AppState};

/// The latest sales-mix report with UTP suggestions
#[utoipa::path(
    get,
    path = "/api/v1/salesmix/current",
    responses(
        (status = 200, description = "Latest upload, or an empty report when none exists", body = ApiResponse<SalesMixReport>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Sales Mix"
)]
pub async fn get_current_salesmix(State(state): State<AppState>) -> ApiResult<SalesMixReport> {
    let report = state.services.salesmix.current().await?;
    Ok(Json(ApiResponse::success(report)))
}

/// Replace the stored sales mix with a new upload
#[utoipa::path(
    post,
    path = "/api/v1/salesmix/upload",
    request_body = SalesMixUpload,
    responses(
        (status = 200, description = "Report for the new upload", body = ApiResponse<SalesMixReport>),
        (status = 400, description = "Non-positive period sales, empty upload, or blank item", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Sales Mix"
)]
pub async fn upload_salesmix(
    State(state): State<AppState>,
    Json(upload): Json<SalesMixUpload>,
) -> ApiResult<SalesMixReport> {
    let report = state.services.salesmix.upload(upload).await?;
    Ok(Json(ApiResponse::success(report)))
}
