use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};

use crate::entities::future_projection;
use crate::errors::ServiceError;
use crate::services::projections::{FutureProjectionInput, ProjectionConfigView};
use crate::{ApiResponse, ApiResult, AppState};

/// Date-specific sales overrides from today onward
#[utoipa::path(
    get,
    path = "/api/v1/projections/future",
    responses(
        (status = 200, description = "Upcoming overrides, soonest first", body = ApiResponse<Vec<future_projection::Model>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Projections"
)]
pub async fn list_future_projections(
    State(state): State<AppState>,
) -> ApiResult<Vec<future_projection::Model>> {
    let rows = state.services.projections.list_upcoming().await?;
    Ok(Json(ApiResponse::success(rows)))
}

/// Create or replace the sales override for one date
#[utoipa::path(
    post,
    path = "/api/v1/projections/future",
    request_body = FutureProjectionInput,
    responses(
        (status = 200, description = "Stored override", body = ApiResponse<future_projection::Model>),
        (status = 400, description = "Past date or negative amount", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Projections"
)]
pub async fn upsert_future_projection(
    State(state): State<AppState>,
    Json(input): Json<FutureProjectionInput>,
) -> ApiResult<future_projection::Model> {
    let row = state.services.projections.upsert(input).await?;
    Ok(Json(ApiResponse::success(row)))
}

/// Remove a date override
#[utoipa::path(
    delete,
    path = "/api/v1/projections/future/:id",
    params(("id" = i64, Path, description = "Override row id")),
    responses(
        (status = 204, description = "Override removed"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "No such override", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Projections"
)]
pub async fn delete_future_projection(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServiceError> {
    state.services.projections.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Which week the boards plan for
#[utoipa::path(
    get,
    path = "/api/v1/sales-projection-config",
    responses(
        (status = 200, description = "Current plan-ahead toggle", body = ApiResponse<ProjectionConfigView>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Projections"
)]
pub async fn get_projection_config(State(state): State<AppState>) -> ApiResult<ProjectionConfigView> {
    let config = state.services.projections.config().await?;
    Ok(Json(ApiResponse::success(config)))
}

/// Point the boards at the current or the next week
#[utoipa::path(
    put,
    path = "/api/v1/sales-projection-config",
    request_body = ProjectionConfigView,
    responses(
        (status = 200, description = "Updated toggle", body = ApiResponse<ProjectionConfigView>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Projections"
)]
pub async fn put_projection_config(
    State(state): State<AppState>,
    Json(input): Json<ProjectionConfigView>,
) -> ApiResult<ProjectionConfigView> {
    let config = state
        .services
        .projections
        .set_config(input.plan_next_week)
        .await?;
    Ok(Json(ApiResponse::success(config)))
}
