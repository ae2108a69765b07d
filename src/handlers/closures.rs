use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};

use crate::entities::closure_plan;
use crate::errors::ServiceError;
use crate::services::closures::ClosurePlanInput;
use crate::{ApiResponse, ApiResult, AppState};

/// Closure windows that have not ended yet
#[utoipa::path(
    get,
    path = "/api/v1/closure/plans",
    responses(
        (status = 200, description = "Current and upcoming closures, soonest first", body = ApiResponse<Vec<closure_plan::Model>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Closures"
)]
pub async fn list_closure_plans(
    State(state): State<AppState>,
) -> ApiResult<Vec<closure_plan::Model>> {
    let rows = state.services.closures.list_upcoming().await?;
    Ok(Json(ApiResponse::success(rows)))
}

/// Schedule a closure window
#[utoipa::path(
    post,
    path = "/api/v1/closure/plans",
    request_body = ClosurePlanInput,
    responses(
        (status = 200, description = "Stored closure", body = ApiResponse<closure_plan::Model>),
        (status = 400, description = "Bad duration, blank reason, or window already over", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Closures"
)]
pub async fn create_closure_plan(
    State(state): State<AppState>,
    Json(input): Json<ClosurePlanInput>,
) -> ApiResult<closure_plan::Model> {
    let row = state.services.closures.create(input).await?;
    Ok(Json(ApiResponse::success(row)))
}

/// Cancel a scheduled closure
#[utoipa::path(
    delete,
    path = "/api/v1/closure/plans/:id",
    params(("id" = i64, Path, description = "Closure plan id")),
    responses(
        (status = 204, description = "Closure cancelled"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "No such closure", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Closures"
)]
pub async fn delete_closure_plan(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServiceError> {
    state.services.closures.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
