use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::allocation::{AllocationPlan, Board};
use crate::services::allocations::{BoardSummary, WeekSelector};
use crate::{ApiResponse, ApiResult, AppState};

#[derive(Debug, Deserialize, IntoParams)]
pub struct WeekQuery {
    /// "current" or "next". Absent, the stored projection config decides.
    pub week: Option<WeekSelector>,
}

/// Thaw board: case pulls per day for the planning week
#[utoipa::path(
    get,
    path = "/api/v1/allocations/thaw",
    params(WeekQuery),
    responses(
        (status = 200, description = "Thaw plan for the selected week", body = ApiResponse<AllocationPlan>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Boards"
)]
pub async fn get_thaw_board(
    State(state): State<AppState>,
    Query(query): Query<WeekQuery>,
) -> ApiResult<AllocationPlan> {
    let plan = state
        .services
        .allocations
        .plan(Board::Thaw, query.week)
        .await?;
    Ok(Json(ApiResponse::success(plan)))
}

/// Prep board: bag and tray counts per day for the planning week
#[utoipa::path(
    get,
    path = "/api/v1/allocations/prep",
    params(WeekQuery),
    responses(
        (status = 200, description = "Prep plan for the selected week", body = ApiResponse<AllocationPlan>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Boards"
)]
pub async fn get_prep_board(
    State(state): State<AppState>,
    Query(query): Query<WeekQuery>,
) -> ApiResult<AllocationPlan> {
    let plan = state
        .services
        .allocations
        .plan(Board::Prep, query.week)
        .await?;
    Ok(Json(ApiResponse::success(plan)))
}

/// Both boards and the closure list from one snapshot
#[utoipa::path(
    get,
    path = "/api/v1/allocations/summary",
    params(WeekQuery),
    responses(
        (status = 200, description = "Thaw plan, prep plan, and closures", body = ApiResponse<BoardSummary>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Boards"
)]
pub async fn get_board_summary(
    State(state): State<AppState>,
    Query(query): Query<WeekQuery>,
) -> ApiResult<BoardSummary> {
    let summary = state.services.allocations.summary(query.week).await?;
    Ok(Json(ApiResponse::success(summary)))
}
