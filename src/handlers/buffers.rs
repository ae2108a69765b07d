use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::allocation::DayOfWeek;
use crate::entities::{buffer, daily_buffer};
use crate::errors::ServiceError;
use crate::services::buffers::{BufferInput, DailyBufferInput};
use crate::{ApiResponse, ApiResult, AppState};

#[derive(Debug, Deserialize, IntoParams)]
pub struct DayFilter {
    /// Weekday name, e.g. "monday". Absent means every day.
    pub day: Option<String>,
}

fn parse_day(raw: &str) -> Result<DayOfWeek, ServiceError> {
    DayOfWeek::parse(raw)
        .ok_or_else(|| ServiceError::ValidationError(format!("unknown day of week: '{}'", raw)))
}

/// Global buffer percentages
#[utoipa::path(
    get,
    path = "/api/v1/buffer",
    responses(
        (status = 200, description = "Buffers ordered by product name", body = ApiResponse<Vec<buffer::Model>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Buffers"
)]
pub async fn list_buffers(State(state): State<AppState>) -> ApiResult<Vec<buffer::Model>> {
    let rows = state.services.buffers.list_global().await?;
    Ok(Json(ApiResponse::success(rows)))
}

/// Set the global buffer for one product
#[utoipa::path(
    put,
    path = "/api/v1/buffer",
    request_body = BufferInput,
    responses(
        (status = 200, description = "Stored buffer", body = ApiResponse<buffer::Model>),
        (status = 400, description = "Unknown product or percentage out of range", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Buffers"
)]
pub async fn put_buffer(
    State(state): State<AppState>,
    Json(input): Json<BufferInput>,
) -> ApiResult<buffer::Model> {
    let row = state.services.buffers.set_global(input).await?;
    Ok(Json(ApiResponse::success(row)))
}

/// Day-specific buffer overrides
#[utoipa::path(
    get,
    path = "/api/v1/daily-buffer",
    params(DayFilter),
    responses(
        (status = 200, description = "Overrides, optionally narrowed to one day", body = ApiResponse<Vec<daily_buffer::Model>>),
        (status = 400, description = "Unknown day", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Buffers"
)]
pub async fn list_daily_buffers(
    State(state): State<AppState>,
    Query(filter): Query<DayFilter>,
) -> ApiResult<Vec<daily_buffer::Model>> {
    let day = filter.day.as_deref().map(parse_day).transpose()?;
    let rows = state.services.buffers.list_daily(day).await?;
    Ok(Json(ApiResponse::success(rows)))
}

/// Set the buffer override for one day/product pair
#[utoipa::path(
    put,
    path = "/api/v1/daily-buffer",
    request_body = DailyBufferInput,
    responses(
        (status = 200, description = "Stored override", body = ApiResponse<daily_buffer::Model>),
        (status = 400, description = "Unknown day or product, or percentage out of range", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Buffers"
)]
pub async fn put_daily_buffer(
    State(state): State<AppState>,
    Json(input): Json<DailyBufferInput>,
) -> ApiResult<daily_buffer::Model> {
    let row = state.services.buffers.set_daily(input).await?;
    Ok(Json(ApiResponse::success(row)))
}

/// Remove a daily override, falling back to the global buffer
#[utoipa::path(
    delete,
    path = "/api/v1/daily-buffer/:id",
    params(("id" = i64, Path, description = "Override row id")),
    responses(
        (status = 204, description = "Override removed"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "No such override", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Buffers"
)]
pub async fn delete_daily_buffer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServiceError> {
    state.services.buffers.delete_daily(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
