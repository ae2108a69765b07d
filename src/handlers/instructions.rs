use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::allocation::DayOfWeek;
use crate::errors::ServiceError;
use crate::services::instructions::{InstructionInput, InstructionView};
use crate::{ApiResponse, ApiResult, AppState};

#[derive(Debug, Deserialize, IntoParams)]
pub struct InstructionFilter {
    /// Weekday name, e.g. "friday". Absent means every day.
    pub day: Option<String>,
}

/// Standing instructions, with their prep-only flag split out
#[utoipa::path(
    get,
    path = "/api/v1/instructions",
    params(InstructionFilter),
    responses(
        (status = 200, description = "Instructions, optionally narrowed to one day", body = ApiResponse<Vec<InstructionView>>),
        (status = 400, description = "Unknown day", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Instructions"
)]
pub async fn list_instructions(
    State(state): State<AppState>,
    Query(filter): Query<InstructionFilter>,
) -> ApiResult<Vec<InstructionView>> {
    let day = match filter.day.as_deref() {
        Some(raw) => Some(DayOfWeek::parse(raw).ok_or_else(|| {
            ServiceError::ValidationError(format!("unknown day of week: '{}'", raw))
        })?),
        None => None,
    };
    let rows = state.services.instructions.list(day).await?;
    Ok(Json(ApiResponse::success(rows)))
}

/// Post an instruction for a day
#[utoipa::path(
    post,
    path = "/api/v1/instructions",
    request_body = InstructionInput,
    responses(
        (status = 200, description = "Stored instruction", body = ApiResponse<InstructionView>),
        (status = 400, description = "Unknown day or product, or empty message", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Instructions"
)]
pub async fn create_instruction(
    State(state): State<AppState>,
    Json(input): Json<InstructionInput>,
) -> ApiResult<InstructionView> {
    let row = state.services.instructions.create(input).await?;
    Ok(Json(ApiResponse::success(row)))
}

/// Replace an instruction
#[utoipa::path(
    put,
    path = "/api/v1/instructions/:id",
    params(("id" = i64, Path, description = "Instruction id")),
    request_body = InstructionInput,
    responses(
        (status = 200, description = "Updated instruction", body = ApiResponse<InstructionView>),
        (status = 400, description = "Unknown day or product, or empty message", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "No such instruction", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Instructions"
)]
pub async fn update_instruction(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<InstructionInput>,
) -> ApiResult<InstructionView> {
    let row = state.services.instructions.update(id, input).await?;
    Ok(Json(ApiResponse::success(row)))
}

/// Remove an instruction
#[utoipa::path(
    delete,
    path = "/api/v1/instructions/:id",
    params(("id" = i64, Path, description = "Instruction id")),
    responses(
        (status = 204, description = "Instruction removed"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "No such instruction", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Instructions"
)]
pub async fn delete_instruction(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServiceError> {
    state.services.instructions.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
