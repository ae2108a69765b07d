use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};

use crate::auth::AuthUser;
use crate::entities::adjustment_message;
use crate::errors::ServiceError;
use crate::services::messages::{AdjustmentData, AdjustmentMessageInput};
use crate::{ApiResponse, ApiResult, AppState};

/// Unexpired adjustment messages
#[utoipa::path(
    get,
    path = "/api/v1/messages",
    responses(
        (status = 200, description = "Active messages, oldest first", body = ApiResponse<Vec<adjustment_message::Model>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Messages"
)]
pub async fn list_messages(
    State(state): State<AppState>,
) -> ApiResult<Vec<adjustment_message::Model>> {
    let rows = state.services.messages.list_active().await?;
    Ok(Json(ApiResponse::success(rows)))
}

/// Post an adjustment for a day/product pair
#[utoipa::path(
    post,
    path = "/api/v1/messages",
    request_body = AdjustmentMessageInput,
    responses(
        (status = 200, description = "Stored message", body = ApiResponse<adjustment_message::Model>),
        (status = 400, description = "Unknown day or product, or no parseable adjustment", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Messages"
)]
pub async fn create_message(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<AdjustmentMessageInput>,
) -> ApiResult<adjustment_message::Model> {
    let row = state
        .services
        .messages
        .create(input, user.name.clone())
        .await?;
    Ok(Json(ApiResponse::success(row)))
}

/// Retract a message before it expires
#[utoipa::path(
    delete,
    path = "/api/v1/messages/:id",
    params(("id" = i64, Path, description = "Message id")),
    responses(
        (status = 204, description = "Message removed"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "No such message", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Messages"
)]
pub async fn delete_message(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServiceError> {
    state.services.messages.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Active messages with their parsed case and bag deltas
#[utoipa::path(
    get,
    path = "/api/v1/adjustment/data",
    responses(
        (status = 200, description = "Messages plus parsed clause totals", body = ApiResponse<Vec<AdjustmentData>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Messages"
)]
pub async fn get_adjustment_data(State(state): State<AppState>) -> ApiResult<Vec<AdjustmentData>> {
    let rows = state.services.messages.adjustment_data().await?;
    Ok(Json(ApiResponse::success(rows)))
}
