use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::allocation::DayOfWeek;
use crate::errors::ServiceError;
use crate::services::truck_items::{OrderSheet, TruckItemInput, TruckItemView};
use crate::{ApiResponse, ApiResult, AppState};

#[derive(Debug, Deserialize, IntoParams)]
pub struct OrderSheetQuery {
    /// Delivery day the sheet is built against.
    pub day: String,
}

/// Truck catalog, grouped by storage area
#[utoipa::path(
    get,
    path = "/api/v1/truck-items",
    responses(
        (status = 200, description = "Items ordered by storage area and sort order", body = ApiResponse<Vec<TruckItemView>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Truck"
)]
pub async fn list_truck_items(State(state): State<AppState>) -> ApiResult<Vec<TruckItemView>> {
    let rows = state.services.truck_items.list().await?;
    Ok(Json(ApiResponse::success(rows)))
}

/// Add an item to the truck catalog
#[utoipa::path(
    post,
    path = "/api/v1/truck-items",
    request_body = TruckItemInput,
    responses(
        (status = 200, description = "Stored item", body = ApiResponse<TruckItemView>),
        (status = 400, description = "Blank description, negative cost, or bad par day", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Truck"
)]
pub async fn create_truck_item(
    State(state): State<AppState>,
    Json(input): Json<TruckItemInput>,
) -> ApiResult<TruckItemView> {
    let row = state.services.truck_items.create(input).await?;
    Ok(Json(ApiResponse::success(row)))
}

/// Replace a truck item
#[utoipa::path(
    put,
    path = "/api/v1/truck-items/:id",
    params(("id" = i64, Path, description = "Truck item id")),
    request_body = TruckItemInput,
    responses(
        (status = 200, description = "Updated item", body = ApiResponse<TruckItemView>),
        (status = 400, description = "Blank description, negative cost, or bad par day", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "No such item", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Truck"
)]
pub async fn update_truck_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<TruckItemInput>,
) -> ApiResult<TruckItemView> {
    let row = state.services.truck_items.update(id, input).await?;
    Ok(Json(ApiResponse::success(row)))
}

/// Remove a truck item
#[utoipa::path(
    delete,
    path = "/api/v1/truck-items/:id",
    params(("id" = i64, Path, description = "Truck item id")),
    responses(
        (status = 204, description = "Item removed"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "No such item", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Truck"
)]
pub async fn delete_truck_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServiceError> {
    state.services.truck_items.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Suggested order quantities for one delivery day
#[utoipa::path(
    get,
    path = "/api/v1/truck-items/order-sheet",
    params(OrderSheetQuery),
    responses(
        (status = 200, description = "Par-versus-on-hand shortfalls with costs", body = ApiResponse<OrderSheet>),
        (status = 400, description = "Unknown day", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Truck"
)]
pub async fn get_order_sheet(
    State(state): State<AppState>,
    Query(query): Query<OrderSheetQuery>,
) -> ApiResult<OrderSheet> {
    let day = DayOfWeek::parse(&query.day).ok_or_else(|| {
        ServiceError::ValidationError(format!("unknown day of week: '{}'", query.day))
    })?;
    let sheet = state.services.truck_items.order_sheet(day).await?;
    Ok(Json(ApiResponse::success(sheet)))
}
