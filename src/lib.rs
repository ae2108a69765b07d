//! Backhouse API Library
//!
//! Back-of-house planning service for a quick-service kitchen. Weekly sales
//! projections and per-product factors drive the thaw and prep allocation
//! boards; adjustment messages, closure plans, instructions, truck ordering,
//! and sales-mix analysis layer on top.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod allocation;
pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod health;
pub mod metrics;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod services;
pub mod tracing;

use axum::{
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::auth::consts as perm;
use crate::auth::AuthRouterExt;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub auth_service: Arc<auth::AuthService>,
    pub services: handlers::AppServices,
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn validation_errors(errors: Vec<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some("Validation failed".to_string()),
            errors: Some(errors),
            meta: Some(ResponseMeta::capture()),
        }
    }
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use chrono::DateTime;

    #[tokio::test]
    async fn success_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-123"), async {
                ApiResponse::success("ok")
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-123"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }

    #[tokio::test]
    async fn error_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-err"), async {
                ApiResponse::<()>::error("oops".into())
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-err"));
        assert!(!meta.timestamp.is_empty());
    }

    #[tokio::test]
    async fn validation_errors_response_includes_metadata() {
        let response = crate::tracing::scope_request_id(
            crate::tracing::RequestId::new("meta-validation"),
            async { ApiResponse::<()>::validation_errors(vec!["missing".into()]) },
        )
        .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-validation"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// Versioned API, grouped into sub-routers by the permission that gates them.
pub fn api_v1_routes(state: AppState) -> Router<AppState> {
    // Allocation boards (read-only; the engine computes, nobody edits)
    let boards_read = Router::new()
        .route(
            "/allocations/thaw",
            get(handlers::allocations::get_thaw_board),
        )
        .route(
            "/allocations/prep",
            get(handlers::allocations::get_prep_board),
        )
        .route(
            "/allocations/summary",
            get(handlers::allocations::get_board_summary),
        )
        .with_permission(perm::BOARDS_READ, state.clone());

    // Planning configuration reads
    let settings_read = Router::new()
        .route("/sales", get(handlers::sales::get_sales))
        .route(
            "/projections/future",
            get(handlers::projections::list_future_projections),
        )
        .route(
            "/sales-projection-config",
            get(handlers::projections::get_projection_config),
        )
        .route("/upt", get(handlers::upts::list_upts))
        .route("/buffer", get(handlers::buffers::list_buffers))
        .route("/daily-buffer", get(handlers::buffers::list_daily_buffers))
        .route("/messages", get(handlers::messages::list_messages))
        .route(
            "/adjustment/data",
            get(handlers::messages::get_adjustment_data),
        )
        .route(
            "/closure/plans",
            get(handlers::closures::list_closure_plans),
        )
        .route(
            "/instructions",
            get(handlers::instructions::list_instructions),
        )
        .route(
            "/salesmix/current",
            get(handlers::salesmix::get_current_salesmix),
        )
        .with_permission(perm::SETTINGS_READ, state.clone());

    // Planning configuration writes
    let settings_write = Router::new()
        .route("/sales", put(handlers::sales::put_sales))
        .route(
            "/projections/future",
            post(handlers::projections::upsert_future_projection),
        )
        .route(
            "/projections/future/:id",
            delete(handlers::projections::delete_future_projection),
        )
        .route(
            "/sales-projection-config",
            put(handlers::projections::put_projection_config),
        )
        .route("/upt", put(handlers::upts::put_upt))
        .route("/upt/bulk", put(handlers::upts::put_upts_bulk))
        .route("/buffer", put(handlers::buffers::put_buffer))
        .route("/daily-buffer", put(handlers::buffers::put_daily_buffer))
        .route(
            "/daily-buffer/:id",
            delete(handlers::buffers::delete_daily_buffer),
        )
        .route("/messages", post(handlers::messages::create_message))
        .route("/messages/:id", delete(handlers::messages::delete_message))
        .route(
            "/closure/plans",
            post(handlers::closures::create_closure_plan),
        )
        .route(
            "/closure/plans/:id",
            delete(handlers::closures::delete_closure_plan),
        )
        .route(
            "/instructions",
            post(handlers::instructions::create_instruction),
        )
        .route(
            "/instructions/:id",
            put(handlers::instructions::update_instruction)
                .delete(handlers::instructions::delete_instruction),
        )
        .route("/salesmix/upload", post(handlers::salesmix::upload_salesmix))
        .with_permission(perm::SETTINGS_WRITE, state.clone());

    // Truck catalog and order sheets
    let truck_read = Router::new()
        .route("/truck-items", get(handlers::truck_items::list_truck_items))
        .route(
            "/truck-items/order-sheet",
            get(handlers::truck_items::get_order_sheet),
        )
        .with_permission(perm::TRUCK_READ, state.clone());

    let truck_write = Router::new()
        .route(
            "/truck-items",
            post(handlers::truck_items::create_truck_item),
        )
        .route(
            "/truck-items/:id",
            put(handlers::truck_items::update_truck_item)
                .delete(handlers::truck_items::delete_truck_item),
        )
        .with_permission(perm::TRUCK_WRITE, state);

    Router::new()
        .route("/status", get(api_status))
        .merge(boards_read)
        .merge(settings_read)
        .merge(settings_write)
        .merge(truck_read)
        .merge(truck_write)
}

async fn api_status() -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let status_data = json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "backhouse-api",
        "timestamp": Utc::now().to_rfc3339(),
        "environment": std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
    });

    Ok(Json(ApiResponse::success(status_data)))
}

pub mod prelude {
    pub use crate::allocation::*;
    pub use crate::db::*;
    pub use crate::errors::*;
    pub use crate::events::*;
    pub use crate::health::*;
    pub use crate::metrics::*;
    pub use crate::openapi::*;
    pub use crate::services::*;
    pub use crate::tracing::*;
}
