use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

/// Registers the bearer JWT scheme every protected path refers to.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "Bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Backhouse API",
        version = "1.0.0",
        description = r#"
# Backhouse Kitchen Planning API

Back-of-house planning service for a single quick-service restaurant: weekly
sales projections drive the thaw and prep allocation boards, with manual
adjustments, closure plans, standing instructions, truck ordering, and
sales-mix analysis layered on top.

## Features

- **Sales Projections**: Weekly baseline by weekday plus date-specific overrides
- **Allocation Boards**: Server-computed thaw and prep worksheets per product and day
- **UTP Factors**: Units-per-thousand consumption factors, maintainable from sales-mix uploads
- **Buffers**: Global percentage cushions with per-day overrides
- **Adjustment Messages**: Expiring free-text tweaks parsed into case and bag deltas
- **Closure Plans**: Scheduled closure windows that blank out board days
- **Truck Ordering**: Item catalog with par levels and generated order sheets

## Authentication

All API endpoints require a JWT issued by `/auth/login`. Include it in the
Authorization header:

```
Authorization: Bearer <your-jwt-token>
```

## Error Handling

The API uses a consistent error envelope with appropriate HTTP status codes:

```json
{
  "error": "VALIDATION_ERROR",
  "message": "unknown day of week: 'someday'",
  "request_id": "7f9c0c3b",
  "timestamp": "2024-01-01T00:00:00Z"
}
```
        "#,
        contact(
            name = "Backhouse Maintainers",
            email = "ops@backhouse.dev"
        ),
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development"),
        (url = "http://backhouse.local:8080", description = "In-store server")
    ),
    tags(
        (name = "Auth", description = "Sign-in and token lifecycle"),
        (name = "Sales", description = "Weekly sales baseline"),
        (name = "Projections", description = "Date overrides and the plan-ahead toggle"),
        (name = "UPT", description = "Units-per-thousand factors"),
        (name = "Buffers", description = "Global and per-day buffer percentages"),
        (name = "Messages", description = "Expiring manual adjustments"),
        (name = "Closures", description = "Scheduled closure windows"),
        (name = "Instructions", description = "Standing notes for board days"),
        (name = "Truck", description = "Order catalog and order sheets"),
        (name = "Sales Mix", description = "Item-level sales uploads and UTP suggestions"),
        (name = "Boards", description = "Thaw and prep allocation boards")
    ),
    paths(
        // Auth
        crate::auth::login_handler,
        crate::auth::refresh_token_handler,
        crate::auth::logout_handler,
        crate::auth::me_handler,

        // Sales baseline
        crate::handlers::sales::get_sales,
        crate::handlers::sales::put_sales,

        // Projections
        crate::handlers::projections::list_future_projections,
        crate::handlers::projections::upsert_future_projection,
        crate::handlers::projections::delete_future_projection,
        crate::handlers::projections::get_projection_config,
        crate::handlers::projections::put_projection_config,

        // UTP factors
        crate::handlers::upts::list_upts,
        crate::handlers::upts::put_upt,
        crate::handlers::upts::put_upts_bulk,

        // Buffers
        crate::handlers::buffers::list_buffers,
        crate::handlers::buffers::put_buffer,
        crate::handlers::buffers::list_daily_buffers,
        crate::handlers::buffers::put_daily_buffer,
        crate::handlers::buffers::delete_daily_buffer,

        // Adjustment messages
        crate::handlers::messages::list_messages,
        crate::handlers::messages::create_message,
        crate::handlers::messages::delete_message,
        crate::handlers::messages::get_adjustment_data,

        // Closure plans
        crate::handlers::closures::list_closure_plans,
        crate::handlers::closures::create_closure_plan,
        crate::handlers::closures::delete_closure_plan,

        // Instructions
        crate::handlers::instructions::list_instructions,
        crate::handlers::instructions::create_instruction,
        crate::handlers::instructions::update_instruction,
        crate::handlers::instructions::delete_instruction,

        // Truck ordering
        crate::handlers::truck_items::list_truck_items,
        crate::handlers::truck_items::create_truck_item,
        crate::handlers::truck_items::update_truck_item,
        crate::handlers::truck_items::delete_truck_item,
        crate::handlers::truck_items::get_order_sheet,

        // Sales mix
        crate::handlers::salesmix::get_current_salesmix,
        crate::handlers::salesmix::upload_salesmix,

        // Allocation boards
        crate::handlers::allocations::get_thaw_board,
        crate::handlers::allocations::get_prep_board,
        crate::handlers::allocations::get_board_summary,
    ),
    components(
        schemas(
            // Common types
            crate::ApiResponse<serde_json::Value>,
            crate::errors::ErrorResponse,

            // Auth types
            crate::auth::LoginRequest,
            crate::auth::RefreshTokenRequest,
            crate::auth::TokenPair,
            crate::auth::CurrentUser,

            // Planning inputs
            crate::services::sales::DailySales,
            crate::services::sales::DayAmountInput,
            crate::services::projections::FutureProjectionInput,
            crate::services::projections::ProjectionConfigView,
            crate::services::upts::UptInput,
            crate::services::buffers::BufferInput,
            crate::services::buffers::DailyBufferInput,
            crate::entities::future_projection::Model,
            crate::entities::product_upt::Model,
            crate::entities::buffer::Model,
            crate::entities::daily_buffer::Model,

            // Board overlays
            crate::services::messages::AdjustmentMessageInput,
            crate::services::messages::AdjustmentData,
            crate::services::closures::ClosurePlanInput,
            crate::services::closures::DurationInput,
            crate::services::instructions::InstructionInput,
            crate::services::instructions::InstructionView,
            crate::entities::adjustment_message::Model,
            crate::entities::closure_plan::Model,

            // Truck ordering
            crate::services::truck_items::TruckItemInput,
            crate::services::truck_items::TruckItemView,
            crate::services::truck_items::AssociatedItem,
            crate::services::truck_items::AssociatedDemand,
            crate::services::truck_items::OrderLine,
            crate::services::truck_items::OrderSheet,

            // Sales mix
            crate::services::salesmix::SalesMixRowInput,
            crate::services::salesmix::SalesMixUpload,
            crate::services::salesmix::SalesMixRowView,
            crate::services::salesmix::UptSuggestion,
            crate::services::salesmix::SalesMixReport,

            // Allocation engine output
            crate::allocation::AllocationPlan,
            crate::allocation::AllocationDay,
            crate::allocation::AllocationItem,
            crate::allocation::Board,
            crate::allocation::DayOfWeek,
            crate::allocation::ContainerUnit,
            crate::allocation::RoundingRule,
            crate::allocation::DurationUnit,
            crate::services::allocations::WeekSelector,
            crate::services::allocations::ClosureOverview,
            crate::services::allocations::BoardSummary,
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_generates() {
        let openapi = ApiDocV1::openapi();
        let json = serde_json::to_string_pretty(&openapi).unwrap();
        assert!(json.contains("Backhouse API"));
        assert!(json.contains("/api/v1/sales"));
        assert!(json.contains("/api/v1/allocations/thaw"));
        assert!(json.contains("/auth/login"));
    }

    #[test]
    fn bearer_scheme_is_registered() {
        let openapi = ApiDocV1::openapi();
        let components = openapi.components.expect("components expected");
        assert!(components.security_schemes.contains_key("Bearer"));
    }
}
