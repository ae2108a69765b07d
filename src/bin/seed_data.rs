//! Seed data script - populates the database with realistic demo data
//!
//! Run with: cargo run --bin seed-data
//!
//! This creates:
//! - 3 login users (admin / manager / team, passwords printed at the end)
//! - A full weekly sales baseline plus one date-specific projection
//! - UTP factors and buffer percentages for every catalog product
//! - An adjustment message, a closure plan, and two crew instructions
//! - Truck order items with par levels and a sample sales-mix upload
//!
//! Planning rows go through the service layer so derived fields (closure
//! expiry, parsed adjustment clauses, JSON columns) come out exactly as
//! the API would write them. Safe to re-run: upserts overwrite, and the
//! user accounts are skipped when they already exist.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Datelike, Duration, Utc};
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

use backhouse_api::auth::{self, user, AuthService};
use backhouse_api::db;
use backhouse_api::events::EventSender;
use backhouse_api::services::buffers::{BufferInput, BufferService, DailyBufferInput};
use backhouse_api::services::closures::{ClosurePlanInput, ClosurePlanService, DurationInput};
use backhouse_api::services::instructions::{InstructionInput, InstructionService};
use backhouse_api::services::messages::{AdjustmentMessageInput, AdjustmentMessageService};
use backhouse_api::services::projections::{FutureProjectionInput, ProjectionService};
use backhouse_api::services::sales::{DayAmountInput, SalesProjectionService};
use backhouse_api::services::salesmix::{SalesMixRowInput, SalesMixService, SalesMixUpload};
use backhouse_api::services::truck_items::{AssociatedItem, TruckItemInput, TruckItemService};
use backhouse_api::services::upts::{UptInput, UptService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    info!("=== Backhouse API Seed Data ===");
    info!("Creating a realistic store setup for exploration...\n");

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://backhouse.db?mode=rwc".to_string());

    info!("Connecting to database: {}", database_url);
    let pool = db::establish_connection(&database_url).await?;
    db::run_migrations(&pool).await?;
    info!("Connected, schema up to date\n");

    let pool = Arc::new(pool);
    // Nobody consumes events during seeding; the channel just has to be
    // deep enough that sends never block.
    let (event_tx, _event_rx) = mpsc::channel(256);
    let event_sender = EventSender::new(event_tx);

    info!("Creating login users...");
    let user_count = create_users(&pool).await?;
    info!("  Created {} users", user_count);

    info!("Creating weekly sales baseline...");
    let sales = SalesProjectionService::new(pool.clone(), event_sender.clone());
    let week = create_weekly_baseline(&sales).await?;
    info!("  Set {} days of projected sales", week);

    info!("Creating date-specific projection...");
    let projections = ProjectionService::new(pool.clone(), event_sender.clone());
    create_future_projection(&projections).await?;
    info!("  Created 1 future projection");

    info!("Creating UTP factors...");
    let upts = UptService::new(pool.clone(), event_sender.clone());
    let upt_count = create_upts(&upts).await?;
    info!("  Set {} UTP factors", upt_count);

    info!("Creating buffers...");
    let buffers = BufferService::new(pool.clone(), event_sender.clone());
    let buffer_count = create_buffers(&buffers).await?;
    info!("  Set {} buffers (incl. one Saturday override)", buffer_count);

    info!("Creating adjustment message...");
    let messages = AdjustmentMessageService::new(pool.clone(), event_sender.clone());
    create_adjustment_message(&messages).await?;
    info!("  Created 1 adjustment message");

    info!("Creating closure plan...");
    let closures = ClosurePlanService::new(pool.clone(), event_sender.clone());
    create_closure_plan(&closures).await?;
    info!("  Created 1 closure plan");

    info!("Creating crew instructions...");
    let instructions = InstructionService::new(pool.clone(), event_sender.clone());
    let instruction_count = create_instructions(&instructions).await?;
    info!("  Created {} instructions", instruction_count);

    info!("Creating truck order items...");
    let truck_items = TruckItemService::new(pool.clone(), event_sender.clone());
    let truck_count = create_truck_items(&truck_items).await?;
    info!("  Created {} truck items", truck_count);

    info!("Uploading sample sales mix...");
    let salesmix = SalesMixService::new(pool.clone(), event_sender.clone());
    create_salesmix_upload(&salesmix).await?;
    info!("  Uploaded 1 sales-mix report");

    info!("\n=== Seed Data Complete ===");
    info!("Accounts: admin/admin123!  manager/manager123!  team/team123!");
    info!("");
    info!("Log in first:");
    info!("  curl -X POST http://localhost:8080/auth/login \\");
    info!("    -H 'Content-Type: application/json' \\");
    info!("    -d '{{\"username\":\"manager\",\"password\":\"manager123!\"}}'");
    info!("");
    info!("Then try these with the access token:");
    info!("  curl -H \"Authorization: Bearer $TOKEN\" http://localhost:8080/api/v1/sales");
    info!("  curl -H \"Authorization: Bearer $TOKEN\" http://localhost:8080/api/v1/allocations/thaw");
    info!("  curl -H \"Authorization: Bearer $TOKEN\" http://localhost:8080/api/v1/allocations/prep");
    info!("  curl -H \"Authorization: Bearer $TOKEN\" \"http://localhost:8080/api/v1/truck-items/order-sheet?day=thursday\"");
    info!("");
    info!("Or explore interactively at: http://localhost:8080/swagger-ui");

    Ok(())
}

/// Store accounts, one per role. Skipped entirely when the admin user
/// already exists so re-runs do not trip the unique username index.
async fn create_users(db: &sea_orm::DatabaseConnection) -> anyhow::Result<usize> {
    let existing = user::Entity::find()
        .filter(user::Column::Username.eq("admin"))
        .one(db)
        .await?;
    if existing.is_some() {
        info!("  Users already present, skipping");
        return Ok(0);
    }

    let users_data = vec![
        ("admin", "Store Operator", auth::ROLE_ADMIN, "admin123!"),
        ("manager", "Kitchen Director", auth::ROLE_MANAGER, "manager123!"),
        ("team", "Team Member", auth::ROLE_TEAM, "team123!"),
    ];

    let now = Utc::now();
    let mut created = 0;
    for (username, display_name, role, password) in users_data {
        let record = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(username.to_string()),
            display_name: Set(display_name.to_string()),
            password_hash: Set(AuthService::hash_password(password)?),
            role: Set(role.to_string()),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        record.insert(db).await?;
        created += 1;
    }

    Ok(created)
}

/// A typical week: slow Monday building to a big Friday/Saturday, closed
/// Sunday (zero sales, so the boards render an empty day).
async fn create_weekly_baseline(sales: &SalesProjectionService) -> anyhow::Result<usize> {
    let week_data = vec![
        ("monday", dec!(9500)),
        ("tuesday", dec!(10200)),
        ("wednesday", dec!(10800)),
        ("thursday", dec!(11500)),
        ("friday", dec!(14800)),
        ("saturday", dec!(16200)),
        ("sunday", dec!(0)),
    ];

    let entries = week_data
        .into_iter()
        .map(|(day, amount)| DayAmountInput {
            day: day.to_string(),
            amount,
        })
        .collect::<Vec<_>>();
    let count = entries.len();
    sales.set_weekly(entries).await?;
    Ok(count)
}

/// One date-specific override two Saturdays out - a catered event bump.
async fn create_future_projection(projections: &ProjectionService) -> anyhow::Result<()> {
    let today = Utc::now().date_naive();
    let days_until_saturday = (5 - today.weekday().num_days_from_monday() as i64).rem_euclid(7);
    let event_date = today + Duration::days(days_until_saturday + 7);

    projections
        .upsert(FutureProjectionInput {
            date: event_date,
            amount: dec!(21500),
        })
        .await?;
    Ok(())
}

/// Servings sold per $1000 of sales, one factor per catalog product.
/// Numbers are in the range a suburban store actually runs.
async fn create_upts(upts: &UptService) -> anyhow::Result<usize> {
    let upt_data = vec![
        ("Breaded Filet", dec!(38.5)),
        ("Spicy Filet", dec!(21.0)),
        ("Nugget", dec!(96.0)),
        ("Strip", dec!(18.75)),
        ("Grilled Filet", dec!(12.4)),
        ("Grilled Nugget", dec!(27.2)),
        ("Diced Chicken", dec!(9.6)),
        ("Mac & Cheese", dec!(11.2)),
        ("Chicken Salad", dec!(3.1)),
        ("Lemonade Mix", dec!(7.8)),
    ];

    let inputs = upt_data
        .into_iter()
        .map(|(product_name, utp)| UptInput {
            product_name: product_name.to_string(),
            utp,
        })
        .collect::<Vec<_>>();
    let models = upts.set_bulk(inputs).await?;
    Ok(models.len())
}

/// Standing buffers for every product plus one Saturday override on
/// Nugget, the highest-velocity thaw item.
async fn create_buffers(buffers: &BufferService) -> anyhow::Result<usize> {
    let buffer_data = vec![
        ("Breaded Filet", dec!(15)),
        ("Spicy Filet", dec!(15)),
        ("Nugget", dec!(20)),
        ("Strip", dec!(10)),
        ("Grilled Filet", dec!(12)),
        ("Grilled Nugget", dec!(12)),
        ("Diced Chicken", dec!(10)),
        ("Mac & Cheese", dec!(8)),
        ("Chicken Salad", dec!(5)),
        ("Lemonade Mix", dec!(10)),
    ];

    let mut count = 0;
    for (product_name, buffer_prcnt) in buffer_data {
        buffers
            .set_global(BufferInput {
                product_name: product_name.to_string(),
                buffer_prcnt,
            })
            .await?;
        count += 1;
    }

    buffers
        .set_daily(DailyBufferInput {
            day: "saturday".to_string(),
            product_name: "Nugget".to_string(),
            buffer_prcnt: dec!(35),
        })
        .await?;
    count += 1;

    Ok(count)
}

/// A signed-clause message the parser understands: nets to +2 cases on
/// Friday's thaw count.
async fn create_adjustment_message(messages: &AdjustmentMessageService) -> anyhow::Result<()> {
    messages
        .create(
            AdjustmentMessageInput {
                day: "friday".to_string(),
                product_name: "Breaded Filet".to_string(),
                message: "+3 cases for the football crowd, -1 case back Saturday".to_string(),
                expires_at: Utc::now() + Duration::days(3),
            },
            Some("seed-data".to_string()),
        )
        .await?;
    Ok(())
}

/// Two-day closure starting ten days out. The engine blanks covered days
/// and the board summary reports the window.
async fn create_closure_plan(closures: &ClosurePlanService) -> anyhow::Result<()> {
    let start = Utc::now().date_naive() + Duration::days(10);
    closures
        .create(ClosurePlanInput {
            date: start,
            reason: "Dining room renovation".to_string(),
            duration: DurationInput {
                value: 2,
                unit: "days".to_string(),
            },
        })
        .await?;
    Ok(())
}

/// One general note and one prep-only note (the "[PREP]" prefix keeps it
/// off the thaw board).
async fn create_instructions(instructions: &InstructionService) -> anyhow::Result<usize> {
    let instruction_data = vec![
        (
            "saturday",
            "Game day - start the second lemonade batch by 9am",
            vec!["Lemonade Mix"],
        ),
        (
            "monday",
            "[PREP] Date-check every salad bucket before first use",
            vec!["Chicken Salad"],
        ),
    ];

    let mut created = 0;
    for (day, message, products) in instruction_data {
        instructions
            .create(InstructionInput {
                day: day.to_string(),
                message: message.to_string(),
                products: products.into_iter().map(String::from).collect(),
            })
            .await?;
        created += 1;
    }

    Ok(created)
}

/// Dry-goods catalog for the weekly truck. Par levels key the two
/// delivery days; associated items ride along on the order sheet.
async fn create_truck_items(truck_items: &TruckItemService) -> anyhow::Result<usize> {
    let medium_cup_pars = BTreeMap::from([
        ("monday".to_string(), dec!(6)),
        ("thursday".to_string(), dec!(9)),
    ]);
    let tea_pars = BTreeMap::from([
        ("monday".to_string(), dec!(2)),
        ("thursday".to_string(), dec!(3)),
    ]);
    let fry_pars = BTreeMap::from([
        ("monday".to_string(), dec!(10)),
        ("thursday".to_string(), dec!(14)),
    ]);

    let items = vec![
        TruckItemInput {
            description: "Medium Drink Cups".to_string(),
            uom: "case".to_string(),
            total_units: 1000,
            cost: dec!(42.50),
            associated_items: vec![AssociatedItem {
                description: "Medium Lids".to_string(),
                units_per: 1,
            }],
            par_levels: medium_cup_pars,
            storage_area: Some("Dry Storage A".to_string()),
            sort_order: 10,
        },
        TruckItemInput {
            description: "Iced Tea Bags".to_string(),
            uom: "case".to_string(),
            total_units: 96,
            cost: dec!(31.00),
            associated_items: vec![AssociatedItem {
                description: "Tea Filters".to_string(),
                units_per: 2,
            }],
            par_levels: tea_pars,
            storage_area: Some("Dry Storage B".to_string()),
            sort_order: 20,
        },
        TruckItemInput {
            description: "Waffle Fries".to_string(),
            uom: "case".to_string(),
            total_units: 6,
            cost: dec!(58.75),
            associated_items: Vec::new(),
            par_levels: fry_pars,
            storage_area: Some("Walk-in Freezer".to_string()),
            sort_order: 30,
        },
    ];

    let mut created = 0;
    for item in items {
        truck_items.create(item).await?;
        created += 1;
    }

    Ok(created)
}

/// A week of mix lines covering every mapped catalog product, so the
/// upload response comes back with a full set of UTP suggestions.
async fn create_salesmix_upload(salesmix: &SalesMixService) -> anyhow::Result<()> {
    let rows = vec![
        ("Chicken Sandwich", 2710, dec!(12739.00)),
        ("Spicy Chicken Sandwich", 1480, dec!(7252.00)),
        ("Nuggets 8-count", 860, dec!(4214.00)),
        ("Strips 3-count", 445, dec!(2306.00)),
        ("Grilled Sandwich", 890, dec!(5073.00)),
        ("Grilled Nuggets 8-count", 240, dec!(1612.80)),
        ("Mac & Cheese Medium", 795, dec!(3132.30)),
        ("Chicken Salad Sandwich", 228, dec!(1504.80)),
        ("Lemonade Gallon", 310, dec!(2480.00)),
    ];

    salesmix
        .upload(SalesMixUpload {
            period_sales: dec!(72500),
            rows: rows
                .into_iter()
                .map(|(item_name, quantity_sold, net_sales)| SalesMixRowInput {
                    item_name: item_name.to_string(),
                    quantity_sold,
                    net_sales,
                })
                .collect(),
        })
        .await?;
    Ok(())
}
