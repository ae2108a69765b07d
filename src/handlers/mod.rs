pub mod allocations;
pub mod buffers;
pub mod closures;
pub mod instructions;
pub mod messages;
pub mod projections;
pub mod sales;
pub mod salesmix;
pub mod truck_items;
pub mod upts;

use std::sync::Arc;

use crate::auth::AuthService;
use crate::db::DbPool;
use crate::events::EventSender;
use crate::services;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub sales: Arc<services::sales::SalesProjectionService>,
    pub projections: Arc<services::projections::ProjectionService>,
    pub upts: Arc<services::upts::UptService>,
    pub buffers: Arc<services::buffers::BufferService>,
    pub messages: Arc<services::messages::AdjustmentMessageService>,
    pub closures: Arc<services::closures::ClosurePlanService>,
    pub instructions: Arc<services::instructions::InstructionService>,
    pub truck_items: Arc<services::truck_items::TruckItemService>,
    pub salesmix: Arc<services::salesmix::SalesMixService>,
    pub allocations: Arc<services::allocations::AllocationService>,
    pub maintenance: Arc<services::maintenance::MaintenanceService>,
}

impl AppServices {
    /// Build the full service container over one shared pool and event
    /// channel.
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: EventSender,
        auth_service: Arc<AuthService>,
    ) -> Self {
        Self {
            sales: Arc::new(services::sales::SalesProjectionService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            projections: Arc::new(services::projections::ProjectionService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            upts: Arc::new(services::upts::UptService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            buffers: Arc::new(services::buffers::BufferService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            messages: Arc::new(services::messages::AdjustmentMessageService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            closures: Arc::new(services::closures::ClosurePlanService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            instructions: Arc::new(services::instructions::InstructionService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            truck_items: Arc::new(services::truck_items::TruckItemService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            salesmix: Arc::new(services::salesmix::SalesMixService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            allocations: Arc::new(services::allocations::AllocationService::new(
                db_pool.clone(),
            )),
            maintenance: Arc::new(services::maintenance::MaintenanceService::new(
                db_pool,
                event_sender,
                auth_service,
            )),
        }
    }
}
