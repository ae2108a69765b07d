use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, instrument};
use utoipa::ToSchema;

use crate::auth::AuthService;
use crate::db::DbPool;
use crate::entities::adjustment_message::{self, Entity as AdjustmentMessage};
use crate::entities::closure_plan::{self, Entity as ClosurePlan};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::metrics::BOARD_METRICS;
use crate::services::closures::start_of_day_utc;

/// What one sweep removed.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct SweepReport {
    pub messages_purged: u64,
    pub closures_purged: u64,
    pub tokens_purged: u64,
}

impl SweepReport {
    pub fn total(&self) -> u64 {
        self.messages_purged + self.closures_purged + self.tokens_purged
    }
}

/// Periodic cleanup of rows the read paths already ignore: expired
/// adjustment messages, closure plans whose window has passed, and dead
/// refresh tokens.
#[derive(Clone)]
pub struct MaintenanceService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
    auth: Arc<AuthService>,
}

impl MaintenanceService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender, auth: Arc<AuthService>) -> Self {
        Self {
            db_pool,
            event_sender,
            auth,
        }
    }

    #[instrument(skip(self))]
    pub async fn sweep(&self) -> Result<SweepReport, ServiceError> {
        let db = &*self.db_pool;
        let now = Utc::now();
        let today = now.date_naive();

        let messages_purged = AdjustmentMessage::delete_many()
            .filter(adjustment_message::Column::ExpiresAt.lte(now))
            .exec(db)
            .await?
            .rows_affected;

        let closures_purged = ClosurePlan::delete_many()
            .filter(closure_plan::Column::ExpiresAt.lt(start_of_day_utc(today)))
            .exec(db)
            .await?
            .rows_affected;

        let tokens_purged = self.auth.purge_expired_refresh_tokens().await?;

        let report = SweepReport {
            messages_purged,
            closures_purged,
            tokens_purged,
        };
        BOARD_METRICS.maintenance_purged_total.inc_by(report.total());
        self.event_sender
            .send_or_log(Event::MaintenanceSweep {
                messages_purged,
                closures_purged,
                tokens_purged,
            })
            .await;
        info!(
            messages = messages_purged,
            closures = closures_purged,
            tokens = tokens_purged,
            "maintenance sweep finished"
        );
        Ok(report)
    }
}

/// Runs [`MaintenanceService::sweep`] on a fixed interval until the task
/// is aborted. The first sweep happens immediately on startup.
pub fn spawn_sweeper(service: MaintenanceService, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(e) = service.sweep().await {
                error!("maintenance sweep failed: {e}");
            }
        }
    })
}
