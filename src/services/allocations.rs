use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};
use utoipa::ToSchema;

use crate::allocation::{
    build_plan, product_key, AdjustmentNote, AllocationPlan, Board, ClosureWindow, DayOfWeek,
    DurationUnit, InstructionNote, PlanningInputs,
};
use crate::db::DbPool;
use crate::entities::adjustment_message::{self, Entity as AdjustmentMessage};
use crate::entities::buffer::Entity as Buffer;
use crate::entities::closure_plan::{self, Entity as ClosurePlan};
use crate::entities::daily_buffer::Entity as DailyBuffer;
use crate::entities::future_projection::Entity as FutureProjection;
use crate::entities::instruction::Entity as Instruction;
use crate::entities::product_upt::Entity as ProductUpt;
use crate::entities::projection_config::Entity as ProjectionConfig;
use crate::entities::sales_projection::Entity as SalesProjection;
use crate::errors::ServiceError;
use crate::metrics::BOARD_METRICS;
use crate::services::closures::start_of_day_utc;
use crate::services::instructions::parse_prep_tag;

/// Which planning week a board request targets. Absent, the stored
/// config decides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum WeekSelector {
    Current,
    Next,
}

/// One closure as the dashboard lists it.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ClosureOverview {
    pub date: NaiveDate,
    /// First day the store is open again.
    pub reopen_date: NaiveDate,
    pub reason: String,
}

/// Both boards plus the closure list, one snapshot behind all three.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct BoardSummary {
    pub thaw: AllocationPlan,
    pub prep: AllocationPlan,
    pub closures: Vec<ClosureOverview>,
}

/// Runs the allocation engine over a point-in-time snapshot of every
/// table a plan depends on.
#[derive(Clone)]
pub struct AllocationService {
    db_pool: Arc<DbPool>,
}

impl AllocationService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn plan(
        &self,
        board: Board,
        week: Option<WeekSelector>,
    ) -> Result<AllocationPlan, ServiceError> {
        let inputs = self.snapshot(week).await?;
        BOARD_METRICS.allocation_plans_total.inc();
        Ok(build_plan(board, &inputs))
    }

    /// Dashboard view: both boards computed from one snapshot, so their
    /// sales and closures can never disagree.
    #[instrument(skip(self))]
    pub async fn summary(&self, week: Option<WeekSelector>) -> Result<BoardSummary, ServiceError> {
        let inputs = self.snapshot(week).await?;
        BOARD_METRICS.allocation_plans_total.inc();
        let closures = inputs
            .closures
            .iter()
            .map(|window| ClosureOverview {
                date: window.start,
                reopen_date: window.end,
                reason: window.reason.clone(),
            })
            .collect();
        Ok(BoardSummary {
            thaw: build_plan(Board::Thaw, &inputs),
            prep: build_plan(Board::Prep, &inputs),
            closures,
        })
    }

    /// Reads every planning table once. Rows that no longer parse (a day
    /// or duration unit edited out from under us) are skipped with a
    /// warning rather than failing the whole plan.
    async fn snapshot(&self, week: Option<WeekSelector>) -> Result<PlanningInputs, ServiceError> {
        let db = &*self.db_pool;
        let now = Utc::now();
        let today = now.date_naive();

        let plan_next_week = match week {
            Some(WeekSelector::Current) => false,
            Some(WeekSelector::Next) => true,
            None => ProjectionConfig::find()
                .one(db)
                .await?
                .map(|config| config.plan_next_week)
                .unwrap_or(false),
        };

        let mut baseline_sales = HashMap::new();
        for row in SalesProjection::find().all(db).await? {
            match DayOfWeek::parse(&row.day) {
                Some(day) => {
                    baseline_sales.insert(day, row.amount);
                }
                None => warn!(day = %row.day, "skipping baseline sales row with unknown day"),
            }
        }

        let future_sales = FutureProjection::find()
            .all(db)
            .await?
            .into_iter()
            .map(|row| (row.date, row.amount))
            .collect();

        let upts = ProductUpt::find()
            .all(db)
            .await?
            .into_iter()
            .map(|row| (product_key(&row.product_name), row.utp))
            .collect();

        let buffers = Buffer::find()
            .all(db)
            .await?
            .into_iter()
            .map(|row| (product_key(&row.product_name), row.buffer_prcnt))
            .collect();

        let mut daily_buffers = HashMap::new();
        for row in DailyBuffer::find().all(db).await? {
            match DayOfWeek::parse(&row.day) {
                Some(day) => {
                    daily_buffers.insert((day, product_key(&row.product_name)), row.buffer_prcnt);
                }
                None => warn!(day = %row.day, "skipping daily buffer row with unknown day"),
            }
        }

        let mut adjustments = Vec::new();
        for row in AdjustmentMessage::find()
            .filter(adjustment_message::Column::ExpiresAt.gt(now))
            .all(db)
            .await?
        {
            match DayOfWeek::parse(&row.day) {
                Some(day) => adjustments.push(AdjustmentNote {
                    day,
                    product_name: row.product_name,
                    message: row.message,
                }),
                None => warn!(day = %row.day, "skipping adjustment with unknown day"),
            }
        }

        let mut closures = Vec::new();
        for row in ClosurePlan::find()
            .filter(closure_plan::Column::ExpiresAt.gte(start_of_day_utc(today)))
            .all(db)
            .await?
        {
            match DurationUnit::from_str(&row.duration_unit) {
                Ok(unit) => closures.push(ClosureWindow::new(
                    row.date,
                    row.duration_value,
                    unit,
                    row.reason,
                )),
                Err(_) => {
                    warn!(unit = %row.duration_unit, "skipping closure with unknown duration unit")
                }
            }
        }

        let mut instructions = Vec::new();
        for row in Instruction::find().all(db).await? {
            match DayOfWeek::parse(&row.day) {
                Some(day) => {
                    let (prep_only, message) = parse_prep_tag(&row.message);
                    instructions.push(InstructionNote {
                        day,
                        message: message.to_string(),
                        prep_only,
                    });
                }
                None => warn!(day = %row.day, "skipping instruction with unknown day"),
            }
        }

        Ok(PlanningInputs {
            today,
            now,
            plan_next_week,
            baseline_sales,
            future_sales,
            upts,
            buffers,
            daily_buffers,
            adjustments,
            closures,
            instructions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventSender;
    use crate::services::buffers::{BufferInput, BufferService, DailyBufferInput};
    use crate::services::closures::{ClosurePlanInput, ClosurePlanService, DurationInput};
    use crate::services::messages::{AdjustmentMessageInput, AdjustmentMessageService};
    use crate::services::projections::ProjectionService;
    use crate::services::sales::{DayAmountInput, SalesProjectionService};
    use crate::services::upts::{UptInput, UptService};
    use chrono::Duration;
    use rust_decimal_macros::dec;
    use sea_orm_migration::MigratorTrait;
    use tokio::sync::mpsc;

    struct Fixture {
        allocations: AllocationService,
        sales: SalesProjectionService,
        upts: UptService,
        buffers: BufferService,
        messages: AdjustmentMessageService,
        closures: ClosurePlanService,
        projections: ProjectionService,
    }

    async fn fixture() -> Fixture {
        let db = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
        crate::migrator::Migrator::up(&db, None).await.unwrap();
        let db = Arc::new(db);
        let (tx, _rx) = mpsc::channel(64);
        // One sender shared by every service; the receiver is dropped, so
        // send_or_log falls through without blocking.
        let events = EventSender::new(tx);
        Fixture {
            allocations: AllocationService::new(db.clone()),
            sales: SalesProjectionService::new(db.clone(), events.clone()),
            upts: UptService::new(db.clone(), events.clone()),
            buffers: BufferService::new(db.clone(), events.clone()),
            messages: AdjustmentMessageService::new(db.clone(), events.clone()),
            closures: ClosurePlanService::new(db.clone(), events.clone()),
            projections: ProjectionService::new(db, events),
        }
    }

    fn day_amount(day: &str, amount: rust_decimal::Decimal) -> DayAmountInput {
        DayAmountInput {
            day: day.to_string(),
            amount,
        }
    }

    #[tokio::test]
    async fn plan_reflects_sales_upts_and_buffers() {
        let fx = fixture().await;
        fx.sales
            .set_weekly(vec![day_amount("monday", dec!(16000))])
            .await
            .unwrap();
        fx.upts
            .set(UptInput {
                product_name: "Nugget".to_string(),
                utp: dec!(60),
            })
            .await
            .unwrap();
        fx.buffers
            .set_global(BufferInput {
                product_name: "Nugget".to_string(),
                buffer_prcnt: dec!(10),
            })
            .await
            .unwrap();

        let plan = fx
            .allocations
            .plan(Board::Thaw, Some(WeekSelector::Current))
            .await
            .unwrap();
        let monday = plan
            .days
            .iter()
            .find(|d| d.day == DayOfWeek::Monday)
            .unwrap();
        assert_eq!(monday.sales, dec!(16000));

        // 16000/1000*60 = 960 servings, /510 per case = 1.88..., +10% =
        // 2.07..., ceil = 3 cases.
        let nugget = monday.items.iter().find(|i| i.product == "Nugget").unwrap();
        assert_eq!(nugget.quantity, 3);
        assert_eq!(nugget.buffer_pct, dec!(10));

        // Products without a UTP are reported once, not rendered as rows.
        assert!(plan.missing_upt.contains(&"Breaded Filet".to_string()));
        assert!(monday.items.iter().all(|i| i.product != "Breaded Filet"));
    }

    #[tokio::test]
    async fn week_selector_overrides_the_stored_config() {
        let fx = fixture().await;
        let current = fx
            .allocations
            .plan(Board::Thaw, Some(WeekSelector::Current))
            .await
            .unwrap();
        let next = fx
            .allocations
            .plan(Board::Thaw, Some(WeekSelector::Next))
            .await
            .unwrap();
        assert_eq!(next.week_start - current.week_start, Duration::days(7));

        fx.projections.set_config(true).await.unwrap();
        let configured = fx.allocations.plan(Board::Thaw, None).await.unwrap();
        assert_eq!(configured.week_start, next.week_start);
    }

    #[tokio::test]
    async fn closures_from_the_db_blank_out_their_days() {
        let fx = fixture().await;
        let today = Utc::now().date_naive();
        fx.closures
            .create(ClosurePlanInput {
                date: today + Duration::days(28),
                reason: "resurfacing the lot".to_string(),
                duration: DurationInput {
                    value: 2,
                    unit: "days".to_string(),
                },
            })
            .await
            .unwrap();

        let summary = fx.allocations.summary(Some(WeekSelector::Current)).await.unwrap();
        assert_eq!(summary.closures.len(), 1);
        assert_eq!(summary.closures[0].date, today + Duration::days(28));
        assert_eq!(summary.closures[0].reopen_date, today + Duration::days(30));

        // The closed date falls outside the current week, so no day on
        // either board is blanked by it.
        assert!(summary.thaw.days.iter().all(|d| !d.closed));
        assert!(summary.prep.days.iter().all(|d| !d.closed));
    }

    #[tokio::test]
    async fn adjustments_and_daily_buffers_reach_the_engine() {
        let fx = fixture().await;
        fx.sales
            .set_weekly(vec![day_amount("tuesday", dec!(10000))])
            .await
            .unwrap();
        fx.upts
            .set(UptInput {
                product_name: "Strip".to_string(),
                utp: dec!(45),
            })
            .await
            .unwrap();
        fx.buffers
            .set_daily(DailyBufferInput {
                day: "tuesday".to_string(),
                product_name: "Strip".to_string(),
                buffer_prcnt: dec!(50),
            })
            .await
            .unwrap();
        fx.messages
            .create(
                AdjustmentMessageInput {
                    day: "tuesday".to_string(),
                    product_name: "Strip".to_string(),
                    message: "+2 cases for the tailgate order".to_string(),
                    expires_at: Utc::now() + Duration::days(14),
                },
                None,
            )
            .await
            .unwrap();

        let plan = fx
            .allocations
            .plan(Board::Thaw, Some(WeekSelector::Current))
            .await
            .unwrap();
        let tuesday = plan
            .days
            .iter()
            .find(|d| d.day == DayOfWeek::Tuesday)
            .unwrap();
        let strip = tuesday.items.iter().find(|i| i.product == "Strip").unwrap();

        // 10000/1000*45 = 450 servings /225 = 2 cases, +50% = 3 cases
        // nearest, +2 adjustment = 5.
        assert_eq!(strip.buffer_pct, dec!(50));
        assert_eq!(strip.adjustment_delta, 2);
        assert_eq!(strip.quantity, 5);
        assert_eq!(strip.adjustment_notes.len(), 1);
    }

    #[tokio::test]
    async fn summary_boards_share_one_snapshot() {
        let fx = fixture().await;
        fx.sales
            .set_weekly(vec![day_amount("wednesday", dec!(9000))])
            .await
            .unwrap();

        let summary = fx.allocations.summary(Some(WeekSelector::Current)).await.unwrap();
        assert_eq!(summary.thaw.week_start, summary.prep.week_start);
        let thaw_sales: Vec<_> = summary.thaw.days.iter().map(|d| d.sales).collect();
        let prep_sales: Vec<_> = summary.prep.days.iter().map(|d| d.sales).collect();
        assert_eq!(thaw_sales, prep_sales);
    }
}
