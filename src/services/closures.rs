use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::allocation::closure::{window_end, DurationUnit};
use crate::db::DbPool;
use crate::entities::closure_plan::{self, Entity as ClosurePlan};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DurationInput {
    pub value: i32,
    /// "days" or "weeks"; singular forms accepted.
    pub unit: String,
}

/// Create payload for a closure window.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ClosurePlanInput {
    pub date: NaiveDate,
    pub reason: String,
    pub duration: DurationInput,
}

/// Scheduled closure windows. `expires_at` is derived from the window
/// end so reads and the purge can filter without date math.
#[derive(Clone)]
pub struct ClosurePlanService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl ClosurePlanService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Plans whose window ends today or later, soonest start first.
    #[instrument(skip(self))]
    pub async fn list_upcoming(&self) -> Result<Vec<closure_plan::Model>, ServiceError> {
        let db = &*self.db_pool;
        let cutoff = start_of_day_utc(Utc::now().date_naive());
        Ok(ClosurePlan::find()
            .filter(closure_plan::Column::ExpiresAt.gte(cutoff))
            .order_by_asc(closure_plan::Column::Date)
            .all(db)
            .await?)
    }

    #[instrument(skip(self, input))]
    pub async fn create(&self, input: ClosurePlanInput) -> Result<closure_plan::Model, ServiceError> {
        if input.duration.value < 1 {
            return Err(ServiceError::ValidationError(
                "closure duration must be at least 1".to_string(),
            ));
        }
        let unit: DurationUnit = input.duration.unit.trim().parse().map_err(|_| {
            ServiceError::ValidationError(format!(
                "unknown duration unit '{}'; use days or weeks",
                input.duration.unit
            ))
        })?;
        let reason = input.reason.trim();
        if reason.is_empty() {
            return Err(ServiceError::ValidationError(
                "closure reason must not be empty".to_string(),
            ));
        }

        let end = window_end(input.date, input.duration.value, unit);
        if end <= Utc::now().date_naive() {
            return Err(ServiceError::ValidationError(format!(
                "closure starting {} is already over",
                input.date
            )));
        }

        let db = &*self.db_pool;
        let model = closure_plan::ActiveModel {
            date: Set(input.date),
            reason: Set(reason.to_string()),
            duration_value: Set(input.duration.value),
            duration_unit: Set(unit.to_string()),
            expires_at: Set(start_of_day_utc(end)),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await?;

        self.event_sender
            .send_or_log(Event::ClosurePlanned {
                id: model.id,
                date: model.date,
            })
            .await;
        info!(id = model.id, date = %model.date, end = %end, "closure planned");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let result = ClosurePlan::delete_by_id(id).exec(db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "closure plan {id} not found"
            )));
        }
        self.event_sender
            .send_or_log(Event::ClosureCanceled { id })
            .await;
        Ok(())
    }
}

/// Midnight UTC at the start of `date`.
pub(crate) fn start_of_day_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}
