use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::db::DbPool;
use crate::entities::future_projection::{self, Entity as FutureProjection};
use crate::entities::projection_config::{self, Entity as ProjectionConfig};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// The projection-config table holds a single row at this id.
const CONFIG_ROW_ID: i32 = 1;

/// Upsert payload for a date-specific sales override.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct FutureProjectionInput {
    pub date: NaiveDate,
    pub amount: Decimal,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ProjectionConfigView {
    pub plan_next_week: bool,
}

/// Date-specific projection overrides plus the plan-ahead toggle the
/// boards read their target week from.
#[derive(Clone)]
pub struct ProjectionService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl ProjectionService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Overrides dated today or later, soonest first. Rows for past
    /// dates stay out of the list even before the purge removes them.
    #[instrument(skip(self))]
    pub async fn list_upcoming(&self) -> Result<Vec<future_projection::Model>, ServiceError> {
        let db = &*self.db_pool;
        let today = Utc::now().date_naive();
        Ok(FutureProjection::find()
            .filter(future_projection::Column::Date.gte(today))
            .order_by_asc(future_projection::Column::Date)
            .all(db)
            .await?)
    }

    /// Upserts the override for one date.
    #[instrument(skip(self, input))]
    pub async fn upsert(
        &self,
        input: FutureProjectionInput,
    ) -> Result<future_projection::Model, ServiceError> {
        let today = Utc::now().date_naive();
        if input.date < today {
            return Err(ServiceError::ValidationError(format!(
                "cannot project for {}: date is in the past",
                input.date
            )));
        }
        if input.amount < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "projected sales must not be negative".to_string(),
            ));
        }

        let db = &*self.db_pool;
        let existing = FutureProjection::find()
            .filter(future_projection::Column::Date.eq(input.date))
            .one(db)
            .await?;

        let model = match existing {
            Some(model) => {
                let mut active: future_projection::ActiveModel = model.into();
                active.amount = Set(input.amount);
                active.updated_at = Set(Utc::now());
                active.update(db).await?
            }
            None => {
                future_projection::ActiveModel {
                    date: Set(input.date),
                    amount: Set(input.amount),
                    created_at: Set(Utc::now()),
                    updated_at: Set(Utc::now()),
                    ..Default::default()
                }
                .insert(db)
                .await?
            }
        };

        self.event_sender
            .send_or_log(Event::FutureProjectionUpserted {
                date: model.date,
                amount: model.amount,
            })
            .await;
        info!(date = %model.date, amount = %model.amount, "future projection stored");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let model = FutureProjection::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("future projection {id} not found")))?;

        let date = model.date;
        FutureProjection::delete_by_id(id).exec(db).await?;

        self.event_sender
            .send_or_log(Event::FutureProjectionDeleted { date })
            .await;
        Ok(())
    }

    /// The plan-ahead toggle; the row is created on first read.
    #[instrument(skip(self))]
    pub async fn config(&self) -> Result<ProjectionConfigView, ServiceError> {
        let db = &*self.db_pool;
        let row = ProjectionConfig::find_by_id(CONFIG_ROW_ID).one(db).await?;
        let plan_next_week = match row {
            Some(row) => row.plan_next_week,
            None => {
                projection_config::ActiveModel {
                    id: Set(CONFIG_ROW_ID),
                    plan_next_week: Set(false),
                    updated_at: Set(Utc::now()),
                }
                .insert(db)
                .await?;
                false
            }
        };
        Ok(ProjectionConfigView { plan_next_week })
    }

    #[instrument(skip(self))]
    pub async fn set_config(
        &self,
        plan_next_week: bool,
    ) -> Result<ProjectionConfigView, ServiceError> {
        let db = &*self.db_pool;
        match ProjectionConfig::find_by_id(CONFIG_ROW_ID).one(db).await? {
            Some(row) => {
                let mut active: projection_config::ActiveModel = row.into();
                active.plan_next_week = Set(plan_next_week);
                active.updated_at = Set(Utc::now());
                active.update(db).await?;
            }
            None => {
                projection_config::ActiveModel {
                    id: Set(CONFIG_ROW_ID),
                    plan_next_week: Set(plan_next_week),
                    updated_at: Set(Utc::now()),
                }
                .insert(db)
                .await?;
            }
        }

        self.event_sender
            .send_or_log(Event::ProjectionConfigChanged { plan_next_week })
            .await;
        info!(plan_next_week, "projection config updated");
        Ok(ProjectionConfigView { plan_next_week })
    }
}
