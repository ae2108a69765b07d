use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

use crate::allocation::{DayOfWeek, WEEK};
use crate::db::DbPool;
use crate::entities::sales_projection::{self, Entity as SalesProjection};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// One day of the weekly baseline as the boards read it.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DailySales {
    pub day: DayOfWeek,
    pub amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Upsert payload for one weekday of the baseline.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DayAmountInput {
    pub day: String,
    pub amount: Decimal,
}

/// Weekly sales baseline: one projected dollar amount per weekday,
/// the fallback when no date-specific projection exists.
#[derive(Clone)]
pub struct SalesProjectionService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl SalesProjectionService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// The full week, Monday first. Days never written report zero so
    /// clients always render seven rows.
    #[instrument(skip(self))]
    pub async fn weekly(&self) -> Result<Vec<DailySales>, ServiceError> {
        let db = &*self.db_pool;
        let stored = SalesProjection::find().all(db).await?;

        let mut by_day: HashMap<DayOfWeek, sales_projection::Model> = HashMap::new();
        for row in stored {
            match DayOfWeek::parse(&row.day) {
                Some(day) => {
                    by_day.insert(day, row);
                }
                None => warn!(day = %row.day, "skipping baseline row with unknown day"),
            }
        }

        Ok(WEEK
            .iter()
            .map(|&day| match by_day.remove(&day) {
                Some(row) => DailySales {
                    day,
                    amount: row.amount,
                    updated_at: Some(row.updated_at),
                },
                None => DailySales {
                    day,
                    amount: Decimal::ZERO,
                    updated_at: None,
                },
            })
            .collect())
    }

    /// Upserts the listed days in one transaction and returns the
    /// resulting week.
    #[instrument(skip(self, entries))]
    pub async fn set_weekly(
        &self,
        entries: Vec<DayAmountInput>,
    ) -> Result<Vec<DailySales>, ServiceError> {
        let mut parsed = Vec::with_capacity(entries.len());
        for entry in &entries {
            let day = DayOfWeek::parse(&entry.day).ok_or_else(|| {
                ServiceError::ValidationError(format!("unknown day of week: '{}'", entry.day))
            })?;
            if entry.amount < Decimal::ZERO {
                return Err(ServiceError::ValidationError(format!(
                    "projected sales for {day} must not be negative"
                )));
            }
            parsed.push((day, entry.amount));
        }

        let db = &*self.db_pool;
        let txn = db.begin().await?;
        for &(day, amount) in &parsed {
            let existing = SalesProjection::find()
                .filter(sales_projection::Column::Day.eq(day.to_string()))
                .one(&txn)
                .await?;
            match existing {
                Some(model) => {
                    let mut active: sales_projection::ActiveModel = model.into();
                    active.amount = Set(amount);
                    active.updated_at = Set(Utc::now());
                    active.update(&txn).await?;
                }
                None => {
                    sales_projection::ActiveModel {
                        day: Set(day.to_string()),
                        amount: Set(amount),
                        updated_at: Set(Utc::now()),
                        ..Default::default()
                    }
                    .insert(&txn)
                    .await?;
                }
            }
        }
        txn.commit().await?;

        for &(day, amount) in &parsed {
            self.event_sender
                .send_or_log(Event::ProjectionUpdated { day, amount })
                .await;
        }
        info!(days = parsed.len(), "weekly sales baseline updated");

        self.weekly().await
    }
}
