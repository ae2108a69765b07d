use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::allocation::catalog;
use crate::allocation::DayOfWeek;
use crate::db::DbPool;
use crate::entities::buffer::{self, Entity as Buffer};
use crate::entities::daily_buffer::{self, Entity as DailyBuffer};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

const MIN_BUFFER: Decimal = dec!(-100);
const MAX_BUFFER: Decimal = dec!(1000);

/// Upsert payload for a product's standing buffer.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct BufferInput {
    pub product_name: String,
    pub buffer_prcnt: Decimal,
}

/// Upsert payload for a single-day buffer override.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DailyBufferInput {
    pub day: String,
    pub product_name: String,
    pub buffer_prcnt: Decimal,
}

/// Buffer percentages: a standing pad per product, overridable for one
/// weekday at a time. The engine resolves daily-first.
#[derive(Clone)]
pub struct BufferService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl BufferService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self))]
    pub async fn list_global(&self) -> Result<Vec<buffer::Model>, ServiceError> {
        let db = &*self.db_pool;
        Ok(Buffer::find()
            .order_by_asc(buffer::Column::ProductName)
            .all(db)
            .await?)
    }

    #[instrument(skip(self, input))]
    pub async fn set_global(&self, input: BufferInput) -> Result<buffer::Model, ServiceError> {
        let canonical = known_product(&input.product_name)?;
        check_range(input.buffer_prcnt)?;

        let db = &*self.db_pool;
        let existing = Buffer::find()
            .filter(buffer::Column::ProductName.eq(canonical))
            .one(db)
            .await?;
        let model = match existing {
            Some(model) => {
                let mut active: buffer::ActiveModel = model.into();
                active.buffer_prcnt = Set(input.buffer_prcnt);
                active.updated_at = Set(Utc::now());
                active.update(db).await?
            }
            None => {
                buffer::ActiveModel {
                    product_name: Set(canonical.to_string()),
                    buffer_prcnt: Set(input.buffer_prcnt),
                    updated_at: Set(Utc::now()),
                    ..Default::default()
                }
                .insert(db)
                .await?
            }
        };

        self.event_sender
            .send_or_log(Event::BufferChanged {
                product: model.product_name.clone(),
                buffer_prcnt: model.buffer_prcnt,
            })
            .await;
        info!(product = %model.product_name, pct = %model.buffer_prcnt, "buffer stored");
        Ok(model)
    }

    /// Daily overrides, optionally narrowed to one weekday.
    #[instrument(skip(self))]
    pub async fn list_daily(
        &self,
        day: Option<DayOfWeek>,
    ) -> Result<Vec<daily_buffer::Model>, ServiceError> {
        let db = &*self.db_pool;
        let mut query = DailyBuffer::find();
        if let Some(day) = day {
            query = query.filter(daily_buffer::Column::Day.eq(day.to_string()));
        }
        Ok(query
            .order_by_asc(daily_buffer::Column::Day)
            .order_by_asc(daily_buffer::Column::ProductName)
            .all(db)
            .await?)
    }

    #[instrument(skip(self, input))]
    pub async fn set_daily(
        &self,
        input: DailyBufferInput,
    ) -> Result<daily_buffer::Model, ServiceError> {
        let day = DayOfWeek::parse(&input.day).ok_or_else(|| {
            ServiceError::ValidationError(format!("unknown day of week: '{}'", input.day))
        })?;
        let canonical = known_product(&input.product_name)?;
        check_range(input.buffer_prcnt)?;

        let db = &*self.db_pool;
        let existing = DailyBuffer::find()
            .filter(daily_buffer::Column::Day.eq(day.to_string()))
            .filter(daily_buffer::Column::ProductName.eq(canonical))
            .one(db)
            .await?;
        let model = match existing {
            Some(model) => {
                let mut active: daily_buffer::ActiveModel = model.into();
                active.buffer_prcnt = Set(input.buffer_prcnt);
                active.updated_at = Set(Utc::now());
                active.update(db).await?
            }
            None => {
                daily_buffer::ActiveModel {
                    day: Set(day.to_string()),
                    product_name: Set(canonical.to_string()),
                    buffer_prcnt: Set(input.buffer_prcnt),
                    updated_at: Set(Utc::now()),
                    ..Default::default()
                }
                .insert(db)
                .await?
            }
        };

        self.event_sender
            .send_or_log(Event::DailyBufferChanged {
                day,
                product: model.product_name.clone(),
                buffer_prcnt: model.buffer_prcnt,
            })
            .await;
        info!(
            day = %day,
            product = %model.product_name,
            pct = %model.buffer_prcnt,
            "daily buffer stored"
        );
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn delete_daily(&self, id: i64) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let result = DailyBuffer::delete_by_id(id).exec(db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "daily buffer {id} not found"
            )));
        }
        Ok(())
    }
}

fn known_product(name: &str) -> Result<&'static str, ServiceError> {
    match catalog::find(name) {
        Some(spec) => Ok(spec.name),
        None => Err(ServiceError::InvalidInput(format!(
            "unknown product '{}'; known products: {}",
            name.trim(),
            catalog::product_names().join(", ")
        ))),
    }
}

fn check_range(pct: Decimal) -> Result<(), ServiceError> {
    if !(MIN_BUFFER..=MAX_BUFFER).contains(&pct) {
        return Err(ServiceError::ValidationError(format!(
            "buffer percentage {pct} is outside {MIN_BUFFER}..={MAX_BUFFER}"
        )));
    }
    Ok(())
}
