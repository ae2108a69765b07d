use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::allocation::{adjustment, catalog, DayOfWeek};
use crate::db::DbPool;
use crate::entities::adjustment_message::{self, Entity as AdjustmentMessage};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Create payload for a manual adjustment.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AdjustmentMessageInput {
    pub day: String,
    pub product_name: String,
    pub message: String,
    pub expires_at: DateTime<Utc>,
}

/// One active message with its clauses already parsed, the shape the
/// adjustment-data view serves.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AdjustmentData {
    pub id: i64,
    pub day: DayOfWeek,
    pub product_name: String,
    /// Net signed delta per container unit named in the message.
    pub deltas: BTreeMap<String, i64>,
    pub raw: String,
    pub expires_at: DateTime<Utc>,
}

/// Manual adjustments: free-text signed container deltas pinned to a
/// day and product, ignored once expired.
#[derive(Clone)]
pub struct AdjustmentMessageService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl AdjustmentMessageService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Messages that have not expired, oldest first.
    #[instrument(skip(self))]
    pub async fn list_active(&self) -> Result<Vec<adjustment_message::Model>, ServiceError> {
        let db = &*self.db_pool;
        Ok(AdjustmentMessage::find()
            .filter(adjustment_message::Column::ExpiresAt.gt(Utc::now()))
            .order_by_asc(adjustment_message::Column::Id)
            .all(db)
            .await?)
    }

    /// Stores a message after checking it actually adjusts something.
    #[instrument(skip(self, input))]
    pub async fn create(
        &self,
        input: AdjustmentMessageInput,
        created_by: Option<String>,
    ) -> Result<adjustment_message::Model, ServiceError> {
        let day = DayOfWeek::parse(&input.day).ok_or_else(|| {
            ServiceError::ValidationError(format!("unknown day of week: '{}'", input.day))
        })?;
        let canonical = match catalog::find(&input.product_name) {
            Some(spec) => spec.name,
            None => {
                return Err(ServiceError::InvalidInput(format!(
                    "unknown product '{}'; known products: {}",
                    input.product_name.trim(),
                    catalog::product_names().join(", ")
                )))
            }
        };
        if adjustment::parse(&input.message).is_empty() {
            return Err(ServiceError::ValidationError(format!(
                "message '{}' contains no adjustment clause like '+2 cases' or '-1 bag'",
                input.message
            )));
        }
        if input.expires_at <= Utc::now() {
            return Err(ServiceError::ValidationError(
                "expires_at must be in the future".to_string(),
            ));
        }

        let db = &*self.db_pool;
        let model = adjustment_message::ActiveModel {
            day: Set(day.to_string()),
            product_name: Set(canonical.to_string()),
            message: Set(input.message.trim().to_string()),
            expires_at: Set(input.expires_at),
            created_by: Set(created_by),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await?;

        self.event_sender
            .send_or_log(Event::AdjustmentPosted {
                id: model.id,
                day,
                product: model.product_name.clone(),
            })
            .await;
        info!(id = model.id, day = %day, product = %model.product_name, "adjustment posted");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let result = AdjustmentMessage::delete_by_id(id).exec(db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "adjustment message {id} not found"
            )));
        }
        self.event_sender
            .send_or_log(Event::AdjustmentDeleted { id })
            .await;
        Ok(())
    }

    /// The computed view: every active message with its per-unit net
    /// deltas, ready for the boards to apply or display.
    #[instrument(skip(self))]
    pub async fn adjustment_data(&self) -> Result<Vec<AdjustmentData>, ServiceError> {
        let active = self.list_active().await?;
        Ok(active
            .into_iter()
            .filter_map(|model| {
                let day = DayOfWeek::parse(&model.day)?;
                let parsed = adjustment::parse(&model.message);
                Some(AdjustmentData {
                    id: model.id,
                    day,
                    product_name: model.product_name,
                    deltas: parsed.unit_totals(),
                    raw: model.message,
                    expires_at: model.expires_at,
                })
            })
            .collect())
    }
}
