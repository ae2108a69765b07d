use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

use crate::allocation::{catalog, DayOfWeek};
use crate::db::DbPool;
use crate::entities::instruction::{self, Entity as Instruction};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Message prefix marking a note as prep-board-only.
pub const PREP_TAG: &str = "[PREP]";

/// Splits the prep tag off a stored message: `("[PREP] batch early")`
/// becomes `(true, "batch early")`.
pub fn parse_prep_tag(message: &str) -> (bool, &str) {
    let trimmed = message.trim();
    match trimmed.get(..PREP_TAG.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(PREP_TAG) => {
            (true, trimmed[PREP_TAG.len()..].trim_start())
        }
        _ => (false, trimmed),
    }
}

/// Create/update payload for a crew instruction.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct InstructionInput {
    pub day: String,
    pub message: String,
    #[serde(default)]
    pub products: Vec<String>,
}

/// An instruction as clients render it, prep tag already split off.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct InstructionView {
    pub id: i64,
    pub day: DayOfWeek,
    pub message: String,
    pub prep_only: bool,
    pub products: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

/// Day-level crew notes shown alongside board quantities.
#[derive(Clone)]
pub struct InstructionService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl InstructionService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, day: Option<DayOfWeek>) -> Result<Vec<InstructionView>, ServiceError> {
        let db = &*self.db_pool;
        let mut query = Instruction::find();
        if let Some(day) = day {
            query = query.filter(instruction::Column::Day.eq(day.to_string()));
        }
        let rows = query
            .order_by_asc(instruction::Column::Id)
            .all(db)
            .await?;
        Ok(rows.into_iter().filter_map(to_view).collect())
    }

    #[instrument(skip(self, input))]
    pub async fn create(&self, input: InstructionInput) -> Result<InstructionView, ServiceError> {
        let (day, message, products) = validate(&input)?;

        let db = &*self.db_pool;
        let model = instruction::ActiveModel {
            day: Set(day.to_string()),
            message: Set(message),
            products: Set(serde_json::json!(products)),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await?;

        self.event_sender
            .send_or_log(Event::InstructionSaved { id: model.id, day })
            .await;
        info!(id = model.id, day = %day, "instruction created");
        to_view(model).ok_or_else(|| {
            ServiceError::InternalError("stored instruction failed to render".to_string())
        })
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: i64,
        input: InstructionInput,
    ) -> Result<InstructionView, ServiceError> {
        let (day, message, products) = validate(&input)?;

        let db = &*self.db_pool;
        let model = Instruction::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("instruction {id} not found")))?;

        let mut active: instruction::ActiveModel = model.into();
        active.day = Set(day.to_string());
        active.message = Set(message);
        active.products = Set(serde_json::json!(products));
        active.updated_at = Set(Utc::now());
        let model = active.update(db).await?;

        self.event_sender
            .send_or_log(Event::InstructionSaved { id: model.id, day })
            .await;
        info!(id = model.id, day = %day, "instruction updated");
        to_view(model).ok_or_else(|| {
            ServiceError::InternalError("stored instruction failed to render".to_string())
        })
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let result = Instruction::delete_by_id(id).exec(db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "instruction {id} not found"
            )));
        }
        self.event_sender
            .send_or_log(Event::InstructionDeleted { id })
            .await;
        Ok(())
    }
}

fn validate(input: &InstructionInput) -> Result<(DayOfWeek, String, Vec<String>), ServiceError> {
    let day = DayOfWeek::parse(&input.day).ok_or_else(|| {
        ServiceError::ValidationError(format!("unknown day of week: '{}'", input.day))
    })?;
    let message = input.message.trim();
    if message.is_empty() {
        return Err(ServiceError::ValidationError(
            "instruction message must not be empty".to_string(),
        ));
    }
    let mut products = Vec::with_capacity(input.products.len());
    for name in &input.products {
        match catalog::find(name) {
            Some(spec) => products.push(spec.name.to_string()),
            None => {
                return Err(ServiceError::InvalidInput(format!(
                    "unknown product '{}'; known products: {}",
                    name.trim(),
                    catalog::product_names().join(", ")
                )))
            }
        }
    }
    Ok((day, message.to_string(), products))
}

fn to_view(model: instruction::Model) -> Option<InstructionView> {
    let Some(day) = DayOfWeek::parse(&model.day) else {
        warn!(id = model.id, day = %model.day, "skipping instruction with unknown day");
        return None;
    };
    let (prep_only, message) = parse_prep_tag(&model.message);
    let products = serde_json::from_value(model.products).unwrap_or_default();
    Some(InstructionView {
        id: model.id,
        day,
        message: message.to_string(),
        prep_only,
        products,
        updated_at: model.updated_at,
    })
}
