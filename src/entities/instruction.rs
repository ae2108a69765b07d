use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Day-level crew note shown on the boards. `products` is a JSON array of
/// catalog product names the note applies to; a "[PREP]" message prefix marks
/// prep-board-only notes.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "instructions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub day: String,
    pub message: String,
    pub products: Json,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
