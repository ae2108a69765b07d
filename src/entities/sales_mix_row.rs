use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Itemized line of a sales-mix report.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sales_mix_rows")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub batch_id: Uuid,
    pub item_name: String,
    pub quantity_sold: i32,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub net_sales: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sales_mix_batch::Entity",
        from = "Column::BatchId",
        to = "super::sales_mix_batch::Column::Id"
    )]
    Batch,
}

impl Related<super::sales_mix_batch::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Batch.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
