use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::allocation::{catalog, product_key};
use crate::db::DbPool;
use crate::entities::sales_mix_batch::{self, Entity as SalesMixBatch};
use crate::entities::sales_mix_row::{self, Entity as SalesMixRow};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// One line of an uploaded sales-mix report.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct SalesMixRowInput {
    pub item_name: String,
    pub quantity_sold: i32,
    pub net_sales: Decimal,
}

/// An uploaded sales-mix report covering one sales period.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct SalesMixUpload {
    /// Total sales for the period the report covers.
    pub period_sales: Decimal,
    pub rows: Vec<SalesMixRowInput>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct SalesMixRowView {
    pub item_name: String,
    pub quantity_sold: i32,
    pub net_sales: Decimal,
}

/// A UTP derived from the mix: servings sold per $1000 of period sales.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct UptSuggestion {
    pub product_name: String,
    pub mix_item: String,
    pub quantity_sold: i64,
    pub suggested_utp: Decimal,
}

/// The current batch plus its derived suggestions. Empty (not 404) when
/// nothing has been uploaded yet.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct SalesMixReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<Uuid>,
    pub period_sales: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<DateTime<Utc>>,
    pub rows: Vec<SalesMixRowView>,
    pub suggestions: Vec<UptSuggestion>,
}

impl SalesMixReport {
    fn empty() -> Self {
        Self {
            batch_id: None,
            period_sales: Decimal::ZERO,
            uploaded_at: None,
            rows: Vec::new(),
            suggestions: Vec::new(),
        }
    }
}

/// Sales-mix uploads and the UTP suggestions derived from them.
#[derive(Clone)]
pub struct SalesMixService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl SalesMixService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Replaces the current batch wholesale and returns the stored report.
    #[instrument(skip(self, upload), fields(rows = upload.rows.len()))]
    pub async fn upload(&self, upload: SalesMixUpload) -> Result<SalesMixReport, ServiceError> {
        if upload.period_sales <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "period_sales must be positive".to_string(),
            ));
        }
        if upload.rows.is_empty() {
            return Err(ServiceError::ValidationError(
                "a sales mix upload needs at least one row".to_string(),
            ));
        }
        for row in &upload.rows {
            if row.item_name.trim().is_empty() {
                return Err(ServiceError::ValidationError(
                    "sales mix rows need an item name".to_string(),
                ));
            }
            if row.quantity_sold < 0 {
                return Err(ServiceError::ValidationError(format!(
                    "quantity sold for '{}' must not be negative",
                    row.item_name.trim()
                )));
            }
        }

        let batch_id = Uuid::new_v4();
        let row_count = upload.rows.len();
        let db = &*self.db_pool;
        let txn = db.begin().await?;
        SalesMixRow::delete_many().exec(&txn).await?;
        SalesMixBatch::delete_many().exec(&txn).await?;
        sales_mix_batch::ActiveModel {
            id: Set(batch_id),
            period_sales: Set(upload.period_sales),
            uploaded_at: Set(Utc::now()),
        }
        .insert(&txn)
        .await?;
        let models = upload.rows.iter().map(|row| sales_mix_row::ActiveModel {
            batch_id: Set(batch_id),
            item_name: Set(row.item_name.trim().to_string()),
            quantity_sold: Set(row.quantity_sold),
            net_sales: Set(row.net_sales),
            ..Default::default()
        });
        SalesMixRow::insert_many(models).exec(&txn).await?;
        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::SalesMixUploaded {
                batch_id,
                rows: row_count,
                period_sales: upload.period_sales,
            })
            .await;
        info!(%batch_id, rows = row_count, "sales mix uploaded");
        self.current().await
    }

    /// The latest batch with its suggestions, or an empty report.
    #[instrument(skip(self))]
    pub async fn current(&self) -> Result<SalesMixReport, ServiceError> {
        let db = &*self.db_pool;
        let Some(batch) = SalesMixBatch::find()
            .order_by_desc(sales_mix_batch::Column::UploadedAt)
            .one(db)
            .await?
        else {
            return Ok(SalesMixReport::empty());
        };

        let rows = SalesMixRow::find()
            .filter(sales_mix_row::Column::BatchId.eq(batch.id))
            .order_by_asc(sales_mix_row::Column::Id)
            .all(db)
            .await?;

        let suggestions = suggest(batch.period_sales, &rows);
        Ok(SalesMixReport {
            batch_id: Some(batch.id),
            period_sales: batch.period_sales,
            uploaded_at: Some(batch.uploaded_at),
            rows: rows
                .into_iter()
                .map(|row| SalesMixRowView {
                    item_name: row.item_name,
                    quantity_sold: row.quantity_sold,
                    net_sales: row.net_sales,
                })
                .collect(),
            suggestions,
        })
    }
}

/// Derives a suggested UTP for every catalog product whose mix item appears
/// in the report: servings sold (quantity times servings per sale) per $1000
/// of period sales.
fn suggest(period_sales: Decimal, rows: &[sales_mix_row::Model]) -> Vec<UptSuggestion> {
    if period_sales <= Decimal::ZERO {
        return Vec::new();
    }

    let mut sold_by_item: HashMap<String, i64> = HashMap::new();
    for row in rows {
        *sold_by_item.entry(product_key(&row.item_name)).or_insert(0) +=
            i64::from(row.quantity_sold);
    }

    catalog::CATALOG
        .iter()
        .filter_map(|spec| {
            let mix = spec.mix.as_ref()?;
            let quantity_sold = *sold_by_item.get(&product_key(mix.item))?;
            let servings = Decimal::from(quantity_sold) * mix.servings_each;
            let suggested_utp = (servings * dec!(1000) / period_sales).round_dp(4);
            Some(UptSuggestion {
                product_name: spec.name.to_string(),
                mix_item: mix.item.to_string(),
                quantity_sold,
                suggested_utp,
            })
        })
        .collect()
}
