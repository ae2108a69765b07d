use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::allocation::catalog;
use crate::db::DbPool;
use crate::entities::product_upt::{self, Entity as ProductUpt};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Upsert payload for one product's UTP factor.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct UptInput {
    pub product_name: String,
    pub utp: Decimal,
}

/// UTP factors: servings sold per $1000 of sales, one per catalog
/// product. Names are stored catalog-cased so lookups stay exact.
#[derive(Clone)]
pub struct UptService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl UptService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<product_upt::Model>, ServiceError> {
        let db = &*self.db_pool;
        Ok(ProductUpt::find()
            .order_by_asc(product_upt::Column::ProductName)
            .all(db)
            .await?)
    }

    /// Upserts one factor. The product must be in the catalog; the
    /// stored name is the catalog spelling regardless of input case.
    #[instrument(skip(self, input))]
    pub async fn set(&self, input: UptInput) -> Result<product_upt::Model, ServiceError> {
        let canonical = validate(&input)?;
        let db = &*self.db_pool;
        let model = upsert_one(db, canonical, input.utp).await?;

        self.event_sender
            .send_or_log(Event::UptChanged {
                product: model.product_name.clone(),
                utp: model.utp,
            })
            .await;
        info!(product = %model.product_name, utp = %model.utp, "UTP factor stored");
        Ok(model)
    }

    /// Applies a whole batch transactionally; the first invalid row
    /// rejects everything.
    #[instrument(skip(self, inputs))]
    pub async fn set_bulk(
        &self,
        inputs: Vec<UptInput>,
    ) -> Result<Vec<product_upt::Model>, ServiceError> {
        let mut validated = Vec::with_capacity(inputs.len());
        for input in &inputs {
            validated.push((validate(input)?, input.utp));
        }

        let db = &*self.db_pool;
        let txn = db.begin().await?;
        let mut models = Vec::with_capacity(validated.len());
        for &(canonical, utp) in &validated {
            models.push(upsert_one(&txn, canonical, utp).await?);
        }
        txn.commit().await?;

        for model in &models {
            self.event_sender
                .send_or_log(Event::UptChanged {
                    product: model.product_name.clone(),
                    utp: model.utp,
                })
                .await;
        }
        info!(count = models.len(), "UTP factors stored in bulk");
        Ok(models)
    }
}

/// Checks one input against the catalog, returning the canonical name.
fn validate(input: &UptInput) -> Result<&'static str, ServiceError> {
    if input.utp < Decimal::ZERO {
        return Err(ServiceError::ValidationError(format!(
            "UTP for '{}' must not be negative",
            input.product_name
        )));
    }
    match catalog::find(&input.product_name) {
        Some(spec) => Ok(spec.name),
        None => Err(ServiceError::InvalidInput(format!(
            "unknown product '{}'; known products: {}",
            input.product_name.trim(),
            catalog::product_names().join(", ")
        ))),
    }
}

async fn upsert_one<C: ConnectionTrait>(
    conn: &C,
    canonical: &str,
    utp: Decimal,
) -> Result<product_upt::Model, ServiceError> {
    let existing = ProductUpt::find()
        .filter(product_upt::Column::ProductName.eq(canonical))
        .one(conn)
        .await?;
    let model = match existing {
        Some(model) => {
            let mut active: product_upt::ActiveModel = model.into();
            active.utp = Set(utp);
            active.updated_at = Set(Utc::now());
            active.update(conn).await?
        }
        None => {
            product_upt::ActiveModel {
                product_name: Set(canonical.to_string()),
                utp: Set(utp),
                updated_at: Set(Utc::now()),
                ..Default::default()
            }
            .insert(conn)
            .await?
        }
    };
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use sea_orm_migration::MigratorTrait;
    use tokio::sync::mpsc;

    async fn service() -> (UptService, mpsc::Receiver<Event>) {
        let db = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
        crate::migrator::Migrator::up(&db, None).await.unwrap();
        let (tx, rx) = mpsc::channel(32);
        (UptService::new(Arc::new(db), EventSender::new(tx)), rx)
    }

    fn input(name: &str, utp: Decimal) -> UptInput {
        UptInput {
            product_name: name.to_string(),
            utp,
        }
    }

    #[tokio::test]
    async fn set_canonicalizes_the_name_and_upserts() {
        let (svc, mut rx) = service().await;
        let model = svc.set(input("breaded filet", dec!(15.5))).await.unwrap();
        assert_eq!(model.product_name, "Breaded Filet");
        assert_eq!(model.utp, dec!(15.5));

        // Different casing hits the same row.
        let again = svc.set(input("BREADED FILET", dec!(17))).await.unwrap();
        assert_eq!(again.id, model.id);
        assert_eq!(svc.list().await.unwrap().len(), 1);

        assert!(matches!(rx.try_recv().unwrap(), Event::UptChanged { .. }));
    }

    #[tokio::test]
    async fn unknown_products_list_the_catalog() {
        let (svc, _rx) = service().await;
        let err = svc.set(input("Waffle Fries", dec!(30))).await.unwrap_err();
        match err {
            ServiceError::InvalidInput(msg) => {
                assert!(msg.contains("Waffle Fries"));
                assert!(msg.contains("Nugget"));
            }
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn negative_utp_is_rejected() {
        let (svc, _rx) = service().await;
        let err = svc.set(input("Nugget", dec!(-0.01))).await.unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(_)));
    }

    #[tokio::test]
    async fn bulk_rejects_everything_on_the_first_bad_row() {
        let (svc, _rx) = service().await;
        let err = svc
            .set_bulk(vec![
                input("Nugget", dec!(170)),
                input("Not A Product", dec!(1)),
                input("Strip", dec!(45)),
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
        assert!(svc.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn bulk_applies_all_rows_and_emits_per_product() {
        let (svc, mut rx) = service().await;
        let models = svc
            .set_bulk(vec![
                input("Nugget", dec!(170)),
                input("strip", dec!(45.25)),
            ])
            .await
            .unwrap();
        assert_eq!(models.len(), 2);

        let listed = svc.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        // Ordered by name.
        assert_eq!(listed[0].product_name, "Nugget");
        assert_eq!(listed[1].product_name, "Strip");

        let mut count = 0;
        while let Ok(event) = rx.try_recv() {
            assert!(matches!(event, Event::UptChanged { .. }));
            count += 1;
        }
        assert_eq!(count, 2);
    }
}
