use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::allocation::DayOfWeek;
use crate::db::DbPool;
use crate::entities::truck_item::{self, Entity as TruckItem};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// A secondary item ordered alongside a primary one (lids with cups,
/// filters with tea bags).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AssociatedItem {
    pub description: String,
    pub units_per: i32,
}

/// Create/update payload for a truck order item.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct TruckItemInput {
    pub description: String,
    pub uom: String,
    #[serde(default)]
    pub total_units: i32,
    pub cost: Decimal,
    #[serde(default)]
    pub associated_items: Vec<AssociatedItem>,
    /// Day name → par level for that delivery day.
    #[serde(default)]
    pub par_levels: BTreeMap<String, Decimal>,
    #[serde(default)]
    pub storage_area: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
}

/// A truck item as clients render it, JSON columns decoded.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct TruckItemView {
    pub id: i64,
    pub description: String,
    pub uom: String,
    pub total_units: i32,
    pub cost: Decimal,
    pub associated_items: Vec<AssociatedItem>,
    pub par_levels: BTreeMap<String, Decimal>,
    pub storage_area: Option<String>,
    pub sort_order: i32,
    pub updated_at: DateTime<Utc>,
}

/// Derived demand for an associated item on an order sheet.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AssociatedDemand {
    pub description: String,
    pub units_needed: i64,
}

/// One primary item on an order sheet.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderLine {
    pub item_id: i64,
    pub description: String,
    pub uom: String,
    pub storage_area: Option<String>,
    pub par: Decimal,
    pub on_hand: i32,
    pub suggested_order: i64,
    pub extended_cost: Decimal,
    pub associated_demand: Vec<AssociatedDemand>,
}

/// The full suggested order for one delivery day.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderSheet {
    pub day: DayOfWeek,
    pub generated_at: DateTime<Utc>,
    pub lines: Vec<OrderLine>,
    pub total_cost: Decimal,
}

/// Truck order items and the order sheets built from them.
#[derive(Clone)]
pub struct TruckItemService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl TruckItemService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<TruckItemView>, ServiceError> {
        let db = &*self.db_pool;
        let rows = TruckItem::find()
            .order_by_asc(truck_item::Column::StorageArea)
            .order_by_asc(truck_item::Column::SortOrder)
            .order_by_asc(truck_item::Column::Id)
            .all(db)
            .await?;
        Ok(rows.into_iter().map(to_view).collect())
    }

    #[instrument(skip(self, input))]
    pub async fn create(&self, input: TruckItemInput) -> Result<TruckItemView, ServiceError> {
        let input = validate(input)?;

        let db = &*self.db_pool;
        let model = truck_item::ActiveModel {
            description: Set(input.description),
            uom: Set(input.uom),
            total_units: Set(input.total_units),
            cost: Set(input.cost),
            associated_items: Set(encode(&input.associated_items)?),
            par_levels: Set(encode(&input.par_levels)?),
            storage_area: Set(input.storage_area),
            sort_order: Set(input.sort_order),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await?;

        self.event_sender
            .send_or_log(Event::TruckItemCreated { id: model.id })
            .await;
        info!(id = model.id, description = %model.description, "truck item created");
        Ok(to_view(model))
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: i64,
        input: TruckItemInput,
    ) -> Result<TruckItemView, ServiceError> {
        let input = validate(input)?;

        let db = &*self.db_pool;
        let model = TruckItem::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("truck item {id} not found")))?;

        let mut active: truck_item::ActiveModel = model.into();
        active.description = Set(input.description);
        active.uom = Set(input.uom);
        active.total_units = Set(input.total_units);
        active.cost = Set(input.cost);
        active.associated_items = Set(encode(&input.associated_items)?);
        active.par_levels = Set(encode(&input.par_levels)?);
        active.storage_area = Set(input.storage_area);
        active.sort_order = Set(input.sort_order);
        active.updated_at = Set(Utc::now());
        let model = active.update(db).await?;

        self.event_sender
            .send_or_log(Event::TruckItemUpdated { id: model.id })
            .await;
        info!(id = model.id, "truck item updated");
        Ok(to_view(model))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let result = TruckItem::delete_by_id(id).exec(db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("truck item {id} not found")));
        }
        self.event_sender
            .send_or_log(Event::TruckItemDeleted { id })
            .await;
        Ok(())
    }

    /// Builds the suggested order for one delivery day: every item's
    /// shortfall against its par, plus derived demand for associated items.
    #[instrument(skip(self))]
    pub async fn order_sheet(&self, day: DayOfWeek) -> Result<OrderSheet, ServiceError> {
        let items = self.list().await?;
        let day_key = day.to_string();

        let mut lines = Vec::with_capacity(items.len());
        let mut total_cost = Decimal::ZERO;
        for item in items {
            let par = item
                .par_levels
                .get(&day_key)
                .copied()
                .unwrap_or(Decimal::ZERO);
            let shortfall = par - Decimal::from(item.total_units);
            let suggested_order = if shortfall > Decimal::ZERO {
                shortfall.ceil().to_i64().unwrap_or(0)
            } else {
                0
            };
            let extended_cost = item.cost * Decimal::from(suggested_order);
            total_cost += extended_cost;

            let associated_demand = item
                .associated_items
                .iter()
                .map(|assoc| AssociatedDemand {
                    description: assoc.description.clone(),
                    units_needed: i64::from(assoc.units_per) * suggested_order,
                })
                .filter(|demand| demand.units_needed > 0)
                .collect();

            lines.push(OrderLine {
                item_id: item.id,
                description: item.description,
                uom: item.uom,
                storage_area: item.storage_area,
                par,
                on_hand: item.total_units,
                suggested_order,
                extended_cost,
                associated_demand,
            });
        }

        Ok(OrderSheet {
            day,
            generated_at: Utc::now(),
            lines,
            total_cost,
        })
    }
}

fn validate(mut input: TruckItemInput) -> Result<TruckItemInput, ServiceError> {
    input.description = input.description.trim().to_string();
    if input.description.is_empty() {
        return Err(ServiceError::ValidationError(
            "truck item description must not be empty".to_string(),
        ));
    }
    input.uom = input.uom.trim().to_string();
    if input.uom.is_empty() {
        return Err(ServiceError::ValidationError(
            "truck item uom must not be empty".to_string(),
        ));
    }
    if input.cost < Decimal::ZERO {
        return Err(ServiceError::ValidationError(
            "truck item cost must not be negative".to_string(),
        ));
    }
    if input.total_units < 0 {
        return Err(ServiceError::ValidationError(
            "on-hand units must not be negative".to_string(),
        ));
    }
    for assoc in &input.associated_items {
        if assoc.description.trim().is_empty() || assoc.units_per < 1 {
            return Err(ServiceError::ValidationError(
                "associated items need a description and a positive units_per".to_string(),
            ));
        }
    }
    let mut par_levels = BTreeMap::new();
    for (key, par) in &input.par_levels {
        let day = DayOfWeek::parse(key).ok_or_else(|| {
            ServiceError::ValidationError(format!("unknown day of week in par levels: '{key}'"))
        })?;
        if *par < Decimal::ZERO {
            return Err(ServiceError::ValidationError(format!(
                "par level for {day} must not be negative"
            )));
        }
        par_levels.insert(day.to_string(), *par);
    }
    input.par_levels = par_levels;
    Ok(input)
}

fn encode<T: Serialize>(value: &T) -> Result<serde_json::Value, ServiceError> {
    serde_json::to_value(value)
        .map_err(|e| ServiceError::InternalError(format!("failed to encode truck item JSON: {e}")))
}

fn to_view(model: truck_item::Model) -> TruckItemView {
    TruckItemView {
        id: model.id,
        description: model.description,
        uom: model.uom,
        total_units: model.total_units,
        cost: model.cost,
        associated_items: serde_json::from_value(model.associated_items).unwrap_or_default(),
        par_levels: serde_json::from_value(model.par_levels).unwrap_or_default(),
        storage_area: model.storage_area,
        sort_order: model.sort_order,
        updated_at: model.updated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use sea_orm_migration::MigratorTrait;
    use tokio::sync::mpsc;

    async fn service() -> (TruckItemService, mpsc::Receiver<Event>) {
        let db = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
        crate::migrator::Migrator::up(&db, None).await.unwrap();
        let (tx, rx) = mpsc::channel(32);
        (
            TruckItemService::new(Arc::new(db), EventSender::new(tx)),
            rx,
        )
    }

    fn item(description: &str, area: Option<&str>, sort_order: i32) -> TruckItemInput {
        TruckItemInput {
            description: description.to_string(),
            uom: "case".to_string(),
            total_units: 0,
            cost: dec!(10.00),
            associated_items: Vec::new(),
            par_levels: BTreeMap::new(),
            storage_area: area.map(|a| a.to_string()),
            sort_order,
        }
    }

    #[tokio::test]
    async fn list_orders_by_storage_area_then_sort_order() {
        let (svc, _rx) = service().await;
        svc.create(item("Cups", Some("Dry Storage"), 2)).await.unwrap();
        svc.create(item("Lids", Some("Dry Storage"), 1)).await.unwrap();
        svc.create(item("Filets", Some("Cooler"), 5)).await.unwrap();

        let names: Vec<String> = svc
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.description)
            .collect();
        assert_eq!(names, vec!["Filets", "Lids", "Cups"]);
    }

    #[tokio::test]
    async fn par_level_keys_are_validated_and_canonicalized() {
        let (svc, _rx) = service().await;
        let mut input = item("Filets", None, 0);
        input.par_levels.insert("TUESDAY".to_string(), dec!(12));
        let view = svc.create(input).await.unwrap();
        assert_eq!(view.par_levels.get("tuesday"), Some(&dec!(12)));

        let mut bad = item("Filets", None, 0);
        bad.par_levels.insert("someday".to_string(), dec!(12));
        assert!(matches!(
            svc.create(bad).await.unwrap_err(),
            ServiceError::ValidationError(_)
        ));
    }

    #[tokio::test]
    async fn update_replaces_and_delete_reports_missing_rows() {
        let (svc, mut rx) = service().await;
        let created = svc.create(item("Cups", None, 0)).await.unwrap();

        let mut replacement = item("Cups 16oz", Some("Dry Storage"), 3);
        replacement.total_units = 4;
        let updated = svc.update(created.id, replacement).await.unwrap();
        assert_eq!(updated.description, "Cups 16oz");
        assert_eq!(updated.total_units, 4);

        svc.delete(created.id).await.unwrap();
        assert!(matches!(
            svc.delete(created.id).await.unwrap_err(),
            ServiceError::NotFound(_)
        ));

        assert!(matches!(rx.try_recv().unwrap(), Event::TruckItemCreated { .. }));
        assert!(matches!(rx.try_recv().unwrap(), Event::TruckItemUpdated { .. }));
        assert!(matches!(rx.try_recv().unwrap(), Event::TruckItemDeleted { .. }));
    }

    #[tokio::test]
    async fn order_sheet_orders_the_shortfall_rounded_up() {
        let (svc, _rx) = service().await;
        let mut filets = item("Filets", None, 0);
        filets.cost = dec!(45.50);
        filets.total_units = 4;
        filets.par_levels.insert("thursday".to_string(), dec!(10.5));
        filets.associated_items.push(AssociatedItem {
            description: "Breading Mix".to_string(),
            units_per: 2,
        });
        svc.create(filets).await.unwrap();

        let mut cups = item("Cups", None, 1);
        cups.total_units = 20;
        cups.par_levels.insert("thursday".to_string(), dec!(12));
        svc.create(cups).await.unwrap();

        let sheet = svc.order_sheet(DayOfWeek::Thursday).await.unwrap();
        assert_eq!(sheet.lines.len(), 2);

        // 10.5 par - 4 on hand = 6.5, rounded up to 7 units.
        let filet_line = &sheet.lines[0];
        assert_eq!(filet_line.suggested_order, 7);
        assert_eq!(filet_line.extended_cost, dec!(318.50));
        assert_eq!(filet_line.associated_demand.len(), 1);
        assert_eq!(filet_line.associated_demand[0].units_needed, 14);

        // Over par: nothing suggested, no derived demand.
        let cup_line = &sheet.lines[1];
        assert_eq!(cup_line.suggested_order, 0);
        assert!(cup_line.associated_demand.is_empty());

        assert_eq!(sheet.total_cost, dec!(318.50));
    }

    #[tokio::test]
    async fn order_sheet_treats_missing_days_as_zero_par() {
        let (svc, _rx) = service().await;
        let mut filets = item("Filets", None, 0);
        filets.par_levels.insert("thursday".to_string(), dec!(10));
        svc.create(filets).await.unwrap();

        let sheet = svc.order_sheet(DayOfWeek::Monday).await.unwrap();
        assert_eq!(sheet.lines[0].par, Decimal::ZERO);
        assert_eq!(sheet.lines[0].suggested_order, 0);
        assert_eq!(sheet.total_cost, Decimal::ZERO);
    }

    #[tokio::test]
    async fn invalid_items_are_rejected() {
        let (svc, _rx) = service().await;
        assert!(svc.create(item("  ", None, 0)).await.is_err());

        let mut negative = item("Cups", None, 0);
        negative.cost = dec!(-1);
        assert!(svc.create(negative).await.is_err());

        let mut bad_assoc = item("Cups", None, 0);
        bad_assoc.associated_items.push(AssociatedItem {
            description: "Lids".to_string(),
            units_per: 0,
        });
        assert!(svc.create(bad_assoc).await.is_err());
    }
}
