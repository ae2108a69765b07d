//! In-process event fanout. Services publish facts about configuration
//! changes and uploads; the processing loop logs them and hands them to
//! registered handlers.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::allocation::DayOfWeek;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging instead of failing when the processing
    /// loop is gone. Writes must not be rolled back because nobody is
    /// listening for the announcement.
    pub async fn send_or_log(&self, event: Event) {
        let kind = event.kind();
        if let Err(e) = self.send(event).await {
            warn!(event = kind, error = %e, "event dropped");
        }
    }
}

// Define the various events that can occur in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Projection events
    ProjectionUpdated {
        day: DayOfWeek,
        amount: Decimal,
    },
    FutureProjectionUpserted {
        date: NaiveDate,
        amount: Decimal,
    },
    FutureProjectionDeleted {
        date: NaiveDate,
    },
    ProjectionConfigChanged {
        plan_next_week: bool,
    },

    // UTP factor and buffer events
    UptChanged {
        product: String,
        utp: Decimal,
    },
    BufferChanged {
        product: String,
        buffer_prcnt: Decimal,
    },
    DailyBufferChanged {
        day: DayOfWeek,
        product: String,
        buffer_prcnt: Decimal,
    },

    // Adjustment message events
    AdjustmentPosted {
        id: i64,
        day: DayOfWeek,
        product: String,
    },
    AdjustmentDeleted {
        id: i64,
    },

    // Closure plan events
    ClosurePlanned {
        id: i64,
        date: NaiveDate,
    },
    ClosureCanceled {
        id: i64,
    },

    // Instruction events
    InstructionSaved {
        id: i64,
        day: DayOfWeek,
    },
    InstructionDeleted {
        id: i64,
    },

    // Truck catalog events
    TruckItemCreated {
        id: i64,
    },
    TruckItemUpdated {
        id: i64,
    },
    TruckItemDeleted {
        id: i64,
    },

    // Sales-mix upload events
    SalesMixUploaded {
        batch_id: Uuid,
        rows: usize,
        period_sales: Decimal,
    },

    // Auth events
    UserLoggedIn {
        user_id: Uuid,
    },

    // Background maintenance events
    MaintenanceSweep {
        messages_purged: u64,
        closures_purged: u64,
        tokens_purged: u64,
    },
}

impl Event {
    /// Stable name used for log fields and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::ProjectionUpdated { .. } => "projection_updated",
            Event::FutureProjectionUpserted { .. } => "future_projection_upserted",
            Event::FutureProjectionDeleted { .. } => "future_projection_deleted",
            Event::ProjectionConfigChanged { .. } => "projection_config_changed",
            Event::UptChanged { .. } => "upt_changed",
            Event::BufferChanged { .. } => "buffer_changed",
            Event::DailyBufferChanged { .. } => "daily_buffer_changed",
            Event::AdjustmentPosted { .. } => "adjustment_posted",
            Event::AdjustmentDeleted { .. } => "adjustment_deleted",
            Event::ClosurePlanned { .. } => "closure_planned",
            Event::ClosureCanceled { .. } => "closure_canceled",
            Event::InstructionSaved { .. } => "instruction_saved",
            Event::InstructionDeleted { .. } => "instruction_deleted",
            Event::TruckItemCreated { .. } => "truck_item_created",
            Event::TruckItemUpdated { .. } => "truck_item_updated",
            Event::TruckItemDeleted { .. } => "truck_item_deleted",
            Event::SalesMixUploaded { .. } => "salesmix_uploaded",
            Event::UserLoggedIn { .. } => "user_logged_in",
            Event::MaintenanceSweep { .. } => "maintenance_sweep",
        }
    }

    /// Whether this event changes the inputs that allocation boards are
    /// computed from.
    pub fn affects_boards(&self) -> bool {
        matches!(
            self,
            Event::ProjectionUpdated { .. }
                | Event::FutureProjectionUpserted { .. }
                | Event::FutureProjectionDeleted { .. }
                | Event::ProjectionConfigChanged { .. }
                | Event::UptChanged { .. }
                | Event::BufferChanged { .. }
                | Event::DailyBufferChanged { .. }
                | Event::AdjustmentPosted { .. }
                | Event::AdjustmentDeleted { .. }
                | Event::ClosurePlanned { .. }
                | Event::ClosureCanceled { .. }
                | Event::InstructionSaved { .. }
                | Event::InstructionDeleted { .. }
        )
    }
}

// Define a trait for handling events. Handlers implementing this trait will process events asynchronously.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle_event(&self, event: Event) -> Result<(), String>;
}

/// Handler that keeps the metrics registry in step with event traffic.
pub struct MetricsEventHandler;

#[async_trait]
impl EventHandler for MetricsEventHandler {
    async fn handle_event(&self, event: Event) -> Result<(), String> {
        use crate::metrics::{BOARD_METRICS, METRICS};

        if event.affects_boards() {
            METRICS
                .get_or_create_counter("board_input_changes_total")
                .inc();
        }

        match event {
            Event::SalesMixUploaded { .. } => {
                BOARD_METRICS.salesmix_uploads_total.inc();
            }
            Event::MaintenanceSweep {
                messages_purged,
                closures_purged,
                tokens_purged,
            } => {
                BOARD_METRICS
                    .maintenance_purged_total
                    .inc_by(messages_purged + closures_purged + tokens_purged);
            }
            Event::UserLoggedIn { .. } => {
                METRICS.get_or_create_counter("logins_total").inc();
            }
            _ => {}
        }

        Ok(())
    }
}

// Function to process incoming events and distribute them to registered event handlers.
pub async fn process_events(mut rx: mpsc::Receiver<Event>, handlers: Vec<Arc<dyn EventHandler>>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::SalesMixUploaded {
                batch_id,
                rows,
                period_sales,
            } => {
                info!(
                    batch_id = %batch_id,
                    rows,
                    period_sales = %period_sales,
                    "sales mix uploaded"
                );
            }
            Event::ClosurePlanned { id, date } => {
                info!(closure_id = id, date = %date, "closure planned");
            }
            Event::MaintenanceSweep {
                messages_purged,
                closures_purged,
                tokens_purged,
            } => {
                info!(
                    messages_purged,
                    closures_purged, tokens_purged, "maintenance sweep completed"
                );
            }
            Event::UserLoggedIn { user_id } => {
                info!(user_id = %user_id, "user logged in");
            }
            other => {
                debug!(event = other.kind(), "event received");
            }
        }

        for handler in &handlers {
            if let Err(e) = handler.handle_event(event.clone()).await {
                error!(event = event.kind(), error = %e, "event handler failed");
            }
        }
    }

    warn!("Event processing loop has ended");
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn send_delivers_to_receiver() {
        let (tx, mut rx) = mpsc::channel(8);
        let sender = EventSender::new(tx);

        sender
            .send(Event::UptChanged {
                product: "Nugget".to_string(),
                utp: dec!(15.5),
            })
            .await
            .unwrap();

        match rx.recv().await.unwrap() {
            Event::UptChanged { product, utp } => {
                assert_eq!(product, "Nugget");
                assert_eq!(utp, dec!(15.5));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn send_or_log_swallows_closed_channel() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);

        // Must not panic or return an error to the caller
        sender
            .send_or_log(Event::AdjustmentDeleted { id: 7 })
            .await;
    }

    #[tokio::test]
    async fn handlers_receive_each_event() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        struct CountingHandler(AtomicUsize);

        #[async_trait]
        impl EventHandler for CountingHandler {
            async fn handle_event(&self, _event: Event) -> Result<(), String> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }

        let handler = Arc::new(CountingHandler(AtomicUsize::new(0)));
        let (tx, rx) = mpsc::channel(8);
        let sender = EventSender::new(tx);

        let loop_handle = tokio::spawn(process_events(rx, vec![handler.clone()]));

        sender
            .send(Event::ClosureCanceled { id: 1 })
            .await
            .unwrap();
        sender
            .send(Event::TruckItemDeleted { id: 2 })
            .await
            .unwrap();
        drop(sender);

        loop_handle.await.unwrap();
        assert_eq!(handler.0.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn board_inputs_are_flagged() {
        assert!(Event::UptChanged {
            product: "Strip".to_string(),
            utp: dec!(4)
        }
        .affects_boards());
        assert!(!Event::UserLoggedIn {
            user_id: Uuid::new_v4()
        }
        .affects_boards());
        assert_eq!(
            Event::MaintenanceSweep {
                messages_purged: 0,
                closures_purged: 0,
                tokens_purged: 0
            }
            .kind(),
            "maintenance_sweep"
        );
    }
}
