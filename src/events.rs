use std::sync::Arc;

use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::entities::order::OrderStatus;
use crate::services::notifications::NotificationService;

/// Domain events emitted by the order ledger. Handlers emit these
/// after the database transaction commits; nothing in the request path
/// waits on downstream delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    OrderPlaced(Uuid),
    OrderStatusChanged {
        order_id: Uuid,
        old_status: OrderStatus,
        new_status: OrderStatus,
    },
}

#[derive(Clone)]
pub struct EventSender {
    tx: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(tx: mpsc::Sender<Event>) -> Self {
        Self { tx }
    }

    pub async fn send(&self, event: Event) -> Result<(), mpsc::error::SendError<Event>> {
        self.tx.send(event).await
    }

    /// Sends an event and logs instead of failing if the processor has
    /// shut down. Used at points where the caller's work is already
    /// committed.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.tx.send(event).await {
            error!(error = %e, "event channel closed, dropping event");
        }
    }
}

/// Drains the event channel for the life of the process. Notification
/// failures are logged and swallowed; an order must never be affected
/// by a messaging outage.
pub async fn process_events(
    mut rx: mpsc::Receiver<Event>,
    db: Arc<DatabaseConnection>,
    notifier: Arc<NotificationService>,
) {
    info!("event processor started");
    while let Some(event) = rx.recv().await {
        match event {
            Event::OrderPlaced(order_id) => {
                debug!(%order_id, "processing OrderPlaced");
                notifier.notify_order_placed(db.as_ref(), order_id).await;
            }
            Event::OrderStatusChanged {
                order_id,
                old_status,
                new_status,
            } => {
                info!(%order_id, ?old_status, ?new_status, "order status changed");
            }
        }
    }
    info!("event processor stopped");
}
