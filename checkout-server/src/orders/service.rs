//! OrderService - action execution and event broadcasting
//!
//! # Action Flow
//!
//! ```text
//! execute(action)
//!     ├─ 1. Begin write transaction
//!     ├─ 2. Create CommandContext
//!     ├─ 3. Execute action
//!     ├─ 4. Commit transaction
//!     ├─ 5. Broadcast event(s)
//!     └─ 6. Return the refreshed order
//! ```
//!
//! Events are broadcast strictly after commit; subscribers never observe
//! rolled-back state.

use chrono::Utc;
use chrono_tz::Tz;
use shared::order::{DomainEvent, OrderRecord};
use tokio::sync::broadcast;

use super::actions::OrderAction;
use super::error::OrderError;
use super::storage::{CheckoutStorage, StorageError};
use super::traits::{CommandContext, CommandHandler, CommandMetadata};

/// Event broadcast channel capacity
const EVENT_CHANNEL_CAPACITY: usize = 4096;

/// OrderService - owns the storage handle and the event bus
pub struct OrderService {
    storage: CheckoutStorage,
    event_tx: broadcast::Sender<DomainEvent>,
    /// Business timezone (PO date components, delivery resolution)
    tz: Tz,
}

impl std::fmt::Debug for OrderService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderService")
            .field("storage", &"<CheckoutStorage>")
            .field("tz", &self.tz)
            .finish()
    }
}

impl OrderService {
    pub fn new(storage: CheckoutStorage, tz: Tz) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            storage,
            event_tx,
            tz,
        }
    }

    /// Subscribe to domain event broadcasts
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.event_tx.subscribe()
    }

    /// The underlying storage
    pub fn storage(&self) -> &CheckoutStorage {
        &self.storage
    }

    /// Current server time (Unix milliseconds)
    pub fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }

    /// Current time in the business timezone
    pub fn now_local(&self) -> chrono::DateTime<Tz> {
        Utc::now().with_timezone(&self.tz)
    }

    /// Date component for PO numbers (yyyymmdd, business timezone)
    pub fn po_date(&self) -> String {
        self.now_local().format("%Y%m%d").to_string()
    }

    /// Execute an action in its own transaction and broadcast its events
    pub async fn execute(
        &self,
        action: OrderAction,
        actor: &str,
    ) -> Result<OrderRecord, OrderError> {
        let metadata = CommandMetadata::new(actor, self.now_ms());
        let order_id = action.order_id().to_string();

        let txn = self.storage.begin_write()?;
        let events = {
            let mut ctx = CommandContext::new(&txn, &self.storage);
            action.execute(&mut ctx, &metadata).await?
        };
        txn.commit().map_err(StorageError::from)?;

        self.broadcast(events);

        self.storage
            .get_order(&order_id)?
            .ok_or(OrderError::OrderNotFound(order_id))
    }

    /// Broadcast events to all subscribers (no-op when nobody listens)
    pub fn broadcast(&self, events: Vec<DomainEvent>) {
        for event in events {
            tracing::debug!(
                order_id = %event.order_id,
                kind = %event.kind,
                "broadcasting domain event"
            );
            let _ = self.event_tx.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::actions::CompleteOrderAction;
    use shared::order::{Address, DomainEventKind};

    fn test_address() -> Address {
        Address {
            line1: "1 Test St".to_string(),
            line2: None,
            city: "Auckland".to_string(),
            region: None,
            postcode: "1010".to_string(),
            country: "NZ".to_string(),
        }
    }

    fn service() -> OrderService {
        OrderService::new(
            CheckoutStorage::open_in_memory().unwrap(),
            chrono_tz::Pacific::Auckland,
        )
    }

    #[tokio::test]
    async fn test_execute_commits_and_broadcasts() {
        let service = service();
        let mut rx = service.subscribe();

        let order = OrderRecord::new(
            "order-1".to_string(),
            "client-1".to_string(),
            test_address(),
            test_address(),
            0,
        );
        let txn = service.storage().begin_write().unwrap();
        service.storage().store_order(&txn, &order).unwrap();
        txn.commit().unwrap();

        let updated = service
            .execute(
                OrderAction::Complete(CompleteOrderAction {
                    order_id: "order-1".to_string(),
                }),
                "test",
            )
            .await
            .unwrap();

        assert!(updated.completed_at.is_some());
        let event = rx.try_recv().unwrap();
        assert!(matches!(event.kind, DomainEventKind::OrderReady));
    }

    #[tokio::test]
    async fn test_failed_action_leaves_no_trace() {
        let service = service();
        let mut rx = service.subscribe();

        let result = service
            .execute(
                OrderAction::Complete(CompleteOrderAction {
                    order_id: "ghost".to_string(),
                }),
                "test",
            )
            .await;

        assert!(matches!(result, Err(OrderError::OrderNotFound(_))));
        assert!(rx.try_recv().is_err());
    }
}
