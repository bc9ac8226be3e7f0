//! CompleteOrder command handler

use async_trait::async_trait;
use shared::order::{DomainEvent, DomainEventKind};

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata};
use crate::orders::OrderError;

/// CompleteOrder action - stamps completion and announces readiness
#[derive(Debug, Clone)]
pub struct CompleteOrderAction {
    pub order_id: String,
}

#[async_trait]
impl CommandHandler for CompleteOrderAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<DomainEvent>, OrderError> {
        let mut order = ctx.load_order(&self.order_id)?;
        order.complete(metadata.timestamp);
        order.updated_at = metadata.timestamp;
        ctx.save_order(&order)?;

        Ok(vec![DomainEvent::new(
            order.order_id.clone(),
            metadata.timestamp,
            DomainEventKind::OrderReady,
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::storage::CheckoutStorage;
    use shared::order::{Address, OrderRecord};

    #[tokio::test]
    async fn test_complete_stamps_timestamp() {
        let storage = CheckoutStorage::open_in_memory().unwrap();
        let order = OrderRecord::new(
            "order-1".to_string(),
            "client-1".to_string(),
            Address {
                line1: "1 Test St".to_string(),
                line2: None,
                city: "Auckland".to_string(),
                region: None,
                postcode: "1010".to_string(),
                country: "NZ".to_string(),
            },
            Address {
                line1: "1 Test St".to_string(),
                line2: None,
                city: "Auckland".to_string(),
                region: None,
                postcode: "1010".to_string(),
                country: "NZ".to_string(),
            },
            0,
        );
        let txn = storage.begin_write().unwrap();
        storage.store_order(&txn, &order).unwrap();
        txn.commit().unwrap();

        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage);
        let action = CompleteOrderAction {
            order_id: "order-1".to_string(),
        };
        let metadata = CommandMetadata::new("test", 42);
        let events = action.execute(&mut ctx, &metadata).await.unwrap();
        drop(ctx);
        txn.commit().unwrap();

        let order = storage.get_order("order-1").unwrap().unwrap();
        assert_eq!(order.completed_at, Some(42));
        assert!(matches!(events[0].kind, DomainEventKind::OrderReady));
    }
}
