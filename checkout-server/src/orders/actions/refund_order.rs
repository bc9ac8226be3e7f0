//! RefundOrder command handler
//!
//! The status update and the external refund call share one write
//! transaction: a provider failure aborts the transaction, so the status
//! change only ever commits together with a successful refund.

use async_trait::async_trait;
use shared::order::{DomainEvent, DomainEventKind};

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata};
use crate::orders::OrderError;
use crate::providers::ProviderRegistry;

/// RefundOrder action
#[derive(Clone)]
pub struct RefundOrderAction {
    pub order_id: String,
    /// Amount to refund; defaults to the order's final price
    pub amount: Option<f64>,
    pub providers: ProviderRegistry,
}

#[async_trait]
impl CommandHandler for RefundOrderAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<DomainEvent>, OrderError> {
        // 1. Load and gate on status: refunds only from paid/emailed/refunded
        let mut order = ctx.load_order(&self.order_id)?;
        if !order.status.refundable() {
            return Err(OrderError::RefundNotPermitted(
                order.status.as_str().to_string(),
            ));
        }

        // 2. A refund needs the provider reference from settlement
        let reference = order
            .payment_reference
            .clone()
            .ok_or(OrderError::MissingPaymentReference)?;
        let provider_name = order
            .payment_provider
            .clone()
            .ok_or_else(|| OrderError::UnknownProvider("<unset>".to_string()))?;
        let provider = self
            .providers
            .get(&provider_name)
            .ok_or_else(|| OrderError::UnknownProvider(provider_name.clone()))?;

        // 3. Apply the status change inside the transaction
        let amount = self.amount.unwrap_or(order.final_price);
        order.refund(amount)?;
        order.updated_at = metadata.timestamp;
        ctx.save_order(&order)?;

        // 4. External refund call; an error here aborts the whole
        //    transaction and the status change above never commits
        provider
            .refund(&reference, amount)
            .await
            .map_err(|e| OrderError::RefundFailed(e.to_string()))?;

        Ok(vec![DomainEvent::new(
            order.order_id.clone(),
            metadata.timestamp,
            DomainEventKind::OrderRefunded { amount },
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::storage::CheckoutStorage;
    use crate::providers::{PaymentOutcome, PaymentProvider, ProviderError};
    use parking_lot::Mutex;
    use shared::order::{Address, OrderRecord, OrderStatus, PaymentData};
    use std::sync::Arc;

    struct StubProvider {
        name: String,
        fail_refund: bool,
        refunds: Mutex<Vec<(String, f64)>>,
    }

    impl StubProvider {
        fn new(name: &str, fail_refund: bool) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                fail_refund,
                refunds: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl PaymentProvider for StubProvider {
        fn name(&self) -> &str {
            &self.name
        }

        async fn pay(
            &self,
            _order: &OrderRecord,
            _payment: &PaymentData,
        ) -> Result<PaymentOutcome, ProviderError> {
            Ok(PaymentOutcome {
                reference: "ref-1".to_string(),
            })
        }

        async fn refund(
            &self,
            payment_reference: &str,
            amount: f64,
        ) -> Result<(), ProviderError> {
            if self.fail_refund {
                return Err(ProviderError::Unavailable("refund API down".to_string()));
            }
            self.refunds
                .lock()
                .push((payment_reference.to_string(), amount));
            Ok(())
        }

        async fn cancel_installment(&self, _payment: &PaymentData) -> Result<(), ProviderError> {
            Ok(())
        }
    }

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

    fn paid_order(id: &str) -> OrderRecord {
        let mut order = OrderRecord::new(
            id.to_string(),
            "client-1".to_string(),
            test_address(),
            test_address(),
            0,
        );
        order.set_status(OrderStatus::PaymentProvider).unwrap();
        order.set_status(OrderStatus::Paid).unwrap();
        order.final_price = 55.0;
        order.payment_provider = Some("stripe".to_string());
        order.payment_reference = Some("ref-1".to_string());
        order
    }

    fn store(storage: &CheckoutStorage, order: &OrderRecord) {
        let txn = storage.begin_write().unwrap();
        storage.store_order(&txn, order).unwrap();
        txn.commit().unwrap();
    }

    fn metadata() -> CommandMetadata {
        CommandMetadata::new("test", 1_700_000_000_000)
    }

    #[tokio::test]
    async fn test_refund_from_paid_succeeds() {
        let storage = CheckoutStorage::open_in_memory().unwrap();
        store(&storage, &paid_order("order-1"));

        let provider = StubProvider::new("stripe", false);
        let providers = ProviderRegistry::new().with(provider.clone());

        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage);
        let action = RefundOrderAction {
            order_id: "order-1".to_string(),
            amount: None,
            providers,
        };
        let events = action.execute(&mut ctx, &metadata()).await.unwrap();
        drop(ctx);
        txn.commit().unwrap();

        let order = storage.get_order("order-1").unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Refunded);
        assert_eq!(order.refund_amount, Some(55.0));
        let refunds = provider.refunds.lock();
        assert_eq!(refunds.len(), 1);
        assert_eq!(refunds[0], ("ref-1".to_string(), 55.0));
        assert!(matches!(
            events[0].kind,
            DomainEventKind::OrderRefunded { .. }
        ));
    }

    #[tokio::test]
    async fn test_refund_from_cart_fails() {
        let storage = CheckoutStorage::open_in_memory().unwrap();
        let mut order = paid_order("order-1");
        order.status = OrderStatus::Cart; // fresh record, bypass for setup
        store(&storage, &order);

        let providers = ProviderRegistry::new().with(StubProvider::new("stripe", false));
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage);
        let action = RefundOrderAction {
            order_id: "order-1".to_string(),
            amount: None,
            providers,
        };
        let result = action.execute(&mut ctx, &metadata()).await;

        assert!(matches!(result, Err(OrderError::RefundNotPermitted(_))));
    }

    #[tokio::test]
    async fn test_refund_without_reference_fails() {
        let storage = CheckoutStorage::open_in_memory().unwrap();
        let mut order = paid_order("order-1");
        order.payment_reference = None;
        store(&storage, &order);

        let providers = ProviderRegistry::new().with(StubProvider::new("stripe", false));
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage);
        let action = RefundOrderAction {
            order_id: "order-1".to_string(),
            amount: None,
            providers,
        };
        let result = action.execute(&mut ctx, &metadata()).await;

        assert!(matches!(result, Err(OrderError::MissingPaymentReference)));
    }

    #[tokio::test]
    async fn test_provider_failure_rolls_back_status() {
        let storage = CheckoutStorage::open_in_memory().unwrap();
        store(&storage, &paid_order("order-1"));

        let providers = ProviderRegistry::new().with(StubProvider::new("stripe", true));
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage);
        let action = RefundOrderAction {
            order_id: "order-1".to_string(),
            amount: None,
            providers,
        };
        let result = action.execute(&mut ctx, &metadata()).await;
        assert!(matches!(result, Err(OrderError::RefundFailed(_))));
        drop(ctx);
        drop(txn); // abort, as the service does on error

        let order = storage.get_order("order-1").unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Paid);
        assert!(order.refund_amount.is_none());
    }

    #[tokio::test]
    async fn test_partial_refund_amount() {
        let storage = CheckoutStorage::open_in_memory().unwrap();
        store(&storage, &paid_order("order-1"));

        let provider = StubProvider::new("stripe", false);
        let providers = ProviderRegistry::new().with(provider.clone());
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage);
        let action = RefundOrderAction {
            order_id: "order-1".to_string(),
            amount: Some(20.0),
            providers,
        };
        action.execute(&mut ctx, &metadata()).await.unwrap();
        drop(ctx);
        txn.commit().unwrap();

        let order = storage.get_order("order-1").unwrap().unwrap();
        assert_eq!(order.refund_amount, Some(20.0));
    }
}
