//! UpdateShipping command handler

use async_trait::async_trait;
use shared::order::{DomainEvent, DomainEventKind, ShippingStatus};

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata};
use crate::orders::OrderError;

/// UpdateShipping action - advances the order's shipping axis
///
/// Package-bound items follow the order; standalone items keep their own
/// shipping schedule and are advanced individually.
#[derive(Debug, Clone)]
pub struct UpdateShippingAction {
    pub order_id: String,
    pub to: ShippingStatus,
    /// Standalone items to advance together with the order (by item id);
    /// empty = order-level update only
    pub item_ids: Vec<String>,
}

#[async_trait]
impl CommandHandler for UpdateShippingAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<DomainEvent>, OrderError> {
        let mut order = ctx.load_order(&self.order_id)?;
        order.set_shipping_status(self.to)?;

        for item_id in &self.item_ids {
            if let Some(item) = order
                .items
                .iter_mut()
                .find(|i| i.is_standalone() && &i.item_id == item_id)
            {
                if !item.shipping_status.can_transition(self.to) {
                    return Err(OrderError::InvalidTransition(
                        shared::order::InvalidTransition {
                            from: item.shipping_status.as_str().to_string(),
                            to: self.to.as_str().to_string(),
                        },
                    ));
                }
                item.shipping_status = self.to;
            }
        }

        order.updated_at = metadata.timestamp;
        ctx.save_order(&order)?;

        Ok(vec![DomainEvent::new(
            order.order_id.clone(),
            metadata.timestamp,
            DomainEventKind::OrderShipped {
                shipping_status: self.to,
            },
        )])
    }
}
