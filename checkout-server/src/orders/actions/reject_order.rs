//! RejectOrder command handler

use async_trait::async_trait;
use shared::order::{DomainEvent, OrderStatus};

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata};
use crate::orders::OrderError;

/// RejectOrder action - review or provider decline before settlement
#[derive(Debug, Clone)]
pub struct RejectOrderAction {
    pub order_id: String,
}

#[async_trait]
impl CommandHandler for RejectOrderAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<DomainEvent>, OrderError> {
        let mut order = ctx.load_order(&self.order_id)?;
        order.set_status(OrderStatus::Rejected)?;
        order.updated_at = metadata.timestamp;
        ctx.save_order(&order)?;
        Ok(vec![])
    }
}
