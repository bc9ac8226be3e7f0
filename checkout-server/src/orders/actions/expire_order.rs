//! ExpireOrder command handler
//!
//! Carts abandoned before payment settles are expired by a sweeper; the
//! transition is only legal from pre-settlement statuses.

use async_trait::async_trait;
use shared::order::{DomainEvent, OrderStatus};

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata};
use crate::orders::OrderError;

/// ExpireOrder action
#[derive(Debug, Clone)]
pub struct ExpireOrderAction {
    pub order_id: String,
}

#[async_trait]
impl CommandHandler for ExpireOrderAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<DomainEvent>, OrderError> {
        let mut order = ctx.load_order(&self.order_id)?;
        order.set_status(OrderStatus::Expired)?;
        order.updated_at = metadata.timestamp;
        ctx.save_order(&order)?;
        Ok(vec![])
    }
}
