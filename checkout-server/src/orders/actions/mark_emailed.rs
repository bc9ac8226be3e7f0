//! MarkEmailed command handler
//!
//! Runs after the confirmation email is delivered (outside the placement
//! transaction): advances `paid -> emailed` and flips the invoice from
//! draft to sent.

use async_trait::async_trait;
use shared::order::{DomainEvent, DomainEventKind, OrderStatus};

use crate::invoices;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata};
use crate::orders::OrderError;

/// MarkEmailed action
#[derive(Debug, Clone)]
pub struct MarkEmailedAction {
    pub order_id: String,
}

#[async_trait]
impl CommandHandler for MarkEmailedAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<DomainEvent>, OrderError> {
        let mut order = ctx.load_order(&self.order_id)?;
        order.set_status(OrderStatus::Emailed)?;
        order.updated_at = metadata.timestamp;
        ctx.save_order(&order)?;

        if let Some(mut invoice) = ctx.find_invoice(&self.order_id)? {
            invoices::mark_sent(&mut invoice);
            ctx.save_invoice(&invoice)?;
        }

        Ok(vec![DomainEvent::new(
            order.order_id.clone(),
            metadata.timestamp,
            DomainEventKind::OrderEmailed,
        )])
    }
}
