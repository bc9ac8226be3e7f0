//! Command action implementations
//!
//! Each action implements the `CommandHandler` trait and handles one
//! specific order operation.

use async_trait::async_trait;
use shared::order::DomainEvent;

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata};
use crate::orders::OrderError;

mod approve_order;
mod complete_order;
mod expire_order;
mod mark_emailed;
mod place_order;
mod refund_order;
mod reject_order;
mod update_shipping;

pub use approve_order::{ApproveOrderAction, CancelApprovalAction};
pub use complete_order::CompleteOrderAction;
pub use expire_order::ExpireOrderAction;
pub use mark_emailed::MarkEmailedAction;
pub use place_order::PlaceOrderAction;
pub use refund_order::RefundOrderAction;
pub use reject_order::RejectOrderAction;
pub use update_shipping::UpdateShippingAction;

/// OrderAction enum - dispatches to concrete action implementations
///
/// Order placement is orchestrated separately by the checkout flow (the
/// payment hop shares its transaction), so it is not part of this enum.
pub enum OrderAction {
    Refund(RefundOrderAction),
    Approve(ApproveOrderAction),
    CancelApproval(CancelApprovalAction),
    UpdateShipping(UpdateShippingAction),
    Complete(CompleteOrderAction),
    Expire(ExpireOrderAction),
    Reject(RejectOrderAction),
    MarkEmailed(MarkEmailedAction),
}

impl OrderAction {
    /// Order this action targets
    pub fn order_id(&self) -> &str {
        match self {
            OrderAction::Refund(a) => &a.order_id,
            OrderAction::Approve(a) => &a.order_id,
            OrderAction::CancelApproval(a) => &a.order_id,
            OrderAction::UpdateShipping(a) => &a.order_id,
            OrderAction::Complete(a) => &a.order_id,
            OrderAction::Expire(a) => &a.order_id,
            OrderAction::Reject(a) => &a.order_id,
            OrderAction::MarkEmailed(a) => &a.order_id,
        }
    }
}

/// Manual implementation of CommandHandler for OrderAction
#[async_trait]
impl CommandHandler for OrderAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<DomainEvent>, OrderError> {
        match self {
            OrderAction::Refund(action) => action.execute(ctx, metadata).await,
            OrderAction::Approve(action) => action.execute(ctx, metadata).await,
            OrderAction::CancelApproval(action) => action.execute(ctx, metadata).await,
            OrderAction::UpdateShipping(action) => action.execute(ctx, metadata).await,
            OrderAction::Complete(action) => action.execute(ctx, metadata).await,
            OrderAction::Expire(action) => action.execute(ctx, metadata).await,
            OrderAction::Reject(action) => action.execute(ctx, metadata).await,
            OrderAction::MarkEmailed(action) => action.execute(ctx, metadata).await,
        }
    }
}
