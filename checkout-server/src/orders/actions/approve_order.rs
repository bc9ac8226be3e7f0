//! ApproveOrder / CancelApproval command handlers
//!
//! Approval routes clinic-bound orders against the clinic's capacity:
//! when the approved-order count for the held delivery date reaches the
//! clinic threshold, the date is advanced to the next deliverable day
//! with headroom before approval is recorded.

use async_trait::async_trait;
use chrono::NaiveDate;
use shared::models::Clinic;
use shared::order::{DomainEvent, DomainEventKind};
use std::collections::HashSet;

use crate::delivery;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata};
use crate::orders::OrderError;

/// ApproveOrder action
#[derive(Debug, Clone)]
pub struct ApproveOrderAction {
    pub order_id: String,
    /// Routing clinic, when the order is clinic-bound
    pub clinic: Option<Clinic>,
    /// Bound for the delivery-date rescan
    pub max_scan_days: u32,
}

impl ApproveOrderAction {
    /// Find the first deliverable date at or after `start` where the
    /// clinic still has approval headroom
    fn route_date(
        &self,
        ctx: &CommandContext<'_>,
        clinic: &Clinic,
        start: NaiveDate,
    ) -> Result<NaiveDate, OrderError> {
        let clinic_id = clinic.id.as_deref().unwrap_or_default();
        let blackouts: HashSet<NaiveDate> = clinic.blackout_dates.iter().copied().collect();

        let mut candidate = delivery::next_deliverable(start, &blackouts, self.max_scan_days)?;
        for _ in 0..=self.max_scan_days {
            let approved = ctx.count_approved_for_clinic_date(clinic_id, candidate)?;
            if approved < clinic.approval_threshold {
                return Ok(candidate);
            }
            let next = candidate
                .succ_opt()
                .ok_or(OrderError::NoDeliveryCapacity(self.max_scan_days))?;
            candidate = delivery::next_deliverable(next, &blackouts, self.max_scan_days)?;
        }
        Err(OrderError::NoDeliveryCapacity(self.max_scan_days))
    }
}

#[async_trait]
impl CommandHandler for ApproveOrderAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<DomainEvent>, OrderError> {
        let mut order = ctx.load_order(&self.order_id)?;

        if let (Some(clinic), Some(held)) = (&self.clinic, order.delivery_date) {
            let routed = self.route_date(ctx, clinic, held)?;
            if routed != held {
                tracing::info!(
                    order_id = %order.order_id,
                    from = %held,
                    to = %routed,
                    "clinic at capacity, delivery date advanced"
                );
                order.delivery_date = Some(routed);
                // The client's picked date no longer holds
                order.delivery_date_confirmed = false;
            }
        }

        order.approve(metadata.timestamp);
        order.updated_at = metadata.timestamp;
        ctx.save_order(&order)?;

        Ok(vec![DomainEvent::new(
            order.order_id.clone(),
            metadata.timestamp,
            DomainEventKind::OrderApproved {
                delivery_date: order.delivery_date,
            },
        )])
    }
}

/// CancelApproval action - clears a recorded approval
#[derive(Debug, Clone)]
pub struct CancelApprovalAction {
    pub order_id: String,
}

#[async_trait]
impl CommandHandler for CancelApprovalAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<DomainEvent>, OrderError> {
        let mut order = ctx.load_order(&self.order_id)?;
        order.cancel_approval();
        order.updated_at = metadata.timestamp;
        ctx.save_order(&order)?;
        Ok(vec![])
    }
}
