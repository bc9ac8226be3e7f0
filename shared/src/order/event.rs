//! Domain events - immutable facts broadcast after commit
//!
//! Events are published on the in-process bus only once the surrounding
//! storage transaction has committed, so subscribers (mail, CRM sync,
//! shipping feeds) never observe rolled-back state.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::types::ShippingStatus;

/// Domain event envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Event unique ID
    pub event_id: String,
    /// Order this event belongs to
    pub order_id: String,
    /// Server timestamp (Unix milliseconds)
    pub timestamp: i64,
    /// Event kind and payload
    pub kind: DomainEventKind,
}

impl DomainEvent {
    pub fn new(order_id: String, timestamp: i64, kind: DomainEventKind) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            order_id,
            timestamp,
            kind,
        }
    }
}

/// Event kind enumeration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DomainEventKind {
    /// Order persisted with its items, packages and invoice
    OrderPlaced { po_number: String, final_price: f64 },
    /// Payment settled
    OrderPaid {
        provider: Option<String>,
        payment_reference: Option<String>,
    },
    /// Confirmation email delivered
    OrderEmailed,
    /// Refund issued
    OrderRefunded { amount: f64 },
    /// Order approved for dispatch
    OrderApproved { delivery_date: Option<NaiveDate> },
    /// Order completed and ready for fulfilment
    OrderReady,
    /// Shipping status advanced
    OrderShipped { shipping_status: ShippingStatus },
}

impl std::fmt::Display for DomainEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainEventKind::OrderPlaced { .. } => write!(f, "ORDER_PLACED"),
            DomainEventKind::OrderPaid { .. } => write!(f, "ORDER_PAID"),
            DomainEventKind::OrderEmailed => write!(f, "ORDER_EMAILED"),
            DomainEventKind::OrderRefunded { .. } => write!(f, "ORDER_REFUNDED"),
            DomainEventKind::OrderApproved { .. } => write!(f, "ORDER_APPROVED"),
            DomainEventKind::OrderReady => write!(f, "ORDER_READY"),
            DomainEventKind::OrderShipped { .. } => write!(f, "ORDER_SHIPPED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization_tags() {
        let event = DomainEvent::new(
            "order-1".to_string(),
            1_700_000_000_000,
            DomainEventKind::OrderRefunded { amount: 42.5 },
        );
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"ORDER_REFUNDED\""));
        assert!(json.contains("\"amount\":42.5"));
    }

    #[test]
    fn test_display_names() {
        assert_eq!(DomainEventKind::OrderReady.to_string(), "ORDER_READY");
        assert_eq!(
            DomainEventKind::OrderPaid {
                provider: None,
                payment_reference: None
            }
            .to_string(),
            "ORDER_PAID"
        );
    }
}
