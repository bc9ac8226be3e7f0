//! Persisted order records
//!
//! Records are plain data structures written through the storage layer.
//! Status fields only move through the transition methods below; callers
//! never assign them directly.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::types::{
    Address, DelegateInfo, InvalidTransition, OrderStatus, ShippingStatus,
};

/// Add-on line attached to an item or package
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddonLine {
    pub addon_id: String,
    pub name: String,
    pub price: f64,
}

/// Item within an order
///
/// Items not bound to a package carry their own shipping status,
/// approval timestamp and delivery date, which may diverge from the
/// order's. Package-bound items follow their package.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemRecord {
    pub item_id: String,
    pub kit_id: String,
    pub name: String,
    /// Item purchase-order number (sequence independent from the order's)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub po_number: Option<String>,
    pub price: f64,
    pub quantity: i32,
    #[serde(default)]
    pub addons: Vec<AddonLine>,
    /// Order-package instance this item ships under, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_package_id: Option<String>,
    pub shipping_status: ShippingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_date: Option<NaiveDate>,
}

impl ItemRecord {
    /// Whether this item ships independently of any package
    pub fn is_standalone(&self) -> bool {
        self.order_package_id.is_none()
    }
}

/// Package materialized onto an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPackageRecord {
    pub order_package_id: String,
    pub package_id: String,
    pub name: String,
    pub price: f64,
    pub quantity: i32,
    #[serde(default)]
    pub addons: Vec<AddonLine>,
}

/// Order record - the aggregate persisted by the storage layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: String,
    /// Order purchase-order number, allocated after insert
    #[serde(skip_serializing_if = "Option::is_none")]
    pub po_number: Option<String>,
    pub status: OrderStatus,
    pub shipping_status: ShippingStatus,
    pub client_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affiliate_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clinic_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delegate: Option<DelegateInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_code: Option<String>,
    /// Discount-adjusted total at creation time
    pub final_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_amount: Option<f64>,
    pub affiliate_payout: f64,
    pub billing_address: Address,
    pub shipping_address: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_date: Option<NaiveDate>,
    #[serde(default)]
    pub delivery_date_confirmed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_reference: Option<String>,
    pub items: Vec<ItemRecord>,
    pub packages: Vec<OrderPackageRecord>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl OrderRecord {
    /// Create a new order in `cart` status
    pub fn new(
        order_id: String,
        client_id: String,
        billing_address: Address,
        shipping_address: Address,
        created_at: i64,
    ) -> Self {
        Self {
            order_id,
            po_number: None,
            status: OrderStatus::Cart,
            shipping_status: ShippingStatus::ReadyForShipping,
            client_id,
            affiliate_id: None,
            clinic_id: None,
            delegate: None,
            discount_code: None,
            final_price: 0.0,
            refund_amount: None,
            affiliate_payout: 0.0,
            billing_address,
            shipping_address,
            delivery_date: None,
            delivery_date_confirmed: false,
            approved_at: None,
            completed_at: None,
            payment_provider: None,
            payment_reference: None,
            items: Vec::new(),
            packages: Vec::new(),
            created_at,
            updated_at: created_at,
        }
    }

    /// Transition the payment/lifecycle status
    pub fn set_status(&mut self, to: OrderStatus) -> Result<(), InvalidTransition> {
        if !self.status.can_transition(to) {
            return Err(InvalidTransition {
                from: self.status.as_str().to_string(),
                to: to.as_str().to_string(),
            });
        }
        self.status = to;
        Ok(())
    }

    /// Transition the order-level shipping status, cascading to
    /// package-bound items (standalone items keep their own schedule)
    pub fn set_shipping_status(
        &mut self,
        to: ShippingStatus,
    ) -> Result<(), InvalidTransition> {
        if !self.shipping_status.can_transition(to) {
            return Err(InvalidTransition {
                from: self.shipping_status.as_str().to_string(),
                to: to.as_str().to_string(),
            });
        }
        self.shipping_status = to;
        for item in self.items.iter_mut().filter(|i| !i.is_standalone()) {
            item.shipping_status = to;
        }
        Ok(())
    }

    /// Record approval (one-way unless cleared via `cancel_approval`)
    pub fn approve(&mut self, at_ms: i64) {
        if self.approved_at.is_none() {
            self.approved_at = Some(at_ms);
        }
    }

    /// Clear a previously recorded approval
    pub fn cancel_approval(&mut self) {
        self.approved_at = None;
    }

    /// Stamp completion time
    pub fn complete(&mut self, at_ms: i64) {
        self.completed_at = Some(at_ms);
    }

    /// Record a refund against a settled order
    pub fn refund(&mut self, amount: f64) -> Result<(), InvalidTransition> {
        if !self.status.refundable() {
            return Err(InvalidTransition {
                from: self.status.as_str().to_string(),
                to: OrderStatus::Refunded.as_str().to_string(),
            });
        }
        self.refund_amount = Some(amount);
        self.status = OrderStatus::Refunded;
        Ok(())
    }

    /// Items not bound to any package
    pub fn standalone_items(&self) -> impl Iterator<Item = &ItemRecord> {
        self.items.iter().filter(|i| i.is_standalone())
    }
}

// ============================================================================
// Invoice
// ============================================================================

/// Invoice status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Sent,
}

/// Single invoice line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvoiceLine {
    pub description: String,
    pub quantity: i32,
    pub unit_price: f64,
    pub line_total: f64,
}

/// Invoice record - generated once per order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceRecord {
    pub invoice_id: String,
    pub order_id: String,
    pub lines: Vec<InvoiceLine>,
    pub subtotal: f64,
    pub total: f64,
    /// Amount saved by the applied discount, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_savings: Option<f64>,
    pub billing_address: Address,
    pub shipping_address: Address,
    pub status: InvoiceStatus,
    pub created_at: i64,
}

// ============================================================================
// Discount Use
// ============================================================================

/// Record of a discount application, tied to order + client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountUseRecord {
    pub id: String,
    pub order_id: String,
    pub client_id: String,
    pub code: String,
    /// Cart total fed into the calculator
    pub input_price: f64,
    /// Discounted total produced by the calculator
    pub output_price: f64,
    pub created_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_address() -> Address {
        Address {
            line1: "12 Harbour St".to_string(),
            line2: None,
            city: "Auckland".to_string(),
            region: None,
            postcode: "1010".to_string(),
            country: "NZ".to_string(),
        }
    }

    fn test_order() -> OrderRecord {
        OrderRecord::new(
            "order-1".to_string(),
            "client-1".to_string(),
            test_address(),
            test_address(),
            1_700_000_000_000,
        )
    }

    #[test]
    fn test_new_order_starts_in_cart() {
        let order = test_order();
        assert_eq!(order.status, OrderStatus::Cart);
        assert_eq!(order.shipping_status, ShippingStatus::ReadyForShipping);
        assert!(order.po_number.is_none());
    }

    #[test]
    fn test_refund_from_cart_rejected() {
        let mut order = test_order();
        let err = order.refund(10.0).unwrap_err();
        assert_eq!(err.from, "cart");
        assert_eq!(order.status, OrderStatus::Cart);
        assert!(order.refund_amount.is_none());
    }

    #[test]
    fn test_refund_from_paid_records_amount() {
        let mut order = test_order();
        order.set_status(OrderStatus::PaymentProvider).unwrap();
        order.set_status(OrderStatus::Paid).unwrap();
        order.refund(55.0).unwrap();
        assert_eq!(order.status, OrderStatus::Refunded);
        assert_eq!(order.refund_amount, Some(55.0));
    }

    #[test]
    fn test_invalid_status_transition() {
        let mut order = test_order();
        let err = order.set_status(OrderStatus::Emailed).unwrap_err();
        assert_eq!(err.from, "cart");
        assert_eq!(err.to, "emailed");
    }

    #[test]
    fn test_approval_is_one_way_until_cancelled() {
        let mut order = test_order();
        order.approve(1000);
        order.approve(2000);
        assert_eq!(order.approved_at, Some(1000));
        order.cancel_approval();
        assert!(order.approved_at.is_none());
        order.approve(3000);
        assert_eq!(order.approved_at, Some(3000));
    }

    #[test]
    fn test_shipping_cascades_to_package_items_only() {
        let mut order = test_order();
        order.items.push(ItemRecord {
            item_id: "i1".to_string(),
            kit_id: "kit-1".to_string(),
            name: "Standalone".to_string(),
            po_number: None,
            price: 10.0,
            quantity: 1,
            addons: vec![],
            order_package_id: None,
            shipping_status: ShippingStatus::ReadyForShipping,
            approved_at: None,
            delivery_date: None,
        });
        order.items.push(ItemRecord {
            item_id: "i2".to_string(),
            kit_id: "kit-2".to_string(),
            name: "Bundled".to_string(),
            po_number: None,
            price: 0.0,
            quantity: 1,
            addons: vec![],
            order_package_id: Some("op-1".to_string()),
            shipping_status: ShippingStatus::ReadyForShipping,
            approved_at: None,
            delivery_date: None,
        });

        order
            .set_shipping_status(ShippingStatus::ShippingDetailsSent)
            .unwrap();

        assert_eq!(
            order.items[0].shipping_status,
            ShippingStatus::ReadyForShipping
        );
        assert_eq!(
            order.items[1].shipping_status,
            ShippingStatus::ShippingDetailsSent
        );
    }
}
