//! Shared types for the order lifecycle

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::ClientPayload;

// ============================================================================
// Status Axes
// ============================================================================

/// Attempted status change that the state machine forbids
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid transition: {from} -> {to}")]
pub struct InvalidTransition {
    pub from: String,
    pub to: String,
}

/// Order payment/lifecycle status
///
/// Wire values are kebab-case to match the persisted column values.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    /// Created, not yet handed to a payment provider
    #[default]
    Cart,
    /// Handed off to the payment provider, awaiting outcome
    PaymentProvider,
    /// Payment settled (or zero-priced)
    Paid,
    /// Confirmation email delivered
    Emailed,
    /// Abandoned before payment completed
    Expired,
    /// Declined by review or by the provider
    Rejected,
    /// Refunded after settlement
    Refunded,
}

impl OrderStatus {
    /// Whether the state machine permits moving to `to`
    ///
    /// cart -> payment-provider -> paid -> emailed, with expired/rejected
    /// reachable before settlement and refunded reachable after it.
    pub fn can_transition(self, to: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, to),
            (Cart, PaymentProvider)
                | (Cart, Paid)
                | (Cart, Expired)
                | (Cart, Rejected)
                | (PaymentProvider, Paid)
                | (PaymentProvider, Expired)
                | (PaymentProvider, Rejected)
                | (Paid, Emailed)
                | (Paid, Refunded)
                | (Emailed, Refunded)
                | (Refunded, Refunded)
        )
    }

    /// Statuses a refund may be issued from
    pub fn refundable(self) -> bool {
        matches!(
            self,
            OrderStatus::Paid | OrderStatus::Emailed | OrderStatus::Refunded
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Cart => "cart",
            OrderStatus::PaymentProvider => "payment-provider",
            OrderStatus::Paid => "paid",
            OrderStatus::Emailed => "emailed",
            OrderStatus::Expired => "expired",
            OrderStatus::Rejected => "rejected",
            OrderStatus::Refunded => "refunded",
        }
    }
}

/// Shipping status - independent axis from payment status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ShippingStatus {
    #[default]
    ReadyForShipping,
    ShippingDetailsSent,
    Shipped,
}

impl ShippingStatus {
    /// Forward-only: ready-for-shipping -> shipping-details-sent -> shipped
    pub fn can_transition(self, to: ShippingStatus) -> bool {
        use ShippingStatus::*;
        matches!(
            (self, to),
            (ReadyForShipping, ShippingDetailsSent) | (ShippingDetailsSent, Shipped)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ShippingStatus::ReadyForShipping => "ready-for-shipping",
            ShippingStatus::ShippingDetailsSent => "shipping-details-sent",
            ShippingStatus::Shipped => "shipped",
        }
    }
}

// ============================================================================
// Address
// ============================================================================

/// Postal address value object
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Address {
    pub line1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub postcode: String,
    pub country: String,
}

// ============================================================================
// Checkout Inputs
// ============================================================================

/// Add-on selected for an item or package line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddonSelection {
    pub addon_id: String,
    pub name: String,
    pub price: f64,
}

/// Cart item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItemInput {
    pub kit_id: String,
    pub name: String,
    pub price: f64,
    pub quantity: i32,
    #[serde(default)]
    pub addons: Vec<AddonSelection>,
    /// Item-level preferred delivery date (free-form, `"empty"` = none)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_delivery_date: Option<String>,
}

/// Package selected in the cart, with its contained items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageSelection {
    pub package_id: String,
    pub name: String,
    pub price: f64,
    pub quantity: i32,
    #[serde(default)]
    pub addons: Vec<AddonSelection>,
    /// Items shipped under this package (bound to its delivery schedule)
    #[serde(default)]
    pub items: Vec<CartItemInput>,
}

/// Delegate operating a client account (clinic staff)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DelegateInfo {
    pub name: String,
    pub email: String,
}

/// Payment payload forwarded to the provider abstraction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentData {
    /// Provider name: `stripe` | `splitit`
    pub provider: String,
    /// Provider-issued payment token / intent id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Installment count (SplitIt plans)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installments: Option<u32>,
}

/// Full checkout payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutInput {
    pub client: ClientPayload,
    #[serde(default)]
    pub items: Vec<CartItemInput>,
    #[serde(default)]
    pub packages: Vec<PackageSelection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affiliate_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clinic_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delegate: Option<DelegateInfo>,
    pub billing_address: Address,
    pub shipping_address: Address,
    /// Order-level preferred delivery date (`"empty"` = none)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_delivery_date: Option<String>,
    pub payment: PaymentData,
}

// ============================================================================
// Collaborator Outputs
// ============================================================================

/// Result returned by the discount calculator collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountResponse {
    pub success: bool,
    /// Cart total before the discount
    pub subtotal: f64,
    /// Cart total after the discount
    pub total: f64,
}
