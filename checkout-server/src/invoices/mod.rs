//! Invoice generation
//!
//! One invoice per order, built inside the placement transaction. Lines
//! are assembled first, then the invoice record referencing them: one
//! line per package, one per package-less item (add-ons included in the
//! line total).

use rust_decimal::Decimal;
use shared::order::{InvoiceLine, InvoiceRecord, InvoiceStatus, OrderRecord};

use crate::discounts::AppliedDiscount;
use crate::orders::money::{to_decimal, to_f64};

/// Build the invoice for a freshly placed order
pub fn build_invoice(
    order: &OrderRecord,
    discount: Option<&AppliedDiscount>,
    created_at: i64,
) -> InvoiceRecord {
    let mut lines = Vec::new();
    let mut subtotal = Decimal::ZERO;

    for package in &order.packages {
        let line_total = to_decimal(package.price) * Decimal::from(package.quantity);
        subtotal += line_total;
        lines.push(InvoiceLine {
            description: package.name.clone(),
            quantity: package.quantity,
            unit_price: package.price,
            line_total: to_f64(line_total),
        });
    }

    for item in order.standalone_items() {
        let addons: Decimal = item.addons.iter().map(|a| to_decimal(a.price)).sum();
        let line_total = to_decimal(item.price) * Decimal::from(item.quantity) + addons;
        subtotal += line_total;
        lines.push(InvoiceLine {
            description: item.name.clone(),
            quantity: item.quantity,
            unit_price: item.price,
            line_total: to_f64(line_total),
        });
    }

    let savings = discount.map(|d| d.savings());
    let total = subtotal - savings.map(to_decimal).unwrap_or(Decimal::ZERO);

    InvoiceRecord {
        invoice_id: uuid::Uuid::new_v4().to_string(),
        order_id: order.order_id.clone(),
        lines,
        subtotal: to_f64(subtotal),
        total: to_f64(total.max(Decimal::ZERO)),
        discount_savings: savings,
        billing_address: order.billing_address.clone(),
        shipping_address: order.shipping_address.clone(),
        status: InvoiceStatus::Draft,
        created_at,
    }
}

/// Flip a draft invoice to sent
pub fn mark_sent(invoice: &mut InvoiceRecord) {
    invoice.status = InvoiceStatus::Sent;
}
