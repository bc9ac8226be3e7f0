//! PlaceOrder command handler
//!
//! Materializes a checkout cart as an order: order row, PO allocation,
//! discount-use audit, packages with their add-ons, package-bound and
//! standalone items, and the invoice. Runs entirely inside the caller's
//! write transaction; any failure rolls the whole order back.

use async_trait::async_trait;
use chrono::NaiveDate;
use shared::models::ClientRecord;
use shared::order::{
    AddonLine, AddonSelection, CheckoutInput, DiscountUseRecord, DomainEvent, DomainEventKind,
    ItemRecord, OrderPackageRecord, OrderRecord, ShippingStatus,
};

use crate::discounts::AppliedDiscount;
use crate::invoices;
use crate::orders::money;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata};
use crate::orders::OrderError;
use crate::pricing;

/// PlaceOrder action
///
/// Pricing, discount application and delivery-date resolution happen
/// before the transaction; this action only persists the outcome.
#[derive(Debug, Clone)]
pub struct PlaceOrderAction {
    pub order_id: String,
    pub input: CheckoutInput,
    /// Raw (undiscounted) cart total
    pub raw_total: f64,
    pub applied_discount: Option<AppliedDiscount>,
    /// Resolved order-level delivery date
    pub delivery_date: Option<NaiveDate>,
    /// Whether the delivery date came from an explicit client preference
    pub delivery_date_confirmed: bool,
    /// Resolved per-item dates, parallel to `input.items` (None = follow order)
    pub item_delivery_dates: Vec<Option<NaiveDate>>,
    /// Affiliate commission rate
    pub affiliate_rate: f64,
    /// Date component of allocated PO numbers (yyyymmdd, business timezone)
    pub po_date: String,
}

fn addon_lines(addons: &[AddonSelection]) -> Vec<AddonLine> {
    addons
        .iter()
        .map(|a| AddonLine {
            addon_id: a.addon_id.clone(),
            name: a.name.clone(),
            price: a.price,
        })
        .collect()
}

#[async_trait]
impl CommandHandler for PlaceOrderAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<DomainEvent>, OrderError> {
        // 1. Validate the cart payload
        if self.input.items.is_empty() && self.input.packages.is_empty() {
            return Err(OrderError::InvalidCart("cart is empty".to_string()));
        }
        for item in &self.input.items {
            money::validate_cart_item(item)?;
        }
        for package in &self.input.packages {
            money::validate_package(package)?;
        }

        // 2. First-or-create the client
        let client = match ctx.find_client_by_email(&self.input.client.email)? {
            Some(existing) => existing,
            None => {
                let client = ClientRecord {
                    client_id: uuid::Uuid::new_v4().to_string(),
                    name: self.input.client.name.clone(),
                    email: self.input.client.email.clone(),
                    phone: self.input.client.phone.clone(),
                    delegated: self.input.delegate.is_some(),
                    created_at: metadata.timestamp,
                };
                ctx.save_client(&client)?;
                client
            }
        };

        // 3. Insert the order row in `cart` status
        let mut order = OrderRecord::new(
            self.order_id.clone(),
            client.client_id.clone(),
            self.input.billing_address.clone(),
            self.input.shipping_address.clone(),
            metadata.timestamp,
        );
        order.affiliate_id = self.input.affiliate_id.clone();
        order.clinic_id = self.input.clinic_id.clone();
        order.delegate = self.input.delegate.clone();
        order.discount_code = self
            .applied_discount
            .as_ref()
            .map(|d| d.code.clone());
        order.delivery_date = self.delivery_date;
        order.delivery_date_confirmed = self.delivery_date_confirmed;
        ctx.save_order(&order)?;

        // 4. Second phase: final price, PO number, affiliate payout.
        //    The PO number depends on the row existing, so this stays a
        //    separate update even inside one transaction.
        let final_price = self
            .applied_discount
            .as_ref()
            .map(|d| d.output_price)
            .unwrap_or(self.raw_total);
        let po_seq = ctx.next_order_po()?;
        order.po_number = Some(format!("PO{}{}", self.po_date, 10_000 + po_seq));
        order.final_price = final_price;
        if order.affiliate_id.is_some() {
            order.affiliate_payout = pricing::affiliate_payout(final_price, self.affiliate_rate);
        }
        order.updated_at = metadata.timestamp;
        ctx.save_order(&order)?;

        // 5. Record the discount application
        if let Some(discount) = &self.applied_discount {
            ctx.save_discount_use(&DiscountUseRecord {
                id: uuid::Uuid::new_v4().to_string(),
                order_id: order.order_id.clone(),
                client_id: client.client_id.clone(),
                code: discount.code.clone(),
                input_price: discount.input_price,
                output_price: discount.output_price,
                created_at: metadata.timestamp,
            })?;
        }

        // 6. Materialize packages and their bound items
        for selection in &self.input.packages {
            let order_package_id = uuid::Uuid::new_v4().to_string();
            order.packages.push(OrderPackageRecord {
                order_package_id: order_package_id.clone(),
                package_id: selection.package_id.clone(),
                name: selection.name.clone(),
                price: selection.price,
                quantity: selection.quantity,
                addons: addon_lines(&selection.addons),
            });
            for item in &selection.items {
                order.items.push(ItemRecord {
                    item_id: uuid::Uuid::new_v4().to_string(),
                    kit_id: item.kit_id.clone(),
                    name: item.name.clone(),
                    po_number: None,
                    price: item.price,
                    quantity: item.quantity,
                    addons: addon_lines(&item.addons),
                    order_package_id: Some(order_package_id.clone()),
                    shipping_status: ShippingStatus::ReadyForShipping,
                    approved_at: None,
                    delivery_date: self.delivery_date,
                });
            }
        }

        // 7. Standalone items, each with its own PO number
        for (idx, item) in self.input.items.iter().enumerate() {
            let po_seq = ctx.next_item_po()?;
            let delivery_date = self
                .item_delivery_dates
                .get(idx)
                .copied()
                .flatten()
                .or(self.delivery_date);
            order.items.push(ItemRecord {
                item_id: uuid::Uuid::new_v4().to_string(),
                kit_id: item.kit_id.clone(),
                name: item.name.clone(),
                po_number: Some(format!("KI{}{}", self.po_date, 10_000 + po_seq)),
                price: item.price,
                quantity: item.quantity,
                addons: addon_lines(&item.addons),
                order_package_id: None,
                shipping_status: ShippingStatus::ReadyForShipping,
                approved_at: None,
                delivery_date,
            });
        }
        ctx.save_order(&order)?;

        // 8. Invoice: lines assembled first, then the record
        let invoice =
            invoices::build_invoice(&order, self.applied_discount.as_ref(), metadata.timestamp);
        ctx.save_invoice(&invoice)?;

        // 9. Event
        let po_number = order.po_number.clone().unwrap_or_default();
        Ok(vec![DomainEvent::new(
            order.order_id.clone(),
            metadata.timestamp,
            DomainEventKind::OrderPlaced {
                po_number,
                final_price,
            },
        )])
    }
}
