//! Checkout orchestration
//!
//! # Checkout Flow
//!
//! ```text
//! checkout(input)
//!     ├─ 1. Validate customer payload
//!     ├─ 2. Price the cart (raw total)
//!     ├─ 3. Apply discount (errors swallowed, cart keeps raw total)
//!     ├─ 4. Resolve delivery dates (order + divergent items)
//!     ├─ 5. Begin write transaction
//!     │      ├─ PlaceOrderAction (order, items, packages, invoice)
//!     │      └─ Payment: zero-priced → paid directly,
//!     │                  otherwise provider hop → paid
//!     ├─ 6. Commit (any failure above rolls the whole order back)
//!     ├─ 7. Broadcast domain events
//!     └─ 8. Send notification email → mark emailed
//! ```
//!
//! The notification runs outside the transaction: a mail failure leaves
//! the order paid and is retried by operators, never unwinding the sale.


use shared::order::{
    CheckoutInput, DomainEvent, DomainEventKind, OrderRecord, OrderStatus, PaymentData,
};
use shared::{ErrorCategory, ErrorCode, ErrorEnvelope};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use validator::ValidateEmail;

use crate::core::Config;
use crate::delivery;
use crate::discounts::{self, DiscountCalculator};
use crate::orders::storage::StorageError;
use crate::orders::{
    CommandContext, CommandHandler, CommandMetadata, MarkEmailedAction, OrderAction, OrderError,
    OrderService, PlaceOrderAction,
};
use crate::providers::{
    Mailer, Notification, ProviderError, ProviderRegistry, PROVIDER_SPLITIT,
};
use crate::services::CatalogService;

/// Checkout failures surfaced to the caller
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Order(#[from] OrderError),

    #[error("Payment action required: {0}")]
    PaymentActionRequired(String),

    #[error("Payment failed: {0}")]
    PaymentFailure(String),

    #[error("Invalid customer: {0}")]
    InvalidCustomer(String),

    #[error("Unknown payment provider: {0}")]
    UnknownProvider(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CheckoutError {
    /// Wire-level error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CheckoutError::Order(e) => e.code(),
            CheckoutError::PaymentActionRequired(_) => ErrorCode::PaymentActionRequired,
            CheckoutError::PaymentFailure(_) => ErrorCode::PaymentFailed,
            CheckoutError::InvalidCustomer(_) => ErrorCode::InvalidCustomer,
            CheckoutError::UnknownProvider(_) => ErrorCode::UnknownProvider,
            CheckoutError::Internal(_) => ErrorCode::InternalError,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code() as u16)
    }

    /// Serializable envelope; system failures get a generic message and
    /// keep the technical detail in the logs
    pub fn envelope(&self) -> ErrorEnvelope {
        let code = self.code();
        match self.category() {
            ErrorCategory::System => ErrorEnvelope::new(code, "something went wrong"),
            _ => ErrorEnvelope::new(code, self.to_string()),
        }
    }
}

/// Checkout orchestration service
pub struct CheckoutService {
    orders: Arc<OrderService>,
    catalog: Arc<dyn CatalogService>,
    calculator: Arc<dyn DiscountCalculator>,
    providers: ProviderRegistry,
    mailer: Arc<dyn Mailer>,
    config: Config,
}

impl CheckoutService {
    pub fn new(
        orders: Arc<OrderService>,
        catalog: Arc<dyn CatalogService>,
        calculator: Arc<dyn DiscountCalculator>,
        providers: ProviderRegistry,
        mailer: Arc<dyn Mailer>,
        config: Config,
    ) -> Self {
        Self {
            orders,
            catalog,
            calculator,
            providers,
            mailer,
            config,
        }
    }

    /// Run the full checkout
    ///
    /// On non-business failures a pending SplitIt installment plan is
    /// cancelled best-effort before the error is surfaced.
    pub async fn checkout(&self, input: CheckoutInput) -> Result<OrderRecord, CheckoutError> {
        let payment = input.payment.clone();
        match self.checkout_inner(input).await {
            Ok(order) => Ok(order),
            Err(err) => {
                tracing::warn!(error = %err, code = %err.code(), "checkout failed");
                if err.category() == ErrorCategory::System {
                    self.compensate_installment(&payment).await;
                }
                Err(err)
            }
        }
    }

    async fn checkout_inner(&self, input: CheckoutInput) -> Result<OrderRecord, CheckoutError> {
        // 1. Customer payload
        self.validate_customer(&input)?;

        // 2. Raw cart total
        let raw_total =
            crate::orders::money::to_f64(crate::pricing::cart_total(&input.items, &input.packages));

        // 3. Discount (non-fatal: failures leave the raw total in place)
        let applied_discount = match input.discount_code.as_deref() {
            Some(code) => {
                discounts::apply_discount(
                    self.catalog.as_ref(),
                    self.calculator.as_ref(),
                    code,
                    &input.items,
                    &input.packages,
                    &input.client.email,
                )
                .await
            }
            None => None,
        };
        let final_price = applied_discount
            .as_ref()
            .map(|d| d.output_price)
            .unwrap_or(raw_total);

        // 4. Delivery dates (order-level plus divergent standalone items)
        let blackouts: HashSet<chrono::NaiveDate> = input
            .clinic_id
            .as_deref()
            .and_then(|id| self.catalog.clinic(id))
            .map(|c| c.blackout_dates.iter().copied().collect())
            .unwrap_or_default();
        let now = self.orders.now_local();
        let explicit_preference =
            delivery::parse_preferred(input.preferred_delivery_date.as_deref()).is_some();
        let delivery_date = delivery::resolve_delivery_date(
            input.preferred_delivery_date.as_deref(),
            &now,
            self.config.dispatch_cutoff,
            &blackouts,
            self.config.delivery_scan_days,
        )
        .map_err(OrderError::from)?;
        let mut item_delivery_dates = Vec::with_capacity(input.items.len());
        for item in &input.items {
            let preferred = item.preferred_delivery_date.as_deref();
            let resolved = match delivery::parse_preferred(preferred) {
                Some(_) => Some(
                    delivery::resolve_delivery_date(
                        preferred,
                        &now,
                        self.config.dispatch_cutoff,
                        &blackouts,
                        self.config.delivery_scan_days,
                    )
                    .map_err(OrderError::from)?,
                ),
                None => None,
            };
            item_delivery_dates.push(resolved);
        }

        // 5. Place and pay inside one transaction
        let order_id = uuid::Uuid::new_v4().to_string();
        let metadata = CommandMetadata::new("checkout", self.orders.now_ms());
        let action = PlaceOrderAction {
            order_id: order_id.clone(),
            input: input.clone(),
            raw_total,
            applied_discount: applied_discount.clone(),
            delivery_date: Some(delivery_date),
            delivery_date_confirmed: explicit_preference,
            item_delivery_dates,
            affiliate_rate: self.config.affiliate_rate,
            po_date: self.orders.po_date(),
        };

        let storage = self.orders.storage();
        let txn = storage.begin_write().map_err(OrderError::from)?;
        let events = {
            let mut ctx = CommandContext::new(&txn, storage);
            let mut events = action.execute(&mut ctx, &metadata).await?;

            let mut order = ctx.load_order(&order_id)?;
            if final_price <= 0.0 {
                // Nothing to charge: settle directly, the provider is
                // never invoked
                order
                    .set_status(OrderStatus::Paid)
                    .map_err(OrderError::from)?;
                order.updated_at = metadata.timestamp;
                ctx.save_order(&order)?;
                events.push(DomainEvent::new(
                    order_id.clone(),
                    metadata.timestamp,
                    DomainEventKind::OrderPaid {
                        provider: None,
                        payment_reference: None,
                    },
                ));
            } else {
                let provider_name = input.payment.provider.clone();
                let provider = self
                    .providers
                    .get(&provider_name)
                    .ok_or_else(|| CheckoutError::UnknownProvider(provider_name.clone()))?;

                order
                    .set_status(OrderStatus::PaymentProvider)
                    .map_err(OrderError::from)?;
                order.payment_provider = Some(provider_name.clone());
                ctx.save_order(&order)?;

                let outcome = provider
                    .pay(&order, &input.payment)
                    .await
                    .map_err(payment_error)?;

                order.payment_reference = Some(outcome.reference.clone());
                order
                    .set_status(OrderStatus::Paid)
                    .map_err(OrderError::from)?;
                order.updated_at = metadata.timestamp;
                ctx.save_order(&order)?;
                events.push(DomainEvent::new(
                    order_id.clone(),
                    metadata.timestamp,
                    DomainEventKind::OrderPaid {
                        provider: Some(provider_name),
                        payment_reference: Some(outcome.reference),
                    },
                ));
            }
            events
        };

        // 6. Commit - everything above becomes visible atomically
        txn.commit()
            .map_err(|e| OrderError::from(StorageError::from(e)))?;

        // 7. Events only flow after commit
        self.orders.broadcast(events);

        // 8. Notification outside the transaction
        self.notify(&order_id).await;

        Ok(storage
            .get_order(&order_id)
            .map_err(OrderError::from)?
            .ok_or(OrderError::OrderNotFound(order_id))?)
    }

    fn validate_customer(&self, input: &CheckoutInput) -> Result<(), CheckoutError> {
        if input.client.name.trim().is_empty() {
            return Err(CheckoutError::InvalidCustomer(
                "client name is required".to_string(),
            ));
        }
        if !input.client.email.validate_email() {
            return Err(CheckoutError::InvalidCustomer(format!(
                "invalid client email: {}",
                input.client.email
            )));
        }
        if let Some(delegate) = &input.delegate
            && !delegate.email.validate_email()
        {
            return Err(CheckoutError::InvalidCustomer(format!(
                "invalid delegate email: {}",
                delegate.email
            )));
        }
        Ok(())
    }

    /// Best-effort cancellation of a pending SplitIt installment plan
    async fn compensate_installment(&self, payment: &PaymentData) {
        if payment.provider != PROVIDER_SPLITIT {
            return;
        }
        let Some(provider) = self.providers.get(PROVIDER_SPLITIT) else {
            return;
        };
        if let Err(e) = provider.cancel_installment(payment).await {
            tracing::error!(
                error = %e,
                "failed to cancel installment plan after checkout failure"
            );
        }
    }

    /// Send the confirmation email and advance `paid -> emailed`
    ///
    /// Failures are logged; the order stays `paid` for operator retry.
    async fn notify(&self, order_id: &str) {
        let Ok(Some(order)) = self.orders.storage().get_order(order_id) else {
            return;
        };
        let client = self
            .orders
            .storage()
            .get_client(&order.client_id)
            .ok()
            .flatten();
        let to = notification_recipients(
            &order,
            client.as_ref().map(|c| c.email.as_str()),
            &self.config,
        );
        if to.is_empty() {
            tracing::warn!(order_id = %order_id, "no notification recipients, skipping email");
            return;
        }

        let notification = Notification {
            to,
            subject: format!(
                "Your order {} is confirmed",
                order.po_number.as_deref().unwrap_or(order_id)
            ),
            order_id: order_id.to_string(),
        };

        match self.mailer.send(&notification).await {
            Ok(()) => {
                if let Err(e) = self
                    .orders
                    .execute(
                        OrderAction::MarkEmailed(MarkEmailedAction {
                            order_id: order_id.to_string(),
                        }),
                        "mailer",
                    )
                    .await
                {
                    tracing::warn!(order_id = %order_id, error = %e, "failed to mark order emailed");
                }
            }
            Err(e) => {
                tracing::warn!(
                    order_id = %order_id,
                    error = %e,
                    "confirmation email failed, order stays paid"
                );
            }
        }
    }
}

/// Map a provider charge failure onto the checkout taxonomy
fn payment_error(e: ProviderError) -> CheckoutError {
    match e {
        ProviderError::ActionRequired(msg) => CheckoutError::PaymentActionRequired(msg),
        ProviderError::Declined(msg) => CheckoutError::PaymentFailure(msg),
        ProviderError::Unavailable(msg) => {
            tracing::error!(error = %msg, "payment provider unavailable");
            CheckoutError::Internal(msg)
        }
    }
}

/// Resolve who receives the confirmation email
///
/// Delegated accounts route to the delegate instead of the client; the
/// partner discount code adds a copy to the partner desk.
pub(crate) fn notification_recipients(
    order: &OrderRecord,
    client_email: Option<&str>,
    config: &Config,
) -> Vec<String> {
    let mut recipients = match &order.delegate {
        Some(delegate) => vec![delegate.email.clone()],
        None => client_email.map(|e| vec![e.to_string()]).unwrap_or_default(),
    };

    if let Some(code) = &order.discount_code
        && code.eq_ignore_ascii_case(&config.partner_discount_code)
        && !config.partner_notification_email.is_empty()
    {
        recipients.push(config.partner_notification_email.clone());
    }

    recipients
}
