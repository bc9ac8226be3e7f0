//! Payment provider and mailer abstractions
//!
//! Providers are resolved by name at checkout time (`stripe` |
//! `splitit`). The SDK integrations live behind these traits; the server
//! only sees the outcome.

use async_trait::async_trait;
use shared::order::{OrderRecord, PaymentData};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Provider name for Stripe card payments
pub const PROVIDER_STRIPE: &str = "stripe";
/// Provider name for SplitIt installment plans
pub const PROVIDER_SPLITIT: &str = "splitit";

/// Failure reported by a payment provider
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// The customer must complete a follow-up step (3DS etc.)
    #[error("payment action required: {0}")]
    ActionRequired(String),

    /// The charge was declined
    #[error("payment declined: {0}")]
    Declined(String),

    /// Transport/availability failure, outcome unknown
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

/// Successful charge outcome
#[derive(Debug, Clone)]
pub struct PaymentOutcome {
    /// Provider-side reference, stored for later refunds
    pub reference: String,
}

/// Payment provider contract
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Name this provider registers under
    fn name(&self) -> &str;

    /// Charge the order
    async fn pay(
        &self,
        order: &OrderRecord,
        payment: &PaymentData,
    ) -> Result<PaymentOutcome, ProviderError>;

    /// Refund a previously settled charge
    async fn refund(&self, payment_reference: &str, amount: f64) -> Result<(), ProviderError>;

    /// Cancel a pending installment plan (SplitIt compensation path)
    async fn cancel_installment(&self, payment: &PaymentData) -> Result<(), ProviderError>;
}

/// Registry resolving providers by name
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn PaymentProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, provider: Arc<dyn PaymentProvider>) {
        self.providers
            .insert(provider.name().to_string(), provider);
    }

    pub fn with(mut self, provider: Arc<dyn PaymentProvider>) -> Self {
        self.register(provider);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn PaymentProvider>> {
        self.providers.get(name).cloned()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.providers.keys().collect::<Vec<_>>())
            .finish()
    }
}

// ============================================================================
// Mailer
// ============================================================================

/// Mail delivery failure
#[derive(Debug, Clone, Error)]
#[error("mail delivery failed: {0}")]
pub struct MailError(pub String);

/// Outgoing order notification
#[derive(Debug, Clone)]
pub struct Notification {
    pub to: Vec<String>,
    pub subject: String,
    pub order_id: String,
}

/// Mailer contract - templates and transport live behind this
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), MailError>;
}
