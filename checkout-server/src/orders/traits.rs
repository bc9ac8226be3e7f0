//! Action execution traits and transaction context

use async_trait::async_trait;
use chrono::NaiveDate;
use redb::WriteTransaction;
use shared::models::ClientRecord;
use shared::order::{DiscountUseRecord, DomainEvent, InvoiceRecord, OrderRecord};

use super::error::OrderError;
use super::storage::CheckoutStorage;

/// Metadata attached to every executed action
#[derive(Debug, Clone)]
pub struct CommandMetadata {
    /// Unique id of the triggering request
    pub command_id: String,
    /// Who triggered the action ("checkout", an operator id, ...)
    pub actor: String,
    /// Server timestamp (Unix milliseconds)
    pub timestamp: i64,
}

impl CommandMetadata {
    pub fn new(actor: impl Into<String>, timestamp: i64) -> Self {
        Self {
            command_id: uuid::Uuid::new_v4().to_string(),
            actor: actor.into(),
            timestamp,
        }
    }
}

/// Execution context - wraps the write transaction every action runs in
///
/// Everything written through the context becomes visible atomically when
/// the caller commits; dropping the transaction discards all of it.
pub struct CommandContext<'a> {
    txn: &'a WriteTransaction,
    storage: &'a CheckoutStorage,
}

impl<'a> CommandContext<'a> {
    pub fn new(txn: &'a WriteTransaction, storage: &'a CheckoutStorage) -> Self {
        Self { txn, storage }
    }

    /// Load an order, failing if it does not exist
    pub fn load_order(&self, order_id: &str) -> Result<OrderRecord, OrderError> {
        self.storage
            .get_order_txn(self.txn, order_id)?
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))
    }

    pub fn save_order(&self, order: &OrderRecord) -> Result<(), OrderError> {
        Ok(self.storage.store_order(self.txn, order)?)
    }

    pub fn save_invoice(&self, invoice: &InvoiceRecord) -> Result<(), OrderError> {
        Ok(self.storage.store_invoice(self.txn, invoice)?)
    }

    /// The invoice generated for an order, if one exists yet
    pub fn find_invoice(&self, order_id: &str) -> Result<Option<InvoiceRecord>, OrderError> {
        Ok(self.storage.get_invoice_for_order_txn(self.txn, order_id)?)
    }

    pub fn save_discount_use(&self, record: &DiscountUseRecord) -> Result<(), OrderError> {
        Ok(self.storage.store_discount_use(self.txn, record)?)
    }

    pub fn save_client(&self, client: &ClientRecord) -> Result<(), OrderError> {
        Ok(self.storage.store_client(self.txn, client)?)
    }

    pub fn find_client_by_email(&self, email: &str) -> Result<Option<ClientRecord>, OrderError> {
        Ok(self.storage.get_client_by_email_txn(self.txn, email)?)
    }

    /// Allocate the next order PO sequence number
    pub fn next_order_po(&self) -> Result<u64, OrderError> {
        Ok(self.storage.next_order_po(self.txn)?)
    }

    /// Allocate the next item PO sequence number
    pub fn next_item_po(&self) -> Result<u64, OrderError> {
        Ok(self.storage.next_item_po(self.txn)?)
    }

    /// Approved orders routed to `clinic_id` holding `date`
    pub fn count_approved_for_clinic_date(
        &self,
        clinic_id: &str,
        date: NaiveDate,
    ) -> Result<u32, OrderError> {
        Ok(self
            .storage
            .count_approved_for_clinic_date(self.txn, clinic_id, date)?)
    }
}

/// Trait implemented by every order action
///
/// Actions mutate records through the context and return the domain
/// events to broadcast once the surrounding transaction commits.
#[async_trait]
pub trait CommandHandler {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<DomainEvent>, OrderError>;
}
