//! redb-based storage layer for orders, invoices and clients
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `orders` | `order_id` | `OrderRecord` | Order aggregate (items + packages inline) |
//! | `invoices` | `order_id` | `InvoiceRecord` | One invoice per order |
//! | `discount_uses` | `id` | `DiscountUseRecord` | Discount application audit |
//! | `clients` | `client_id` | `ClientRecord` | Client directory |
//! | `client_emails` | lowercased email | `client_id` | Email lookup index |
//! | `counters` | `order_po` / `item_po` | `u64` | Purchase-order sequences |
//!
//! # Atomicity
//!
//! Order placement, payment settlement and refund all run inside a single
//! write transaction: callers `begin_write`, thread the transaction through
//! the mutation helpers, and commit only on success. Dropping the
//! transaction rolls everything back, so no partial orders are ever
//! visible. PO numbers are allocated from counter rows inside the same
//! transaction, which also makes the allocation crash-safe.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use shared::models::ClientRecord;
use shared::order::{DiscountUseRecord, InvoiceRecord, OrderRecord};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Table for orders: key = order_id, value = JSON-serialized OrderRecord
const ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");

/// Table for invoices: key = order_id, value = JSON-serialized InvoiceRecord
const INVOICES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("invoices");

/// Table for discount uses: key = id, value = JSON-serialized DiscountUseRecord
const DISCOUNT_USES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("discount_uses");

/// Table for clients: key = client_id, value = JSON-serialized ClientRecord
const CLIENTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("clients");

/// Table for email lookups: key = lowercased email, value = client_id
const CLIENT_EMAILS_TABLE: TableDefinition<&str, &str> = TableDefinition::new("client_emails");

/// Table for PO counters: key = counter name, value = u64
const COUNTERS_TABLE: TableDefinition<&str, u64> = TableDefinition::new("counters");

const ORDER_PO_KEY: &str = "order_po";
const ITEM_PO_KEY: &str = "item_po";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Checkout storage backed by redb
#[derive(Clone)]
pub struct CheckoutStorage {
    db: Arc<Database>,
}

impl CheckoutStorage {
    /// Open (or create) the database at the given path
    ///
    /// redb commits with `Durability::Immediate`, so the file is always in
    /// a consistent state even across power loss.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init_tables(db)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let db =
            Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init_tables(db)
    }

    fn init_tables(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(INVOICES_TABLE)?;
            let _ = write_txn.open_table(DISCOUNT_USES_TABLE)?;
            let _ = write_txn.open_table(CLIENTS_TABLE)?;
            let _ = write_txn.open_table(CLIENT_EMAILS_TABLE)?;

            let mut counters = write_txn.open_table(COUNTERS_TABLE)?;
            if counters.get(ORDER_PO_KEY)?.is_none() {
                counters.insert(ORDER_PO_KEY, 0u64)?;
            }
            if counters.get(ITEM_PO_KEY)?.is_none() {
                counters.insert(ITEM_PO_KEY, 0u64)?;
            }
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== PO Counters ==========

    /// Increment and return the order PO sequence (within transaction)
    pub fn next_order_po(&self, txn: &WriteTransaction) -> StorageResult<u64> {
        Self::bump_counter(txn, ORDER_PO_KEY)
    }

    /// Increment and return the item PO sequence (within transaction)
    ///
    /// Items sequence independently from orders.
    pub fn next_item_po(&self, txn: &WriteTransaction) -> StorageResult<u64> {
        Self::bump_counter(txn, ITEM_PO_KEY)
    }

    fn bump_counter(txn: &WriteTransaction, key: &str) -> StorageResult<u64> {
        let mut table = txn.open_table(COUNTERS_TABLE)?;
        let current = table.get(key)?.map(|guard| guard.value()).unwrap_or(0);
        let next = current + 1;
        table.insert(key, next)?;
        Ok(next)
    }

    // ========== Orders ==========

    /// Store (insert or update) an order within a transaction
    pub fn store_order(&self, txn: &WriteTransaction, order: &OrderRecord) -> StorageResult<()> {
        let mut table = txn.open_table(ORDERS_TABLE)?;
        let bytes = serde_json::to_vec(order)?;
        table.insert(order.order_id.as_str(), bytes.as_slice())?;
        Ok(())
    }

    /// Get an order within a write transaction (sees uncommitted writes)
    pub fn get_order_txn(
        &self,
        txn: &WriteTransaction,
        order_id: &str,
    ) -> StorageResult<Option<OrderRecord>> {
        let table = txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Get an order (committed state)
    pub fn get_order(&self, order_id: &str) -> StorageResult<Option<OrderRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// All committed orders
    pub fn get_all_orders(&self) -> StorageResult<Vec<OrderRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        let mut orders = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            orders.push(serde_json::from_slice(value.value())?);
        }
        Ok(orders)
    }

    /// Count approved orders routed to a clinic holding the given
    /// delivery date (within transaction, sees uncommitted writes)
    pub fn count_approved_for_clinic_date(
        &self,
        txn: &WriteTransaction,
        clinic_id: &str,
        date: chrono::NaiveDate,
    ) -> StorageResult<u32> {
        let table = txn.open_table(ORDERS_TABLE)?;
        let mut count = 0;
        for entry in table.iter()? {
            let (_, value) = entry?;
            let order: OrderRecord = serde_json::from_slice(value.value())?;
            if order.approved_at.is_some()
                && order.clinic_id.as_deref() == Some(clinic_id)
                && order.delivery_date == Some(date)
            {
                count += 1;
            }
        }
        Ok(count)
    }

    // ========== Invoices ==========

    /// Store an invoice within a transaction (keyed by order)
    pub fn store_invoice(
        &self,
        txn: &WriteTransaction,
        invoice: &InvoiceRecord,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(INVOICES_TABLE)?;
        let bytes = serde_json::to_vec(invoice)?;
        table.insert(invoice.order_id.as_str(), bytes.as_slice())?;
        Ok(())
    }

    /// Get an invoice within a write transaction (sees uncommitted writes)
    pub fn get_invoice_for_order_txn(
        &self,
        txn: &WriteTransaction,
        order_id: &str,
    ) -> StorageResult<Option<InvoiceRecord>> {
        let table = txn.open_table(INVOICES_TABLE)?;
        match table.get(order_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Get the invoice generated for an order
    pub fn get_invoice_for_order(&self, order_id: &str) -> StorageResult<Option<InvoiceRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(INVOICES_TABLE)?;
        match table.get(order_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    // ========== Discount Uses ==========

    /// Store a discount-use record within a transaction
    pub fn store_discount_use(
        &self,
        txn: &WriteTransaction,
        record: &DiscountUseRecord,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(DISCOUNT_USES_TABLE)?;
        let bytes = serde_json::to_vec(record)?;
        table.insert(record.id.as_str(), bytes.as_slice())?;
        Ok(())
    }

    /// All discount uses recorded against an order
    pub fn get_discount_uses_for_order(
        &self,
        order_id: &str,
    ) -> StorageResult<Vec<DiscountUseRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(DISCOUNT_USES_TABLE)?;
        let mut uses = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let record: DiscountUseRecord = serde_json::from_slice(value.value())?;
            if record.order_id == order_id {
                uses.push(record);
            }
        }
        Ok(uses)
    }

    // ========== Clients ==========

    /// Store a client and its email index entry within a transaction
    pub fn store_client(
        &self,
        txn: &WriteTransaction,
        client: &ClientRecord,
    ) -> StorageResult<()> {
        {
            let mut table = txn.open_table(CLIENTS_TABLE)?;
            let bytes = serde_json::to_vec(client)?;
            table.insert(client.client_id.as_str(), bytes.as_slice())?;
        }
        let mut emails = txn.open_table(CLIENT_EMAILS_TABLE)?;
        let email = client.email.to_lowercase();
        emails.insert(email.as_str(), client.client_id.as_str())?;
        Ok(())
    }

    /// Get a client (committed state)
    pub fn get_client(&self, client_id: &str) -> StorageResult<Option<ClientRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CLIENTS_TABLE)?;
        match table.get(client_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Look up a client by email within a write transaction
    pub fn get_client_by_email_txn(
        &self,
        txn: &WriteTransaction,
        email: &str,
    ) -> StorageResult<Option<ClientRecord>> {
        let lowered = email.to_lowercase();
        let client_id = {
            let emails = txn.open_table(CLIENT_EMAILS_TABLE)?;
            emails.get(lowered.as_str())?.map(|g| g.value().to_string())
        };
        let Some(client_id) = client_id else {
            return Ok(None);
        };
        let table = txn.open_table(CLIENTS_TABLE)?;
        match table.get(client_id.as_str())? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }
}
