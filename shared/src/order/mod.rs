//! Order domain types
//!
//! - **types**: status enums, checkout inputs, typed addresses
//! - **record**: persisted order/item/invoice/discount-use records
//! - **event**: domain events broadcast after transaction commit

pub mod event;
pub mod record;
pub mod types;

pub use event::{DomainEvent, DomainEventKind};
pub use record::{
    AddonLine, DiscountUseRecord, InvoiceLine, InvoiceRecord, InvoiceStatus, ItemRecord,
    OrderPackageRecord, OrderRecord,
};
pub use types::{
    Address, AddonSelection, CartItemInput, CheckoutInput, DelegateInfo, DiscountResponse,
    InvalidTransition, OrderStatus, PackageSelection, PaymentData, ShippingStatus,
};
