//! Shared types for the medkit checkout platform
//!
//! Common types used across crates: catalog models, order records and
//! checkout inputs, domain events, and unified error codes.

pub mod error;
pub mod models;
pub mod order;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{ErrorCategory, ErrorCode, ErrorEnvelope};
pub use order::{DomainEvent, DomainEventKind, OrderRecord, OrderStatus, ShippingStatus};
