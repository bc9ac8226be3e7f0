//! Order lifecycle module
//!
//! This module implements the order side of the checkout backend:
//!
//! - **actions**: one handler per order operation (place, refund,
//!   approve, shipping, lifecycle)
//! - **service**: transaction driving and post-commit event broadcast
//! - **storage**: redb-based persistence with explicit write transactions
//! - **money**: decimal arithmetic helpers and cart validation
//! - **traits**: the `CommandHandler` contract and transaction context
//!
//! # Action Flow
//!
//! ```text
//! Action → OrderService → CommandContext (write txn) → Storage (redb)
//!                ↓ commit
//!            Broadcast
//!                ↓
//!         All Subscribers
//! ```

pub mod actions;
pub mod error;
pub mod money;
pub mod service;
pub mod storage;
pub mod traits;

// Re-exports
pub use actions::{
    ApproveOrderAction, CancelApprovalAction, CompleteOrderAction, ExpireOrderAction,
    MarkEmailedAction, OrderAction, PlaceOrderAction, RefundOrderAction, RejectOrderAction,
    UpdateShippingAction,
};
pub use error::{OrderError, OrderResult};
pub use service::OrderService;
pub use storage::{CheckoutStorage, StorageError, StorageResult};
pub use traits::{CommandContext, CommandHandler, CommandMetadata};
