//! Order business-rule errors

use shared::ErrorCode;
use shared::order::InvalidTransition;
use thiserror::Error;

use super::storage::StorageError;

/// Business-rule violations raised by order actions
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),

    #[error("Refund not permitted from status {0}")]
    RefundNotPermitted(String),

    #[error("Order has no payment reference")]
    MissingPaymentReference,

    #[error("Refund failed: {0}")]
    RefundFailed(String),

    #[error("Unknown payment provider: {0}")]
    UnknownProvider(String),

    #[error("No deliverable date within {0} days")]
    NoDeliveryCapacity(u32),

    #[error("Invalid cart: {0}")]
    InvalidCart(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl OrderError {
    /// Wire-level error code for this failure
    pub fn code(&self) -> ErrorCode {
        match self {
            OrderError::OrderNotFound(_) => ErrorCode::OrderNotFound,
            OrderError::InvalidTransition(_) => ErrorCode::InvalidOrderStatus,
            OrderError::RefundNotPermitted(_) => ErrorCode::RefundNotPermitted,
            OrderError::MissingPaymentReference => ErrorCode::MissingPaymentReference,
            OrderError::RefundFailed(_) => ErrorCode::RefundFailed,
            OrderError::UnknownProvider(_) => ErrorCode::UnknownProvider,
            OrderError::NoDeliveryCapacity(_) => ErrorCode::NoDeliveryCapacity,
            OrderError::InvalidCart(_) => ErrorCode::InvalidCart,
            OrderError::Storage(_) => ErrorCode::StorageError,
        }
    }
}

pub type OrderResult<T> = Result<T, OrderError>;
