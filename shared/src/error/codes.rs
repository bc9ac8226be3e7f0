//! Unified error codes for the checkout platform
//!
//! Error codes are represented as u16 values for efficient serialization
//! and cross-language compatibility.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order is in the wrong status for the requested operation
    InvalidOrderStatus = 4002,
    /// Refund is not permitted from the current status
    RefundNotPermitted = 4003,
    /// Order has no payment reference to refund against
    MissingPaymentReference = 4004,
    /// No valid delivery date within the scan window
    NoDeliveryCapacity = 4005,
    /// Cart payload failed a business check (price/quantity bounds)
    InvalidCart = 4006,
    /// Invalid customer payload
    InvalidCustomer = 4007,

    // ==================== 5xxx: Payment ====================
    /// Payment provider requires a follow-up customer action
    PaymentActionRequired = 5001,
    /// Payment was declined or failed at the provider
    PaymentFailed = 5002,
    /// Unknown payment provider name
    UnknownProvider = 5003,
    /// Refund call failed at the provider
    RefundFailed = 5004,

    // ==================== 9xxx: System ====================
    /// Storage layer failure
    StorageError = 9001,
    /// Internal error
    InternalError = 9002,
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code as u16
    }
}

impl TryFrom<u16> for ErrorCode {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            0 => Self::Success,
            1 => Self::Unknown,
            2 => Self::ValidationFailed,
            3 => Self::NotFound,
            5 => Self::InvalidRequest,
            4001 => Self::OrderNotFound,
            4002 => Self::InvalidOrderStatus,
            4003 => Self::RefundNotPermitted,
            4004 => Self::MissingPaymentReference,
            4005 => Self::NoDeliveryCapacity,
            4006 => Self::InvalidCart,
            4007 => Self::InvalidCustomer,
            5001 => Self::PaymentActionRequired,
            5002 => Self::PaymentFailed,
            5003 => Self::UnknownProvider,
            5004 => Self::RefundFailed,
            9001 => Self::StorageError,
            9002 => Self::InternalError,
            _ => return Err(format!("unknown error code: {}", value)),
        };
        Ok(code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u16)
    }
}
