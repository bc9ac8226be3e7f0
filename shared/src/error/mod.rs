//! Unified error codes and categories
//!
//! Error codes are shared between the checkout server and its clients so
//! that failures serialize the same way everywhere. Codes are organized
//! by range:
//! - 0xxx: General errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 9xxx: System errors

mod category;
mod codes;

pub use category::ErrorCategory;
pub use codes::ErrorCode;

use serde::{Deserialize, Serialize};

/// Error envelope returned to callers on failure
///
/// The `errors` field carries the user-facing message. Internal failures
/// are reported with a generic message; the technical detail stays in the
/// server logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub errors: String,
    pub code: ErrorCode,
}

impl ErrorEnvelope {
    pub fn new(code: ErrorCode, errors: impl Into<String>) -> Self {
        Self {
            errors: errors.into(),
            code,
        }
    }

    /// Category of the wrapped code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code as u16)
    }
}
