//! Discount Model

use serde::{Deserialize, Serialize};

/// Discount adjustment kind
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountKind {
    /// Percentage of the cart total (value = 10 means 10% off)
    Percentage,
    /// Fixed amount off the cart total
    FixedAmount,
}

/// Discount code entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Discount {
    pub id: Option<String>,
    /// Code entered at checkout (matched case-insensitively)
    pub code: String,
    pub kind: DiscountKind,
    pub value: f64,
    pub is_active: bool,
}
