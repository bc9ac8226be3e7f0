//! Addon Model

use serde::{Deserialize, Serialize};

/// Add-on entity - priced extra attached to an item or package line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Addon {
    pub id: Option<String>,
    pub name: String,
    pub price: f64,
    pub is_active: bool,
}
