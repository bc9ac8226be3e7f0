//! Kit Model

use serde::{Deserialize, Serialize};

/// Kit entity - a shippable product unit ordered by a client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Kit {
    pub id: Option<String>,
    pub name: String,
    /// Stock keeping unit code
    pub sku: String,
    /// Unit price
    pub price: f64,
    pub is_active: bool,
}
