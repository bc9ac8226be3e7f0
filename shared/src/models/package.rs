//! Package Model

use serde::{Deserialize, Serialize};

/// Package entity - a priced bundle of kits sold as one line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    pub id: Option<String>,
    pub name: String,
    /// Bundle price (covers all contained kits)
    pub price: f64,
    /// Kits contained in the bundle
    pub kit_ids: Vec<String>,
    pub is_active: bool,
}
