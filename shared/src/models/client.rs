//! Client Model

use serde::{Deserialize, Serialize};

/// Client account record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientRecord {
    pub client_id: String,
    pub name: String,
    /// Unique within the directory; lookups are by lowercased email
    pub email: String,
    pub phone: Option<String>,
    /// Account is operated by a delegate (clinic staff ordering on
    /// behalf of the client)
    pub delegated: bool,
    pub created_at: i64,
}

/// Client payload submitted at checkout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientPayload {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}
