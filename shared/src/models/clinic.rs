//! Clinic Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Clinic entity - approval routing target for clinic-bound orders
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clinic {
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    /// Dates the clinic cannot receive deliveries
    pub blackout_dates: Vec<NaiveDate>,
    /// Max approved orders the clinic accepts per delivery date
    pub approval_threshold: u32,
    pub is_active: bool,
}

impl Clinic {
    /// Whether the given date is blacked out for this clinic
    pub fn is_blackout(&self, date: NaiveDate) -> bool {
        self.blackout_dates.contains(&date)
    }
}
