//! Catalog lookups consumed by the checkout flow
//!
//! Kits, packages and add-ons arrive priced in the cart payload; the
//! checkout flow only needs discounts (by code) and clinics (blackout
//! dates, approval thresholds) from the catalog.

use shared::models::{Clinic, Discount};
use std::collections::HashMap;

/// Catalog lookup contract
pub trait CatalogService: Send + Sync {
    /// Find a discount by code (case-insensitive)
    fn discount_by_code(&self, code: &str) -> Option<Discount>;

    /// Find a clinic by id
    fn clinic(&self, clinic_id: &str) -> Option<Clinic>;
}

/// In-memory catalog
#[derive(Debug, Default)]
pub struct StaticCatalog {
    discounts: HashMap<String, Discount>,
    clinics: HashMap<String, Clinic>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_discount(mut self, discount: Discount) -> Self {
        self.discounts
            .insert(discount.code.to_lowercase(), discount);
        self
    }

    pub fn with_clinic(mut self, clinic: Clinic) -> Self {
        if let Some(id) = clinic.id.clone() {
            self.clinics.insert(id, clinic);
        }
        self
    }
}

impl CatalogService for StaticCatalog {
    fn discount_by_code(&self, code: &str) -> Option<Discount> {
        self.discounts.get(&code.to_lowercase()).cloned()
    }

    fn clinic(&self, clinic_id: &str) -> Option<Clinic> {
        self.clinics.get(clinic_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::DiscountKind;

    #[test]
    fn test_discount_lookup_is_case_insensitive() {
        let catalog = StaticCatalog::new().with_discount(Discount {
            id: None,
            code: "Save10".to_string(),
            kind: DiscountKind::Percentage,
            value: 10.0,
            is_active: true,
        });

        assert!(catalog.discount_by_code("SAVE10").is_some());
        assert!(catalog.discount_by_code("save10").is_some());
        assert!(catalog.discount_by_code("other").is_none());
    }
}
