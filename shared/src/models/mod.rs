//! Catalog and directory models
//!
//! Read-only reference data consumed by the checkout flow: kits,
//! packages, add-ons, discount codes, clinics and client accounts.

mod addon;
mod client;
mod clinic;
mod discount;
mod kit;
mod package;

pub use addon::Addon;
pub use client::{ClientPayload, ClientRecord};
pub use clinic::Clinic;
pub use discount::{Discount, DiscountKind};
pub use kit::Kit;
pub use package::Package;
