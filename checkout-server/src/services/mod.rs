//! Collaborator services

mod catalog;

pub use catalog::{CatalogService, StaticCatalog};
