//! Medkit Checkout Server
//!
//! Order/checkout backend for the medical-kit shipping platform.
//!
//! # Module structure
//!
//! ```text
//! checkout-server/src/
//! ├── core/        # Configuration
//! ├── orders/      # Actions, service, storage, money, state machine
//! ├── pricing/     # Cart totals and affiliate payout
//! ├── discounts/   # Discount lookup and application
//! ├── delivery/    # Delivery-date resolution
//! ├── invoices/    # Invoice generation
//! ├── checkout/    # Checkout orchestration and error taxonomy
//! ├── providers/   # Payment provider and mailer abstractions
//! ├── services/    # Catalog collaborators
//! └── utils/       # Logging
//! ```
//!
//! HTTP routing, authentication, provider SDKs, mail templates and CRM
//! sync stay outside this crate: HTTP handlers call [`CheckoutService`]
//! and [`OrderService`], and external feeds subscribe to the domain
//! event broadcast.

pub mod checkout;
pub mod core;
pub mod delivery;
pub mod discounts;
pub mod invoices;
pub mod orders;
pub mod pricing;
pub mod providers;
pub mod services;
pub mod utils;

// Re-export public types
pub use checkout::{CheckoutError, CheckoutService};
pub use crate::core::Config;
pub use discounts::{AppliedDiscount, DiscountCalculator, LocalDiscountCalculator};
pub use orders::{CheckoutStorage, OrderError, OrderService};
pub use providers::{Mailer, PaymentProvider, ProviderRegistry};
pub use services::{CatalogService, StaticCatalog};

// Re-export logger functions
pub use utils::{init_logger, init_logger_with_file, setup_environment};
