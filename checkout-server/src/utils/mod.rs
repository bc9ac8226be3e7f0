//! Utility functions

pub mod logger;

pub use logger::{init_logger, init_logger_with_file};

/// Prepare the process environment: .env file, then logging
pub fn setup_environment(config: &crate::core::Config) {
    dotenv::dotenv().ok();
    init_logger_with_file(Some(&config.log_level), Some(&config.data_dir));
}
