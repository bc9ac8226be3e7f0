//! Server configuration

use chrono::NaiveTime;
use chrono_tz::Tz;
use std::str::FromStr;

/// Checkout server configuration
///
/// # Environment variables
///
/// All settings can be overridden via environment variables:
///
/// | Variable | Default | Notes |
/// |----------|---------|-------|
/// | DATA_DIR | /var/lib/medkit/checkout | Database and log location |
/// | BUSINESS_TIMEZONE | Pacific/Auckland | Delivery/PO date timezone |
/// | DISPATCH_CUTOFF | 14:30 | Courier dispatch deadline (HH:MM) |
/// | DELIVERY_SCAN_DAYS | 120 | Bound for the delivery-date scan |
/// | AFFILIATE_RATE | 0.10 | Commission on the order final price |
/// | PARTNER_DISCOUNT_CODE | CLINIC-PARTNER | Code that copies the partner desk |
/// | PARTNER_NOTIFICATION_EMAIL | orders@partner.invalid | Partner desk address |
/// | LOG_LEVEL | info | tracing filter level |
#[derive(Debug, Clone)]
pub struct Config {
    /// Database and log location
    pub data_dir: String,
    /// Business timezone for delivery resolution and PO dates
    pub timezone: Tz,
    /// Courier dispatch deadline; orders after it ship a day later
    pub dispatch_cutoff: NaiveTime,
    /// Bound for the delivery-date forward scan
    pub delivery_scan_days: u32,
    /// Affiliate commission rate on the order final price
    pub affiliate_rate: f64,
    /// Discount code whose orders copy the partner desk
    pub partner_discount_code: String,
    /// Partner desk address
    pub partner_notification_email: String,
    /// tracing filter level
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: "/var/lib/medkit/checkout".to_string(),
            timezone: chrono_tz::Pacific::Auckland,
            dispatch_cutoff: NaiveTime::from_hms_opt(14, 30, 0).expect("valid cutoff"),
            delivery_scan_days: 120,
            affiliate_rate: 0.10,
            partner_discount_code: "CLINIC-PARTNER".to_string(),
            partner_notification_email: "orders@partner.invalid".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset or unparsable variables fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            data_dir: std::env::var("DATA_DIR").unwrap_or(defaults.data_dir),
            timezone: std::env::var("BUSINESS_TIMEZONE")
                .ok()
                .and_then(|s| Tz::from_str(&s).ok())
                .unwrap_or(defaults.timezone),
            dispatch_cutoff: std::env::var("DISPATCH_CUTOFF")
                .ok()
                .and_then(|s| NaiveTime::parse_from_str(&s, "%H:%M").ok())
                .unwrap_or(defaults.dispatch_cutoff),
            delivery_scan_days: std::env::var("DELIVERY_SCAN_DAYS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.delivery_scan_days),
            affiliate_rate: std::env::var("AFFILIATE_RATE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.affiliate_rate),
            partner_discount_code: std::env::var("PARTNER_DISCOUNT_CODE")
                .unwrap_or(defaults.partner_discount_code),
            partner_notification_email: std::env::var("PARTNER_NOTIFICATION_EMAIL")
                .unwrap_or(defaults.partner_notification_email),
            log_level: std::env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.timezone, chrono_tz::Pacific::Auckland);
        assert_eq!(
            config.dispatch_cutoff,
            NaiveTime::from_hms_opt(14, 30, 0).unwrap()
        );
        assert_eq!(config.delivery_scan_days, 120);
    }
}
