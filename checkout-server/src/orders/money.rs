//! Money calculation utilities using rust_decimal for precision
//!
//! Records store `f64`; every calculation runs on `Decimal` and rounds
//! to 2 decimal places on the way back out.

use rust_decimal::prelude::*;
use shared::order::{AddonSelection, CartItemInput, PackageSelection};

use super::error::OrderError;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maximum allowed price per line ($1,000,000)
const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per line
const MAX_QUANTITY: i32 = 9999;

/// Validate that a f64 value is finite (not NaN, not Infinity)
#[inline]
fn require_finite(value: f64, field_name: &str) -> Result<(), OrderError> {
    if !value.is_finite() {
        return Err(OrderError::InvalidCart(format!(
            "{} must be a finite number, got {}",
            field_name, value
        )));
    }
    Ok(())
}

fn validate_price(value: f64, field_name: &str) -> Result<(), OrderError> {
    require_finite(value, field_name)?;
    if value < 0.0 {
        return Err(OrderError::InvalidCart(format!(
            "{} must be non-negative, got {}",
            field_name, value
        )));
    }
    if value > MAX_PRICE {
        return Err(OrderError::InvalidCart(format!(
            "{} exceeds maximum allowed ({}), got {}",
            field_name, MAX_PRICE, value
        )));
    }
    Ok(())
}

fn validate_quantity(quantity: i32, field_name: &str) -> Result<(), OrderError> {
    if quantity <= 0 {
        return Err(OrderError::InvalidCart(format!(
            "{} must be positive, got {}",
            field_name, quantity
        )));
    }
    if quantity > MAX_QUANTITY {
        return Err(OrderError::InvalidCart(format!(
            "{} exceeds maximum allowed ({}), got {}",
            field_name, MAX_QUANTITY, quantity
        )));
    }
    Ok(())
}

fn validate_addons(addons: &[AddonSelection]) -> Result<(), OrderError> {
    for addon in addons {
        validate_price(addon.price, "addon price")?;
    }
    Ok(())
}

/// Validate a cart item before processing
pub fn validate_cart_item(item: &CartItemInput) -> Result<(), OrderError> {
    validate_price(item.price, "item price")?;
    validate_quantity(item.quantity, "item quantity")?;
    validate_addons(&item.addons)?;
    Ok(())
}

/// Validate a package selection (and the items it contains)
pub fn validate_package(package: &PackageSelection) -> Result<(), OrderError> {
    validate_price(package.price, "package price")?;
    validate_quantity(package.quantity, "package quantity")?;
    validate_addons(&package.addons)?;
    for item in &package.items {
        validate_cart_item(item)?;
    }
    Ok(())
}

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Compare two monetary values for equality (within 0.01 tolerance)
pub fn money_eq(a: f64, b: f64) -> bool {
    let diff = (to_decimal(a) - to_decimal(b)).abs();
    diff < MONEY_TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(price: f64, quantity: i32) -> CartItemInput {
        CartItemInput {
            kit_id: "kit-1".to_string(),
            name: "Test Kit".to_string(),
            price,
            quantity,
            addons: vec![],
            preferred_delivery_date: None,
        }
    }

    #[test]
    fn test_to_decimal_precision() {
        // Classic floating point problem: 0.1 + 0.2 != 0.3
        let sum_f64 = 0.1_f64 + 0.2_f64;
        assert_ne!(sum_f64, 0.3);

        let sum_dec = to_decimal(0.1) + to_decimal(0.2);
        assert_eq!(to_f64(sum_dec), 0.3);
    }

    #[test]
    fn test_accumulation_precision() {
        // Sum 0.01 one thousand times
        let mut total = Decimal::ZERO;
        for _ in 0..1000 {
            total += to_decimal(0.01);
        }
        assert_eq!(to_f64(total), 10.0);
    }

    #[test]
    fn test_to_decimal_nan_becomes_zero() {
        assert_eq!(to_decimal(f64::NAN), Decimal::ZERO);
    }

    #[test]
    fn test_to_decimal_infinity_becomes_zero() {
        assert_eq!(to_decimal(f64::INFINITY), Decimal::ZERO);
        assert_eq!(to_decimal(f64::NEG_INFINITY), Decimal::ZERO);
    }

    #[test]
    fn test_rounding_half_up() {
        let value = Decimal::new(5, 3); // 0.005
        assert_eq!(to_f64(value), 0.01);

        let value2 = Decimal::new(4, 3); // 0.004
        assert_eq!(to_f64(value2), 0.0);
    }

    #[test]
    fn test_validate_cart_item_ok() {
        assert!(validate_cart_item(&item(10.0, 2)).is_ok());
    }

    #[test]
    fn test_validate_cart_item_rejects_nan_price() {
        assert!(validate_cart_item(&item(f64::NAN, 1)).is_err());
    }

    #[test]
    fn test_validate_cart_item_rejects_negative_price() {
        assert!(validate_cart_item(&item(-5.0, 1)).is_err());
    }

    #[test]
    fn test_validate_cart_item_rejects_zero_quantity() {
        assert!(validate_cart_item(&item(10.0, 0)).is_err());
    }

    #[test]
    fn test_validate_cart_item_rejects_excess_quantity() {
        assert!(validate_cart_item(&item(10.0, 10_000)).is_err());
    }

    #[test]
    fn test_validate_package_checks_contained_items() {
        let package = PackageSelection {
            package_id: "pkg-1".to_string(),
            name: "Bundle".to_string(),
            price: 15.0,
            quantity: 1,
            addons: vec![],
            items: vec![item(10.0, -1)],
        };
        assert!(validate_package(&package).is_err());
    }

    #[test]
    fn test_money_eq() {
        assert!(money_eq(100.0, 100.0));
        assert!(money_eq(100.004, 100.006));
        assert!(!money_eq(100.0, 100.02));
    }
}
