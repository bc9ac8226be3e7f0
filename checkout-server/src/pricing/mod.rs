//! Cart pricing
//!
//! Pure functions over the cart payload. All arithmetic runs on
//! `Decimal`; callers round with [`money::to_f64`] when persisting.

use rust_decimal::Decimal;
use shared::order::{CartItemInput, PackageSelection};

use crate::orders::money::{to_decimal, to_f64};

/// Line total for a standalone item: quantity x price + add-on prices
///
/// Add-ons are priced once per line, not per unit.
pub fn item_line_total(item: &CartItemInput) -> Decimal {
    let addons: Decimal = item.addons.iter().map(|a| to_decimal(a.price)).sum();
    to_decimal(item.price) * Decimal::from(item.quantity) + addons
}

/// Line total for a package: package price x quantity
///
/// Package add-ons are fulfilment extras already priced into the bundle;
/// they do not contribute separately.
pub fn package_line_total(package: &PackageSelection) -> Decimal {
    to_decimal(package.price) * Decimal::from(package.quantity)
}

/// Total of a cart: standalone items plus package lines
///
/// Items contained in a package are covered by the package price and are
/// not summed here. The result is a plain sum, so it is independent of
/// item order.
pub fn cart_total(items: &[CartItemInput], packages: &[PackageSelection]) -> Decimal {
    let items_total: Decimal = items.iter().map(item_line_total).sum();
    let packages_total: Decimal = packages.iter().map(package_line_total).sum();
    items_total + packages_total
}

/// Affiliate commission from the order final price, rounded to 2 dp
pub fn affiliate_payout(final_price: f64, rate: f64) -> f64 {
    to_f64(to_decimal(final_price) * to_decimal(rate))
}
