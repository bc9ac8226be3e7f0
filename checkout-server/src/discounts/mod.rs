//! Discount lookup and application
//!
//! The calculator is a collaborator: computation failures are logged and
//! swallowed so checkout proceeds undiscounted. Only a successful
//! response is ever applied.

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::models::{Discount, DiscountKind};
use shared::order::{CartItemInput, DiscountResponse, PackageSelection};
use thiserror::Error;

use crate::orders::money::{to_decimal, to_f64};
use crate::pricing;
use crate::services::CatalogService;

/// Calculator failure - always non-fatal for checkout
#[derive(Debug, Error)]
#[error("discount calculation failed: {0}")]
pub struct CalculatorError(pub String);

/// External discount calculator contract
#[async_trait]
pub trait DiscountCalculator: Send + Sync {
    async fn discounted_total(
        &self,
        discount: &Discount,
        items: &[CartItemInput],
        packages: &[PackageSelection],
        email: &str,
    ) -> Result<DiscountResponse, CalculatorError>;
}

/// A discount that was successfully applied to a cart
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedDiscount {
    pub code: String,
    /// Cart total fed into the calculator
    pub input_price: f64,
    /// Discounted total produced by the calculator
    pub output_price: f64,
}

impl AppliedDiscount {
    /// Amount saved by this discount
    pub fn savings(&self) -> f64 {
        to_f64(to_decimal(self.input_price) - to_decimal(self.output_price))
    }
}

/// Look up a code and run the calculator
///
/// Returns `None` for unknown/inactive codes, unsuccessful responses and
/// calculator errors - the cart then keeps its raw total.
pub async fn apply_discount(
    catalog: &dyn CatalogService,
    calculator: &dyn DiscountCalculator,
    code: &str,
    items: &[CartItemInput],
    packages: &[PackageSelection],
    email: &str,
) -> Option<AppliedDiscount> {
    let Some(discount) = catalog.discount_by_code(code) else {
        tracing::debug!(code = %code, "discount code not found, ignoring");
        return None;
    };
    if !discount.is_active {
        tracing::debug!(code = %code, "discount code inactive, ignoring");
        return None;
    }

    match calculator
        .discounted_total(&discount, items, packages, email)
        .await
    {
        Ok(response) if response.success => Some(AppliedDiscount {
            code: discount.code.clone(),
            input_price: response.subtotal,
            output_price: response.total,
        }),
        Ok(_) => {
            tracing::debug!(code = %code, "calculator declined discount");
            None
        }
        Err(e) => {
            tracing::warn!(code = %code, error = %e, "discount calculation failed, continuing without discount");
            None
        }
    }
}

/// Local calculator applying the discount definition to the cart total
///
/// Production deployments may swap in a remote calculator; this one
/// computes percentage and fixed-amount codes directly.
#[derive(Debug, Default)]
pub struct LocalDiscountCalculator;

#[async_trait]
impl DiscountCalculator for LocalDiscountCalculator {
    async fn discounted_total(
        &self,
        discount: &Discount,
        items: &[CartItemInput],
        packages: &[PackageSelection],
        _email: &str,
    ) -> Result<DiscountResponse, CalculatorError> {
        let subtotal = pricing::cart_total(items, packages);
        let value = to_decimal(discount.value);
        if value < Decimal::ZERO {
            return Err(CalculatorError(format!(
                "discount {} has negative value",
                discount.code
            )));
        }

        let total = match discount.kind {
            DiscountKind::Percentage => {
                subtotal * (Decimal::ONE - value / Decimal::ONE_HUNDRED)
            }
            DiscountKind::FixedAmount => subtotal - value,
        }
        .max(Decimal::ZERO);

        Ok(DiscountResponse {
            success: true,
            subtotal: to_f64(subtotal),
            total: to_f64(total),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::StaticCatalog;

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

    fn percentage_discount(code: &str, value: f64) -> Discount {
        Discount {
            id: Some("disc-1".to_string()),
            code: code.to_string(),
            kind: DiscountKind::Percentage,
            value,
            is_active: true,
        }
    }

    struct FailingCalculator;

    #[async_trait]
    impl DiscountCalculator for FailingCalculator {
        async fn discounted_total(
            &self,
            _discount: &Discount,
            _items: &[CartItemInput],
            _packages: &[PackageSelection],
            _email: &str,
        ) -> Result<DiscountResponse, CalculatorError> {
            Err(CalculatorError("upstream unavailable".to_string()))
        }
    }

    #[tokio::test]
    async fn test_percentage_discount_applies() {
        let catalog = StaticCatalog::new().with_discount(percentage_discount("SAVE10", 10.0));
        let items = vec![item(50.0, 2)];

        let applied = apply_discount(
            &catalog,
            &LocalDiscountCalculator,
            "SAVE10",
            &items,
            &[],
            "jo@example.com",
        )
        .await
        .unwrap();

        assert_eq!(applied.input_price, 100.0);
        assert_eq!(applied.output_price, 90.0);
        assert_eq!(applied.savings(), 10.0);
    }

    #[tokio::test]
    async fn test_fixed_discount_never_goes_negative() {
        let discount = Discount {
            id: None,
            code: "BIG".to_string(),
            kind: DiscountKind::FixedAmount,
            value: 500.0,
            is_active: true,
        };
        let catalog = StaticCatalog::new().with_discount(discount);
        let items = vec![item(50.0, 1)];

        let applied = apply_discount(
            &catalog,
            &LocalDiscountCalculator,
            "BIG",
            &items,
            &[],
            "jo@example.com",
        )
        .await
        .unwrap();

        assert_eq!(applied.output_price, 0.0);
    }

    #[tokio::test]
    async fn test_unknown_code_yields_none() {
        let catalog = StaticCatalog::new();
        let items = vec![item(50.0, 1)];

        let applied = apply_discount(
            &catalog,
            &LocalDiscountCalculator,
            "NOPE",
            &items,
            &[],
            "jo@example.com",
        )
        .await;

        assert!(applied.is_none());
    }

    #[tokio::test]
    async fn test_inactive_code_yields_none() {
        let mut discount = percentage_discount("OLD", 10.0);
        discount.is_active = false;
        let catalog = StaticCatalog::new().with_discount(discount);

        let applied = apply_discount(
            &catalog,
            &LocalDiscountCalculator,
            "OLD",
            &[item(50.0, 1)],
            &[],
            "jo@example.com",
        )
        .await;

        assert!(applied.is_none());
    }

    #[tokio::test]
    async fn test_calculator_error_is_swallowed() {
        let catalog = StaticCatalog::new().with_discount(percentage_discount("SAVE10", 10.0));

        let applied = apply_discount(
            &catalog,
            &FailingCalculator,
            "SAVE10",
            &[item(50.0, 1)],
            &[],
            "jo@example.com",
        )
        .await;

        assert!(applied.is_none());
    }
}
