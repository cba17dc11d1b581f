// Derived cart totals: subtotal, delivery fee, taxes, grand total.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::item::CartItem;

/// Flat delivery fee charged on any non-empty cart (in currency units).
pub const DEFAULT_DELIVERY_FEE: Decimal = Decimal::from_parts(40, 0, 0, false, 0);
/// Default tax rate: 5%.
pub const DEFAULT_TAX_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);
pub const DEFAULT_CURRENCY_SYMBOL: &str = "₹";

/// Fixed pricing rules applied on top of the item subtotal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    pub delivery_fee: Decimal,
    /// Fraction of the subtotal, e.g. `0.05` for 5%.
    pub tax_rate: Decimal,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_currency_symbol() -> String {
    DEFAULT_CURRENCY_SYMBOL.to_string()
}

impl Default for Pricing {
    fn default() -> Self {
        Self {
            delivery_fee: DEFAULT_DELIVERY_FEE,
            tax_rate: DEFAULT_TAX_RATE,
            currency_symbol: default_currency_symbol(),
        }
    }
}

impl Pricing {
    /// Format an amount for display, e.g. `₹418.00`.
    pub fn format(&self, amount: Decimal) -> String {
        format!("{}{:.2}", self.currency_symbol, round_currency(amount))
    }
}

/// Totals for a cart. Every component is rounded to 2 decimal places on its
/// own, and `total` is the exact sum of the rounded components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub taxes: Decimal,
    pub total: Decimal,
}

impl CartTotals {
    /// Compute totals over `items` using `pricing`.
    ///
    /// Arithmetic saturates at `Decimal::MAX` rather than panicking; item
    /// price and quantity ceilings keep real carts far below that.
    pub fn compute(items: &[CartItem], pricing: &Pricing) -> Self {
        let subtotal = round_currency(
            items
                .iter()
                .map(CartItem::line_total)
                .fold(Decimal::ZERO, Decimal::saturating_add),
        );
        let delivery_fee = if items.is_empty() {
            Decimal::ZERO
        } else {
            round_currency(pricing.delivery_fee)
        };
        let taxes = round_currency(subtotal.saturating_mul(pricing.tax_rate));

        Self {
            subtotal,
            delivery_fee,
            taxes,
            total: subtotal.saturating_add(delivery_fee).saturating_add(taxes),
        }
    }
}

/// Round to cents, halves away from zero (the way prices are displayed).
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
