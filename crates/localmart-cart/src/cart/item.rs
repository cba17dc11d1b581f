// Line items and the restaurant a cart is bound to.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::CartError;

/// Highest unit price the cart accepts (in currency units).
pub const MAX_ITEM_PRICE: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);
/// Highest quantity a single line may reach.
pub const MAX_LINE_QUANTITY: u32 = 9_999;

/// The vendor a non-empty cart belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartRestaurant {
    pub id: String,
    pub name: String,
}

impl CartRestaurant {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A menu entry as offered to the cart. Carries no quantity; the cart decides
/// whether it becomes a new line or bumps an existing one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub is_vegetarian: bool,
}

impl MenuItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            is_vegetarian: false,
        }
    }

    /// Mark the item as vegetarian (display only).
    pub fn vegetarian(mut self) -> Self {
        self.is_vegetarian = true;
        self
    }

    /// Reject items the cart can never hold: blank ids, negative prices, and
    /// prices above [`MAX_ITEM_PRICE`].
    pub fn validate(&self) -> Result<(), CartError> {
        if self.id.trim().is_empty() {
            return Err(CartError::InvalidItem {
                item_id: self.id.clone(),
                message: "id must not be empty".into(),
            });
        }
        if self.price < Decimal::ZERO {
            return Err(CartError::InvalidItem {
                item_id: self.id.clone(),
                message: format!("price must not be negative, got {}", self.price),
            });
        }
        if self.price > MAX_ITEM_PRICE {
            return Err(CartError::InvalidItem {
                item_id: self.id.clone(),
                message: format!("price must not exceed {MAX_ITEM_PRICE}, got {}", self.price),
            });
        }
        Ok(())
    }
}

/// One distinct entry in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    /// Always at least 1 while the line is in the cart.
    pub quantity: u32,
    #[serde(default)]
    pub is_vegetarian: bool,
}

impl CartItem {
    /// Start a new line with a single unit of `item`.
    pub fn first_unit(item: MenuItem) -> Self {
        Self {
            id: item.id,
            name: item.name,
            price: item.price,
            quantity: 1,
            is_vegetarian: item.is_vegetarian,
        }
    }

    /// `price × quantity`, unrounded. Saturates at `Decimal::MAX`.
    pub fn line_total(&self) -> Decimal {
        self.price
            .checked_mul(Decimal::from(self.quantity))
            .unwrap_or(Decimal::MAX)
    }
}
