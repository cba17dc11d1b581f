// Persisted form of the cart.
//
// The cart is stored as a JSON array of lines, each carrying a reference to
// its restaurant. On restore the bound restaurant is re-derived from the first
// line, so an empty array means an unbound cart.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::item::{CartItem, CartRestaurant, MAX_ITEM_PRICE, MAX_LINE_QUANTITY};
use super::state::Cart;

/// Why a stored blob could not be turned back into a cart.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("cart snapshot is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("cart snapshot line {index} is malformed: {message}")]
    Malformed { index: usize, message: String },
}

/// One persisted line: the item plus the restaurant it was ordered from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedLine {
    #[serde(flatten)]
    pub item: CartItem,
    pub restaurant: CartRestaurant,
}

/// Serialize `cart` to its stored JSON form.
pub fn encode(cart: &Cart) -> Result<String, SnapshotError> {
    let lines: Vec<PersistedLine> = match cart.restaurant() {
        Some(restaurant) => cart
            .items()
            .iter()
            .map(|item| PersistedLine {
                item: item.clone(),
                restaurant: restaurant.clone(),
            })
            .collect(),
        None => Vec::new(),
    };
    Ok(serde_json::to_string(&lines)?)
}

/// Rebuild a cart from its stored JSON form, rejecting anything that would
/// break the cart's invariants.
pub fn decode(json: &str) -> Result<Cart, SnapshotError> {
    let lines: Vec<PersistedLine> = serde_json::from_str(json)?;

    let Some(first) = lines.first() else {
        return Ok(Cart::new());
    };
    let restaurant = first.restaurant.clone();

    let mut seen = HashSet::new();
    let mut items = Vec::with_capacity(lines.len());
    for (index, line) in lines.into_iter().enumerate() {
        let malformed = |message: String| SnapshotError::Malformed { index, message };

        if line.item.id.trim().is_empty() {
            return Err(malformed("empty item id".into()));
        }
        if line.item.quantity == 0 {
            return Err(malformed(format!("item `{}` has quantity 0", line.item.id)));
        }
        if line.item.quantity > MAX_LINE_QUANTITY {
            return Err(malformed(format!(
                "item `{}` has quantity {} above {MAX_LINE_QUANTITY}",
                line.item.id, line.item.quantity
            )));
        }
        if line.item.price < Decimal::ZERO || line.item.price > MAX_ITEM_PRICE {
            return Err(malformed(format!(
                "item `{}` has out-of-range price {}",
                line.item.id, line.item.price
            )));
        }
        if line.restaurant.id != restaurant.id {
            return Err(malformed(format!(
                "item `{}` belongs to restaurant `{}`, expected `{}`",
                line.item.id, line.restaurant.id, restaurant.id
            )));
        }
        if !seen.insert(line.item.id.clone()) {
            return Err(malformed(format!("duplicate item id `{}`", line.item.id)));
        }
        items.push(line.item);
    }

    Ok(Cart::from_parts(items, Some(restaurant)))
}
