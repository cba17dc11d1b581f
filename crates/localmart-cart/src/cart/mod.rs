// Cart domain: line items, the single-restaurant cart aggregate, totals, and
// the manager that persists after every mutation.

pub mod item;
pub mod manager;
pub mod snapshot;
pub mod state;
pub mod totals;

use thiserror::Error;

/// Usage errors surfaced by cart operations. Declining a restaurant switch is
/// not an error; see [`manager::AddOutcome::SwitchDeclined`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    #[error("cannot add item `{item_id}`: the cart is empty and no restaurant was given")]
    MissingRestaurant { item_id: String },

    #[error("invalid item `{item_id}`: {message}")]
    InvalidItem { item_id: String, message: String },
}
