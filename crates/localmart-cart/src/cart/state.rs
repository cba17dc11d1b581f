// Cart aggregate: ordered line items bound to at most one restaurant.

use super::item::{CartItem, CartRestaurant, MenuItem};
use super::totals::{CartTotals, Pricing};

/// The in-progress selection of items from a single restaurant.
///
/// `items` is empty exactly when `restaurant` is `None`. All mutators keep
/// that invariant; there is no way to hold one without the other.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    items: Vec<CartItem>,
    restaurant: Option<CartRestaurant>,
}

/// What happened to the line touched by [`Cart::add_unit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineChange {
    /// A new line was appended with quantity 1.
    Appended,
    /// An existing line's quantity went up to the contained value.
    Incremented(u32),
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn restaurant(&self) -> Option<&CartRestaurant> {
        self.restaurant.as_ref()
    }

    /// Look up a line by item id.
    pub fn item(&self, item_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.id == item_id)
    }

    /// Number of units across all lines.
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn totals(&self, pricing: &Pricing) -> CartTotals {
        CartTotals::compute(&self.items, pricing)
    }

    /// Drop every line and bind the cart to `restaurant`.
    ///
    /// The cart is momentarily bound but empty; callers must follow with
    /// [`Cart::add_unit`].
    pub(crate) fn rebind(&mut self, restaurant: CartRestaurant) {
        self.items.clear();
        self.restaurant = Some(restaurant);
    }

    /// Add one unit of `item`, merging with an existing line of the same id.
    ///
    /// The cart must already be bound to a restaurant.
    pub(crate) fn add_unit(&mut self, item: MenuItem) -> LineChange {
        debug_assert!(self.restaurant.is_some(), "add_unit on an unbound cart");

        match self.items.iter_mut().find(|line| line.id == item.id) {
            Some(line) => {
                line.quantity = line.quantity.saturating_add(1);
                LineChange::Incremented(line.quantity)
            }
            None => {
                self.items.push(CartItem::first_unit(item));
                LineChange::Appended
            }
        }
    }

    /// Take one unit of `item_id` out of the cart. Removes the line when its
    /// last unit goes, and unbinds the restaurant when the last line goes.
    /// Returns `false` if no such line exists.
    pub(crate) fn take_unit(&mut self, item_id: &str) -> bool {
        let Some(idx) = self.items.iter().position(|line| line.id == item_id) else {
            return false;
        };

        if self.items[idx].quantity > 1 {
            self.items[idx].quantity -= 1;
        } else {
            self.items.remove(idx);
        }

        if self.items.is_empty() {
            self.restaurant = None;
        }
        true
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
        self.restaurant = None;
    }

    /// Assemble a cart from restored parts. Callers guarantee the invariant.
    pub(crate) fn from_parts(items: Vec<CartItem>, restaurant: Option<CartRestaurant>) -> Self {
        debug_assert_eq!(items.is_empty(), restaurant.is_none());
        Self { items, restaurant }
    }
}
