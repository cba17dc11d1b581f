// Cart state manager: owns the cart, enforces the single-restaurant rule, and
// saves to the key-value store after every mutation.

use tracing::{debug, info, warn};

use super::item::{CartItem, CartRestaurant, MenuItem, MAX_LINE_QUANTITY};
use super::snapshot;
use super::state::{Cart, LineChange};
use super::totals::{CartTotals, Pricing};
use super::CartError;
use crate::confirm::{Confirm, ConfirmPrompt};
use crate::store::CartStore;

/// Storage key used when the caller doesn't pick one.
pub const DEFAULT_CART_KEY: &str = "localmart_cart";

/// Result of a successful [`CartManager::add_item`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The item was new to the cart and now has quantity 1.
    Added,
    /// The item was already in the cart; its quantity is now the contained value.
    Incremented { quantity: u32 },
    /// The item came from another restaurant and the user declined to clear
    /// the cart. Nothing changed.
    SwitchDeclined,
}

/// The authoritative cart for one shopper session.
///
/// Persistence failures are logged and swallowed: the in-memory cart stays
/// authoritative for the session.
pub struct CartManager<S, C> {
    cart: Cart,
    store: S,
    confirm: C,
    pricing: Pricing,
    key: String,
}

impl<S: CartStore, C: Confirm> CartManager<S, C> {
    /// Start with an empty cart, ignoring anything already stored under `key`.
    pub fn new(store: S, confirm: C, pricing: Pricing, key: impl Into<String>) -> Self {
        Self {
            cart: Cart::new(),
            store,
            confirm,
            pricing,
            key: key.into(),
        }
    }

    /// Build a manager from whatever was stored under `key`.
    ///
    /// A missing, unreadable, or malformed blob yields an empty cart.
    pub fn restore(store: S, confirm: C, pricing: Pricing, key: impl Into<String>) -> Self {
        let mut manager = Self::new(store, confirm, pricing, key);

        match manager.store.load(&manager.key) {
            Ok(Some(json)) => match snapshot::decode(&json) {
                Ok(cart) => {
                    info!(
                        "Restored cart: {} lines from {}",
                        cart.items().len(),
                        cart.restaurant().map_or("no restaurant", |r| r.name.as_str())
                    );
                    manager.cart = cart;
                }
                Err(e) => warn!("Discarding saved cart under '{}': {}", manager.key, e),
            },
            Ok(None) => info!("No saved cart under '{}', starting empty", manager.key),
            Err(e) => warn!("Failed to read saved cart under '{}': {:#}", manager.key, e),
        }

        manager
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Add one unit of `item`.
    ///
    /// `restaurant` may be omitted only when the cart is already bound. If it
    /// names a different restaurant than the bound one, the injected
    /// [`Confirm`] decides whether to clear the cart and switch; declining
    /// leaves the cart untouched.
    pub async fn add_item(
        &mut self,
        item: MenuItem,
        restaurant: Option<CartRestaurant>,
    ) -> Result<AddOutcome, CartError> {
        item.validate()?;

        match (self.cart.restaurant().cloned(), restaurant) {
            (None, None) => {
                return Err(CartError::MissingRestaurant { item_id: item.id });
            }
            (None, Some(requested)) => {
                debug!("Binding cart to restaurant {}", requested.id);
                self.cart.rebind(requested);
            }
            (Some(current), Some(requested)) if current.id != requested.id => {
                let prompt = ConfirmPrompt::SwitchRestaurant {
                    current: current.clone(),
                    requested: requested.clone(),
                };
                if !self.confirm.confirm(&prompt).await {
                    debug!("Restaurant switch {} -> {} declined", current.id, requested.id);
                    return Ok(AddOutcome::SwitchDeclined);
                }
                info!(
                    "Switching cart from {} to {}; dropping {} lines",
                    current.id,
                    requested.id,
                    self.cart.items().len()
                );
                self.cart.rebind(requested);
            }
            (Some(_), _) => {
                if self.quantity_of(&item.id) >= MAX_LINE_QUANTITY {
                    return Err(CartError::InvalidItem {
                        item_id: item.id,
                        message: format!("quantity cannot exceed {MAX_LINE_QUANTITY}"),
                    });
                }
            }
        }

        let item_id = item.id.clone();
        let outcome = match self.cart.add_unit(item) {
            LineChange::Appended => AddOutcome::Added,
            LineChange::Incremented(quantity) => AddOutcome::Incremented { quantity },
        };
        debug!("Added {} to cart: {:?}", item_id, outcome);

        self.persist();
        Ok(outcome)
    }

    /// Take one unit of `item_id` out of the cart, dropping the line at zero
    /// and unbinding the restaurant when the cart empties. Returns `false`
    /// (and saves nothing) if the item isn't in the cart.
    pub fn remove_item(&mut self, item_id: &str) -> bool {
        if !self.cart.take_unit(item_id) {
            debug!("remove_item: {} not in cart", item_id);
            return false;
        }
        debug!("Removed one {} from cart", item_id);
        self.persist();
        true
    }

    /// Empty the cart and unbind the restaurant.
    pub fn clear(&mut self) {
        self.cart.clear();
        debug!("Cart cleared");
        self.persist();
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn totals(&self) -> CartTotals {
        self.cart.totals(&self.pricing)
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn items(&self) -> &[CartItem] {
        self.cart.items()
    }

    pub fn restaurant(&self) -> Option<&CartRestaurant> {
        self.cart.restaurant()
    }

    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    /// Number of units across all lines.
    pub fn item_count(&self) -> u32 {
        self.cart.item_count()
    }

    /// Quantity of `item_id` in the cart, 0 if absent.
    pub fn quantity_of(&self, item_id: &str) -> u32 {
        self.cart.item(item_id).map_or(0, |line| line.quantity)
    }

    pub fn pricing(&self) -> &Pricing {
        &self.pricing
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    fn persist(&self) {
        let json = match snapshot::encode(&self.cart) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize cart: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.save(&self.key, &json) {
            warn!("Failed to save cart under '{}': {:#}", self.key, e);
        }
    }
}
