// Library root: cart state manager for the localmart storefront plus the
// storage, confirmation, checkout, and configuration seams around it.

pub mod cart;
pub mod config;
pub mod confirm;
pub mod order;
pub mod store;

pub use cart::manager::{AddOutcome, CartManager};
pub use cart::CartError;
