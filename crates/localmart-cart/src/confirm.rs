// Yes/no decision point consulted before the cart switches restaurants.

use async_trait::async_trait;

use crate::cart::item::CartRestaurant;

/// Context shown to the user when a decision is needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmPrompt {
    /// The cart holds items from `current`; adding from `requested` would
    /// discard them.
    SwitchRestaurant {
        current: CartRestaurant,
        requested: CartRestaurant,
    },
}

impl ConfirmPrompt {
    /// Human-readable question for terminal or dialog front ends.
    pub fn message(&self) -> String {
        match self {
            ConfirmPrompt::SwitchRestaurant { current, requested } => format!(
                "Your cart contains items from {}. Clear it and start a new order from {}?",
                current.name, requested.name
            ),
        }
    }
}

/// Asks the user to approve a prompt. `false` means the user declined.
#[async_trait]
pub trait Confirm: Send + Sync {
    async fn confirm(&self, prompt: &ConfirmPrompt) -> bool;
}

/// Answers every prompt the same way without asking anyone.
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

#[async_trait]
impl Confirm for AutoConfirm {
    async fn confirm(&self, _prompt: &ConfirmPrompt) -> bool {
        self.0
    }
}

#[async_trait]
impl<T: Confirm + ?Sized> Confirm for Box<T> {
    async fn confirm(&self, prompt: &ConfirmPrompt) -> bool {
        (**self).confirm(prompt).await
    }
}
