// Checkout hand-off: turns the cart into an order request for the remote
// order service and clears the cart once the order is accepted.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::cart::item::CartItem;
use crate::cart::manager::CartManager;
use crate::cart::state::Cart;
use crate::cart::totals::CartTotals;
use crate::config::OrdersConfig;
use crate::confirm::Confirm;
use crate::store::CartStore;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("cannot place an order from an empty cart")]
    EmptyCart,

    #[error("delivery detail `{field}` must not be empty")]
    InvalidDetails { field: &'static str },

    #[error("order service request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("order service rejected the order ({status}): {message}")]
    Rejected { status: u16, message: String },
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Where and to whom the order goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryDetails {
    pub customer_name: String,
    pub phone: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

impl DeliveryDetails {
    fn validate(&self) -> Result<(), OrderError> {
        let fields: [(&'static str, &str); 3] = [
            ("customerName", &self.customer_name),
            ("phone", &self.phone),
            ("address", &self.address),
        ];
        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(OrderError::InvalidDetails { field });
            }
        }
        Ok(())
    }
}

/// Body sent to the order service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub items: Vec<CartItem>,
    pub restaurant_id: String,
    pub restaurant_name: String,
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub taxes: Decimal,
    pub total: Decimal,
    pub placed_at: DateTime<Utc>,
    #[serde(flatten)]
    pub delivery: DeliveryDetails,
}

impl OrderRequest {
    /// Build a request from a bound cart. Returns `EmptyCart` when there is
    /// nothing to order.
    pub fn from_cart(
        cart: &Cart,
        totals: &CartTotals,
        delivery: DeliveryDetails,
    ) -> Result<Self, OrderError> {
        let restaurant = cart.restaurant().ok_or(OrderError::EmptyCart)?;
        if cart.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        Ok(Self {
            items: cart.items().to_vec(),
            restaurant_id: restaurant.id.clone(),
            restaurant_name: restaurant.name.clone(),
            subtotal: totals.subtotal,
            delivery_fee: totals.delivery_fee,
            taxes: totals.taxes,
            total: totals.total,
            placed_at: Utc::now(),
            delivery,
        })
    }
}

/// What the order service returns for an accepted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    #[serde(alias = "_id", alias = "id")]
    pub order_id: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub estimated_delivery_minutes: Option<u32>,
}

fn default_status() -> String {
    "placed".to_string()
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Remote collaborator that accepts orders.
#[async_trait]
pub trait OrderService: Send + Sync {
    async fn place_order(&self, request: &OrderRequest) -> Result<OrderConfirmation, OrderError>;
}

/// Order service reached over HTTP: `POST {base_url}/orders` with a JSON body.
pub struct HttpOrderService {
    http: reqwest::Client,
    base_url: String,
}

impl HttpOrderService {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, OrderError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    pub fn from_config(config: &OrdersConfig) -> Result<Self, OrderError> {
        Self::new(
            config.base_url.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn orders_url(&self) -> String {
        format!("{}/orders", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl OrderService for HttpOrderService {
    async fn place_order(&self, request: &OrderRequest) -> Result<OrderConfirmation, OrderError> {
        let response = self.http.post(self.orders_url()).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(OrderError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<OrderConfirmation>().await?)
    }
}

/// Place an order for everything in the cart.
///
/// The cart is cleared only after the service accepts the order; on any
/// failure it is left as it was so the shopper can retry.
pub async fn checkout<S, C, O>(
    manager: &mut CartManager<S, C>,
    service: &O,
    delivery: DeliveryDetails,
) -> Result<OrderConfirmation, OrderError>
where
    S: CartStore,
    C: Confirm,
    O: OrderService + ?Sized,
{
    delivery.validate()?;
    let request = OrderRequest::from_cart(manager.cart(), &manager.totals(), delivery)?;

    match service.place_order(&request).await {
        Ok(confirmation) => {
            info!(
                "Order {} placed with {} ({} lines, total {})",
                confirmation.order_id,
                request.restaurant_name,
                request.items.len(),
                request.total
            );
            manager.clear();
            Ok(confirmation)
        }
        Err(e) => {
            warn!("Order placement failed: {}", e);
            Err(e)
        }
    }
}
