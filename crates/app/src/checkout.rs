//! Checkout: turn the cart into an order document.
//!
//! The order is written to the `orders` collection with a store-generated
//! ID; the caller clears the cart only after the write succeeds, so a
//! failed checkout leaves the cart intact for retry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use arrivo_core::{OrderId, OrderStatus, Price, ProductId, UserId};

use crate::cart::Cart;
use crate::services::docstore::{DocStoreClient, DocStoreError};

/// Collection holding order documents.
const ORDERS_COLLECTION: &str = "orders";

/// Errors that can occur while placing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Checkout with nothing in the cart.
    #[error("cart is empty")]
    EmptyCart,

    /// Writing the order document failed.
    #[error("order write failed: {0}")]
    DocStore(#[from] DocStoreError),
}

/// One line of an order, denormalized from the cart at checkout time so
/// later catalog edits don't rewrite order history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Price,
    pub quantity: u32,
    pub line_total: Price,
}

/// An order document (`orders` collection).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub user_id: UserId,
    pub lines: Vec<OrderLine>,
    pub total: Price,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// Write the cart as a pending order for `uid`.
///
/// Returns the store-generated order ID with the written document. The
/// caller is responsible for clearing the cart afterwards.
///
/// # Errors
///
/// Returns `CheckoutError::EmptyCart` for an empty cart, or the document
/// store failure when the write does not go through.
pub async fn place_order(
    docstore: &DocStoreClient,
    uid: &UserId,
    cart: &Cart,
) -> Result<(OrderId, Order), CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let order = Order {
        user_id: uid.clone(),
        lines: cart
            .items()
            .iter()
            .map(|item| OrderLine {
                product_id: item.product.id.clone(),
                name: item.product.name.clone(),
                unit_price: item.product.price,
                quantity: item.quantity,
                line_total: item.line_total(),
            })
            .collect(),
        total: cart.total(),
        status: OrderStatus::Pending,
        created_at: Utc::now(),
    };

    let id = docstore.add(ORDERS_COLLECTION, &order).await?;
    let order_id = OrderId::new(id.into_inner());

    info!(
        uid = %uid,
        order_id = %order_id,
        items = order.lines.len(),
        total = %order.total,
        "order placed"
    );
    Ok((order_id, order))
}
