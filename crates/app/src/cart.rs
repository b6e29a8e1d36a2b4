//! In-memory cart shared across screens.
//!
//! An ordered list of `(product, quantity)` pairs, uniqued by product ID,
//! with the total and item count derived on read. All operations are
//! synchronous; the cart lives for the session and is cleared after a
//! successful checkout. Nothing here persists or talks to the network.

use arrivo_core::{CurrencyCode, Price, ProductId};

use crate::models::Product;

/// One cart line: a product at a quantity of at least 1.
#[derive(Debug, Clone, PartialEq)]
pub struct CartItem {
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    /// Price of this line: unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.line_total(self.quantity)
    }
}

/// The session cart.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of `product`.
    ///
    /// A product already in the cart gets its quantity incremented;
    /// otherwise a new line is appended with quantity 1.
    pub fn add(&mut self, product: Product) {
        if let Some(item) = self.items.iter_mut().find(|i| i.product.id == product.id) {
            item.quantity += 1;
        } else {
            self.items.push(CartItem {
                product,
                quantity: 1,
            });
        }
    }

    /// Set the quantity of a line.
    ///
    /// A quantity below 1 removes the line, so no zero-quantity lines can
    /// exist. Unknown product IDs are ignored.
    pub fn update_quantity(&mut self, product_id: &ProductId, quantity: u32) {
        if quantity < 1 {
            self.remove(product_id);
            return;
        }
        if let Some(item) = self.items.iter_mut().find(|i| &i.product.id == product_id) {
            item.quantity = quantity;
        }
    }

    /// Remove a line entirely.
    pub fn remove(&mut self, product_id: &ProductId) {
        self.items.retain(|i| &i.product.id != product_id);
    }

    /// Empty the cart (successful checkout, logout).
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// The cart lines, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// True when no lines remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of `price * quantity` across all lines.
    ///
    /// An empty cart totals zero USD; otherwise the first line's currency
    /// is used (the catalog is seeded single-currency).
    #[must_use]
    pub fn total(&self) -> Price {
        let currency = self
            .items
            .first()
            .map_or(CurrencyCode::USD, |i| i.product.price.currency_code);

        self.items
            .iter()
            .fold(Price::zero(currency), |acc, item| acc + item.line_total())
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use arrivo_core::Price;
    use rust_decimal::Decimal;

    fn product(id: &str, price: u32) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("product {id}"),
            description: String::new(),
            price: Price::new(Decimal::from(price), CurrencyCode::USD),
            image_url: None,
            category: String::new(),
        }
    }

    #[test]
    fn test_add_new_product_starts_at_quantity_one() {
        let mut cart = Cart::new();
        cart.add(product("a", 100));

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_add_same_product_increments_quantity() {
        let mut cart = Cart::new();
        cart.add(product("a", 100));
        cart.add(product("a", 100));

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_total_and_item_count() {
        let mut cart = Cart::new();
        cart.add(product("a", 100));
        cart.add(product("a", 100));
        cart.add(product("b", 50));

        assert_eq!(cart.total().amount, Decimal::from(250));
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_update_quantity() {
        let mut cart = Cart::new();
        cart.add(product("a", 10));
        cart.update_quantity(&ProductId::new("a"), 5);

        assert_eq!(cart.item_count(), 5);
        assert_eq!(cart.total().amount, Decimal::from(50));
    }

    #[test]
    fn test_update_quantity_zero_equals_remove() {
        let mut by_update = Cart::new();
        by_update.add(product("a", 10));
        by_update.add(product("b", 20));
        by_update.update_quantity(&ProductId::new("a"), 0);

        let mut by_remove = Cart::new();
        by_remove.add(product("a", 10));
        by_remove.add(product("b", 20));
        by_remove.remove(&ProductId::new("a"));

        assert_eq!(by_update.items(), by_remove.items());
        assert!(by_update.items().iter().all(|i| i.quantity >= 1));
    }

    #[test]
    fn test_update_quantity_unknown_id_is_noop() {
        let mut cart = Cart::new();
        cart.add(product("a", 10));
        cart.update_quantity(&ProductId::new("ghost"), 7);

        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_remove_keeps_other_lines() {
        let mut cart = Cart::new();
        cart.add(product("a", 10));
        cart.add(product("b", 20));
        cart.remove(&ProductId::new("a"));

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].product.id.as_str(), "b");
    }

    #[test]
    fn test_no_zero_quantity_lines_survive_any_sequence() {
        let mut cart = Cart::new();
        cart.add(product("a", 10));
        cart.add(product("b", 20));
        cart.add(product("a", 10));
        cart.update_quantity(&ProductId::new("b"), 0);
        cart.update_quantity(&ProductId::new("a"), 3);
        cart.remove(&ProductId::new("missing"));

        assert!(cart.items().iter().all(|i| i.quantity >= 1));
        assert_eq!(
            cart.item_count(),
            cart.items().iter().map(|i| i.quantity).sum::<u32>()
        );
    }

    #[test]
    fn test_empty_cart_total_is_zero() {
        let cart = Cart::new();
        assert_eq!(cart.total().amount, Decimal::ZERO);
        assert_eq!(cart.item_count(), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add(product("a", 10));
        cart.clear();
        assert!(cart.is_empty());
    }
}
