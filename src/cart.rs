//! # Cart Module
//!
//! A session-scoped shopping cart keyed by product name. Each item keeps its
//! unit prices and quantity; both totals are recomputed from those after every
//! mutation.

use chrono::{DateTime, Utc};
use fluent::FluentArgs;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::errors::CartError;
use crate::localization::LocalizationManager;
use crate::pricing::{format_amount, parse_price};
use crate::resolver::FormattedProduct;

/// One distinct product in the cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(rename = "Product_name")]
    product_name: String,
    #[serde(rename = "Price")]
    price: f64,
    #[serde(rename = "Price_with_Tax")]
    price_with_tax: f64,
    #[serde(rename = "Weight")]
    weight: String,
    #[serde(rename = "Quantity")]
    quantity: u32,
    #[serde(rename = "Total_price")]
    total_price: f64,
    #[serde(rename = "Total_Price_with_Tax")]
    total_price_with_tax: f64,
    added_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CartItem {
    fn new(product: &FormattedProduct, quantity: u32) -> Self {
        let now = Utc::now();
        let mut item = Self {
            product_name: product.product_name.clone(),
            price: parse_price(&product.price),
            price_with_tax: parse_price(&product.tax),
            weight: product.weight.clone(),
            quantity,
            total_price: 0.0,
            total_price_with_tax: 0.0,
            added_at: now,
            updated_at: now,
        };
        item.recompute_totals();
        item
    }

    fn recompute_totals(&mut self) {
        let quantity = f64::from(self.quantity);
        self.total_price = quantity * self.price;
        self.total_price_with_tax = quantity * self.price_with_tax;
        self.updated_at = Utc::now();
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn price_with_tax(&self) -> f64 {
        self.price_with_tax
    }

    pub fn weight(&self) -> &str {
        &self.weight
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn total_price(&self) -> f64 {
        self.total_price
    }

    pub fn total_price_with_tax(&self) -> f64 {
        self.total_price_with_tax
    }

    pub fn added_at(&self) -> DateTime<Utc> {
        self.added_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// What a removal did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// One unit removed, `remaining` units left
    Decremented { remaining: u32 },
    /// The last unit was removed along with the item
    Removed,
    /// No item with that name was in the cart
    NotFound,
}

/// Items in insertion order, at most one per product name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, product_name: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.product_name == product_name)
    }

    /// Add `quantity` units of a product, merging with an existing item
    ///
    /// A repeat add refreshes the unit prices and weight from `product`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use recipe_basket::cart::Cart;
    /// use recipe_basket::resolver::FormattedProduct;
    ///
    /// let soy = FormattedProduct {
    ///     product_name: "しょうゆ".to_string(),
    ///     tax: "108円".to_string(),
    ///     price: "98".to_string(),
    ///     weight: "500 ml".to_string(),
    /// };
    ///
    /// let mut cart = Cart::new();
    /// cart.add(&soy, 2).unwrap();
    /// cart.add(&soy, 3).unwrap();
    ///
    /// assert_eq!(cart.items().len(), 1);
    /// assert_eq!(cart.total_items(), 5);
    /// assert_eq!(cart.total_price_with_tax(), 540.0);
    /// ```
    pub fn add(&mut self, product: &FormattedProduct, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity(quantity));
        }

        match self.position(&product.product_name) {
            Some(index) => {
                let item = &mut self.items[index];
                let Some(merged) = item.quantity.checked_add(quantity) else {
                    warn!(
                        "Cart: adding {} to '{}' would overflow its quantity",
                        quantity, item.product_name
                    );
                    return Err(CartError::QuantityOverflow {
                        product_name: item.product_name.clone(),
                        quantity,
                    });
                };
                item.quantity = merged;
                item.price = parse_price(&product.price);
                item.price_with_tax = parse_price(&product.tax);
                item.weight = product.weight.clone();
                item.recompute_totals();
                debug!(
                    "Cart: '{}' quantity now {}",
                    item.product_name, item.quantity
                );
            }
            None => {
                self.items.push(CartItem::new(product, quantity));
                info!("Cart: added {} x '{}'", quantity, product.product_name);
            }
        }
        Ok(())
    }

    /// Remove one unit of a product, deleting the item at quantity one
    pub fn remove(&mut self, product_name: &str) -> RemoveOutcome {
        let Some(index) = self.position(product_name) else {
            warn!("Cart: '{}' not found in cart", product_name);
            return RemoveOutcome::NotFound;
        };

        let item = &mut self.items[index];
        if item.quantity > 1 {
            item.quantity -= 1;
            item.recompute_totals();
            debug!("Cart: '{}' quantity now {}", product_name, item.quantity);
            RemoveOutcome::Decremented {
                remaining: item.quantity,
            }
        } else {
            self.items.remove(index);
            info!("Cart: removed '{}'", product_name);
            RemoveOutcome::Removed
        }
    }

    /// Localized summary: one line per item, a separator and the grand total
    ///
    /// An empty cart renders a single "cart is empty" line.
    pub fn summary(&self, localization: &LocalizationManager, language: &str) -> Vec<String> {
        if self.items.is_empty() {
            return vec![localization.format("cart-empty", language, None)];
        }

        let mut lines: Vec<String> = self
            .items
            .iter()
            .map(|item| {
                let mut args = FluentArgs::new();
                args.set("quantity", item.quantity.to_string());
                args.set("name", item.product_name.as_str());
                args.set("price", format_amount(item.price_with_tax));
                localization.format("cart-line", language, Some(&args))
            })
            .collect();

        lines.push("---".to_string());
        let mut total = FluentArgs::new();
        total.set("total", format_amount(self.total_price_with_tax()));
        lines.push(localization.format("cart-total", language, Some(&total)));
        lines
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn get(&self, product_name: &str) -> Option<&CartItem> {
        self.items
            .iter()
            .find(|item| item.product_name == product_name)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of all quantities
    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    pub fn total_price(&self) -> f64 {
        self.items.iter().map(|item| item.total_price).sum()
    }

    pub fn total_price_with_tax(&self) -> f64 {
        self.items.iter().map(|item| item.total_price_with_tax).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str, price: &str, tax: &str) -> FormattedProduct {
        FormattedProduct {
            product_name: name.to_string(),
            tax: tax.to_string(),
            price: price.to_string(),
            weight: "500 ml".to_string(),
        }
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let mut cart = Cart::new();
        assert_eq!(
            cart.add(&product("しょうゆ", "98", "108円"), 0),
            Err(CartError::InvalidQuantity(0))
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn test_repeat_add_refreshes_prices() {
        let mut cart = Cart::new();
        cart.add(&product("しょうゆ", "98", "108円"), 1).unwrap();
        cart.add(&product("しょうゆ", "100", "110円"), 1).unwrap();

        let item = cart.get("しょうゆ").unwrap();
        assert_eq!(item.quantity(), 2);
        assert_eq!(item.price(), 100.0);
        assert_eq!(item.total_price(), 200.0);
        assert_eq!(item.total_price_with_tax(), 220.0);
        assert!(item.updated_at() >= item.added_at());
    }

    #[test]
    fn test_remove_walks_down_to_absent() {
        let mut cart = Cart::new();
        cart.add(&product("塩", "100", "108円"), 2).unwrap();

        assert_eq!(cart.remove("塩"), RemoveOutcome::Decremented { remaining: 1 });
        assert_eq!(cart.get("塩").unwrap().total_price_with_tax(), 108.0);
        assert_eq!(cart.remove("塩"), RemoveOutcome::Removed);
        assert_eq!(cart.remove("塩"), RemoveOutcome::NotFound);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_unparseable_prices_become_zero() {
        let mut cart = Cart::new();
        cart.add(&product("水", "free", ""), 3).unwrap();
        assert_eq!(cart.total_price(), 0.0);
        assert_eq!(cart.total_price_with_tax(), 0.0);
    }

    #[test]
    fn test_serialized_field_names() {
        let mut cart = Cart::new();
        cart.add(&product("しょうゆ", "98", "108円"), 1).unwrap();
        let json = serde_json::to_value(&cart).unwrap();
        let item = &json[0];
        assert_eq!(item["Product_name"], "しょうゆ");
        assert_eq!(item["Price_with_Tax"], 108.0);
        assert_eq!(item["Total_Price_with_Tax"], 108.0);
        assert_eq!(item["Quantity"], 1);
    }
}
