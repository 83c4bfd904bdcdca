//! # Cart Tests
//!
//! Quantity merging, removal and total bookkeeping of the shopping cart.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use recipe_basket::cart::{Cart, RemoveOutcome};
use recipe_basket::errors::CartError;
use recipe_basket::localization::LocalizationManager;
use recipe_basket::resolver::FormattedProduct;

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

    fn assert_totals_consistent(cart: &Cart) {
        for item in cart.items() {
            let quantity = f64::from(item.quantity());
            assert_eq!(item.total_price(), quantity * item.price());
            assert_eq!(item.total_price_with_tax(), quantity * item.price_with_tax());
        }
    }

    #[test]
    fn test_single_add_then_remove_empties_cart() {
        let mut cart = Cart::new();
        cart.add(&product("しょうゆ", "98", "108円"), 1).unwrap();
        assert_eq!(cart.remove("しょうゆ"), RemoveOutcome::Removed);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_repeat_adds_merge_into_one_item() {
        let soy = product("しょうゆ", "98", "108円");
        let mut cart = Cart::new();
        cart.add(&soy, 2).unwrap();
        cart.add(&soy, 3).unwrap();

        assert_eq!(cart.items().len(), 1);
        let item = cart.get("しょうゆ").unwrap();
        assert_eq!(item.quantity(), 5);
        assert_eq!(item.total_price(), 490.0);
        assert_eq!(item.total_price_with_tax(), 540.0);
    }

    #[test]
    fn test_prices_parsed_from_strings() {
        let mut cart = Cart::new();
        cart.add(&product("牛肉", "¥1,280", "税込 1,382.4円"), 1).unwrap();
        let item = cart.get("牛肉").unwrap();
        assert_eq!(item.price(), 1280.0);
        assert_eq!(item.price_with_tax(), 1382.4);
        assert_eq!(item.weight(), "500 ml");
    }

    #[test]
    fn test_remove_unknown_product_is_not_found() {
        let mut cart = Cart::new();
        cart.add(&product("塩", "100", "108円"), 1).unwrap();
        assert_eq!(cart.remove("砂糖"), RemoveOutcome::NotFound);
        assert_eq!(cart.total_items(), 1);
    }

    #[test]
    fn test_totals_hold_after_random_operations() {
        let catalog = [
            product("しょうゆ", "98", "108円"),
            product("みりん", "300", "324円"),
            product("塩", "99.5", "107.46円"),
            product("卵", "1,000", "1,080円"),
        ];
        let mut rng = StdRng::seed_from_u64(7);
        let mut cart = Cart::new();

        for _ in 0..500 {
            let pick = &catalog[rng.gen_range(0..catalog.len())];
            if rng.gen_bool(0.6) {
                cart.add(pick, rng.gen_range(1..4)).unwrap();
            } else {
                cart.remove(&pick.product_name);
            }
            assert_totals_consistent(&cart);
        }
    }

    #[test]
    fn test_items_keep_insertion_order() {
        let mut cart = Cart::new();
        cart.add(&product("b", "1", "1円"), 1).unwrap();
        cart.add(&product("a", "1", "1円"), 1).unwrap();
        cart.add(&product("b", "1", "1円"), 1).unwrap();

        let names: Vec<&str> = cart.items().iter().map(|i| i.product_name()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_summary_total_is_sum_of_items() {
        let localization = LocalizationManager::new().unwrap();
        let mut cart = Cart::new();
        cart.add(&product("しょうゆ", "98", "108円"), 2).unwrap();
        cart.add(&product("みりん", "300", "324円"), 1).unwrap();

        assert_eq!(cart.total_price_with_tax(), 540.0);
        assert_eq!(cart.total_price(), 496.0);

        let lines = cart.summary(&localization, "en");
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("2 x しょうゆ"));
        assert!(lines[0].contains("108 円"));
        assert!(lines[1].starts_with("1 x みりん"));
        assert_eq!(lines[2], "---");
        assert_eq!(lines[3], "**Total price: 540 円(税込)**");
    }

    #[test]
    fn test_summary_in_japanese() {
        let localization = LocalizationManager::new().unwrap();
        let mut cart = Cart::new();
        cart.add(&product("しょうゆ", "98", "108円"), 1).unwrap();

        let lines = cart.summary(&localization, "japanese");
        assert!(lines[0].contains("税込価格: 108 円"));
        assert_eq!(lines.last().unwrap(), "**合計金額: 108 円(税込)**");
    }

    #[test]
    fn test_empty_cart_summary() {
        let localization = LocalizationManager::new().unwrap();
        let cart = Cart::new();
        assert_eq!(cart.summary(&localization, "en"), vec!["Your cart is empty."]);
        assert_eq!(cart.summary(&localization, "ja"), vec!["カートは空です。"]);
    }

    #[test]
    fn test_quantity_overflow_leaves_item_untouched() {
        let soy = product("しょうゆ", "98", "108円");
        let mut cart = Cart::new();
        cart.add(&soy, u32::MAX).unwrap();

        assert_eq!(
            cart.add(&soy, 1),
            Err(CartError::QuantityOverflow {
                product_name: "しょうゆ".to_string(),
                quantity: 1,
            })
        );
        let item = cart.get("しょうゆ").unwrap();
        assert_eq!(item.quantity(), u32::MAX);
        assert_totals_consistent(&cart);
    }

    #[test]
    fn test_total_items_beyond_u32() {
        let mut cart = Cart::new();
        cart.add(&product("しょうゆ", "98", "108円"), u32::MAX).unwrap();
        cart.add(&product("塩", "100", "108円"), 1).unwrap();
        assert_eq!(cart.total_items(), u64::from(u32::MAX) + 1);
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add(&product("塩", "100", "108円"), 4).unwrap();
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total_items(), 0);
    }
}
