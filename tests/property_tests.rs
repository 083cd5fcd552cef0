//! Property-based tests for catalog statistics, filtering and request coercion.

use chrono::Utc;
use inventory_tracker::client::{
    categories, filter_products, render::escape_html, InventoryStats, Product,
    LOW_STOCK_THRESHOLD,
};
use inventory_tracker::handlers::common::{coerce_price, coerce_quantity};
use proptest::prelude::*;
use rust_decimal::Decimal;
use serde_json::json;

fn category_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("Electronics".to_string()),
        Just("Office".to_string()),
        Just("Kitchen".to_string()),
    ]
}

fn product_strategy() -> impl Strategy<Value = Product> {
    (
        1i32..10_000,
        "[A-Za-z ]{1,20}",
        "[a-z ]{0,30}",
        category_strategy(),
        -50i32..1_000,
        (0i64..100_000).prop_map(|cents| Decimal::new(cents, 2)),
        proptest::option::of("[A-Z]{3}-[0-9]{3}"),
    )
        .prop_map(|(id, name, description, category, quantity, price, sku)| Product {
            id,
            name,
            description,
            category,
            quantity,
            price,
            sku,
            created_at: Utc::now(),
        })
}

proptest! {
    #[test]
    fn stats_match_direct_sums(products in prop::collection::vec(product_strategy(), 0..40)) {
        let stats = InventoryStats::compute(&products);

        prop_assert_eq!(stats.total_products, products.len());
        prop_assert_eq!(
            stats.total_items,
            products.iter().map(|p| i64::from(p.quantity)).sum::<i64>()
        );
        let value: Decimal = products
            .iter()
            .map(|p| Decimal::from(p.quantity) * p.price)
            .sum();
        prop_assert_eq!(stats.total_value, value);
        prop_assert_eq!(
            stats.low_stock_count,
            products.iter().filter(|p| p.quantity < LOW_STOCK_THRESHOLD).count()
        );
    }

    #[test]
    fn empty_filters_keep_everything(products in prop::collection::vec(product_strategy(), 0..40)) {
        prop_assert_eq!(filter_products(&products, "", ""), products);
    }

    #[test]
    fn filtered_products_are_an_ordered_subset(
        products in prop::collection::vec(product_strategy(), 0..40),
        search in "[a-z]{0,3}",
        category in category_strategy(),
    ) {
        let filtered = filter_products(&products, &search, &category);
        prop_assert!(filtered.len() <= products.len());

        let mut remaining = products.iter();
        for product in &filtered {
            prop_assert!(remaining.any(|p| p == product));
            if !category.is_empty() {
                prop_assert_eq!(&product.category, &category);
            }
        }
    }

    #[test]
    fn filtering_is_idempotent(
        products in prop::collection::vec(product_strategy(), 0..40),
        search in "[a-z]{0,3}",
        category in category_strategy(),
    ) {
        let once = filter_products(&products, &search, &category);
        let twice = filter_products(&once, &search, &category);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn categories_are_distinct_and_non_empty(products in prop::collection::vec(product_strategy(), 0..40)) {
        let cats = categories(&products);
        prop_assert!(cats.iter().all(|c| !c.is_empty()));
        let unique: std::collections::HashSet<_> = cats.iter().collect();
        prop_assert_eq!(unique.len(), cats.len());
    }

    #[test]
    fn escaped_text_has_no_markup(text in ".*") {
        let escaped = escape_html(&text);
        prop_assert!(!escaped.contains('<'));
        prop_assert!(!escaped.contains('>'));
        prop_assert!(!escaped.contains('"'));
    }

    #[test]
    fn integer_quantities_round_trip(quantity in any::<i32>()) {
        prop_assert_eq!(coerce_quantity(&json!(quantity)).unwrap(), quantity);
        prop_assert_eq!(coerce_quantity(&json!(quantity.to_string())).unwrap(), quantity);
    }

    #[test]
    fn cent_prices_parse_exactly(cents in 0i64..10_000_000) {
        let price = Decimal::new(cents, 2);
        prop_assert_eq!(coerce_price(&json!(price.to_string())).unwrap(), price);
    }
}
