//! Client-side view of the catalog: the fetched list, the filtered subset and the open form.

use rust_decimal::Decimal;

use super::Product;

/// Products with fewer units than this are flagged as low stock
pub const LOW_STOCK_THRESHOLD: i32 = 20;

/// Application state shared by the dashboard renderer and the workflows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientState {
    /// Every product from the last full fetch
    pub products: Vec<Product>,
    /// Subset currently shown, derived from `products` and the filters
    pub filtered_products: Vec<Product>,
    /// Product whose edit form is open, `None` when adding or idle
    pub editing_product_id: Option<i32>,
    pub search_term: String,
    pub category_filter: String,
}

impl ClientState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: Vec<Product>) -> Self {
        let mut state = Self::new();
        state.set_products(products);
        state
    }

    /// Replaces the list after a fetch and re-applies the active filters.
    pub fn set_products(&mut self, products: Vec<Product>) {
        self.products = products;
        self.apply_filters();
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
        self.apply_filters();
    }

    pub fn set_category(&mut self, category: impl Into<String>) {
        self.category_filter = category.into();
        self.apply_filters();
    }

    pub fn apply_filters(&mut self) {
        self.filtered_products =
            filter_products(&self.products, &self.search_term, &self.category_filter);
    }

    /// Totals over the whole catalog, ignoring filters
    pub fn stats(&self) -> InventoryStats {
        InventoryStats::compute(&self.products)
    }

    pub fn categories(&self) -> Vec<String> {
        categories(&self.products)
    }

    pub fn find(&self, id: i32) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn editing_product(&self) -> Option<&Product> {
        self.editing_product_id.and_then(|id| self.find(id))
    }
}

/// Aggregates shown in the dashboard header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InventoryStats {
    pub total_products: usize,
    pub total_items: i64,
    pub total_value: Decimal,
    pub low_stock_count: usize,
}

impl InventoryStats {
    /// Sums saturate at the numeric limits instead of overflowing.
    pub fn compute(products: &[Product]) -> Self {
        products.iter().fold(Self::default(), |mut stats, product| {
            stats.total_products += 1;
            stats.total_items = stats.total_items.saturating_add(i64::from(product.quantity));
            let line_value = Decimal::from(product.quantity).saturating_mul(product.price);
            stats.total_value = stats.total_value.saturating_add(line_value);
            if product.quantity < LOW_STOCK_THRESHOLD {
                stats.low_stock_count += 1;
            }
            stats
        })
    }
}

/// Distinct non-empty categories in first-seen order.
pub fn categories(products: &[Product]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for product in products {
        if !product.category.is_empty() && !seen.contains(&product.category) {
            seen.push(product.category.clone());
        }
    }
    seen
}

/// Case-insensitive search over name, description and SKU, combined with an exact category match.
///
/// An empty search term or category disables that half of the filter.
pub fn filter_products(products: &[Product], search: &str, category: &str) -> Vec<Product> {
    let needle = search.to_lowercase();

    products
        .iter()
        .filter(|product| {
            let matches_search = needle.is_empty()
                || product.name.to_lowercase().contains(&needle)
                || product.description.to_lowercase().contains(&needle)
                || product
                    .sku
                    .as_deref()
                    .is_some_and(|sku| sku.to_lowercase().contains(&needle));
            let matches_category = category.is_empty() || product.category == category;
            matches_search && matches_category
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn product(id: i32, name: &str, category: &str, quantity: i32, price: Decimal) -> Product {
        Product {
            id,
            name: name.to_string(),
            description: String::new(),
            category: category.to_string(),
            quantity,
            price,
            sku: None,
            created_at: Utc::now(),
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product(1, "Wireless Mouse", "Electronics", 45, dec!(29.99)),
            product(2, "Desk Lamp", "Office", 40, dec!(34.99)),
            product(3, "Webcam HD", "Electronics", 20, dec!(59.99)),
            product(4, "Mouse Pad", "", 5, dec!(4.50)),
        ]
    }

    #[test]
    fn stats_sum_quantity_and_value() {
        let products = vec![
            product(1, "A", "", 5, dec!(10.00)),
            product(2, "B", "", 0, dec!(5.00)),
        ];
        let stats = InventoryStats::compute(&products);
        assert_eq!(stats.total_products, 2);
        assert_eq!(stats.total_items, 5);
        assert_eq!(stats.total_value, dec!(50.00));
        assert_eq!(stats.low_stock_count, 2);
    }

    #[test]
    fn stats_saturate_instead_of_overflowing() {
        let products = vec![
            product(1, "A", "", i32::MAX, Decimal::MAX),
            product(2, "B", "", 100, Decimal::from_scientific("1e27").unwrap()),
        ];
        let stats = InventoryStats::compute(&products);
        assert_eq!(stats.total_value, Decimal::MAX);
        assert_eq!(stats.total_items, i64::from(i32::MAX) + 100);
    }

    #[test]
    fn threshold_quantity_is_not_low_stock() {
        let stats = InventoryStats::compute(&catalog());
        assert_eq!(stats.low_stock_count, 1);
    }

    #[test]
    fn categories_skip_blank_and_keep_first_seen_order() {
        assert_eq!(categories(&catalog()), vec!["Electronics", "Office"]);
    }

    #[test]
    fn search_is_case_insensitive() {
        let names: Vec<_> = filter_products(&catalog(), "MOUSE", "")
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Wireless Mouse", "Mouse Pad"]);
    }

    #[test]
    fn search_and_category_combine() {
        let filtered = filter_products(&catalog(), "mouse", "Electronics");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, 1);
    }

    #[test]
    fn category_alone_keeps_every_match() {
        let mut products = catalog();
        products.push(product(5, "USB Hub", "Electronics", 12, dec!(19.99)));
        let ids: Vec<i32> = filter_products(&products, "", "Electronics")
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![1, 3, 5]);
    }

    #[test]
    fn editing_product_follows_the_open_form() {
        let mut state = ClientState::with_products(catalog());
        assert!(state.editing_product().is_none());
        state.editing_product_id = Some(3);
        assert_eq!(state.editing_product().map(|p| p.name.as_str()), Some("Webcam HD"));
        state.editing_product_id = Some(99);
        assert!(state.editing_product().is_none());
    }

    #[test]
    fn search_matches_sku() {
        let mut products = catalog();
        products[1].sku = Some("OFF-001".to_string());
        let filtered = filter_products(&products, "off-0", "");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "Desk Lamp");
    }

    #[test]
    fn reload_keeps_active_filters() {
        let mut state = ClientState::with_products(catalog());
        state.set_category("Office");
        assert_eq!(state.filtered_products.len(), 1);

        let mut refreshed = catalog();
        refreshed.push(product(5, "Stapler", "Office", 50, dec!(14.99)));
        state.set_products(refreshed);
        assert_eq!(state.filtered_products.len(), 2);
        assert_eq!(state.stats().total_products, 5);
    }
}
