//! Starter catalog written into an empty store on first start.

use rust_decimal::Decimal;

use crate::repositories::product_repository::NewProduct;

struct SeedProduct {
    name: &'static str,
    description: &'static str,
    category: &'static str,
    quantity: i32,
    price_cents: i64,
    sku: &'static str,
}

const SEED_CATALOG: [SeedProduct; 20] = [
    SeedProduct { name: "Wireless Mouse", description: "Ergonomic wireless mouse with 2.4GHz connection", category: "Electronics", quantity: 45, price_cents: 2999, sku: "ELEC-001" },
    SeedProduct { name: "USB-C Cable", description: "6ft USB-C to USB-C cable, fast charging", category: "Electronics", quantity: 150, price_cents: 1299, sku: "ELEC-002" },
    SeedProduct { name: "Laptop Stand", description: "Aluminum adjustable laptop stand", category: "Electronics", quantity: 30, price_cents: 4999, sku: "ELEC-003" },
    SeedProduct { name: "Mechanical Keyboard", description: "RGB backlit mechanical keyboard with blue switches", category: "Electronics", quantity: 25, price_cents: 8999, sku: "ELEC-004" },
    SeedProduct { name: "Webcam HD", description: "1080p HD webcam with built-in microphone", category: "Electronics", quantity: 20, price_cents: 5999, sku: "ELEC-005" },
    SeedProduct { name: "Desk Lamp", description: "LED desk lamp with adjustable brightness", category: "Office", quantity: 40, price_cents: 3499, sku: "OFF-001" },
    SeedProduct { name: "Office Chair", description: "Ergonomic office chair with lumbar support", category: "Furniture", quantity: 15, price_cents: 24999, sku: "FURN-001" },
    SeedProduct { name: "Standing Desk", description: "Electric height-adjustable standing desk", category: "Furniture", quantity: 10, price_cents: 49999, sku: "FURN-002" },
    SeedProduct { name: "Monitor 27\"", description: "27-inch 4K UHD monitor with HDR", category: "Electronics", quantity: 18, price_cents: 39999, sku: "ELEC-006" },
    SeedProduct { name: "Headphones", description: "Wireless noise-cancelling over-ear headphones", category: "Electronics", quantity: 35, price_cents: 19999, sku: "ELEC-007" },
    SeedProduct { name: "Notebook Set", description: "Set of 3 premium lined notebooks", category: "Stationery", quantity: 100, price_cents: 1599, sku: "STAT-001" },
    SeedProduct { name: "Pen Set", description: "Professional ballpoint pen set, 12 pieces", category: "Stationery", quantity: 75, price_cents: 2499, sku: "STAT-002" },
    SeedProduct { name: "Whiteboard", description: "Magnetic dry-erase whiteboard 36x24 inches", category: "Office", quantity: 22, price_cents: 4499, sku: "OFF-002" },
    SeedProduct { name: "File Cabinet", description: "3-drawer metal file cabinet with lock", category: "Furniture", quantity: 12, price_cents: 14999, sku: "FURN-003" },
    SeedProduct { name: "Desk Organizer", description: "Bamboo desktop organizer with compartments", category: "Office", quantity: 60, price_cents: 2999, sku: "OFF-003" },
    SeedProduct { name: "Printer Paper", description: "A4 printer paper, 500 sheets", category: "Stationery", quantity: 200, price_cents: 999, sku: "STAT-003" },
    SeedProduct { name: "Stapler", description: "Heavy-duty desktop stapler", category: "Office", quantity: 50, price_cents: 1499, sku: "OFF-004" },
    SeedProduct { name: "Scissors", description: "8-inch stainless steel scissors", category: "Office", quantity: 80, price_cents: 799, sku: "OFF-005" },
    SeedProduct { name: "Calculator", description: "Scientific calculator with large display", category: "Office", quantity: 45, price_cents: 1999, sku: "OFF-006" },
    SeedProduct { name: "Coffee Mug", description: "Ceramic coffee mug, 14 oz", category: "Kitchen", quantity: 90, price_cents: 1199, sku: "KITCH-001" },
];

/// Number of rows written by a fresh seed.
pub const SEED_COUNT: usize = SEED_CATALOG.len();

/// The starter catalog as insertable products, in insertion order.
pub fn seed_products() -> Vec<NewProduct> {
    SEED_CATALOG
        .iter()
        .map(|seed| NewProduct {
            name: seed.name.to_string(),
            description: seed.description.to_string(),
            category: seed.category.to_string(),
            quantity: seed.quantity,
            price: Decimal::new(seed.price_cents, 2),
            sku: Some(seed.sku.to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn seed_skus_are_unique() {
        let skus: HashSet<_> = SEED_CATALOG.iter().map(|s| s.sku).collect();
        assert_eq!(skus.len(), SEED_COUNT);
    }

    #[test]
    fn seed_prices_keep_cents() {
        let products = seed_products();
        assert_eq!(products[0].name, "Wireless Mouse");
        assert_eq!(products[0].price.to_string(), "29.99");
        assert_eq!(products[19].sku.as_deref(), Some("KITCH-001"));
    }
}
