//! HTML rendering for the dashboard page.
//!
//! Every piece of product text passes through [`escape_html`] before it is interpolated.

use std::fmt::Write;

use rust_decimal::Decimal;
use url::form_urlencoded;

use super::state::{ClientState, InventoryStats, LOW_STOCK_THRESHOLD};
use super::workflow::delete_prompt;
use super::Product;

/// Escapes text for use in element content and quoted attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Dollar amount with two decimal places
pub fn format_price(amount: Decimal) -> String {
    format!("${:.2}", amount.round_dp(2))
}

/// Active search and category, carried through links and form posts so a round trip keeps them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Filters<'a> {
    pub search: &'a str,
    pub category: &'a str,
}

impl<'a> Filters<'a> {
    pub fn of(state: &'a ClientState) -> Self {
        Self {
            search: &state.search_term,
            category: &state.category_filter,
        }
    }

    /// `path` with the filters and `extra` pairs as its query; empty values are left out.
    pub fn href(&self, path: &str, extra: &[(&str, &str)]) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        let pairs = [("search", self.search), ("category", self.category)];
        for (key, value) in pairs.iter().chain(extra) {
            if !value.is_empty() {
                query.append_pair(key, value);
            }
        }
        let query = query.finish();
        if query.is_empty() {
            path.to_string()
        } else {
            format!("{path}?{query}")
        }
    }

    fn hidden_inputs(&self) -> String {
        format!(
            r#"<input type="hidden" name="filter_search" value="{}"><input type="hidden" name="filter_category" value="{}">"#,
            escape_html(self.search),
            escape_html(self.category)
        )
    }
}

/// Outcome banner shown above the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

/// What the add/edit form shows, kept as text so a rejected submission can be redisplayed as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFormValues {
    pub name: String,
    pub description: String,
    pub category: String,
    pub sku: String,
    pub quantity: String,
    pub price: String,
}

impl From<&Product> for ProductFormValues {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
            sku: product.sku.clone().unwrap_or_default(),
            quantity: product.quantity.to_string(),
            price: product.price.to_string(),
        }
    }
}

/// Extras layered over the catalog view
#[derive(Debug, Clone, Default)]
pub struct DashboardPage {
    pub notice: Option<Notice>,
    /// Overrides the values taken from the product being edited
    pub form: Option<ProductFormValues>,
}

pub fn render_product_card(product: &Product) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        r#"<div class="product-card" data-id="{id}"><div class="product-header"><div><div class="product-name">{name}</div>"#,
        id = product.id,
        name = escape_html(&product.name),
    );
    if !product.category.is_empty() {
        let _ = write!(
            html,
            r#"<span class="product-category">{}</span>"#,
            escape_html(&product.category)
        );
    }
    html.push_str("</div></div>");

    if !product.description.is_empty() {
        let _ = write!(
            html,
            r#"<p class="product-description">{}</p>"#,
            escape_html(&product.description)
        );
    }
    if let Some(sku) = product.sku.as_deref().filter(|s| !s.is_empty()) {
        let _ = write!(html, r#"<div class="product-sku">SKU: {}</div>"#, escape_html(sku));
    }

    let low = if product.quantity < LOW_STOCK_THRESHOLD {
        " quantity-low"
    } else {
        ""
    };
    let _ = write!(
        html,
        concat!(
            r#"<div class="product-details">"#,
            r#"<div class="product-detail"><span class="detail-label">Quantity</span>"#,
            r#"<span class="detail-value quantity-value{low}">{quantity}</span></div>"#,
            r#"<div class="product-detail"><span class="detail-label">Price</span>"#,
            r#"<span class="detail-value price-value">{price}</span></div>"#,
            "</div></div>"
        ),
        low = low,
        quantity = product.quantity,
        price = format_price(product.price),
    );
    html
}

/// Quantity form, edit link and delete link for one card.
pub fn render_product_actions(product: &Product, filters: &Filters<'_>) -> String {
    let edit_id = product.id.to_string();
    format!(
        concat!(
            r#"<div class="product-actions">"#,
            r#"<form class="quantity-form" method="post" action="/products/{id}/quantity">{hidden}"#,
            r#"<input type="number" name="quantity" value="{quantity}" aria-label="Quantity" required>"#,
            r#"<button type="submit" class="btn btn-secondary">Update</button></form>"#,
            r#"<a class="btn btn-secondary" href="{edit}">Edit</a>"#,
            r#"<a class="btn btn-danger" href="{delete}">Delete</a>"#,
            "</div>"
        ),
        id = product.id,
        hidden = filters.hidden_inputs(),
        quantity = product.quantity,
        edit = escape_html(&filters.href("/", &[("edit", edit_id.as_str())])),
        delete = escape_html(&filters.href(&format!("/products/{}/delete", product.id), &[])),
    )
}

/// Product grid with per-card actions, or an empty-state panel when nothing matches.
pub fn render_product_cards(products: &[Product], filters: &Filters<'_>) -> String {
    if products.is_empty() {
        return concat!(
            r#"<div class="empty-state"><h3>No products found</h3>"#,
            "<p>Add your first product to get started!</p></div>"
        )
        .to_string();
    }
    products
        .iter()
        .map(|product| {
            let card = render_product_card(product);
            // actions go inside the card, before its closing tag
            let body = card.strip_suffix("</div>").unwrap_or(card.as_str());
            format!("{body}{}</div>", render_product_actions(product, filters))
        })
        .collect()
}

pub fn render_stats(stats: &InventoryStats) -> String {
    format!(
        concat!(
            r#"<div class="stats">"#,
            r#"<div class="stat-card"><span class="stat-label">Total Products</span><span class="stat-value" id="totalProducts">{}</span></div>"#,
            r#"<div class="stat-card"><span class="stat-label">Total Items</span><span class="stat-value" id="totalItems">{}</span></div>"#,
            r#"<div class="stat-card"><span class="stat-label">Total Value</span><span class="stat-value" id="totalValue">{}</span></div>"#,
            r#"<div class="stat-card"><span class="stat-label">Low Stock</span><span class="stat-value" id="lowStockCount">{}</span></div>"#,
            "</div>"
        ),
        stats.total_products,
        stats.total_items,
        format_price(stats.total_value),
        stats.low_stock_count,
    )
}

/// `<option>` list for the category filter, "All Categories" first.
pub fn render_category_options(categories: &[String], selected: &str) -> String {
    let mut html = String::from(r#"<option value="">All Categories</option>"#);
    for category in categories {
        let escaped = escape_html(category);
        let marker = if category == selected { " selected" } else { "" };
        let _ = write!(
            html,
            r#"<option value="{escaped}"{marker}>{escaped}</option>"#
        );
    }
    html
}

pub fn render_notice(notice: &Notice) -> String {
    let (kind, message) = match notice {
        Notice::Success(message) => ("success", message),
        Notice::Error(message) => ("error", message),
    };
    format!(
        r#"<div class="notification notification-{kind}" role="status">{}</div>"#,
        escape_html(message)
    )
}

/// Add form, or the edit form when the state has a product open for editing.
pub fn render_product_form(
    state: &ClientState,
    override_values: Option<&ProductFormValues>,
) -> String {
    let editing = state.editing_product();
    let values = override_values
        .cloned()
        .or_else(|| editing.map(ProductFormValues::from))
        .unwrap_or_default();
    let filters = Filters::of(state);

    let (title, action, submit) = match editing {
        Some(product) => (
            "Edit Product",
            format!("/products/{}", product.id),
            "Save Changes",
        ),
        None => ("Add Product", "/products".to_string(), "Add Product"),
    };
    let cancel = if editing.is_some() {
        format!(
            r#"<a class="btn btn-secondary" href="{}">Cancel</a>"#,
            escape_html(&filters.href("/", &[]))
        )
    } else {
        String::new()
    };

    format!(
        concat!(
            r#"<section class="product-form" id="productForm"><h2>{title}</h2>"#,
            r#"<form method="post" action="{action}">{hidden}"#,
            r#"<label>Name<input type="text" name="name" value="{name}" required></label>"#,
            r#"<label>Description<textarea name="description">{description}</textarea></label>"#,
            r#"<label>Category<input type="text" name="category" value="{category}"></label>"#,
            r#"<label>SKU<input type="text" name="sku" value="{sku}"></label>"#,
            r#"<label>Quantity<input type="number" name="quantity" value="{quantity}" required></label>"#,
            r#"<label>Price<input type="number" name="price" step="0.01" value="{price}" required></label>"#,
            r#"<div class="form-actions"><button type="submit" class="btn btn-primary">{submit}</button>{cancel}</div>"#,
            "</form></section>"
        ),
        title = title,
        action = action,
        hidden = filters.hidden_inputs(),
        name = escape_html(&values.name),
        description = escape_html(&values.description),
        category = escape_html(&values.category),
        sku = escape_html(&values.sku),
        quantity = escape_html(&values.quantity),
        price = escape_html(&values.price),
        submit = submit,
        cancel = cancel,
    )
}

fn render_document(title: &str, main: &str) -> String {
    format!(
        concat!(
            "<!DOCTYPE html>\n",
            r#"<html lang="en"><head><meta charset="utf-8">"#,
            r#"<meta name="viewport" content="width=device-width, initial-scale=1">"#,
            "<title>{title}</title>",
            r#"<link rel="stylesheet" href="/styles.css"></head><body>"#,
            r#"<header><h1>Inventory Tracker</h1></header><main>"#,
            "{main}",
            "</main></body></html>\n"
        ),
        title = escape_html(title),
        main = main,
    )
}

/// Full dashboard document for the given state.
pub fn render_dashboard(state: &ClientState) -> String {
    render_dashboard_page(state, &DashboardPage::default())
}

/// Full dashboard document with an optional banner and form override.
pub fn render_dashboard_page(state: &ClientState, page: &DashboardPage) -> String {
    let filters = Filters::of(state);
    let notice = page.notice.as_ref().map(render_notice).unwrap_or_default();
    let main = format!(
        concat!(
            "{notice}",
            "{stats}",
            r#"<form class="filters" method="get" action="/">"#,
            r#"<input type="search" id="searchInput" name="search" placeholder="Search products..." value="{search}">"#,
            r#"<select id="categoryFilter" name="category">{options}</select>"#,
            r#"<button type="submit" class="btn btn-primary">Filter</button></form>"#,
            "{form}",
            r#"<div class="products-grid" id="productsGrid">{cards}</div>"#,
        ),
        notice = notice,
        stats = render_stats(&state.stats()),
        search = escape_html(&state.search_term),
        options = render_category_options(&state.categories(), &state.category_filter),
        form = render_product_form(state, page.form.as_ref()),
        cards = render_product_cards(&state.filtered_products, &filters),
    );
    render_document("Inventory Tracker", &main)
}

/// Confirmation page shown before a product is deleted.
pub fn render_delete_confirmation(product: &Product, filters: &Filters<'_>) -> String {
    let main = format!(
        concat!(
            r#"<section class="confirm-delete"><p>{prompt}</p>"#,
            r#"<form method="post" action="/products/{id}/delete">{hidden}"#,
            r#"<button type="submit" class="btn btn-danger">Delete</button>"#,
            r#"<a class="btn btn-secondary" href="{cancel}">Cancel</a></form></section>"#,
        ),
        prompt = escape_html(&delete_prompt(&product.name)),
        id = product.id,
        hidden = filters.hidden_inputs(),
        cancel = escape_html(&filters.href("/", &[])),
    );
    render_document("Delete product", &main)
}
