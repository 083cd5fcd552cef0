//! Server-rendered dashboard and the HTML form posts behind it.
//!
//! Writes go through the same request coercion and repository calls as the JSON API. A successful
//! post redirects back to the dashboard with the active filters; a rejected one re-renders it with
//! the error and the submitted values.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;
use utoipa::IntoParams;

use crate::client::render::{
    render_dashboard_page, render_delete_confirmation, DashboardPage, Filters, Notice,
    ProductFormValues,
};
use crate::client::workflow::{
    PRODUCT_ADDED, PRODUCT_DELETED, PRODUCT_UPDATED, QUANTITY_UPDATED,
};
use crate::client::ClientState;
use crate::errors::ServiceError;
use crate::handlers::common::parse_id;
use crate::handlers::products::{ProductHandlerState, ProductRequest, QuantityRequest};

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct DashboardQuery {
    /// Case-insensitive match on name, description or SKU
    pub search: Option<String>,
    /// Exact category
    pub category: Option<String>,
    /// Id of the product to open in the edit form
    pub edit: Option<String>,
    /// Outcome of the previous form post: added, updated, quantity or deleted
    pub notice: Option<String>,
}

/// Filters echoed back by every form as hidden fields
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FilterForm {
    #[serde(rename = "filter_search")]
    pub search: String,
    #[serde(rename = "filter_category")]
    pub category: String,
}

impl FilterForm {
    fn filters(&self) -> Filters<'_> {
        Filters {
            search: &self.search,
            category: &self.category,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub category: String,
    pub sku: String,
    pub quantity: String,
    pub price: String,
    #[serde(flatten)]
    pub filters: FilterForm,
}

impl ProductForm {
    fn values(&self) -> ProductFormValues {
        ProductFormValues {
            name: self.name.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            sku: self.sku.clone(),
            quantity: self.quantity.clone(),
            price: self.price.clone(),
        }
    }
}

impl From<ProductForm> for ProductRequest {
    fn from(form: ProductForm) -> Self {
        Self {
            name: Some(Value::String(form.name)),
            description: Some(Value::String(form.description)),
            category: Some(Value::String(form.category)),
            quantity: Some(Value::String(form.quantity)),
            price: Some(Value::String(form.price)),
            sku: Some(Value::String(form.sku)),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct QuantityForm {
    pub quantity: String,
    #[serde(flatten)]
    pub filters: FilterForm,
}

fn notice_for(code: &str) -> Option<Notice> {
    let message = match code {
        "added" => PRODUCT_ADDED,
        "updated" => PRODUCT_UPDATED,
        "quantity" => QUANTITY_UPDATED,
        "deleted" => PRODUCT_DELETED,
        _ => return None,
    };
    Some(Notice::Success(message.to_string()))
}

async fn load_view<S>(
    state: &S,
    search: &str,
    category: &str,
) -> Result<ClientState, ServiceError>
where
    S: ProductHandlerState,
{
    let products = state
        .product_repository()
        .list_all()
        .await
        .map_err(|e| e.or_internal("Failed to load products"))?;

    let mut view = ClientState::with_products(products);
    view.search_term = search.to_string();
    view.category_filter = category.to_string();
    view.apply_filters();
    Ok(view)
}

fn back_to_dashboard(filters: &FilterForm, notice: &str) -> Response {
    Redirect::to(&filters.filters().href("/", &[("notice", notice)])).into_response()
}

/// Dashboard showing `err` above the catalog, with the error's status code.
async fn rejected<S>(
    state: &S,
    filters: &FilterForm,
    editing: Option<i32>,
    form: Option<ProductFormValues>,
    err: ServiceError,
) -> Response
where
    S: ProductHandlerState,
{
    match load_view(state, &filters.search, &filters.category).await {
        Ok(mut view) => {
            view.editing_product_id = editing;
            let page = DashboardPage {
                notice: Some(Notice::Error(err.response_message())),
                form,
            };
            (err.status_code(), Html(render_dashboard_page(&view, &page))).into_response()
        }
        Err(_) => err.into_response(),
    }
}

/// Server-rendered dashboard over the current catalog
pub async fn dashboard<S>(
    State(state): State<S>,
    Query(query): Query<DashboardQuery>,
) -> Result<Html<String>, ServiceError>
where
    S: ProductHandlerState,
{
    let mut view = load_view(
        &state,
        query.search.as_deref().unwrap_or_default(),
        query.category.as_deref().unwrap_or_default(),
    )
    .await?;
    view.editing_product_id = query.edit.as_deref().and_then(|id| id.parse().ok());

    let page = DashboardPage {
        notice: query.notice.as_deref().and_then(notice_for),
        form: None,
    };
    Ok(Html(render_dashboard_page(&view, &page)))
}

pub async fn create_product_form<S>(
    State(state): State<S>,
    Form(form): Form<ProductForm>,
) -> Response
where
    S: ProductHandlerState,
{
    let filters = form.filters.clone();
    let values = form.values();

    let result = match ProductRequest::from(form).into_new_product() {
        Ok(product) => state
            .product_repository()
            .insert(product)
            .await
            .map_err(|e| e.or_internal("Failed to add product")),
        Err(e) => Err(e),
    };
    match result {
        Ok(id) => {
            info!(product_id = id, "Product created from form");
            back_to_dashboard(&filters, "added")
        }
        Err(e) => rejected(&state, &filters, None, Some(values), e).await,
    }
}

pub async fn update_product_form<S>(
    State(state): State<S>,
    Path(id): Path<String>,
    Form(form): Form<ProductForm>,
) -> Response
where
    S: ProductHandlerState,
{
    let filters = form.filters.clone();
    let values = form.values();

    let result = match (parse_id(&id), ProductRequest::from(form).into_new_product()) {
        (Ok(id), Ok(product)) => match state.product_repository().update_all(id, product).await {
            Ok(true) => Ok(id),
            Ok(false) => Err(ServiceError::NotFound("Product not found".to_string())),
            Err(e) => Err(e.or_internal("Failed to update product")),
        },
        (_, Err(e)) | (Err(e), _) => Err(e),
    };
    match result {
        Ok(id) => {
            info!(product_id = id, "Product updated from form");
            back_to_dashboard(&filters, "updated")
        }
        Err(e @ ServiceError::NotFound(_)) => rejected(&state, &filters, None, None, e).await,
        Err(e) => {
            let editing = parse_id(&id).ok();
            rejected(&state, &filters, editing, Some(values), e).await
        }
    }
}

pub async fn update_quantity_form<S>(
    State(state): State<S>,
    Path(id): Path<String>,
    Form(form): Form<QuantityForm>,
) -> Response
where
    S: ProductHandlerState,
{
    let request = QuantityRequest {
        quantity: Some(Value::String(form.quantity)),
    };
    let result = match (parse_id(&id), request.into_quantity()) {
        (Ok(id), Ok(quantity)) => {
            match state.product_repository().update_quantity(id, quantity).await {
                Ok(true) => Ok((id, quantity)),
                Ok(false) => Err(ServiceError::NotFound("Product not found".to_string())),
                Err(e) => Err(e.or_internal("Failed to update quantity")),
            }
        }
        (_, Err(e)) | (Err(e), _) => Err(e),
    };
    match result {
        Ok((id, quantity)) => {
            info!(product_id = id, quantity, "Product quantity updated from form");
            back_to_dashboard(&form.filters, "quantity")
        }
        Err(e) => rejected(&state, &form.filters, None, None, e).await,
    }
}

/// Asks for confirmation before the delete form is posted.
pub async fn confirm_delete<S>(
    State(state): State<S>,
    Path(id): Path<String>,
    Query(query): Query<DashboardQuery>,
) -> Response
where
    S: ProductHandlerState,
{
    let filters = FilterForm {
        search: query.search.unwrap_or_default(),
        category: query.category.unwrap_or_default(),
    };
    let found = match parse_id(&id) {
        Ok(id) => state
            .product_repository()
            .get_by_id(id)
            .await
            .map_err(|e| e.or_internal("Failed to load product")),
        Err(e) => Err(e),
    };
    match found {
        Ok(Some(product)) => (
            StatusCode::OK,
            Html(render_delete_confirmation(&product, &filters.filters())),
        )
            .into_response(),
        Ok(None) => {
            let err = ServiceError::NotFound("Product not found".to_string());
            rejected(&state, &filters, None, None, err).await
        }
        Err(e) => rejected(&state, &filters, None, None, e).await,
    }
}

pub async fn delete_product_form<S>(
    State(state): State<S>,
    Path(id): Path<String>,
    Form(filters): Form<FilterForm>,
) -> Response
where
    S: ProductHandlerState,
{
    let result = match parse_id(&id) {
        Ok(id) => match state.product_repository().remove(id).await {
            Ok(true) => Ok(id),
            Ok(false) => Err(ServiceError::NotFound("Product not found".to_string())),
            Err(e) => Err(e.or_internal("Failed to delete product")),
        },
        Err(e) => Err(e),
    };
    match result {
        Ok(id) => {
            info!(product_id = id, "Product deleted from form");
            back_to_dashboard(&filters, "deleted")
        }
        Err(e) => rejected(&state, &filters, None, None, e).await,
    }
}
