use crate::entities::product::Model as ProductModel;
use crate::errors::ServiceError;
use crate::handlers::common::{
    coerce_optional_text, coerce_price, coerce_quantity, coerce_text, created_response,
    is_filled, parse_id, success_response, validate_input,
};
use crate::repositories::{NewProduct, ProductRepository};
use axum::{
    extract::{rejection::JsonRejection, Json, Path, State},
    response::Response,
    routing::{get, put},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use utoipa::ToSchema;

// Trait for product handler state that provides access to the product repository
pub trait ProductHandlerState: Clone + Send + Sync + 'static {
    fn product_repository(&self) -> &ProductRepository;
}

/// Body of create and full-update requests.
///
/// Fields are kept loose so numeric strings from HTML forms are accepted.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct ProductRequest {
    #[schema(value_type = Option<String>, example = "Wireless Mouse")]
    pub name: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub description: Option<Value>,
    #[schema(value_type = Option<String>, example = "Electronics")]
    pub category: Option<Value>,
    #[schema(value_type = Option<i32>, example = 45)]
    pub quantity: Option<Value>,
    #[schema(value_type = Option<f64>, example = 29.99)]
    pub price: Option<Value>,
    #[schema(value_type = Option<String>, example = "ELEC-001")]
    pub sku: Option<Value>,
}

impl ProductRequest {
    /// Checks required fields and coerces the payload into storable form.
    pub fn into_new_product(self) -> Result<NewProduct, ServiceError> {
        let (quantity, price) = match (&self.quantity, &self.price) {
            (Some(quantity), Some(price))
                if is_filled(&self.name) && is_filled(&self.price) =>
            {
                (coerce_quantity(quantity)?, coerce_price(price)?)
            }
            _ => {
                return Err(ServiceError::ValidationError(
                    "Missing required fields".to_string(),
                ))
            }
        };

        let product = NewProduct {
            name: coerce_text(self.name),
            description: coerce_text(self.description),
            category: coerce_text(self.category),
            quantity,
            price,
            sku: coerce_optional_text(self.sku),
        };
        validate_input(&product)?;
        Ok(product)
    }
}

/// Body of the quantity-only update
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct QuantityRequest {
    #[schema(value_type = Option<i32>, example = 12)]
    pub quantity: Option<Value>,
}

impl QuantityRequest {
    pub fn into_quantity(self) -> Result<i32, ServiceError> {
        match self.quantity {
            Some(value) => coerce_quantity(&value),
            None => Err(ServiceError::ValidationError(
                "Quantity is required".to_string(),
            )),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Product deleted successfully")]
    pub message: String,
}

/// Create the products router
pub fn products_router<S>() -> Router<S>
where
    S: ProductHandlerState,
{
    Router::new()
        .route("/", get(list_products::<S>).post(create_product::<S>))
        .route(
            "/:id",
            get(get_product::<S>)
                .put(update_product::<S>)
                .delete(delete_product::<S>),
        )
        .route("/:id/quantity", put(update_quantity::<S>))
}

/// A body that is not JSON reads as an empty object, so it fails field checks instead of parsing.
fn body_or_default<T: Default>(payload: Result<Json<T>, JsonRejection>) -> T {
    match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            tracing::debug!("Unreadable request body: {}", rejection);
            T::default()
        }
    }
}

fn not_found() -> ServiceError {
    ServiceError::NotFound("Product not found".to_string())
}

/// Re-reads a product after a write so the response reflects stored state.
async fn fetch_written(
    repo: &ProductRepository,
    id: i32,
    failure: &str,
) -> Result<ProductModel, ServiceError> {
    repo.get_by_id(id)
        .await
        .map_err(|e| e.or_internal(failure))?
        .ok_or_else(not_found)
}

/// List every product, ordered by id
#[utoipa::path(
    get,
    path = "/api/products",
    responses(
        (status = 200, description = "Product list returned", body = [ProductModel],
            headers(
                ("X-Request-Id" = String, description = "Unique request id for tracing"),
            )
        ),
        (status = 500, description = "Failed to fetch products", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn list_products<S>(State(state): State<S>) -> Result<Response, ServiceError>
where
    S: ProductHandlerState,
{
    let products = state
        .product_repository()
        .list_all()
        .await
        .map_err(|e| e.or_internal("Failed to fetch products"))?;

    Ok(success_response(products))
}

/// Get a single product
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(
        ("id" = i32, Path, description = "Product id")
    ),
    responses(
        (status = 200, description = "Product returned", body = ProductModel),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Failed to fetch product", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn get_product<S>(
    State(state): State<S>,
    Path(id): Path<String>,
) -> Result<Response, ServiceError>
where
    S: ProductHandlerState,
{
    let id = parse_id(&id)?;
    let product = fetch_written(state.product_repository(), id, "Failed to fetch product").await?;
    Ok(success_response(product))
}

/// Create a product
#[utoipa::path(
    post,
    path = "/api/products",
    request_body = ProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductModel),
        (status = 400, description = "Missing required fields or SKU already exists", body = crate::errors::ErrorResponse),
        (status = 500, description = "Failed to add product", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn create_product<S>(
    State(state): State<S>,
    payload: Result<Json<ProductRequest>, JsonRejection>,
) -> Result<Response, ServiceError>
where
    S: ProductHandlerState,
{
    let product = body_or_default(payload).into_new_product()?;
    let repo = state.product_repository();

    let id = repo
        .insert(product)
        .await
        .map_err(|e| e.or_internal("Failed to add product"))?;
    info!(product_id = id, "Product created");

    let created = fetch_written(repo, id, "Failed to add product").await?;
    Ok(created_response(created))
}

/// Set the stock quantity of a product
#[utoipa::path(
    put,
    path = "/api/products/{id}/quantity",
    params(
        ("id" = i32, Path, description = "Product id")
    ),
    request_body = QuantityRequest,
    responses(
        (status = 200, description = "Quantity updated", body = ProductModel),
        (status = 400, description = "Quantity is required", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Failed to update quantity", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn update_quantity<S>(
    State(state): State<S>,
    Path(id): Path<String>,
    payload: Result<Json<QuantityRequest>, JsonRejection>,
) -> Result<Response, ServiceError>
where
    S: ProductHandlerState,
{
    let quantity = body_or_default(payload).into_quantity()?;
    let id = parse_id(&id)?;
    let repo = state.product_repository();

    let updated = repo
        .update_quantity(id, quantity)
        .await
        .map_err(|e| e.or_internal("Failed to update quantity"))?;
    if !updated {
        return Err(not_found());
    }
    info!(product_id = id, quantity, "Product quantity updated");

    let product = fetch_written(repo, id, "Failed to update quantity").await?;
    Ok(success_response(product))
}

/// Replace every editable field of a product
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(
        ("id" = i32, Path, description = "Product id")
    ),
    request_body = ProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductModel),
        (status = 400, description = "Missing required fields or SKU already exists", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Failed to update product", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn update_product<S>(
    State(state): State<S>,
    Path(id): Path<String>,
    payload: Result<Json<ProductRequest>, JsonRejection>,
) -> Result<Response, ServiceError>
where
    S: ProductHandlerState,
{
    let product = body_or_default(payload).into_new_product()?;
    let id = parse_id(&id)?;
    let repo = state.product_repository();

    let updated = repo
        .update_all(id, product)
        .await
        .map_err(|e| e.or_internal("Failed to update product"))?;
    if !updated {
        return Err(not_found());
    }
    info!(product_id = id, "Product updated");

    let product = fetch_written(repo, id, "Failed to update product").await?;
    Ok(success_response(product))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(
        ("id" = i32, Path, description = "Product id")
    ),
    responses(
        (status = 200, description = "Product deleted", body = MessageResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Failed to delete product", body = crate::errors::ErrorResponse)
    ),
    tag = "products"
)]
pub async fn delete_product<S>(
    State(state): State<S>,
    Path(id): Path<String>,
) -> Result<Response, ServiceError>
where
    S: ProductHandlerState,
{
    let id = parse_id(&id)?;
    let removed = state
        .product_repository()
        .remove(id)
        .await
        .map_err(|e| e.or_internal("Failed to delete product"))?;
    if !removed {
        return Err(not_found());
    }
    info!(product_id = id, "Product deleted");

    Ok(success_response(MessageResponse {
        message: "Product deleted successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn request(body: Value) -> ProductRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn complete_request_becomes_new_product() {
        let product = request(json!({
            "name": "Desk Lamp",
            "quantity": "40",
            "price": 34.99,
            "category": "Office"
        }))
        .into_new_product()
        .unwrap();

        assert_eq!(product.name, "Desk Lamp");
        assert_eq!(product.quantity, 40);
        assert_eq!(product.price, dec!(34.99));
        assert_eq!(product.description, "");
        assert_eq!(product.category, "Office");
        assert_eq!(product.sku, None);
    }

    #[test]
    fn missing_or_null_fields_are_rejected() {
        for body in [
            json!({"name": "A", "quantity": 1}),
            json!({"name": "A", "quantity": 1, "price": null}),
            json!({"name": "", "quantity": 1, "price": 2}),
            json!({"name": "A", "quantity": 1, "price": ""}),
            json!({"name": "A", "price": 2}),
            json!({}),
        ] {
            let err = request(body).into_new_product().unwrap_err();
            assert_eq!(err.to_string(), "Missing required fields");
        }
    }

    #[test]
    fn falsy_name_or_price_is_missing() {
        for body in [
            json!({"name": "Freebie", "quantity": 1, "price": 0}),
            json!({"name": 0, "quantity": 1, "price": 2}),
            json!({"name": false, "quantity": 1, "price": 2}),
            json!({"name": "Freebie", "quantity": 1, "price": false}),
        ] {
            let err = request(body).into_new_product().unwrap_err();
            assert_eq!(err.to_string(), "Missing required fields");
        }
    }

    #[test]
    fn zero_quantity_and_text_zero_price_are_accepted() {
        let product = request(json!({"name": "Freebie", "quantity": 0, "price": "0"}))
            .into_new_product()
            .unwrap();
        assert_eq!(product.quantity, 0);
        assert_eq!(product.price, dec!(0));
    }

    #[test]
    fn quantity_request_requires_a_value() {
        assert_eq!(request_quantity(json!({"quantity": 5})).unwrap(), 5);
        assert_matches!(
            request_quantity(json!({})),
            Err(ServiceError::ValidationError(msg)) if msg == "Quantity is required"
        );
        assert!(request_quantity(json!({"quantity": null})).is_err());
    }

    fn request_quantity(body: Value) -> Result<i32, ServiceError> {
        serde_json::from_value::<QuantityRequest>(body)
            .unwrap()
            .into_quantity()
    }
}
