use axum::{routing::get, Json, Router};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Inventory Tracker API",
        version = "1.0.0",
        description = r#"
# Inventory Tracker API

Create, read, update and delete products in a small inventory catalog.

## Error Handling

Failing requests return a JSON body with a message, the request id and a timestamp:

```json
{
  "error": "Product not found",
  "request_id": "4f0c1f9e-2d55-4c59-9a47-5c1f0f7f3a10",
  "timestamp": "2024-01-01T00:00:00Z"
}
```

Numeric fields accept JSON numbers or numeric strings.
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development")
    ),
    tags(
        (name = "products", description = "Product catalog endpoints"),
        (name = "health", description = "Health check endpoints")
    ),
    paths(
        crate::handlers::products::list_products,
        crate::handlers::products::get_product,
        crate::handlers::products::create_product,
        crate::handlers::products::update_quantity,
        crate::handlers::products::update_product,
        crate::handlers::products::delete_product,
        crate::handlers::health::health_check,
    ),
    components(
        schemas(
            crate::entities::product::Model,
            crate::handlers::products::ProductRequest,
            crate::handlers::products::QuantityRequest,
            crate::handlers::products::MessageResponse,
            crate::handlers::health::HealthResponse,
            crate::handlers::health::ComponentHealth,
            crate::handlers::health::ComponentStatus,
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDoc;

/// Serves the generated document at `/api-docs/openapi.json`
pub fn openapi_routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route(
        "/api-docs/openapi.json",
        get(|| async { Json(ApiDoc::openapi()) }),
    )
}
