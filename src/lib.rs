//! Inventory Tracker Library
//!
//! Product catalog storage, the REST API over it, and the client used by the dashboard and CLI.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod client;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod repositories;
pub mod tracing;

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};

use handlers::products::ProductHandlerState;
use repositories::ProductRepository;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub products: ProductRepository,
}

impl AppState {
    pub fn new(db: Arc<DatabaseConnection>, config: config::AppConfig) -> Self {
        let products = ProductRepository::new(db.clone());
        Self {
            db,
            config,
            products,
        }
    }
}

impl ProductHandlerState for AppState {
    fn product_repository(&self) -> &ProductRepository {
        &self.products
    }
}

/// Routes mounted under `/api`
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .nest("/products", handlers::products::products_router::<AppState>())
}

/// Explicit origins when configured, otherwise any origin.
pub fn cors_layer(cfg: &config::AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = cfg
        .cors_origins()
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// HTML form posts behind the dashboard. Each one redirects back to `/` when it succeeds.
pub fn dashboard_form_routes() -> Router<AppState> {
    use handlers::dashboard;

    Router::new()
        .route(
            "/products",
            post(dashboard::create_product_form::<AppState>),
        )
        .route(
            "/products/:id",
            post(dashboard::update_product_form::<AppState>),
        )
        .route(
            "/products/:id/quantity",
            post(dashboard::update_quantity_form::<AppState>),
        )
        .route(
            "/products/:id/delete",
            get(dashboard::confirm_delete::<AppState>)
                .post(dashboard::delete_product_form::<AppState>),
        )
}

/// Full application router: dashboard, API, OpenAPI document and static assets.
pub fn build_router(state: AppState) -> Router {
    let assets = ServeDir::new(&state.config.public_dir);
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/", get(handlers::dashboard::dashboard::<AppState>))
        .merge(dashboard_form_routes())
        .nest("/api", api_routes())
        .merge(openapi::openapi_routes())
        .fallback_service(assets)
        // HTTP tracing layer for consistent request/response telemetry
        .layer(crate::tracing::configure_http_tracing())
        .layer(cors)
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state)
}

pub mod prelude {
    pub use crate::client::{ClientError, ClientState, InventoryClient, InventoryStats};
    pub use crate::config::AppConfig;
    pub use crate::entities::ProductModel;
    pub use crate::errors::{ErrorResponse, ServiceError};
    pub use crate::repositories::{NewProduct, ProductRepository};
    pub use crate::{build_router, AppState};
}
