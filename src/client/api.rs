use reqwest::{Client, Response};
use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use super::Product;

/// Errors surfaced to the user by the client. None of them are fatal.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{message}")]
    Api { status: u16, message: String },
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Network(e) => e.status().map(|s| s.as_u16()),
        }
    }
}

/// Fields a user fills in when adding or editing a product
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub category: String,
    pub sku: String,
    pub quantity: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl From<&Product> for ProductInput {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
            sku: product.sku.clone().unwrap_or_default(),
            quantity: product.quantity,
            price: product.price,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// HTTP client for the products API
#[derive(Debug, Clone)]
pub struct InventoryClient {
    http: Client,
    base_url: String,
}

impl InventoryClient {
    /// Build a client over a default reqwest client. Calls carry no timeout of their own.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = Client::builder().build()?;
        Ok(Self::with_client(base_url, http))
    }

    pub fn with_client(base_url: impl Into<String>, http: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn products_url(&self) -> String {
        format!("{}/api/products", self.base_url)
    }

    fn product_url(&self, id: i32) -> String {
        format!("{}/api/products/{}", self.base_url, id)
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, ClientError> {
        let response = self.http.get(self.products_url()).send().await?;
        read_json(response, "Failed to load products").await
    }

    pub async fn get_product(&self, id: i32) -> Result<Product, ClientError> {
        let response = self.http.get(self.product_url(id)).send().await?;
        read_json(response, "Failed to load product").await
    }

    pub async fn create_product(&self, input: &ProductInput) -> Result<Product, ClientError> {
        let response = self
            .http
            .post(self.products_url())
            .json(input)
            .send()
            .await?;
        read_json(response, "Failed to add product").await
    }

    pub async fn update_product(
        &self,
        id: i32,
        input: &ProductInput,
    ) -> Result<Product, ClientError> {
        let response = self
            .http
            .put(self.product_url(id))
            .json(input)
            .send()
            .await?;
        read_json(response, "Failed to update product").await
    }

    pub async fn update_quantity(&self, id: i32, quantity: i32) -> Result<Product, ClientError> {
        let response = self
            .http
            .put(format!("{}/quantity", self.product_url(id)))
            .json(&json!({ "quantity": quantity }))
            .send()
            .await?;
        read_json(response, "Failed to update quantity").await
    }

    pub async fn delete_product(&self, id: i32) -> Result<(), ClientError> {
        let response = self.http.delete(self.product_url(id)).send().await?;
        check_status(response, "Failed to delete product").await?;
        Ok(())
    }
}

/// Turns a non-2xx response into [`ClientError::Api`], preferring the server's message.
async fn check_status(response: Response, fallback: &str) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.error)
        .unwrap_or_else(|| fallback.to_string());
    debug!(status = status.as_u16(), %message, "API request failed");

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

async fn read_json<T: DeserializeOwned>(response: Response, fallback: &str) -> Result<T, ClientError> {
    let response = check_status(response, fallback).await?;
    Ok(response.json::<T>().await?)
}
