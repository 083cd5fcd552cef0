//! User workflows over the products API.
//!
//! Every successful mutation closes the open form and re-fetches the whole list. A failure is
//! reported through the [`Notifier`] and leaves the state as it was.

use super::api::{ClientError, InventoryClient, ProductInput};
use super::state::ClientState;

pub const PRODUCT_ADDED: &str = "Product added successfully!";
pub const PRODUCT_UPDATED: &str = "Product updated successfully!";
pub const QUANTITY_UPDATED: &str = "Quantity updated successfully!";
pub const PRODUCT_DELETED: &str = "Product deleted successfully!";

/// Question asked before a product is deleted
pub fn delete_prompt(name: &str) -> String {
    format!("Are you sure you want to delete \"{name}\"?")
}

/// Asks the user to approve a destructive action.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

/// Receives user-facing outcome messages.
pub trait Notifier {
    fn success(&mut self, message: &str);
    fn error(&mut self, message: &str);
}

/// Outcome of a delete request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
    /// The id is not in the current list, nothing was asked or sent
    Unknown,
}

pub struct Dashboard<C, N> {
    client: InventoryClient,
    state: ClientState,
    confirm: C,
    notifier: N,
}

impl<C: Confirm, N: Notifier> Dashboard<C, N> {
    pub fn new(client: InventoryClient, confirm: C, notifier: N) -> Self {
        Self {
            client,
            state: ClientState::new(),
            confirm,
            notifier,
        }
    }

    pub fn state(&self) -> &ClientState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ClientState {
        &mut self.state
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Fetches the full list and replaces local state.
    pub async fn load(&mut self) -> Result<(), ClientError> {
        match self.client.list_products().await {
            Ok(products) => {
                self.state.set_products(products);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load products");
                self.notifier.error("Failed to load products");
                Err(e)
            }
        }
    }

    /// Opens an empty form for a new product.
    pub fn begin_add(&mut self) -> ProductInput {
        self.state.editing_product_id = None;
        ProductInput::default()
    }

    /// Opens the edit form prefilled from the cached product, `None` if the id is unknown.
    pub fn begin_edit(&mut self, id: i32) -> Option<ProductInput> {
        let input = self.state.find(id).map(ProductInput::from)?;
        self.state.editing_product_id = Some(id);
        Some(input)
    }

    pub fn close_form(&mut self) {
        self.state.editing_product_id = None;
    }

    /// Creates or updates depending on whether an edit form is open.
    pub async fn submit_product(&mut self, input: &ProductInput) -> Result<(), ClientError> {
        let result = match self.state.editing_product_id {
            Some(id) => self
                .client
                .update_product(id, input)
                .await
                .map(|_| PRODUCT_UPDATED),
            None => self
                .client
                .create_product(input)
                .await
                .map(|_| PRODUCT_ADDED),
        };
        self.finish_mutation(result).await
    }

    pub async fn submit_quantity(&mut self, id: i32, quantity: i32) -> Result<(), ClientError> {
        let result = self
            .client
            .update_quantity(id, quantity)
            .await
            .map(|_| QUANTITY_UPDATED);
        self.finish_mutation(result).await
    }

    /// Deletes after the user confirms with the product's name.
    pub async fn delete(&mut self, id: i32) -> Result<DeleteOutcome, ClientError> {
        let Some(product) = self.state.find(id) else {
            return Ok(DeleteOutcome::Unknown);
        };
        let prompt = delete_prompt(&product.name);
        if !self.confirm.confirm(&prompt) {
            return Ok(DeleteOutcome::Cancelled);
        }

        let result = self
            .client
            .delete_product(id)
            .await
            .map(|_| PRODUCT_DELETED);
        self.finish_mutation(result).await?;
        Ok(DeleteOutcome::Deleted)
    }

    async fn finish_mutation(
        &mut self,
        result: Result<&'static str, ClientError>,
    ) -> Result<(), ClientError> {
        match result {
            Ok(message) => {
                self.notifier.success(message);
                self.close_form();
                self.load().await
            }
            Err(e) => {
                self.notifier.error(&e.to_string());
                Err(e)
            }
        }
    }
}
