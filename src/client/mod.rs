//! Client side of the inventory tracker: state, rendering and the HTTP workflows.

pub mod api;
pub mod render;
pub mod state;
pub mod workflow;

pub use api::{ClientError, InventoryClient, ProductInput};
pub use state::{categories, filter_products, ClientState, InventoryStats, LOW_STOCK_THRESHOLD};
pub use workflow::{Confirm, Dashboard, DeleteOutcome, Notifier};

/// Products as the API returns them
pub type Product = crate::entities::product::Model;
