pub mod common;
pub mod dashboard;
pub mod health;
pub mod products;
