//! Inventory Ledger
//!
//! The only writer of a product's `available_stock` and `sold_amount`.

pub mod errors;
pub mod records;
pub(crate) mod repository;
pub mod service;

pub use errors::InventoryServiceError;
pub use service::*;
