//! Orders
//!
//! The order aggregate and the workflow that drives it through the shipping state
//! machine, cutting stock at approval and recording side effects in the outbox.

pub mod data;
pub mod errors;
pub mod messages;
pub mod postgres;
pub mod records;
pub(crate) mod repository;
pub mod service;
pub mod status;
pub mod store;
pub mod tracking;
pub mod workflow;

pub use errors::OrdersServiceError;
pub use postgres::PgOrderStore;
pub use service::*;
pub use workflow::OrderWorkflow;
