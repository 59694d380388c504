//! Inventory service errors.

use sqlx::Error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InventoryServiceError {
    #[error("product not found")]
    NotFound,

    #[error("quantity must be at least one")]
    InvalidQuantity,

    #[error("only the selling user or an administrator may restock this product")]
    Forbidden,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for InventoryServiceError {
    fn from(error: Error) -> Self {
        match error {
            Error::RowNotFound => Self::NotFound,
            error => Self::Sql(error),
        }
    }
}
