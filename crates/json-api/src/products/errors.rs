//! Product Errors

use salvo::http::StatusError;
use tracing::error;

use bazaar_app::domain::{inventory::InventoryServiceError, products::ProductsServiceError};

pub(crate) fn into_status_error(error: ProductsServiceError) -> StatusError {
    match error {
        ProductsServiceError::AlreadyExists => {
            StatusError::conflict().brief("Product already exists")
        }
        ProductsServiceError::InvalidReference
        | ProductsServiceError::MissingRequiredData
        | ProductsServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid product payload")
        }
        ProductsServiceError::InvalidPrice(_) => {
            StatusError::bad_request().brief("Price is out of range")
        }
        ProductsServiceError::Forbidden => StatusError::forbidden().brief(error.to_string()),
        ProductsServiceError::NotFound => StatusError::not_found().brief("Product not found"),
        ProductsServiceError::Sql(source) => {
            error!("product storage failed: {source}");

            StatusError::internal_server_error()
        }
    }
}

pub(crate) fn inventory_status_error(error: InventoryServiceError) -> StatusError {
    match error {
        InventoryServiceError::NotFound => StatusError::not_found().brief("Product not found"),
        InventoryServiceError::InvalidQuantity => {
            StatusError::bad_request().brief("Quantity must be at least one")
        }
        InventoryServiceError::Forbidden => StatusError::forbidden().brief(error.to_string()),
        InventoryServiceError::Sql(source) => {
            error!("inventory storage failed: {source}");

            StatusError::internal_server_error()
        }
    }
}
