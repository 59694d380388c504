//! Orders service errors.

use sqlx::{
    Error,
    error::ErrorKind,
};
use thiserror::Error;

use crate::{
    database,
    domain::{orders::status::ShippingStatus, products::records::ProductUuid},
    retry::Retryable,
};

/// Name of the unique constraint guarding tracking codes within a tenant.
pub(crate) const TRACKING_CODE_CONSTRAINT: &str = "orders_tracking_code_unique";

#[derive(Debug, Error)]
pub enum OrdersServiceError {
    #[error("order not found")]
    NotFound,

    #[error("product {0} not found")]
    ProductNotFound(ProductUuid),

    #[error("shipping address not found")]
    AddressNotFound,

    #[error("user not found")]
    UserNotFound,

    #[error("invalid order: {0}")]
    InvalidArgument(&'static str),

    #[error("cannot move an order from {from} to {to}")]
    IllegalTransition {
        from: ShippingStatus,
        to: ShippingStatus,
    },

    #[error("You don't have permission to perform this action.")]
    Forbidden,

    #[error("insufficient stock for product {product}: {requested} requested, {available} available")]
    InsufficientStock {
        product: ProductUuid,
        requested: u32,
        available: u64,
    },

    #[error("the order was changed concurrently, try again")]
    Conflict,

    #[error("tracking code already in use")]
    TrackingCodeTaken,

    #[error("order already exists")]
    AlreadyExists,

    #[error("related resource not found")]
    InvalidReference,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl Retryable for OrdersServiceError {
    fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict | Self::TrackingCodeTaken)
    }
}

impl From<Error> for OrdersServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        if database::is_transient(&error) {
            return Self::Conflict;
        }

        let Some(database_error) = error.as_database_error() else {
            return Self::Sql(error);
        };

        match database_error.kind() {
            ErrorKind::UniqueViolation
                if database_error.constraint() == Some(TRACKING_CODE_CONSTRAINT) =>
            {
                Self::TrackingCodeTaken
            }
            ErrorKind::UniqueViolation => Self::AlreadyExists,
            ErrorKind::ForeignKeyViolation => Self::InvalidReference,
            ErrorKind::CheckViolation | ErrorKind::NotNullViolation => Self::InvalidData,
            ErrorKind::Other | _ => Self::Sql(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_concurrency_failures_are_retryable() {
        assert!(OrdersServiceError::Conflict.is_retryable());
        assert!(OrdersServiceError::TrackingCodeTaken.is_retryable());
        assert!(!OrdersServiceError::Forbidden.is_retryable());
        assert!(
            !OrdersServiceError::InsufficientStock {
                product: ProductUuid::new(),
                requested: 3,
                available: 2,
            }
            .is_retryable()
        );
    }

    #[test]
    fn row_not_found_maps_to_not_found() {
        assert!(matches!(
            OrdersServiceError::from(Error::RowNotFound),
            OrdersServiceError::NotFound
        ));
    }
}
