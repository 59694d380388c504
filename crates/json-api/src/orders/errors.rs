//! Order Errors

use salvo::http::StatusError;
use tracing::error;

use bazaar_app::domain::orders::OrdersServiceError;

pub(crate) fn into_status_error(error: OrdersServiceError) -> StatusError {
    match error {
        OrdersServiceError::NotFound => StatusError::not_found().brief("Order not found"),
        OrdersServiceError::ProductNotFound(_)
        | OrdersServiceError::AddressNotFound
        | OrdersServiceError::UserNotFound => StatusError::not_found().brief(error.to_string()),
        OrdersServiceError::InvalidArgument(_)
        | OrdersServiceError::IllegalTransition { .. }
        | OrdersServiceError::InsufficientStock { .. } => {
            StatusError::bad_request().brief(error.to_string())
        }
        OrdersServiceError::InvalidData | OrdersServiceError::InvalidReference => {
            StatusError::bad_request().brief("Invalid order payload")
        }
        OrdersServiceError::Forbidden => StatusError::forbidden().brief(error.to_string()),
        OrdersServiceError::Conflict
        | OrdersServiceError::TrackingCodeTaken
        | OrdersServiceError::AlreadyExists => StatusError::conflict().brief(error.to_string()),
        OrdersServiceError::Sql(source) => {
            error!("order storage failed: {source}");

            StatusError::internal_server_error()
        }
    }
}

#[cfg(test)]
mod tests {
    use bazaar_app::domain::{orders::status::ShippingStatus, products::records::ProductUuid};
    use salvo::http::StatusCode;

    use super::*;

    #[test]
    fn workflow_failures_map_to_client_errors() {
        let cases = [
            (
                OrdersServiceError::IllegalTransition {
                    from: ShippingStatus::Shipped,
                    to: ShippingStatus::Approved,
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                OrdersServiceError::InsufficientStock {
                    product: ProductUuid::new(),
                    requested: 3,
                    available: 1,
                },
                StatusCode::BAD_REQUEST,
            ),
            (OrdersServiceError::Forbidden, StatusCode::FORBIDDEN),
            (OrdersServiceError::Conflict, StatusCode::CONFLICT),
            (OrdersServiceError::AddressNotFound, StatusCode::NOT_FOUND),
            (
                OrdersServiceError::InvalidArgument("order has no lines"),
                StatusCode::BAD_REQUEST,
            ),
        ];

        for (error, expected) in cases {
            let message = error.to_string();

            assert_eq!(
                into_status_error(error).code,
                expected,
                "unexpected status for {message}"
            );
        }
    }
}
