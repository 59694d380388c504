//! Review Errors

use salvo::http::StatusError;
use tracing::error;

use bazaar_app::domain::reviews::ReviewsServiceError;

pub(crate) fn into_status_error(error: ReviewsServiceError) -> StatusError {
    match error {
        ReviewsServiceError::AlreadyExists => StatusError::conflict().brief(error.to_string()),
        ReviewsServiceError::InvalidReference
        | ReviewsServiceError::MissingRequiredData
        | ReviewsServiceError::InvalidData => {
            StatusError::bad_request().brief("Rating must be 1 to 5 with a non-empty comment")
        }
        ReviewsServiceError::Forbidden | ReviewsServiceError::NotEligible => {
            StatusError::forbidden().brief(error.to_string())
        }
        ReviewsServiceError::NotFound => StatusError::not_found().brief("Review not found"),
        ReviewsServiceError::ProductNotFound => {
            StatusError::not_found().brief("Product not found")
        }
        ReviewsServiceError::Sql(source) => {
            error!("review storage failed: {source}");

            StatusError::internal_server_error()
        }
    }
}
