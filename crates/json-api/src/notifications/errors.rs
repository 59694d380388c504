//! Notification Errors

use salvo::http::StatusError;
use tracing::error;

use bazaar_app::domain::notifications::NotificationsServiceError;

pub(crate) fn into_status_error(error: NotificationsServiceError) -> StatusError {
    match error {
        NotificationsServiceError::NotFound => {
            StatusError::not_found().brief("Notification not found")
        }
        NotificationsServiceError::InvalidReference => StatusError::bad_request(),
        NotificationsServiceError::Sql(source) => {
            error!("notification storage failed: {source}");

            StatusError::internal_server_error()
        }
    }
}
