//! Outbox errors.

use std::time::Duration;

use thiserror::Error;

use crate::{
    domain::notifications::NotificationsServiceError,
    outbox::email::EmailError,
};

/// Outbox Storage Error
#[derive(Debug, Error)]
pub enum OutboxError {
    #[error("outbox storage error")]
    Sql(#[from] sqlx::Error),
}

/// Why a single side effect could not be delivered.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("email delivery failed: {0}")]
    Email(#[from] EmailError),

    #[error("notification delivery failed: {0}")]
    Notification(#[from] NotificationsServiceError),

    #[error("delivery did not finish within {0:?}")]
    TimedOut(Duration),
}
