//! Notification Handlers

pub(crate) mod index;
pub(crate) mod opened;
