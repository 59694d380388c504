//! Transactional outbox.
//!
//! Emails and notifications produced by a unit of work are written to the `outbox`
//! table in the same transaction as the state change that caused them, then delivered
//! by an [`OutboxDispatcher`] once committed. A rolled back unit of work leaves no
//! side effects behind.

mod dispatcher;
mod effects;
pub mod email;
pub mod errors;
pub mod records;
pub(crate) mod repository;
mod store;

pub use dispatcher::{DispatchReport, DispatcherConfig, OutboxDispatcher};
pub use effects::{EmailMessage, SideEffect};
pub use email::{
    DEFAULT_EMAIL_TIMEOUT, EmailConfig, EmailError, EmailSender, HttpEmailSender, LogEmailSender,
};
pub use errors::OutboxError;
pub use store::{MockOutboxStore, OutboxStore, PgOutboxStore};
