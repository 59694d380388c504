//! Bazaar marketplace domain, persistence and side-effect delivery.

pub mod auth;
pub mod context;
pub mod database;
pub mod domain;
pub mod outbox;
pub mod retry;

#[cfg(test)]
mod test;

mod uuids;
