//! Order Handlers

pub(crate) mod create;
pub(crate) mod delete;
pub(crate) mod get;
pub(crate) mod index;
pub(crate) mod pay;
pub(crate) mod revenue;
pub(crate) mod update;
