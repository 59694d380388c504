//! Marketplace domain concerns

pub mod addresses;
pub mod inventory;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod tenants;
pub mod users;
