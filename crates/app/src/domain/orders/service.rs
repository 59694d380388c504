//! Orders service.

use async_trait::async_trait;
use mockall::automock;

use crate::domain::{
    orders::{
        data::NewOrder,
        errors::OrdersServiceError,
        postgres::PgOrderStore,
        records::{OrderRecord, OrderUuid},
        status::ShippingStatus,
        workflow::OrderWorkflow,
    },
    tenants::records::TenantUuid,
    users::records::Actor,
};

/// The order workflow over `PostgreSQL`.
pub type PgOrdersService = OrderWorkflow<PgOrderStore>;

/// Orders Service
///
/// Checkout and the shipping state machine, as seen by handlers.
#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Place an order for the acting user, snapshotting current unit prices. Stock is not
    /// touched until the order is approved.
    async fn create_order(
        &self,
        tenant: TenantUuid,
        actor: Actor,
        order: NewOrder,
    ) -> Result<OrderRecord, OrdersServiceError>;

    async fn get_order(
        &self,
        tenant: TenantUuid,
        actor: Actor,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// Orders visible to the actor, newest first.
    async fn list_orders(
        &self,
        tenant: TenantUuid,
        actor: Actor,
    ) -> Result<Vec<OrderRecord>, OrdersServiceError>;

    /// Move an order along the shipping state machine as a seller or administrator.
    ///
    /// Approval cuts stock for every line in the same unit of work as the status change.
    async fn transition_status(
        &self,
        tenant: TenantUuid,
        actor: Actor,
        order: OrderUuid,
        next: ShippingStatus,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// Cancel one of the actor's own orders while it is still pending.
    async fn cancel_order(
        &self,
        tenant: TenantUuid,
        actor: Actor,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// Record an external payment. Marking a paid order again changes nothing.
    async fn mark_paid(
        &self,
        tenant: TenantUuid,
        actor: Actor,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError>;

    async fn delete_order(
        &self,
        tenant: TenantUuid,
        actor: Actor,
        order: OrderUuid,
    ) -> Result<(), OrdersServiceError>;

    /// Sum of order totals, excluding cancelled and refunded orders.
    async fn total_revenue(
        &self,
        tenant: TenantUuid,
        actor: Actor,
    ) -> Result<u64, OrdersServiceError>;
}
