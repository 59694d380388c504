//! Unit-of-work seam between the order workflow and its storage.
//!
//! Every workflow operation runs inside one unit of work: reads observe a consistent
//! view, and writes (status, stock cuts, outbox records) become visible together at
//! [`OrderUnitOfWork::commit`] or not at all. Dropping a unit of work without committing
//! discards it.

use async_trait::async_trait;

use crate::{
    domain::{
        addresses::records::{AddressRecord, AddressUuid},
        inventory::records::StockCut,
        orders::{
            data::{OrderDraft, OrderFilter},
            errors::OrdersServiceError,
            records::{OrderRecord, OrderUuid},
            status::ShippingStatus,
        },
        products::records::{ProductRecord, ProductUuid},
        tenants::records::TenantUuid,
        users::records::{UserRecord, UserUuid},
    },
    outbox::SideEffect,
};

/// Order Store
///
/// Storage backend for [`OrderWorkflow`](super::OrderWorkflow).
#[async_trait]
pub trait OrderStore: Send + Sync {
    type Work: OrderUnitOfWork;

    /// Start a unit of work scoped to `tenant`.
    async fn begin(&self, tenant: TenantUuid) -> Result<Self::Work, OrdersServiceError>;
}

/// Order Unit of Work
///
/// Reads and writes made between [`OrderStore::begin`] and [`OrderUnitOfWork::commit`].
#[async_trait]
pub trait OrderUnitOfWork: Send {
    async fn find_user(&mut self, user: UserUuid) -> Result<Option<UserRecord>, OrdersServiceError>;

    async fn find_address(
        &mut self,
        address: AddressUuid,
    ) -> Result<Option<AddressRecord>, OrdersServiceError>;

    async fn find_product(
        &mut self,
        product: ProductUuid,
    ) -> Result<Option<ProductRecord>, OrdersServiceError>;

    async fn find_order(&mut self, order: OrderUuid)
    -> Result<Option<OrderRecord>, OrdersServiceError>;

    /// Newest first.
    async fn list_orders(
        &mut self,
        filter: OrderFilter,
    ) -> Result<Vec<OrderRecord>, OrdersServiceError>;

    /// Sum of order totals, excluding cancelled and refunded orders.
    async fn total_revenue(&mut self) -> Result<u64, OrdersServiceError>;

    /// Store a new pending order. A clashing tracking code fails with
    /// [`OrdersServiceError::TrackingCodeTaken`].
    async fn insert_order(&mut self, order: &OrderDraft) -> Result<(), OrdersServiceError>;

    /// Move the order to `next` only if it is still in `expected`. Returns `false` when
    /// the order has moved on.
    async fn compare_and_set_status(
        &mut self,
        order: OrderUuid,
        expected: ShippingStatus,
        next: ShippingStatus,
    ) -> Result<bool, OrdersServiceError>;

    /// Set the paid flag. Returns `false` when the order was already paid.
    async fn mark_paid(&mut self, order: OrderUuid) -> Result<bool, OrdersServiceError>;

    /// Returns `false` when there was no such order.
    async fn delete_order(&mut self, order: OrderUuid) -> Result<bool, OrdersServiceError>;

    /// The inventory ledger's conditional decrement, applied inside this unit of work.
    async fn try_cut_stock(
        &mut self,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<StockCut, OrdersServiceError>;

    /// Record a side effect to be dispatched once this unit of work commits.
    async fn enqueue(&mut self, effect: SideEffect) -> Result<(), OrdersServiceError>;

    /// Make every write visible at once.
    async fn commit(self) -> Result<(), OrdersServiceError>;
}
