//! `PostgreSQL` unit of work for the order workflow.

use async_trait::async_trait;
use sqlx::{Postgres, Transaction};

use crate::{
    database::Db,
    domain::{
        addresses::{
            records::{AddressRecord, AddressUuid},
            repository::PgAddressesRepository,
        },
        inventory::{records::StockCut, repository::PgInventoryRepository},
        orders::{
            data::{OrderDraft, OrderFilter},
            errors::OrdersServiceError,
            records::{OrderRecord, OrderUuid},
            repository::PgOrdersRepository,
            status::ShippingStatus,
            store::{OrderStore, OrderUnitOfWork},
        },
        products::{
            records::{ProductRecord, ProductUuid},
            repository::PgProductsRepository,
        },
        tenants::records::TenantUuid,
        users::{
            records::{UserRecord, UserUuid},
            repository::PgUsersRepository,
        },
    },
    outbox::{SideEffect, repository::PgOutboxRepository},
};

/// Repositories a unit of work reads and writes through.
#[derive(Debug, Clone, Default)]
struct Repositories {
    users: PgUsersRepository,
    addresses: PgAddressesRepository,
    products: PgProductsRepository,
    inventory: PgInventoryRepository,
    orders: PgOrdersRepository,
    outbox: PgOutboxRepository,
}

/// Opens one tenant-scoped database transaction per unit of work.
#[derive(Debug, Clone)]
pub struct PgOrderStore {
    db: Db,
}

impl PgOrderStore {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    type Work = PgOrderUnitOfWork;

    async fn begin(&self, tenant: TenantUuid) -> Result<Self::Work, OrdersServiceError> {
        let tx = self.db.begin_tenant_transaction(tenant).await?;

        Ok(PgOrderUnitOfWork {
            tx,
            repositories: Repositories::default(),
        })
    }
}

/// A tenant transaction. Dropping it without [`OrderUnitOfWork::commit`] rolls back.
#[derive(Debug)]
pub struct PgOrderUnitOfWork {
    tx: Transaction<'static, Postgres>,
    repositories: Repositories,
}

#[async_trait]
impl OrderUnitOfWork for PgOrderUnitOfWork {
    async fn find_user(&mut self, user: UserUuid) -> Result<Option<UserRecord>, OrdersServiceError> {
        Ok(self.repositories.users.find_user(&mut self.tx, user).await?)
    }

    async fn find_address(
        &mut self,
        address: AddressUuid,
    ) -> Result<Option<AddressRecord>, OrdersServiceError> {
        Ok(self
            .repositories
            .addresses
            .find_address(&mut self.tx, address)
            .await?)
    }

    async fn find_product(
        &mut self,
        product: ProductUuid,
    ) -> Result<Option<ProductRecord>, OrdersServiceError> {
        Ok(self
            .repositories
            .products
            .find_product(&mut self.tx, product)
            .await?)
    }

    async fn find_order(
        &mut self,
        order: OrderUuid,
    ) -> Result<Option<OrderRecord>, OrdersServiceError> {
        Ok(self.repositories.orders.find_order(&mut self.tx, order).await?)
    }

    async fn list_orders(
        &mut self,
        filter: OrderFilter,
    ) -> Result<Vec<OrderRecord>, OrdersServiceError> {
        Ok(self
            .repositories
            .orders
            .list_orders(&mut self.tx, filter)
            .await?)
    }

    async fn total_revenue(&mut self) -> Result<u64, OrdersServiceError> {
        Ok(self.repositories.orders.total_revenue(&mut self.tx).await?)
    }

    async fn insert_order(&mut self, order: &OrderDraft) -> Result<(), OrdersServiceError> {
        Ok(self
            .repositories
            .orders
            .insert_order(&mut self.tx, order)
            .await?)
    }

    async fn compare_and_set_status(
        &mut self,
        order: OrderUuid,
        expected: ShippingStatus,
        next: ShippingStatus,
    ) -> Result<bool, OrdersServiceError> {
        Ok(self
            .repositories
            .orders
            .update_status(&mut self.tx, order, expected, next)
            .await?)
    }

    async fn mark_paid(&mut self, order: OrderUuid) -> Result<bool, OrdersServiceError> {
        Ok(self.repositories.orders.mark_paid(&mut self.tx, order).await?)
    }

    async fn delete_order(&mut self, order: OrderUuid) -> Result<bool, OrdersServiceError> {
        Ok(self
            .repositories
            .orders
            .delete_order(&mut self.tx, order)
            .await?)
    }

    async fn try_cut_stock(
        &mut self,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<StockCut, OrdersServiceError> {
        self.repositories
            .inventory
            .try_cut_stock(&mut self.tx, product, quantity)
            .await?
            .ok_or(OrdersServiceError::ProductNotFound(product))
    }

    async fn enqueue(&mut self, effect: SideEffect) -> Result<(), OrdersServiceError> {
        self.repositories
            .outbox
            .enqueue(&mut self.tx, &effect)
            .await?;

        Ok(())
    }

    async fn commit(self) -> Result<(), OrdersServiceError> {
        Ok(self.tx.commit().await?)
    }
}
