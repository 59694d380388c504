//! Inventory service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::{
        inventory::{errors::InventoryServiceError, repository::PgInventoryRepository},
        products::{
            records::{ProductRecord, ProductUuid},
            repository::PgProductsRepository,
        },
        tenants::records::TenantUuid,
        users::records::Actor,
    },
};

#[derive(Debug, Clone)]
pub struct PgInventoryService {
    db: Db,
    repository: PgInventoryRepository,
    products: PgProductsRepository,
}

impl PgInventoryService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgInventoryRepository::new(),
            products: PgProductsRepository::new(),
        }
    }
}

#[async_trait]
impl InventoryService for PgInventoryService {
    async fn restock(
        &self,
        tenant: TenantUuid,
        actor: Actor,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<ProductRecord, InventoryServiceError> {
        if quantity == 0 {
            return Err(InventoryServiceError::InvalidQuantity);
        }

        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let current = self
            .products
            .find_product(&mut tx, product)
            .await?
            .ok_or(InventoryServiceError::NotFound)?;

        if !current.managed_by(actor) {
            return Err(InventoryServiceError::Forbidden);
        }

        let restocked = self
            .repository
            .restock(&mut tx, product, quantity)
            .await?
            .ok_or(InventoryServiceError::NotFound)?;

        tx.commit().await?;

        Ok(restocked)
    }
}

/// Manual stock changes.
///
/// Stock cuts belong to order approval and happen inside the order unit of work, through
/// the same ledger statement.
#[automock]
#[async_trait]
pub trait InventoryService: Send + Sync {
    /// Put `quantity` units back on the shelf. Sold amounts are never decreased.
    async fn restock(
        &self,
        tenant: TenantUuid,
        actor: Actor,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<ProductRecord, InventoryServiceError>;
}
