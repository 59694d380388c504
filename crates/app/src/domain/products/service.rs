//! Products service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::{
        products::{
            data::{NewProduct, ProductUpdate, valid_title},
            errors::ProductsServiceError,
            pricing,
            records::{ProductRecord, ProductStatus, ProductUuid},
            repository::{PgProductsRepository, ProductColumns},
        },
        tenants::records::TenantUuid,
        users::records::{Actor, UserRole},
    },
};

#[derive(Debug, Clone)]
pub struct PgProductsService {
    db: Db,
    repository: PgProductsRepository,
}

impl PgProductsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgProductsRepository::new(),
        }
    }
}

#[async_trait]
impl ProductsService for PgProductsService {
    async fn list_products(
        &self,
        tenant: TenantUuid,
        actor: Actor,
    ) -> Result<Vec<ProductRecord>, ProductsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let products = self
            .repository
            .list_products(&mut tx, actor.role == UserRole::Buyer)
            .await?;

        tx.commit().await?;

        Ok(products
            .into_iter()
            .filter(|product| product.visible_to(actor))
            .collect())
    }

    async fn get_product(
        &self,
        tenant: TenantUuid,
        actor: Actor,
        product: ProductUuid,
    ) -> Result<ProductRecord, ProductsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let product = self
            .repository
            .find_product(&mut tx, product)
            .await?
            .filter(|product| product.visible_to(actor))
            .ok_or(ProductsServiceError::NotFound)?;

        tx.commit().await?;

        Ok(product)
    }

    async fn create_product(
        &self,
        tenant: TenantUuid,
        actor: Actor,
        product: NewProduct,
    ) -> Result<ProductRecord, ProductsServiceError> {
        if actor.role == UserRole::Buyer {
            return Err(ProductsServiceError::Forbidden);
        }

        if !valid_title(&product.title) || product.status == ProductStatus::Deleted {
            return Err(ProductsServiceError::InvalidData);
        }

        let unit_price = pricing::unit_price(product.base_price)?;

        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let created = self
            .repository
            .create_product(&mut tx, actor.uuid, &product, unit_price)
            .await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn update_product(
        &self,
        tenant: TenantUuid,
        actor: Actor,
        product: ProductUuid,
        update: ProductUpdate,
    ) -> Result<ProductRecord, ProductsServiceError> {
        if update.status == Some(ProductStatus::Deleted) {
            return Err(ProductsServiceError::InvalidData);
        }

        if update.title.as_deref().is_some_and(|title| !valid_title(title)) {
            return Err(ProductsServiceError::InvalidData);
        }

        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let current = self
            .repository
            .find_product(&mut tx, product)
            .await?
            .filter(|current| current.status != ProductStatus::Deleted)
            .ok_or(ProductsServiceError::NotFound)?;

        if !current.managed_by(actor) {
            return Err(ProductsServiceError::Forbidden);
        }

        let base_price = update.base_price.unwrap_or(current.base_price);

        let updated = self
            .repository
            .update_product(
                &mut tx,
                product,
                ProductColumns {
                    title: update.title.as_deref().unwrap_or(&current.title),
                    description: update
                        .description
                        .as_deref()
                        .unwrap_or(&current.description),
                    base_price,
                    unit_price: pricing::unit_price(base_price)?,
                    status: update.status.unwrap_or(current.status),
                },
            )
            .await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn delete_product(
        &self,
        tenant: TenantUuid,
        actor: Actor,
        product: ProductUuid,
    ) -> Result<(), ProductsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let current = self
            .repository
            .find_product(&mut tx, product)
            .await?
            .ok_or(ProductsServiceError::NotFound)?;

        if !current.managed_by(actor) {
            return Err(ProductsServiceError::Forbidden);
        }

        let rows_affected = self.repository.delete_product(&mut tx, product).await?;

        if rows_affected == 0 {
            return Err(ProductsServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait ProductsService: Send + Sync {
    /// Lists the catalogue; buyers only see public products.
    async fn list_products(
        &self,
        tenant: TenantUuid,
        actor: Actor,
    ) -> Result<Vec<ProductRecord>, ProductsServiceError>;

    async fn get_product(
        &self,
        tenant: TenantUuid,
        actor: Actor,
        product: ProductUuid,
    ) -> Result<ProductRecord, ProductsServiceError>;

    /// Lists a product for sale by the acting seller. The unit price is derived from the
    /// base price.
    async fn create_product(
        &self,
        tenant: TenantUuid,
        actor: Actor,
        product: NewProduct,
    ) -> Result<ProductRecord, ProductsServiceError>;

    /// Updates catalogue fields; changing the base price recomputes the unit price.
    /// Existing orders keep the price they were placed at.
    async fn update_product(
        &self,
        tenant: TenantUuid,
        actor: Actor,
        product: ProductUuid,
        update: ProductUpdate,
    ) -> Result<ProductRecord, ProductsServiceError>;

    /// Soft-deletes a product. Orders that reference it are untouched.
    async fn delete_product(
        &self,
        tenant: TenantUuid,
        actor: Actor,
        product: ProductUuid,
    ) -> Result<(), ProductsServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::test::TestContext;

    use super::*;

    fn new_product(base_price: u64) -> NewProduct {
        NewProduct {
            uuid: ProductUuid::new(),
            title: "Walnut Desk".to_string(),
            description: "Solid walnut".to_string(),
            base_price,
            available_stock: 5,
            status: ProductStatus::Public,
        }
    }

    #[tokio::test]
    async fn create_product_derives_unit_price() -> TestResult {
        let ctx = TestContext::new().await;
        let seller = ctx.create_user(UserRole::Seller).await;

        let product = ctx
            .products
            .create_product(ctx.tenant_uuid, seller.actor(), new_product(1999))
            .await?;

        assert_eq!(product.base_price, 1999);
        assert_eq!(product.unit_price, 2199);
        assert_eq!(product.available_stock, 5);
        assert_eq!(product.sold_amount, 0);
        assert_eq!(product.seller_uuid, seller.uuid);

        Ok(())
    }

    #[tokio::test]
    async fn buyers_cannot_create_products() {
        let ctx = TestContext::new().await;
        let buyer = ctx.create_user(UserRole::Buyer).await;

        let result = ctx
            .products
            .create_product(ctx.tenant_uuid, buyer.actor(), new_product(100))
            .await;

        assert!(
            matches!(result, Err(ProductsServiceError::Forbidden)),
            "expected Forbidden, got {result:?}"
        );
    }

    #[tokio::test]
    async fn short_titles_are_rejected() {
        let ctx = TestContext::new().await;
        let seller = ctx.create_user(UserRole::Seller).await;

        let result = ctx
            .products
            .create_product(
                ctx.tenant_uuid,
                seller.actor(),
                NewProduct {
                    title: "ab".to_string(),
                    ..new_product(100)
                },
            )
            .await;

        assert!(
            matches!(result, Err(ProductsServiceError::InvalidData)),
            "expected InvalidData, got {result:?}"
        );
    }

    #[tokio::test]
    async fn update_base_price_recomputes_unit_price() -> TestResult {
        let ctx = TestContext::new().await;
        let seller = ctx.create_user(UserRole::Seller).await;

        let product = ctx
            .products
            .create_product(ctx.tenant_uuid, seller.actor(), new_product(1000))
            .await?;

        let updated = ctx
            .products
            .update_product(
                ctx.tenant_uuid,
                seller.actor(),
                product.uuid,
                ProductUpdate {
                    base_price: Some(2000),
                    ..ProductUpdate::default()
                },
            )
            .await?;

        assert_eq!(updated.base_price, 2000);
        assert_eq!(updated.unit_price, 2200);
        assert_eq!(updated.title, product.title);

        Ok(())
    }

    #[tokio::test]
    async fn other_sellers_cannot_update_the_product() -> TestResult {
        let ctx = TestContext::new().await;
        let seller = ctx.create_user(UserRole::Seller).await;
        let rival = ctx.create_user(UserRole::Seller).await;

        let product = ctx
            .products
            .create_product(ctx.tenant_uuid, seller.actor(), new_product(1000))
            .await?;

        let result = ctx
            .products
            .update_product(
                ctx.tenant_uuid,
                rival.actor(),
                product.uuid,
                ProductUpdate {
                    base_price: Some(1),
                    ..ProductUpdate::default()
                },
            )
            .await;

        assert!(
            matches!(result, Err(ProductsServiceError::Forbidden)),
            "expected Forbidden, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn hidden_products_are_invisible_to_buyers() -> TestResult {
        let ctx = TestContext::new().await;
        let seller = ctx.create_user(UserRole::Seller).await;
        let buyer = ctx.create_user(UserRole::Buyer).await;

        let hidden = ctx
            .products
            .create_product(
                ctx.tenant_uuid,
                seller.actor(),
                NewProduct {
                    status: ProductStatus::Hidden,
                    ..new_product(100)
                },
            )
            .await?;

        let listed = ctx
            .products
            .list_products(ctx.tenant_uuid, buyer.actor())
            .await?;

        assert!(
            !listed.iter().any(|product| product.uuid == hidden.uuid),
            "hidden product should not be listed for buyers"
        );

        let result = ctx
            .products
            .get_product(ctx.tenant_uuid, buyer.actor(), hidden.uuid)
            .await;

        assert!(
            matches!(result, Err(ProductsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        let seen_by_seller = ctx
            .products
            .get_product(ctx.tenant_uuid, seller.actor(), hidden.uuid)
            .await?;

        assert_eq!(seen_by_seller.status, ProductStatus::Hidden);

        Ok(())
    }

    #[tokio::test]
    async fn delete_product_is_a_soft_delete() -> TestResult {
        let ctx = TestContext::new().await;
        let seller = ctx.create_user(UserRole::Seller).await;

        let product = ctx
            .products
            .create_product(ctx.tenant_uuid, seller.actor(), new_product(100))
            .await?;

        ctx.products
            .delete_product(ctx.tenant_uuid, seller.actor(), product.uuid)
            .await?;

        let result = ctx
            .products
            .get_product(ctx.tenant_uuid, seller.actor(), product.uuid)
            .await;

        assert!(
            matches!(result, Err(ProductsServiceError::NotFound)),
            "expected NotFound after deletion, got {result:?}"
        );

        let again = ctx
            .products
            .delete_product(ctx.tenant_uuid, seller.actor(), product.uuid)
            .await;

        assert!(
            matches!(again, Err(ProductsServiceError::NotFound)),
            "expected NotFound on second delete, got {again:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn product_not_visible_to_other_tenant() -> TestResult {
        let ctx = TestContext::new().await;
        let seller = ctx.create_user(UserRole::Seller).await;

        let product = ctx
            .products
            .create_product(ctx.tenant_uuid, seller.actor(), new_product(100))
            .await?;

        let tenant_b = ctx.create_tenant("Tenant B").await;

        let result = ctx
            .products
            .get_product(tenant_b, seller.actor(), product.uuid)
            .await;

        assert!(
            matches!(result, Err(ProductsServiceError::NotFound)),
            "expected NotFound for cross-tenant access, got {result:?}"
        );

        Ok(())
    }
}
