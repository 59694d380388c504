//! Addresses service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::{
        addresses::{
            data::NewAddress,
            errors::AddressesServiceError,
            records::{AddressRecord, AddressUuid},
            repository::PgAddressesRepository,
        },
        tenants::records::TenantUuid,
        users::records::Actor,
    },
};

#[derive(Debug, Clone)]
pub struct PgAddressesService {
    db: Db,
    repository: PgAddressesRepository,
}

impl PgAddressesService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgAddressesRepository::new(),
        }
    }
}

#[async_trait]
impl AddressesService for PgAddressesService {
    async fn create_address(
        &self,
        tenant: TenantUuid,
        actor: Actor,
        address: NewAddress,
    ) -> Result<AddressRecord, AddressesServiceError> {
        if address.address_line.trim().is_empty() || address.phone_number.trim().is_empty() {
            return Err(AddressesServiceError::InvalidData);
        }

        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let created = self
            .repository
            .create_address(&mut tx, actor.uuid, &address)
            .await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn get_address(
        &self,
        tenant: TenantUuid,
        actor: Actor,
        address: AddressUuid,
    ) -> Result<AddressRecord, AddressesServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let found = self
            .repository
            .find_address(&mut tx, address)
            .await?
            .filter(|found| actor.is_admin() || found.user_uuid == actor.uuid)
            .ok_or(AddressesServiceError::NotFound)?;

        tx.commit().await?;

        Ok(found)
    }
}

#[automock]
#[async_trait]
pub trait AddressesService: Send + Sync {
    /// Saves a shipping address owned by the acting user.
    async fn create_address(
        &self,
        tenant: TenantUuid,
        actor: Actor,
        address: NewAddress,
    ) -> Result<AddressRecord, AddressesServiceError>;

    /// Fetches an address; only its owner and administrators can see it.
    async fn get_address(
        &self,
        tenant: TenantUuid,
        actor: Actor,
        address: AddressUuid,
    ) -> Result<AddressRecord, AddressesServiceError>;
}
