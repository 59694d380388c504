//! Users service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::{
        tenants::records::TenantUuid,
        users::{
            data::NewUser,
            errors::UsersServiceError,
            records::{UserRecord, UserUuid},
            repository::PgUsersRepository,
        },
    },
};

#[derive(Debug, Clone)]
pub struct PgUsersService {
    db: Db,
    repository: PgUsersRepository,
}

impl PgUsersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgUsersRepository::new(),
        }
    }
}

#[async_trait]
impl UsersService for PgUsersService {
    async fn create_user(
        &self,
        tenant: TenantUuid,
        user: NewUser,
    ) -> Result<UserRecord, UsersServiceError> {
        if user.first_name.trim().is_empty() || !user.email.contains('@') {
            return Err(UsersServiceError::InvalidData);
        }

        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let created = self.repository.create_user(&mut tx, &user).await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn get_user(
        &self,
        tenant: TenantUuid,
        user: UserUuid,
    ) -> Result<UserRecord, UsersServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let user = self
            .repository
            .find_user(&mut tx, user)
            .await?
            .ok_or(UsersServiceError::NotFound)?;

        tx.commit().await?;

        Ok(user)
    }
}

#[automock]
#[async_trait]
pub trait UsersService: Send + Sync {
    /// Registers a buyer, seller or administrator in the tenant.
    async fn create_user(
        &self,
        tenant: TenantUuid,
        user: NewUser,
    ) -> Result<UserRecord, UsersServiceError>;

    async fn get_user(
        &self,
        tenant: TenantUuid,
        user: UserUuid,
    ) -> Result<UserRecord, UsersServiceError>;
}
