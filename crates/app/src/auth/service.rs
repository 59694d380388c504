//! Auth service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::debug;
use uuid::Uuid;

use crate::{
    auth::{
        ApiTokenSecret, ApiTokenVersion, AuthServiceError, Principal, constant_time_eq,
        digest_api_token, format_api_token,
        models::{ApiTokenRecord, IssuedApiToken, NewApiToken},
        parse_api_token,
        repository::PgAuthRepository,
    },
    database::Db,
    domain::{
        tenants::records::TenantUuid,
        users::{records::UserUuid, repository::PgUsersRepository},
    },
};

#[derive(Debug, Clone)]
pub struct PgAuthService {
    db: Db,
    repository: PgAuthRepository,
    users: PgUsersRepository,
}

impl PgAuthService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            repository: PgAuthRepository::new(db.pool().clone()),
            users: PgUsersRepository::new(),
            db,
        }
    }

    /// Issue a new token for a user of the tenant.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist in the tenant, the expiry is in the past,
    /// or the token cannot be stored.
    pub async fn issue_api_token(
        &self,
        tenant: TenantUuid,
        user: UserUuid,
        expires_at: Option<Timestamp>,
    ) -> Result<IssuedApiToken, AuthServiceError> {
        if expires_at.is_some_and(|expires_at| expires_at <= Timestamp::now()) {
            return Err(AuthServiceError::InvalidExpiry);
        }

        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        self.users
            .find_user(&mut tx, user)
            .await?
            .ok_or(AuthServiceError::UserNotFound)?;

        tx.commit().await?;

        let token_uuid = Uuid::now_v7();
        let version = ApiTokenVersion::V1;
        let secret = ApiTokenSecret::generate();

        let record = self
            .repository
            .create_api_token(&NewApiToken {
                uuid: token_uuid,
                tenant_uuid: tenant,
                user_uuid: user,
                version,
                token_hash: digest_api_token(token_uuid, version, tenant, user, &secret),
                expires_at,
            })
            .await?;

        Ok(IssuedApiToken {
            token: format_api_token(token_uuid, version, &secret),
            record,
        })
    }

    /// List every token issued in the tenant, revoked ones included.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_api_tokens(
        &self,
        tenant: TenantUuid,
    ) -> Result<Vec<ApiTokenRecord>, AuthServiceError> {
        Ok(self.repository.list_api_tokens(tenant).await?)
    }

    /// Revoke a token by UUID. Returns `true` if the token was active.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn revoke_api_token(&self, token_uuid: Uuid) -> Result<bool, AuthServiceError> {
        Ok(self
            .repository
            .revoke_api_token(token_uuid)
            .await?
            .is_some())
    }
}

#[async_trait]
impl AuthService for PgAuthService {
    #[tracing::instrument(name = "auth.service.authenticate_bearer", skip_all, err)]
    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<Principal, AuthServiceError> {
        let parsed = parse_api_token(bearer_token).map_err(|error| {
            debug!(%error, "rejected malformed bearer token");

            AuthServiceError::NotFound
        })?;

        let token = self
            .repository
            .find_active_api_token(parsed.token_uuid, parsed.version)
            .await?
            .ok_or(AuthServiceError::NotFound)?;

        let expected = digest_api_token(
            parsed.token_uuid,
            parsed.version,
            token.tenant_uuid,
            token.user_uuid,
            &parsed.secret,
        );

        if !constant_time_eq(expected.as_bytes(), token.token_hash.as_bytes()) {
            return Err(AuthServiceError::NotFound);
        }

        let mut tx = self.db.begin_tenant_transaction(token.tenant_uuid).await?;

        let user = self
            .users
            .find_user(&mut tx, token.user_uuid)
            .await?
            .ok_or(AuthServiceError::NotFound)?;

        tx.commit().await?;

        // Auth success does not depend on recording usage.
        if let Err(error) = self.repository.touch_api_token(parsed.token_uuid).await {
            debug!(%error, "failed to record api token usage");
        }

        Ok(Principal {
            tenant: token.tenant_uuid,
            actor: user.actor(),
        })
    }
}

#[automock]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Resolve a bearer token to the tenant and user it was issued for.
    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<Principal, AuthServiceError>;
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;
    use testresult::TestResult;

    use crate::{domain::users::records::UserRole, test::TestContext};

    use super::*;

    #[tokio::test]
    async fn issued_token_authenticates_as_its_user() -> TestResult {
        let ctx = TestContext::new().await;
        let seller = ctx.create_user(UserRole::Seller).await;
        let auth = PgAuthService::new(ctx.app_db.clone());

        let issued = auth
            .issue_api_token(ctx.tenant_uuid, seller.uuid, None)
            .await?;

        let principal = auth.authenticate_bearer(&issued.token).await?;

        assert_eq!(principal.tenant, ctx.tenant_uuid);
        assert_eq!(principal.actor, seller.actor());

        let listed = auth.list_api_tokens(ctx.tenant_uuid).await?;

        assert_eq!(listed.len(), 1, "one token was issued");
        assert!(
            listed.iter().all(|token| token.last_used_at.is_some()),
            "successful authentication records usage"
        );

        Ok(())
    }

    #[tokio::test]
    async fn revoked_token_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let buyer = ctx.create_user(UserRole::Buyer).await;
        let auth = PgAuthService::new(ctx.app_db.clone());

        let issued = auth
            .issue_api_token(ctx.tenant_uuid, buyer.uuid, None)
            .await?;

        assert!(auth.revoke_api_token(issued.record.uuid).await?);
        assert!(
            !auth.revoke_api_token(issued.record.uuid).await?,
            "second revoke finds no active token"
        );

        let result = auth.authenticate_bearer(&issued.token).await;

        assert!(
            matches!(result, Err(AuthServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn forged_secret_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let buyer = ctx.create_user(UserRole::Buyer).await;
        let auth = PgAuthService::new(ctx.app_db.clone());

        let issued = auth
            .issue_api_token(ctx.tenant_uuid, buyer.uuid, None)
            .await?;

        let forged = format_api_token(
            issued.record.uuid,
            ApiTokenVersion::V1,
            &ApiTokenSecret::generate(),
        );

        let result = auth.authenticate_bearer(&forged).await;

        assert!(
            matches!(result, Err(AuthServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        let result = auth.authenticate_bearer("Bearer nonsense").await;

        assert!(
            matches!(result, Err(AuthServiceError::NotFound)),
            "expected NotFound for a malformed token, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn past_expiry_is_refused_at_issue() {
        let ctx = TestContext::new().await;
        let buyer = ctx.create_user(UserRole::Buyer).await;
        let auth = PgAuthService::new(ctx.app_db.clone());

        let yesterday = Timestamp::now() - SignedDuration::from_hours(24);

        let result = auth
            .issue_api_token(ctx.tenant_uuid, buyer.uuid, Some(yesterday))
            .await;

        assert!(
            matches!(result, Err(AuthServiceError::InvalidExpiry)),
            "expected InvalidExpiry, got {result:?}"
        );
    }

    #[tokio::test]
    async fn tokens_are_only_issued_to_users_of_the_tenant() {
        let ctx = TestContext::new().await;
        let buyer = ctx.create_user(UserRole::Buyer).await;
        let other = ctx.create_tenant("Elsewhere").await;
        let auth = PgAuthService::new(ctx.app_db.clone());

        let result = auth.issue_api_token(other, buyer.uuid, None).await;

        assert!(
            matches!(result, Err(AuthServiceError::UserNotFound)),
            "expected UserNotFound, got {result:?}"
        );
    }
}
