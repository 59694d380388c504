//! Auth data models.

use jiff::Timestamp;
use uuid::Uuid;

use crate::{
    auth::ApiTokenVersion,
    domain::{
        tenants::records::TenantUuid,
        users::records::{Actor, UserUuid},
    },
};

/// Stored verifier for a token that is neither revoked nor expired.
#[derive(Debug, Clone)]
pub(crate) struct ActiveApiToken {
    pub tenant_uuid: TenantUuid,
    pub user_uuid: UserUuid,
    pub version: ApiTokenVersion,
    pub token_hash: String,
}

/// API token metadata. Never carries the secret or its digest.
#[derive(Debug, Clone)]
pub struct ApiTokenRecord {
    pub uuid: Uuid,
    pub tenant_uuid: TenantUuid,
    pub user_uuid: UserUuid,
    pub version: ApiTokenVersion,
    pub created_at: Timestamp,
    pub last_used_at: Option<Timestamp>,
    pub expires_at: Option<Timestamp>,
    pub revoked_at: Option<Timestamp>,
}

#[derive(Debug, Clone)]
pub(crate) struct NewApiToken {
    pub uuid: Uuid,
    pub tenant_uuid: TenantUuid,
    pub user_uuid: UserUuid,
    pub version: ApiTokenVersion,
    pub token_hash: String,
    pub expires_at: Option<Timestamp>,
}

/// A freshly issued token. `token` is only ever available here.
#[derive(Debug, Clone)]
pub struct IssuedApiToken {
    pub token: String,
    pub record: ApiTokenRecord,
}

/// Who a bearer token speaks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub tenant: TenantUuid,
    pub actor: Actor,
}
