//! Bearer token format and digests.
//!
//! A token reads `bz_v1_<token uuid>.<secret hex>`. Only a SHA-256 digest of the token
//! uuid, owning tenant and user, and secret is stored, so a leaked table cannot be
//! replayed and a digest copied onto another row never verifies.

use std::{fmt, str::FromStr};

use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;
use zeroize::Zeroize;

use crate::domain::{tenants::records::TenantUuid, users::records::UserUuid};

/// Bearer token prefix.
pub const API_TOKEN_PREFIX: &str = "bz";

/// Number of random secret bytes carried by a token.
pub const API_TOKEN_SECRET_BYTES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiTokenVersion {
    V1,
}

impl ApiTokenVersion {
    #[must_use]
    pub const fn as_i16(self) -> i16 {
        match self {
            Self::V1 => 1,
        }
    }

    #[must_use]
    pub const fn segment(self) -> &'static str {
        match self {
            Self::V1 => "v1",
        }
    }
}

impl TryFrom<i16> for ApiTokenVersion {
    type Error = ApiTokenError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::V1),
            _ => Err(ApiTokenError::UnsupportedVersion),
        }
    }
}

impl FromStr for ApiTokenVersion {
    type Err = ApiTokenError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "v1" => Ok(Self::V1),
            _ => Err(ApiTokenError::UnsupportedVersion),
        }
    }
}

/// Random token material. Wiped from memory on drop.
#[derive(Clone)]
pub struct ApiTokenSecret([u8; API_TOKEN_SECRET_BYTES]);

impl ApiTokenSecret {
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0_u8; API_TOKEN_SECRET_BYTES];

        OsRng.fill_bytes(&mut bytes);

        Self(bytes)
    }

    #[must_use]
    pub const fn from_bytes(bytes: [u8; API_TOKEN_SECRET_BYTES]) -> Self {
        Self(bytes)
    }

    fn to_hex(&self) -> String {
        self.0.iter().fold(
            String::with_capacity(API_TOKEN_SECRET_BYTES * 2),
            |mut out, byte| {
                out.push_str(&format!("{byte:02x}"));
                out
            },
        )
    }

    fn from_hex(encoded: &str) -> Option<Self> {
        if encoded.len() != API_TOKEN_SECRET_BYTES * 2 || !encoded.is_ascii() {
            return None;
        }

        let mut bytes = [0_u8; API_TOKEN_SECRET_BYTES];

        for (byte, pair) in bytes.iter_mut().zip(encoded.as_bytes().chunks_exact(2)) {
            let pair = std::str::from_utf8(pair).ok()?;

            *byte = u8::from_str_radix(pair, 16).ok()?;
        }

        Some(Self(bytes))
    }
}

impl fmt::Debug for ApiTokenSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiTokenSecret(**redacted**)")
    }
}

impl PartialEq for ApiTokenSecret {
    fn eq(&self, other: &Self) -> bool {
        constant_time_eq(&self.0, &other.0)
    }
}

impl Drop for ApiTokenSecret {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// A bearer token split into its parts.
#[derive(Debug, Clone)]
pub struct ParsedApiToken {
    pub token_uuid: Uuid,
    pub version: ApiTokenVersion,
    pub secret: ApiTokenSecret,
}

#[derive(Debug, Error)]
pub enum ApiTokenError {
    #[error("api token format is invalid")]
    InvalidFormat,

    #[error("api token uses an unsupported version")]
    UnsupportedVersion,

    #[error("api token secret encoding is invalid")]
    InvalidSecretEncoding,
}

#[must_use]
pub fn format_api_token(
    token_uuid: Uuid,
    version: ApiTokenVersion,
    secret: &ApiTokenSecret,
) -> String {
    format!(
        "{API_TOKEN_PREFIX}_{}_{}.{}",
        version.segment(),
        token_uuid.simple(),
        secret.to_hex()
    )
}

/// Split a bearer token into uuid, version and secret.
///
/// # Errors
///
/// Returns an error when the prefix, version, uuid or secret segment is malformed.
pub fn parse_api_token(token: &str) -> Result<ParsedApiToken, ApiTokenError> {
    let (identifier, secret) = token.split_once('.').ok_or(ApiTokenError::InvalidFormat)?;

    let mut segments = identifier.splitn(3, '_');

    let (Some(API_TOKEN_PREFIX), Some(version), Some(token_uuid)) =
        (segments.next(), segments.next(), segments.next())
    else {
        return Err(ApiTokenError::InvalidFormat);
    };

    Ok(ParsedApiToken {
        token_uuid: Uuid::try_parse(token_uuid)
            .ok()
            .ok_or(ApiTokenError::InvalidFormat)?,
        version: version.parse()?,
        secret: ApiTokenSecret::from_hex(secret).ok_or(ApiTokenError::InvalidSecretEncoding)?,
    })
}

/// Digest stored for a token, binding its secret to the tenant and user that own it.
#[must_use]
pub fn digest_api_token(
    token_uuid: Uuid,
    version: ApiTokenVersion,
    tenant: TenantUuid,
    user: UserUuid,
    secret: &ApiTokenSecret,
) -> String {
    let mut hasher = Sha256::new();

    hasher.update(token_uuid.as_bytes());
    hasher.update(version.as_i16().to_be_bytes());
    hasher.update(tenant.into_uuid().as_bytes());
    hasher.update(user.into_uuid().as_bytes());
    hasher.update(secret.0);

    format!("{:x}", hasher.finalize())
}

/// Compare two digests without short-circuiting on the first differing byte.
#[must_use]
pub fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .zip(right)
            .fold(0_u8, |diff, (l, r)| diff | (l ^ r))
            == 0
}
