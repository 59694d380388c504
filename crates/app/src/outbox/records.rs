//! Outbox Records

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use thiserror::Error;

use crate::{domain::tenants::records::TenantUuid, outbox::SideEffect, uuids::TypedUuid};

/// Outbox UUID
pub type OutboxUuid = TypedUuid<OutboxRecord>;

/// A side effect claimed for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboxRecord {
    pub uuid: OutboxUuid,
    pub tenant_uuid: TenantUuid,
    pub effect: SideEffect,

    /// Delivery attempts so far, including the one this claim started.
    pub attempts: u32,
    pub created_at: Timestamp,
}

/// Delivery state of an outbox record.
///
/// Records start `Pending`, are `InFlight` while a dispatcher holds them and end either
/// `Delivered` or, after too many failed attempts, `Failed`. An in-flight record whose
/// lease runs out is claimable again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutboxStatus {
    Pending,
    InFlight,
    Delivered,
    Failed,
}

impl OutboxStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InFlight => "in_flight",
            Self::Delivered => "delivered",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for OutboxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown outbox status: {0}")]
pub struct UnknownOutboxStatus(pub String);

impl FromStr for OutboxStatus {
    type Err = UnknownOutboxStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "in_flight" => Ok(Self::InFlight),
            "delivered" => Ok(Self::Delivered),
            "failed" => Ok(Self::Failed),
            other => Err(UnknownOutboxStatus(other.to_string())),
        }
    }
}

/// Number of outbox records in each status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutboxCounts {
    pub pending: u64,
    pub in_flight: u64,
    pub delivered: u64,
    pub failed: u64,
}
