//! Product Records

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    domain::users::records::{Actor, UserUuid},
    uuids::TypedUuid,
};

/// Product UUID
pub type ProductUuid = TypedUuid<ProductRecord>;

/// Product Record
///
/// `available_stock` and `sold_amount` are only ever changed by the inventory ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRecord {
    pub uuid: ProductUuid,
    pub seller_uuid: UserUuid,
    pub title: String,
    pub description: String,
    pub base_price: u64,
    pub unit_price: u64,
    pub available_stock: u64,
    pub sold_amount: u64,
    pub status: ProductStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ProductRecord {
    #[must_use]
    pub fn is_orderable(&self) -> bool {
        self.status == ProductStatus::Public
    }

    /// The selling user and administrators manage a product.
    #[must_use]
    pub fn managed_by(&self, actor: Actor) -> bool {
        actor.is_admin() || self.seller_uuid == actor.uuid
    }

    /// Hidden products are only visible to those who manage them.
    #[must_use]
    pub fn visible_to(&self, actor: Actor) -> bool {
        match self.status {
            ProductStatus::Public => true,
            ProductStatus::Hidden => self.managed_by(actor),
            ProductStatus::Deleted => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    Public,
    Hidden,
    Deleted,
}

impl ProductStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Hidden => "hidden",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown product status: {0}")]
pub struct UnknownProductStatus(pub String);

impl FromStr for ProductStatus {
    type Err = UnknownProductStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "public" => Ok(Self::Public),
            "hidden" => Ok(Self::Hidden),
            "deleted" => Ok(Self::Deleted),
            other => Err(UnknownProductStatus(other.to_string())),
        }
    }
}
