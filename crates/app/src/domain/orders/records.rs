//! Order Records

use std::{collections::BTreeSet, fmt, str::FromStr};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    domain::{
        addresses::records::AddressUuid,
        orders::{data::OrderFilter, status::ShippingStatus, tracking::TrackingCode},
        products::records::ProductUuid,
        users::records::{Actor, UserUuid},
    },
    uuids::TypedUuid,
};

/// Order UUID
pub type OrderUuid = TypedUuid<OrderRecord>;

/// Order Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRecord {
    pub uuid: OrderUuid,
    pub tracking_code: TrackingCode,
    pub buyer_uuid: UserUuid,
    pub lines: Vec<OrderLineRecord>,
    pub payment_method: PaymentMethod,
    pub total_price: u64,
    pub is_paid: bool,
    pub shipping: ShippingRecord,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl OrderRecord {
    /// Distinct sellers with at least one line in the order, in uuid order.
    #[must_use]
    pub fn sellers(&self) -> Vec<UserUuid> {
        self.lines
            .iter()
            .map(|line| line.seller_uuid)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Whether any line was sold by `seller`.
    #[must_use]
    pub fn involves_seller(&self, seller: UserUuid) -> bool {
        self.lines.iter().any(|line| line.seller_uuid == seller)
    }

    /// Whether the actor's [`OrderFilter`] covers this order.
    #[must_use]
    pub fn visible_to(&self, actor: Actor) -> bool {
        OrderFilter::for_actor(actor).matches(self)
    }
}

/// One product in an order's cart snapshot.
///
/// `item_price` and `title` are captured when the order is placed and never re-read from
/// the product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLineRecord {
    pub product_uuid: ProductUuid,
    pub seller_uuid: UserUuid,
    pub title: String,
    pub quantity: u32,
    pub item_price: u64,
}

impl OrderLineRecord {
    /// `quantity × item_price`, or `None` on overflow.
    #[must_use]
    pub fn line_total(&self) -> Option<u64> {
        self.item_price.checked_mul(u64::from(self.quantity))
    }
}

/// Sum of every line total, or `None` on overflow.
#[must_use]
pub fn order_total(lines: &[OrderLineRecord]) -> Option<u64> {
    lines
        .iter()
        .try_fold(0_u64, |total, line| total.checked_add(line.line_total()?))
}

/// Shipping Record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShippingRecord {
    pub address_uuid: AddressUuid,
    pub status: ShippingStatus,
}

/// How the buyer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CreditCard,
    CashOnDelivery,
}

impl PaymentMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreditCard => "credit_card",
            Self::CashOnDelivery => "cash_on_delivery",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown payment method: {0}")]
pub struct UnknownPaymentMethod(pub String);

impl FromStr for PaymentMethod {
    type Err = UnknownPaymentMethod;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "credit_card" => Ok(Self::CreditCard),
            "cash_on_delivery" => Ok(Self::CashOnDelivery),
            other => Err(UnknownPaymentMethod(other.to_string())),
        }
    }
}
