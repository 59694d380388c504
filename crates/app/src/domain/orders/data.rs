//! Orders Data

use crate::domain::{
    addresses::records::AddressUuid,
    orders::{
        records::{OrderLineRecord, OrderRecord, OrderUuid, PaymentMethod},
        tracking::TrackingCode,
    },
    products::records::ProductUuid,
    users::records::{Actor, UserRole, UserUuid},
};

/// A checkout request.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub uuid: OrderUuid,
    pub lines: Vec<NewOrderLine>,
    pub payment_method: PaymentMethod,
    pub address: AddressUuid,

    /// Whether the payment was authorised before checkout. Only credit card orders can be
    /// created paid.
    pub payment_authorized: bool,
}

/// New Order Line Data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewOrderLine {
    pub product: ProductUuid,
    pub quantity: u32,
}

/// A fully priced order, ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    pub uuid: OrderUuid,
    pub tracking_code: TrackingCode,
    pub buyer_uuid: UserUuid,
    pub lines: Vec<OrderLineRecord>,
    pub payment_method: PaymentMethod,
    pub total_price: u64,
    pub is_paid: bool,
    pub address_uuid: AddressUuid,
}

/// Which orders an actor may see. Listings and single-order reads share this rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderFilter {
    All,

    /// Orders the user placed.
    Buyer(UserUuid),

    /// Orders the seller placed themselves, plus orders containing their products.
    Seller(UserUuid),
}

impl OrderFilter {
    /// Admins see everything, everyone else is scoped to themselves.
    #[must_use]
    pub const fn for_actor(actor: Actor) -> Self {
        match actor.role {
            UserRole::Admin => Self::All,
            UserRole::Seller => Self::Seller(actor.uuid),
            UserRole::Buyer => Self::Buyer(actor.uuid),
        }
    }

    #[must_use]
    pub fn matches(self, order: &OrderRecord) -> bool {
        match self {
            Self::All => true,
            Self::Buyer(buyer) => order.buyer_uuid == buyer,
            Self::Seller(seller) => order.buyer_uuid == seller || order.involves_seller(seller),
        }
    }
}
