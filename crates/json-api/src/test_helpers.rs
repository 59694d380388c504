//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*};
use uuid::Uuid;

use bazaar_app::{
    auth::{MockAuthService, Principal},
    context::AppContext,
    domain::{
        addresses::{
            MockAddressesService,
            records::{AddressRecord, AddressUuid},
        },
        inventory::MockInventoryService,
        notifications::{
            MockNotificationsService,
            records::{NotificationRecord, NotificationUuid},
        },
        orders::{
            MockOrdersService,
            records::{OrderLineRecord, OrderRecord, OrderUuid, PaymentMethod, ShippingRecord},
            status::ShippingStatus,
            tracking::TrackingCode,
        },
        products::{
            MockProductsService,
            records::{ProductRecord, ProductStatus, ProductUuid},
        },
        reviews::{
            MockReviewsService,
            records::{ReviewRecord, ReviewUuid},
        },
        tenants::records::TenantUuid,
        users::{
            MockUsersService,
            records::{Actor, UserRole, UserUuid},
        },
    },
    outbox::{MockOutboxStore, email::MockEmailSender},
};

use crate::{extensions::*, state::State};

pub(crate) const TEST_TENANT: TenantUuid = TenantUuid::from_uuid(Uuid::nil());

pub(crate) const BUYER: UserUuid = UserUuid::from_uuid(Uuid::from_u128(0xB0));
pub(crate) const SELLER: UserUuid = UserUuid::from_uuid(Uuid::from_u128(0x5E));
pub(crate) const ADMIN: UserUuid = UserUuid::from_uuid(Uuid::from_u128(0xAD));

pub(crate) fn buyer_actor() -> Actor {
    Actor::new(BUYER, UserRole::Buyer)
}

pub(crate) fn seller_actor() -> Actor {
    Actor::new(SELLER, UserRole::Seller)
}

pub(crate) fn admin_actor() -> Actor {
    Actor::new(ADMIN, UserRole::Admin)
}

/// Stands in for the auth middleware, acting as a fixed principal.
struct InjectPrincipal(Principal);

#[salvo::handler]
impl InjectPrincipal {
    async fn handle(
        &self,
        req: &mut Request,
        depot: &mut Depot,
        res: &mut Response,
        ctrl: &mut FlowCtrl,
    ) {
        depot.insert_principal(self.0);
        ctrl.call_next(req, depot, res).await;
    }
}

/// Every service behind the API, mocked. Calls without an expectation fail the test.
pub(crate) struct MockApp {
    pub(crate) auth: MockAuthService,
    pub(crate) users: MockUsersService,
    pub(crate) addresses: MockAddressesService,
    pub(crate) products: MockProductsService,
    pub(crate) reviews: MockReviewsService,
    pub(crate) inventory: MockInventoryService,
    pub(crate) notifications: MockNotificationsService,
    pub(crate) orders: MockOrdersService,
    pub(crate) outbox: MockOutboxStore,
}

impl MockApp {
    pub(crate) fn new() -> Self {
        Self {
            auth: MockAuthService::new(),
            users: MockUsersService::new(),
            addresses: MockAddressesService::new(),
            products: MockProductsService::new(),
            reviews: MockReviewsService::new(),
            inventory: MockInventoryService::new(),
            notifications: MockNotificationsService::new(),
            orders: MockOrdersService::new(),
            outbox: MockOutboxStore::new(),
        }
    }

    pub(crate) fn into_state(self) -> Arc<State> {
        State::from_app_context(AppContext {
            auth: Arc::new(self.auth),
            users: Arc::new(self.users),
            addresses: Arc::new(self.addresses),
            products: Arc::new(self.products),
            reviews: Arc::new(self.reviews),
            inventory: Arc::new(self.inventory),
            notifications: Arc::new(self.notifications),
            orders: Arc::new(self.orders),
            outbox: Arc::new(self.outbox),
            email: Arc::new(MockEmailSender::new()),
        })
    }

    /// Serve `route` to requests authenticated as `actor` in [`TEST_TENANT`].
    pub(crate) fn service(self, actor: Actor, route: Router) -> Service {
        Service::new(
            Router::new()
                .hoop(inject(self.into_state()))
                .hoop(InjectPrincipal(Principal {
                    tenant: TEST_TENANT,
                    actor,
                }))
                .push(route),
        )
    }
}

pub(crate) fn state_with_auth(auth: MockAuthService) -> Arc<State> {
    MockApp {
        auth,
        ..MockApp::new()
    }
    .into_state()
}

pub(crate) fn make_product(uuid: ProductUuid) -> ProductRecord {
    ProductRecord {
        uuid,
        seller_uuid: SELLER,
        title: "Teapot".to_string(),
        description: "Cast iron".to_string(),
        base_price: 1000,
        unit_price: 1100,
        available_stock: 5,
        sold_amount: 0,
        status: ProductStatus::Public,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

pub(crate) fn make_review(product: ProductUuid, uuid: ReviewUuid, rating: u8) -> ReviewRecord {
    ReviewRecord {
        uuid,
        product_uuid: product,
        author_uuid: BUYER,
        author_name: "Bet**".to_string(),
        rating,
        comment: "Pours well".to_string(),
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

pub(crate) fn make_order(uuid: OrderUuid, status: ShippingStatus) -> OrderRecord {
    OrderRecord {
        uuid,
        tracking_code: TrackingCode::random(),
        buyer_uuid: BUYER,
        lines: vec![OrderLineRecord {
            product_uuid: ProductUuid::from_uuid(Uuid::from_u128(1)),
            seller_uuid: SELLER,
            title: "Teapot".to_string(),
            quantity: 2,
            item_price: 1100,
        }],
        payment_method: PaymentMethod::CreditCard,
        total_price: 2200,
        is_paid: false,
        shipping: ShippingRecord {
            address_uuid: AddressUuid::from_uuid(Uuid::from_u128(2)),
            status,
        },
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

pub(crate) fn make_address(uuid: AddressUuid) -> AddressRecord {
    AddressRecord {
        uuid,
        user_uuid: BUYER,
        address_line: "1 Harbour Road".to_string(),
        phone_number: "+44 20 7946 0000".to_string(),
        created_at: Timestamp::UNIX_EPOCH,
    }
}

pub(crate) fn make_notification(uuid: NotificationUuid, opened: bool) -> NotificationRecord {
    NotificationRecord {
        uuid,
        recipient_uuid: SELLER,
        sender_uuid: Some(BUYER),
        title: "Order Notification".to_string(),
        content: "Got new order".to_string(),
        kind: "Product order".to_string(),
        entity_uuid: Some(Uuid::from_u128(3)),
        opened,
        created_at: Timestamp::UNIX_EPOCH,
    }
}
