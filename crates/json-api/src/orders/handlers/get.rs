//! Get Order Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bazaar_app::domain::orders::records::{OrderLineRecord, OrderRecord};

use crate::{extensions::*, orders::errors::into_status_error, state::State};

/// Order Response
///
/// Prices are minor units, captured when the order was placed.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderResponse {
    pub uuid: Uuid,

    /// Four letters followed by four digits, unique within the marketplace
    pub tracking_code: String,
    pub buyer_id: Uuid,
    pub cart_items: Vec<OrderLineResponse>,
    pub payment_method: String,
    pub total_price: u64,
    pub is_paid: bool,
    pub shipping: ShippingResponse,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderLineResponse {
    pub product_id: Uuid,
    pub seller_id: Uuid,
    pub title: String,
    pub quantity: u32,
    pub item_price: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ShippingResponse {
    pub address_id: Uuid,
    pub status: String,
}

impl From<OrderLineRecord> for OrderLineResponse {
    fn from(line: OrderLineRecord) -> Self {
        Self {
            product_id: line.product_uuid.into_uuid(),
            seller_id: line.seller_uuid.into_uuid(),
            title: line.title,
            quantity: line.quantity,
            item_price: line.item_price,
        }
    }
}

impl From<OrderRecord> for OrderResponse {
    fn from(order: OrderRecord) -> Self {
        Self {
            uuid: order.uuid.into_uuid(),
            tracking_code: order.tracking_code.to_string(),
            buyer_id: order.buyer_uuid.into_uuid(),
            cart_items: order.lines.into_iter().map(Into::into).collect(),
            payment_method: order.payment_method.to_string(),
            total_price: order.total_price,
            is_paid: order.is_paid,
            shipping: ShippingResponse {
                address_id: order.shipping.address_uuid.into_uuid(),
                status: order.shipping.status.to_string(),
            },
            created_at: order.created_at.to_string(),
            updated_at: order.updated_at.to_string(),
        }
    }
}

/// Get Order Handler
///
/// Buyers see their own orders, sellers the orders holding their products.
#[endpoint(
    tags("orders"),
    summary = "Get Order",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Order found"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;

    let order = state
        .app
        .orders
        .get_order(principal.tenant, principal.actor, order.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(order.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use bazaar_app::domain::orders::{
        OrdersServiceError, records::OrderUuid, status::ShippingStatus,
    };

    use crate::test_helpers::{MockApp, SELLER, TEST_TENANT, buyer_actor, make_order};

    use super::*;

    fn route() -> Router {
        Router::with_path("orders/{order}").get(handler)
    }

    #[tokio::test]
    async fn test_get_order_renders_lines_and_shipping() -> TestResult {
        let uuid = OrderUuid::new();
        let order = make_order(uuid, ShippingStatus::Approved);
        let tracking_code = order.tracking_code.to_string();

        let mut app = MockApp::new();

        app.orders
            .expect_get_order()
            .once()
            .withf(move |tenant, actor, o| {
                *tenant == TEST_TENANT && *actor == buyer_actor() && *o == uuid
            })
            .return_once(move |_, _, _| Ok(order));

        let mut res = TestClient::get(format!("http://example.com/orders/{uuid}"))
            .send(&app.service(buyer_actor(), route()))
            .await;

        let body: OrderResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.tracking_code, tracking_code);
        assert_eq!(body.total_price, 2200);
        assert_eq!(body.payment_method, "credit_card");
        assert_eq!(body.shipping.status, "approved");
        assert_eq!(body.cart_items.len(), 1, "one line expected");
        assert_eq!(body.cart_items[0].seller_id, SELLER.into_uuid());

        Ok(())
    }

    #[tokio::test]
    async fn test_get_someone_elses_order_returns_404() -> TestResult {
        let uuid = OrderUuid::new();
        let mut app = MockApp::new();

        app.orders
            .expect_get_order()
            .once()
            .return_once(|_, _, _| Err(OrdersServiceError::NotFound));

        let res = TestClient::get(format!("http://example.com/orders/{uuid}"))
            .send(&app.service(buyer_actor(), route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
