//! Update Order Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bazaar_app::domain::{
    orders::{OrdersServiceError, status::ShippingStatus},
    users::records::UserRole,
};

use crate::{
    extensions::*,
    observability::metrics,
    orders::{errors::into_status_error, get::OrderResponse},
    state::State,
};

/// Update Order Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdateOrderRequest {
    pub shipping: ShippingUpdate,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ShippingUpdate {
    /// Target shipping status. Buyers may only send `cancelled`.
    pub status: String,
}

/// Update Order Handler
///
/// Sellers and administrators move the order through the shipping states. Approving cuts
/// stock for every line. Buyers may cancel their own pending orders.
#[endpoint(
    tags("orders"),
    summary = "Update Order Shipping Status",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Status changed"),
        (status_code = StatusCode::BAD_REQUEST, description = "Illegal transition or insufficient stock"),
        (status_code = StatusCode::FORBIDDEN, description = "Not allowed to change this order"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::CONFLICT, description = "Concurrent update, retry"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "orders.update",
    skip(order, json, depot),
    fields(
        tenant_uuid = tracing::field::Empty,
        order_uuid = tracing::field::Empty,
        status = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    json: JsonBody<UpdateOrderRequest>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;
    let order = order.into_inner();

    let next = json
        .into_inner()
        .shipping
        .status
        .parse::<ShippingStatus>()
        .map_err(|unknown| StatusError::bad_request().brief(unknown.to_string()))?;

    let span = tracing::Span::current();

    span.record("tenant_uuid", tracing::field::display(principal.tenant));
    span.record("order_uuid", tracing::field::display(order));
    span.record("status", next.as_str());

    let result = if principal.actor.role == UserRole::Buyer {
        if next != ShippingStatus::Cancelled {
            return Err(StatusError::forbidden().brief("Buyers may only cancel orders"));
        }

        state
            .app
            .orders
            .cancel_order(principal.tenant, principal.actor, order.into())
            .await
    } else {
        state
            .app
            .orders
            .transition_status(principal.tenant, principal.actor, order.into(), next)
            .await
    };

    let order = result
        .inspect_err(|error| {
            if matches!(error, OrdersServiceError::InsufficientStock { .. }) {
                metrics::record_stock_rejection();
            }
        })
        .map_err(into_status_error)?;

    metrics::record_order_transition(order.shipping.status);

    tracing::info!(order_uuid = %order.uuid, status = %order.shipping.status, "changed order status");

    Ok(Json(order.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use bazaar_app::domain::{orders::records::OrderUuid, products::records::ProductUuid};

    use crate::test_helpers::{MockApp, TEST_TENANT, buyer_actor, make_order, seller_actor};

    use super::*;

    fn route() -> Router {
        Router::with_path("orders/{order}").patch(handler)
    }

    fn status_body(status: &str) -> serde_json::Value {
        json!({ "shipping": { "status": status } })
    }

    #[tokio::test]
    async fn test_seller_approves_order() -> TestResult {
        let uuid = OrderUuid::new();
        let mut app = MockApp::new();

        app.orders
            .expect_transition_status()
            .once()
            .withf(move |tenant, actor, o, next| {
                *tenant == TEST_TENANT
                    && *actor == seller_actor()
                    && *o == uuid
                    && *next == ShippingStatus::Approved
            })
            .return_once(move |_, _, _, _| Ok(make_order(uuid, ShippingStatus::Approved)));

        app.orders.expect_cancel_order().never();

        let mut res = TestClient::patch(format!("http://example.com/orders/{uuid}"))
            .json(&status_body("approved"))
            .send(&app.service(seller_actor(), route()))
            .await;

        let body: OrderResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.shipping.status, "approved");

        Ok(())
    }

    #[tokio::test]
    async fn test_approval_without_stock_returns_400() -> TestResult {
        let uuid = OrderUuid::new();
        let mut app = MockApp::new();

        app.orders
            .expect_transition_status()
            .once()
            .return_once(|_, _, _, _| {
                Err(OrdersServiceError::InsufficientStock {
                    product: ProductUuid::new(),
                    requested: 2,
                    available: 1,
                })
            });

        let res = TestClient::patch(format!("http://example.com/orders/{uuid}"))
            .json(&status_body("approved"))
            .send(&app.service(seller_actor(), route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_repeated_approval_returns_400() -> TestResult {
        let uuid = OrderUuid::new();
        let mut app = MockApp::new();

        app.orders
            .expect_transition_status()
            .once()
            .return_once(|_, _, _, _| {
                Err(OrdersServiceError::IllegalTransition {
                    from: ShippingStatus::Approved,
                    to: ShippingStatus::Approved,
                })
            });

        let res = TestClient::patch(format!("http://example.com/orders/{uuid}"))
            .json(&status_body("approved"))
            .send(&app.service(seller_actor(), route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_lost_race_returns_409() -> TestResult {
        let uuid = OrderUuid::new();
        let mut app = MockApp::new();

        app.orders
            .expect_transition_status()
            .once()
            .return_once(|_, _, _, _| Err(OrdersServiceError::Conflict));

        let res = TestClient::patch(format!("http://example.com/orders/{uuid}"))
            .json(&status_body("shipped"))
            .send(&app.service(seller_actor(), route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }

    #[tokio::test]
    async fn test_buyer_cancel_goes_through_cancel_order() -> TestResult {
        let uuid = OrderUuid::new();
        let mut app = MockApp::new();

        app.orders
            .expect_cancel_order()
            .once()
            .withf(move |tenant, actor, o| {
                *tenant == TEST_TENANT && *actor == buyer_actor() && *o == uuid
            })
            .return_once(move |_, _, _| Ok(make_order(uuid, ShippingStatus::Cancelled)));

        app.orders.expect_transition_status().never();

        let mut res = TestClient::patch(format!("http://example.com/orders/{uuid}"))
            .json(&status_body("cancelled"))
            .send(&app.service(buyer_actor(), route()))
            .await;

        let body: OrderResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.shipping.status, "cancelled");

        Ok(())
    }

    #[tokio::test]
    async fn test_buyer_cannot_cancel_approved_order() -> TestResult {
        let uuid = OrderUuid::new();
        let mut app = MockApp::new();

        app.orders
            .expect_cancel_order()
            .once()
            .return_once(|_, _, _| Err(OrdersServiceError::Forbidden));

        let res = TestClient::patch(format!("http://example.com/orders/{uuid}"))
            .json(&status_body("cancelled"))
            .send(&app.service(buyer_actor(), route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }

    #[tokio::test]
    async fn test_buyer_cannot_ship() -> TestResult {
        let uuid = OrderUuid::new();
        let mut app = MockApp::new();

        app.orders.expect_cancel_order().never();
        app.orders.expect_transition_status().never();

        let res = TestClient::patch(format!("http://example.com/orders/{uuid}"))
            .json(&status_body("shipped"))
            .send(&app.service(buyer_actor(), route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_status_returns_400() -> TestResult {
        let uuid = OrderUuid::new();

        let res = TestClient::patch(format!("http://example.com/orders/{uuid}"))
            .json(&status_body("lost"))
            .send(&MockApp::new().service(seller_actor(), route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
