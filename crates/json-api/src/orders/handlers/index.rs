//! Order Index Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{
    extensions::*,
    orders::{errors::into_status_error, get::OrderResponse},
    state::State,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrdersResponse {
    /// Newest first
    pub orders: Vec<OrderResponse>,
}

/// Order Index Handler
///
/// Lists the orders the caller can see.
#[endpoint(
    tags("orders"),
    summary = "List Orders",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<OrdersResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;

    let orders = state
        .app
        .orders
        .list_orders(principal.tenant, principal.actor)
        .await
        .map_err(into_status_error)?;

    Ok(Json(OrdersResponse {
        orders: orders.into_iter().map(Into::into).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use bazaar_app::domain::orders::{records::OrderUuid, status::ShippingStatus};

    use crate::test_helpers::{MockApp, TEST_TENANT, make_order, seller_actor};

    use super::*;

    #[tokio::test]
    async fn test_index_lists_orders_for_the_caller() -> TestResult {
        let newer = OrderUuid::new();
        let older = OrderUuid::new();

        let mut app = MockApp::new();

        app.orders
            .expect_list_orders()
            .once()
            .withf(|tenant, actor| *tenant == TEST_TENANT && *actor == seller_actor())
            .return_once(move |_, _| {
                Ok(vec![
                    make_order(newer, ShippingStatus::Pending),
                    make_order(older, ShippingStatus::Delivered),
                ])
            });

        let response: OrdersResponse = TestClient::get("http://example.com/orders")
            .send(&app.service(seller_actor(), Router::with_path("orders").get(handler)))
            .await
            .take_json()
            .await?;

        assert_eq!(response.orders.len(), 2, "expected two orders");
        assert_eq!(response.orders[0].uuid, newer.into_uuid());
        assert_eq!(response.orders[1].shipping.status, "delivered");

        Ok(())
    }
}
