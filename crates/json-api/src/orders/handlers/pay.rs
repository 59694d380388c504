//! Order Payment Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, get::OrderResponse},
    state::State,
};

/// Order Payment Handler
///
/// Records a payment taken outside the marketplace. Administrators only; repeating it
/// changes nothing.
#[endpoint(
    tags("orders"),
    summary = "Mark Order Paid",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Order is paid"),
        (status_code = StatusCode::FORBIDDEN, description = "Administrators only"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
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
        .mark_paid(principal.tenant, principal.actor, order.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(order.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use bazaar_app::domain::orders::{records::OrderUuid, status::ShippingStatus};

    use crate::test_helpers::{MockApp, TEST_TENANT, admin_actor, make_order};

    use super::*;

    #[tokio::test]
    async fn test_mark_paid_returns_paid_order() -> TestResult {
        let uuid = OrderUuid::new();
        let mut app = MockApp::new();

        app.orders
            .expect_mark_paid()
            .once()
            .withf(move |tenant, actor, o| {
                *tenant == TEST_TENANT && *actor == admin_actor() && *o == uuid
            })
            .return_once(move |_, _, _| {
                let mut order = make_order(uuid, ShippingStatus::Pending);

                order.is_paid = true;

                Ok(order)
            });

        let mut res = TestClient::post(format!("http://example.com/orders/{uuid}/payment"))
            .send(&app.service(
                admin_actor(),
                Router::with_path("orders/{order}/payment").post(handler),
            ))
            .await;

        let body: OrderResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert!(body.is_paid, "order should be reported paid");

        Ok(())
    }
}
