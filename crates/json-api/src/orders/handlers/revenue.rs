//! Revenue Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{extensions::*, orders::errors::into_status_error, state::State};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RevenueResponse {
    /// Sum of order totals in minor units, cancelled and refunded orders excluded
    pub total_revenue: u64,
}

/// Revenue Handler
#[endpoint(
    tags("orders"),
    summary = "Total Revenue",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Revenue"),
        (status_code = StatusCode::FORBIDDEN, description = "Administrators only"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<RevenueResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;

    let total_revenue = state
        .app
        .orders
        .total_revenue(principal.tenant, principal.actor)
        .await
        .map_err(into_status_error)?;

    Ok(Json(RevenueResponse { total_revenue }))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use bazaar_app::domain::orders::OrdersServiceError;

    use crate::test_helpers::{MockApp, TEST_TENANT, admin_actor, buyer_actor};

    use super::*;

    fn route() -> Router {
        Router::with_path("orders/revenue").get(handler)
    }

    #[tokio::test]
    async fn test_revenue_for_admin() -> TestResult {
        let mut app = MockApp::new();

        app.orders
            .expect_total_revenue()
            .once()
            .withf(|tenant, actor| *tenant == TEST_TENANT && *actor == admin_actor())
            .return_once(|_, _| Ok(12_345));

        let response: RevenueResponse = TestClient::get("http://example.com/orders/revenue")
            .send(&app.service(admin_actor(), route()))
            .await
            .take_json()
            .await?;

        assert_eq!(response.total_revenue, 12_345);

        Ok(())
    }

    #[tokio::test]
    async fn test_revenue_for_buyer_returns_403() -> TestResult {
        let mut app = MockApp::new();

        app.orders
            .expect_total_revenue()
            .once()
            .return_once(|_, _| Err(OrdersServiceError::Forbidden));

        let res = TestClient::get("http://example.com/orders/revenue")
            .send(&app.service(buyer_actor(), route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }
}
