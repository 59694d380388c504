//! Restock Product Handler

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

use crate::{
    extensions::*,
    products::{errors::inventory_status_error, get::ProductResponse},
    state::State,
};

/// Restock Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RestockRequest {
    /// Units put back on the shelf
    pub quantity: u32,
}

/// Restock Product Handler
#[endpoint(
    tags("products"),
    summary = "Restock Product",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Stock added"),
        (status_code = StatusCode::FORBIDDEN, description = "Not the product's seller"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    product: PathParam<Uuid>,
    json: JsonBody<RestockRequest>,
    depot: &mut Depot,
) -> Result<Json<ProductResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;

    let product = state
        .app
        .inventory
        .restock(
            principal.tenant,
            principal.actor,
            product.into_inner().into(),
            json.into_inner().quantity,
        )
        .await
        .map_err(inventory_status_error)?;

    Ok(Json(product.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use bazaar_app::domain::{inventory::InventoryServiceError, products::records::ProductUuid};

    use crate::test_helpers::{MockApp, TEST_TENANT, make_product, seller_actor};

    use super::*;

    fn route() -> Router {
        Router::with_path("products/{product}/stock").post(handler)
    }

    #[tokio::test]
    async fn test_restock_returns_new_stock() -> TestResult {
        let uuid = ProductUuid::new();
        let mut app = MockApp::new();

        app.inventory
            .expect_restock()
            .once()
            .withf(move |tenant, actor, product, quantity| {
                *tenant == TEST_TENANT
                    && *actor == seller_actor()
                    && *product == uuid
                    && *quantity == 3
            })
            .return_once(move |_, _, _, _| {
                let mut product = make_product(uuid);

                product.available_stock = 8;

                Ok(product)
            });

        let mut res = TestClient::post(format!("http://example.com/products/{uuid}/stock"))
            .json(&json!({ "quantity": 3 }))
            .send(&app.service(seller_actor(), route()))
            .await;

        let body: ProductResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.available_stock, 8);

        Ok(())
    }

    #[tokio::test]
    async fn test_restock_zero_returns_400() -> TestResult {
        let uuid = ProductUuid::new();
        let mut app = MockApp::new();

        app.inventory
            .expect_restock()
            .once()
            .return_once(|_, _, _, _| Err(InventoryServiceError::InvalidQuantity));

        let res = TestClient::post(format!("http://example.com/products/{uuid}/stock"))
            .json(&json!({ "quantity": 0 }))
            .send(&app.service(seller_actor(), route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
