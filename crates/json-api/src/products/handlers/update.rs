//! Update Product Handler

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

use bazaar_app::domain::products::data::ProductUpdate;

use crate::{
    extensions::*,
    products::{
        errors::into_status_error,
        get::{ProductResponse, parse_status},
    },
    state::State,
};

/// Update Product Request
///
/// Omitted fields keep their current value.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateProductRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub base_price: Option<u64>,
    pub status: Option<String>,
}

/// Product Update Handler
#[endpoint(
    tags("products"),
    summary = "Update Product",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Product updated"),
        (status_code = StatusCode::FORBIDDEN, description = "Not the product's seller"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "products.update",
    skip(product, json, depot),
    fields(
        tenant_uuid = tracing::field::Empty,
        product_uuid = tracing::field::Empty,
        base_price = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    product: PathParam<Uuid>,
    json: JsonBody<UpdateProductRequest>,
    depot: &mut Depot,
) -> Result<Json<ProductResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;
    let request = json.into_inner();
    let product = product.into_inner();

    let span = tracing::Span::current();

    span.record("tenant_uuid", tracing::field::display(principal.tenant));
    span.record("product_uuid", tracing::field::display(product));

    if let Some(base_price) = request.base_price {
        span.record("base_price", base_price);
    }

    let update = ProductUpdate {
        status: parse_status(request.status.as_deref())?,
        title: request.title,
        description: request.description,
        base_price: request.base_price,
    };

    let product = state
        .app
        .products
        .update_product(principal.tenant, principal.actor, product.into(), update)
        .await
        .map_err(into_status_error)?;

    tracing::info!(product_uuid = %product.uuid, unit_price = product.unit_price, "updated product");

    Ok(Json(product.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use bazaar_app::domain::products::{
        ProductsServiceError,
        records::{ProductStatus, ProductUuid},
    };

    use crate::test_helpers::{MockApp, TEST_TENANT, make_product, seller_actor};

    use super::*;

    fn route() -> Router {
        Router::with_path("products/{product}").put(handler)
    }

    #[tokio::test]
    async fn test_update_product_success() -> TestResult {
        let uuid = ProductUuid::new();
        let mut app = MockApp::new();

        app.products
            .expect_update_product()
            .once()
            .withf(move |tenant, actor, u, update| {
                *tenant == TEST_TENANT
                    && *actor == seller_actor()
                    && *u == uuid
                    && *update
                        == ProductUpdate {
                            base_price: Some(2000),
                            status: Some(ProductStatus::Hidden),
                            ..ProductUpdate::default()
                        }
            })
            .return_once(move |_, _, _, _| {
                let mut product = make_product(uuid);

                product.base_price = 2000;
                product.unit_price = 2200;
                product.status = ProductStatus::Hidden;

                Ok(product)
            });

        let mut res = TestClient::put(format!("http://example.com/products/{uuid}"))
            .json(&json!({ "basePrice": 2000, "status": "hidden" }))
            .send(&app.service(seller_actor(), route()))
            .await;

        let body: ProductResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.unit_price, 2200);
        assert_eq!(body.status, "hidden");

        Ok(())
    }

    #[tokio::test]
    async fn test_update_product_invalid_uuid_returns_400() -> TestResult {
        let res = TestClient::put("http://example.com/products/123")
            .json(&json!({}))
            .send(&MockApp::new().service(seller_actor(), route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_someone_elses_product_returns_403() -> TestResult {
        let uuid = ProductUuid::new();
        let mut app = MockApp::new();

        app.products
            .expect_update_product()
            .once()
            .return_once(|_, _, _, _| Err(ProductsServiceError::Forbidden));

        let res = TestClient::put(format!("http://example.com/products/{uuid}"))
            .json(&json!({ "title": "Kettle" }))
            .send(&app.service(seller_actor(), route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }
}
