//! Get Product Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bazaar_app::domain::products::records::{ProductRecord, ProductStatus};

use crate::{extensions::*, products::errors::into_status_error, state::State};

/// Product Response
///
/// Prices are minor units.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProductResponse {
    pub uuid: Uuid,
    pub seller_id: Uuid,
    pub title: String,
    pub description: String,
    pub base_price: u64,

    /// What buyers pay per unit
    pub unit_price: u64,
    pub available_stock: u64,
    pub sold_amount: u64,

    /// One of `public`, `hidden` or `deleted`
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ProductRecord> for ProductResponse {
    fn from(product: ProductRecord) -> Self {
        Self {
            uuid: product.uuid.into_uuid(),
            seller_id: product.seller_uuid.into_uuid(),
            title: product.title,
            description: product.description,
            base_price: product.base_price,
            unit_price: product.unit_price,
            available_stock: product.available_stock,
            sold_amount: product.sold_amount,
            status: product.status.to_string(),
            created_at: product.created_at.to_string(),
            updated_at: product.updated_at.to_string(),
        }
    }
}

pub(crate) fn parse_status(status: Option<&str>) -> Result<Option<ProductStatus>, StatusError> {
    status
        .map(str::parse::<ProductStatus>)
        .transpose()
        .map_err(|unknown| StatusError::bad_request().brief(unknown.to_string()))
}

/// Get Product Handler
#[endpoint(
    tags("products"),
    summary = "Get Product",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Product found"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    product: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<ProductResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;

    let product = state
        .app
        .products
        .get_product(principal.tenant, principal.actor, product.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(product.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use bazaar_app::domain::products::{ProductsServiceError, records::ProductUuid};

    use crate::test_helpers::{MockApp, TEST_TENANT, buyer_actor, make_product};

    use super::*;

    fn route() -> Router {
        Router::with_path("products/{product}").get(handler)
    }

    #[tokio::test]
    async fn test_get_product_success() -> TestResult {
        let uuid = ProductUuid::new();
        let mut app = MockApp::new();

        app.products
            .expect_get_product()
            .once()
            .withf(move |tenant, actor, product| {
                *tenant == TEST_TENANT && *actor == buyer_actor() && *product == uuid
            })
            .return_once(move |_, _, _| Ok(make_product(uuid)));

        let mut res = TestClient::get(format!("http://example.com/products/{uuid}"))
            .send(&app.service(buyer_actor(), route()))
            .await;

        let body: ProductResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.uuid, uuid.into_uuid());
        assert_eq!(body.unit_price, 1100);
        assert_eq!(body.status, "public");

        Ok(())
    }

    #[tokio::test]
    async fn test_get_hidden_product_as_buyer_returns_404() -> TestResult {
        let uuid = ProductUuid::new();
        let mut app = MockApp::new();

        app.products
            .expect_get_product()
            .once()
            .return_once(|_, _, _| Err(ProductsServiceError::NotFound));

        let res = TestClient::get(format!("http://example.com/products/{uuid}"))
            .send(&app.service(buyer_actor(), route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }

    #[tokio::test]
    async fn test_get_product_invalid_uuid_returns_400() -> TestResult {
        let res = TestClient::get("http://example.com/products/not-a-uuid")
            .send(&MockApp::new().service(buyer_actor(), route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
