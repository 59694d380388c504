//! Product Index Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{
    extensions::*,
    products::{errors::into_status_error, get::ProductResponse},
    state::State,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ProductsResponse {
    /// The list of products
    pub products: Vec<ProductResponse>,
}

/// Product Index Handler
///
/// Buyers only see public products.
#[endpoint(
    tags("products"),
    summary = "List Products",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<ProductsResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;

    let products = state
        .app
        .products
        .list_products(principal.tenant, principal.actor)
        .await
        .map_err(into_status_error)?;

    Ok(Json(ProductsResponse {
        products: products.into_iter().map(Into::into).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use bazaar_app::domain::products::{ProductsServiceError, records::ProductUuid};

    use crate::test_helpers::{MockApp, TEST_TENANT, make_product, seller_actor};

    use super::*;

    fn route() -> Router {
        Router::with_path("products").get(handler)
    }

    #[tokio::test]
    async fn test_index_returns_empty_list() -> TestResult {
        let mut app = MockApp::new();

        app.products
            .expect_list_products()
            .once()
            .withf(|tenant, _| *tenant == TEST_TENANT)
            .return_once(|_, _| Ok(vec![]));

        let response: ProductsResponse = TestClient::get("http://example.com/products")
            .send(&app.service(seller_actor(), route()))
            .await
            .take_json()
            .await?;

        assert!(response.products.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_index_returns_products_in_service_order() -> TestResult {
        let uuid_b = ProductUuid::new();
        let uuid_a = ProductUuid::new();

        let mut app = MockApp::new();

        app.products
            .expect_list_products()
            .once()
            .withf(|tenant, actor| *tenant == TEST_TENANT && *actor == seller_actor())
            .return_once(move |_, _| Ok(vec![make_product(uuid_a), make_product(uuid_b)]));

        let response: ProductsResponse = TestClient::get("http://example.com/products")
            .send(&app.service(seller_actor(), route()))
            .await
            .take_json()
            .await?;

        assert_eq!(response.products.len(), 2, "expected two products");
        assert_eq!(response.products[0].uuid, uuid_a.into_uuid());
        assert_eq!(response.products[1].uuid, uuid_b.into_uuid());

        Ok(())
    }

    #[tokio::test]
    async fn test_index_invalid_data_returns_400() -> TestResult {
        let mut app = MockApp::new();

        app.products
            .expect_list_products()
            .once()
            .return_once(|_, _| Err(ProductsServiceError::InvalidData));

        let res = TestClient::get("http://example.com/products")
            .send(&app.service(seller_actor(), route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
