//! App Router

use salvo::Router;

use crate::{addresses, auth, notifications, orders, products, reviews};

/// Every route that needs a bearer token.
pub(crate) fn app_router() -> Router {
    Router::new()
        .hoop(auth::middleware::handler)
        .push(
            Router::with_path("orders")
                .get(orders::index::handler)
                .post(orders::create::handler)
                .push(Router::with_path("revenue").get(orders::revenue::handler))
                .push(
                    Router::with_path("{order}")
                        .get(orders::get::handler)
                        .patch(orders::update::handler)
                        .delete(orders::delete::handler)
                        .push(Router::with_path("payment").post(orders::pay::handler)),
                ),
        )
        .push(
            Router::with_path("products")
                .get(products::index::handler)
                .post(products::create::handler)
                .push(
                    Router::with_path("{product}")
                        .get(products::get::handler)
                        .put(products::update::handler)
                        .delete(products::delete::handler)
                        .push(Router::with_path("stock").post(products::restock::handler))
                        .push(
                            Router::with_path("reviews")
                                .get(reviews::index::handler)
                                .post(reviews::create::handler)
                                .push(
                                    Router::with_path("{review}")
                                        .put(reviews::update::handler)
                                        .delete(reviews::delete::handler),
                                ),
                        ),
                ),
        )
        .push(
            Router::with_path("addresses")
                .post(addresses::create::handler)
                .push(Router::with_path("{address}").get(addresses::get::handler)),
        )
        .push(
            Router::with_path("notifications")
                .get(notifications::index::handler)
                .push(
                    Router::with_path("{notification}/opened")
                        .post(notifications::opened::handler),
                ),
        )
}

#[cfg(test)]
mod tests {
    use bazaar_app::auth::MockAuthService;
    use salvo::{
        affix_state::inject,
        prelude::*,
        test::TestClient,
    };
    use testresult::TestResult;

    use crate::test_helpers::state_with_auth;

    use super::*;

    #[tokio::test]
    async fn test_every_resource_requires_a_token() -> TestResult {
        let mut auth = MockAuthService::new();

        auth.expect_authenticate_bearer().never();

        let service = Service::new(
            Router::new()
                .hoop(inject(state_with_auth(auth)))
                .push(app_router()),
        );

        for path in [
            "orders",
            "orders/revenue",
            "products",
            "products/0192f1c4-7a4e-7c3b-9a0e-3f2d1c0b9a88/reviews",
            "notifications",
        ] {
            let res = TestClient::get(format!("http://example.com/{path}"))
                .send(&service)
                .await;

            assert_eq!(
                res.status_code,
                Some(StatusCode::UNAUTHORIZED),
                "{path} should require a bearer token"
            );
        }

        Ok(())
    }
}
