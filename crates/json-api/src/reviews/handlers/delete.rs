//! Delete Review Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    reviews::{errors::into_status_error, index::ReviewSummaryResponse},
    state::State,
};

/// Delete Review Handler
///
/// Responds with the product's recounted summary.
#[endpoint(
    tags("reviews"),
    summary = "Delete Review",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Review deleted"),
        (status_code = StatusCode::FORBIDDEN, description = "Not the review's author"),
        (status_code = StatusCode::NOT_FOUND, description = "Product or review not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    product: PathParam<Uuid>,
    review: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<ReviewSummaryResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;

    let summary = state
        .app
        .reviews
        .delete_review(
            principal.tenant,
            principal.actor,
            product.into_inner().into(),
            review.into_inner().into(),
        )
        .await
        .map_err(into_status_error)?;

    Ok(Json(summary.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use bazaar_app::domain::{
        products::records::ProductUuid,
        reviews::{
            ReviewsServiceError,
            records::{ReviewSummary, ReviewUuid},
        },
    };

    use crate::test_helpers::{MockApp, TEST_TENANT, admin_actor};

    use super::*;

    fn route() -> Router {
        Router::with_path("products/{product}/reviews/{review}").delete(handler)
    }

    #[tokio::test]
    async fn test_deleting_the_last_review_returns_an_empty_summary() -> TestResult {
        let product = ProductUuid::new();
        let review = ReviewUuid::new();
        let mut app = MockApp::new();

        app.reviews
            .expect_delete_review()
            .once()
            .withf(move |tenant, actor, p, r| {
                *tenant == TEST_TENANT && *actor == admin_actor() && *p == product && *r == review
            })
            .return_once(move |_, _, _, _| Ok(ReviewSummary::empty(product)));

        let mut res = TestClient::delete(format!(
            "http://example.com/products/{product}/reviews/{review}"
        ))
        .send(&app.service(admin_actor(), route()))
        .await;

        let body: ReviewSummaryResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.review_count, 0);
        assert!(body.average_rating.abs() < f64::EPSILON);
        assert!(body.recent_review_ids.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_missing_review_returns_404() -> TestResult {
        let product = ProductUuid::new();
        let review = ReviewUuid::new();
        let mut app = MockApp::new();

        app.reviews
            .expect_delete_review()
            .once()
            .return_once(|_, _, _, _| Err(ReviewsServiceError::NotFound));

        let res = TestClient::delete(format!(
            "http://example.com/products/{product}/reviews/{review}"
        ))
        .send(&app.service(admin_actor(), route()))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
