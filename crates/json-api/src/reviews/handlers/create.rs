//! Create Review Handler

use std::sync::Arc;

use salvo::{
    http::header::LOCATION,
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bazaar_app::domain::reviews::{
    data::NewReview,
    records::{ReviewChange, ReviewUuid},
};

use crate::{
    extensions::*,
    reviews::{
        errors::into_status_error,
        index::{ReviewResponse, ReviewSummaryResponse},
    },
    state::State,
};

/// Create Review Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateReviewRequest {
    /// 1 to 5
    pub rating: u8,
    pub comment: String,
}

/// Review Change Response
///
/// The stored review and the product summary it produced.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReviewChangeResponse {
    pub review: ReviewResponse,
    pub summary: ReviewSummaryResponse,
}

impl From<ReviewChange> for ReviewChangeResponse {
    fn from(change: ReviewChange) -> Self {
        Self {
            review: change.review.into(),
            summary: change.summary.into(),
        }
    }
}

/// Create Review Handler
#[endpoint(
    tags("reviews"),
    summary = "Create Review",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Review created"),
        (status_code = StatusCode::FORBIDDEN, description = "No delivered order for this product"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::CONFLICT, description = "Product already reviewed by this user"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    product: PathParam<Uuid>,
    json: JsonBody<CreateReviewRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<ReviewChangeResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;
    let request = json.into_inner();
    let product = product.into_inner();

    let new_review = NewReview {
        uuid: ReviewUuid::new(),
        rating: request.rating,
        comment: request.comment,
    };

    let change = state
        .app
        .reviews
        .create_review(principal.tenant, principal.actor, product.into(), new_review)
        .await
        .map_err(into_status_error)?;

    res.add_header(
        LOCATION,
        format!("/products/{product}/reviews/{}", change.review.uuid),
        true,
    )
    .or_500("failed to set location header")?
    .status_code(StatusCode::CREATED);

    tracing::info!(
        product_uuid = %product,
        review_uuid = %change.review.uuid,
        average_rating = change.summary.average_rating,
        "created review"
    );

    Ok(Json(change.into()))
}
