//! Update Review Handler

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

use bazaar_app::domain::reviews::data::ReviewUpdate;

use crate::{
    extensions::*,
    reviews::{create::ReviewChangeResponse, errors::into_status_error},
    state::State,
};

/// Update Review Request
///
/// Omitted fields keep their current value.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateReviewRequest {
    pub rating: Option<u8>,
    pub comment: Option<String>,
}

/// Update Review Handler
#[endpoint(
    tags("reviews"),
    summary = "Update Review",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Review updated"),
        (status_code = StatusCode::FORBIDDEN, description = "Not the review's author"),
        (status_code = StatusCode::NOT_FOUND, description = "Product or review not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    product: PathParam<Uuid>,
    review: PathParam<Uuid>,
    json: JsonBody<UpdateReviewRequest>,
    depot: &mut Depot,
) -> Result<Json<ReviewChangeResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;
    let request = json.into_inner();

    let change = state
        .app
        .reviews
        .update_review(
            principal.tenant,
            principal.actor,
            product.into_inner().into(),
            review.into_inner().into(),
            ReviewUpdate {
                rating: request.rating,
                comment: request.comment,
            },
        )
        .await
        .map_err(into_status_error)?;

    tracing::info!(
        review_uuid = %change.review.uuid,
        average_rating = change.summary.average_rating,
        "updated review"
    );

    Ok(Json(change.into()))
}
