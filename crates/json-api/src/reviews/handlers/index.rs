//! List Reviews Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{PathParam, QueryParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bazaar_app::domain::reviews::records::{ReviewPage, ReviewRecord, ReviewSummary};

use crate::{extensions::*, reviews::errors::into_status_error, state::State};

/// Review Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReviewResponse {
    pub uuid: Uuid,
    pub product_id: Uuid,
    pub author_id: Uuid,

    /// First characters of the author's name, the rest starred out
    pub author_name: String,
    pub rating: u8,
    pub comment: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ReviewRecord> for ReviewResponse {
    fn from(review: ReviewRecord) -> Self {
        Self {
            uuid: review.uuid.into_uuid(),
            product_id: review.product_uuid.into_uuid(),
            author_id: review.author_uuid.into_uuid(),
            author_name: review.author_name,
            rating: review.rating,
            comment: review.comment,
            created_at: review.created_at.to_string(),
            updated_at: review.updated_at.to_string(),
        }
    }
}

/// Review Summary Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReviewSummaryResponse {
    pub review_count: u64,

    /// Rounded to two decimals; `0` without reviews
    pub average_rating: f64,

    /// Newest first
    pub recent_review_ids: Vec<Uuid>,
}

impl From<ReviewSummary> for ReviewSummaryResponse {
    fn from(summary: ReviewSummary) -> Self {
        Self {
            review_count: summary.review_count,
            average_rating: summary.average_rating,
            recent_review_ids: summary
                .recent_review_uuids
                .into_iter()
                .map(|uuid| uuid.into_uuid())
                .collect(),
        }
    }
}

/// Review Page Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReviewPageResponse {
    pub summary: ReviewSummaryResponse,
    pub reviews: Vec<ReviewResponse>,
}

impl From<ReviewPage> for ReviewPageResponse {
    fn from(page: ReviewPage) -> Self {
        Self {
            summary: page.summary.into(),
            reviews: page.reviews.into_iter().map(Into::into).collect(),
        }
    }
}

/// List Reviews Handler
///
/// Ten reviews per page, newest first. `page` starts at zero.
#[endpoint(
    tags("reviews"),
    summary = "List Reviews",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Review page"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    product: PathParam<Uuid>,
    page: QueryParam<u32, false>,
    depot: &mut Depot,
) -> Result<Json<ReviewPageResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;

    let page = state
        .app
        .reviews
        .list_reviews(
            principal.tenant,
            principal.actor,
            product.into_inner().into(),
            page.into_inner().unwrap_or_default(),
        )
        .await
        .map_err(into_status_error)?;

    Ok(Json(page.into()))
}
