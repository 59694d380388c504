//! Review Records

use jiff::Timestamp;

use crate::{
    domain::{products::records::ProductUuid, users::records::UserUuid},
    uuids::TypedUuid,
};

/// Review UUID
pub type ReviewUuid = TypedUuid<ReviewRecord>;

/// Review Record
///
/// `author_name` is masked before it leaves the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRecord {
    pub uuid: ReviewUuid,
    pub product_uuid: ProductUuid,
    pub author_uuid: UserUuid,
    pub author_name: String,
    pub rating: u8,
    pub comment: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Review Summary Record
///
/// Per-product aggregate, rewritten with every review change.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewSummary {
    pub product_uuid: ProductUuid,
    pub review_count: u64,

    /// Mean rating rounded to two decimals; `0.0` without reviews.
    pub average_rating: f64,

    /// The most recent reviews, newest first.
    pub recent_review_uuids: Vec<ReviewUuid>,
}

impl ReviewSummary {
    /// The summary of a product nobody has reviewed yet.
    #[must_use]
    pub const fn empty(product_uuid: ProductUuid) -> Self {
        Self {
            product_uuid,
            review_count: 0,
            average_rating: 0.0,
            recent_review_uuids: Vec::new(),
        }
    }
}

/// One page of a product's reviews, newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewPage {
    pub summary: ReviewSummary,
    pub reviews: Vec<ReviewRecord>,
}

/// A stored review together with the summary it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewChange {
    pub review: ReviewRecord,
    pub summary: ReviewSummary,
}
