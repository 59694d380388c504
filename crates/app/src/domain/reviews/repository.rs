//! Reviews Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};
use uuid::Uuid;

use crate::{
    database::decode_u64,
    domain::{
        products::records::ProductUuid,
        reviews::{
            data::NewReview,
            records::{ReviewRecord, ReviewSummary, ReviewUuid},
        },
        users::records::UserUuid,
    },
};

const LIST_REVIEWS_SQL: &str = include_str!("sql/list_reviews.sql");
const FIND_REVIEW_SQL: &str = include_str!("sql/find_review.sql");
const CREATE_REVIEW_SQL: &str = include_str!("sql/create_review.sql");
const UPDATE_REVIEW_SQL: &str = include_str!("sql/update_review.sql");
const DELETE_REVIEW_SQL: &str = include_str!("sql/delete_review.sql");
const FIND_SUMMARY_SQL: &str = include_str!("sql/find_summary.sql");
const LOCK_SUMMARY_SQL: &str = include_str!("sql/lock_summary.sql");
const REFRESH_SUMMARY_SQL: &str = include_str!("sql/refresh_summary.sql");
const HAS_DELIVERED_PURCHASE_SQL: &str = include_str!("sql/has_delivered_purchase.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgReviewsRepository;

impl PgReviewsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_reviews(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<ReviewRecord>, sqlx::Error> {
        query_as::<Postgres, ReviewRecord>(LIST_REVIEWS_SQL)
            .bind(product.into_uuid())
            .bind(i64::from(limit))
            .bind(i64::try_from(offset).unwrap_or(i64::MAX))
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn find_review(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        review: ReviewUuid,
    ) -> Result<Option<ReviewRecord>, sqlx::Error> {
        query_as::<Postgres, ReviewRecord>(FIND_REVIEW_SQL)
            .bind(review.into_uuid())
            .bind(product.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn create_review(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        author: UserUuid,
        review: &NewReview,
    ) -> Result<ReviewRecord, sqlx::Error> {
        query_as::<Postgres, ReviewRecord>(CREATE_REVIEW_SQL)
            .bind(review.uuid.into_uuid())
            .bind(product.into_uuid())
            .bind(author.into_uuid())
            .bind(i16::from(review.rating))
            .bind(&review.comment)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_review(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        review: ReviewUuid,
        rating: u8,
        comment: &str,
    ) -> Result<ReviewRecord, sqlx::Error> {
        query_as::<Postgres, ReviewRecord>(UPDATE_REVIEW_SQL)
            .bind(review.into_uuid())
            .bind(product.into_uuid())
            .bind(i16::from(rating))
            .bind(comment)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn delete_review(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        review: ReviewUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_REVIEW_SQL)
            .bind(review.into_uuid())
            .bind(product.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn find_summary(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<Option<ReviewSummary>, sqlx::Error> {
        query_as::<Postgres, ReviewSummary>(FIND_SUMMARY_SQL)
            .bind(product.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    /// Row-lock the product's summary, creating it if needed. Every review write takes
    /// this lock before touching `reviews`.
    pub(crate) async fn lock_summary(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<ReviewSummary, sqlx::Error> {
        query_as::<Postgres, ReviewSummary>(LOCK_SUMMARY_SQL)
            .bind(product.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Recount the summary from the product's reviews.
    pub(crate) async fn refresh_summary(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        recent: u32,
    ) -> Result<ReviewSummary, sqlx::Error> {
        query_as::<Postgres, ReviewSummary>(REFRESH_SUMMARY_SQL)
            .bind(product.into_uuid())
            .bind(i64::from(recent))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn has_delivered_purchase(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        buyer: UserUuid,
        product: ProductUuid,
    ) -> Result<bool, sqlx::Error> {
        query_scalar::<Postgres, bool>(HAS_DELIVERED_PURCHASE_SQL)
            .bind(buyer.into_uuid())
            .bind(product.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for ReviewRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let rating: i16 = row.try_get("rating")?;

        Ok(Self {
            uuid: ReviewUuid::from_uuid(row.try_get("uuid")?),
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            author_uuid: UserUuid::from_uuid(row.try_get("author_uuid")?),
            author_name: row.try_get("author_name")?,
            rating: u8::try_from(rating).map_err(|error| sqlx::Error::ColumnDecode {
                index: "rating".to_string(),
                source: Box::new(error),
            })?,
            comment: row.try_get("comment")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for ReviewSummary {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let recent: Vec<Uuid> = row.try_get("recent_review_uuids")?;

        Ok(Self {
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            review_count: decode_u64(row.try_get("review_count")?, "review_count")?,
            average_rating: row.try_get("average_rating")?,
            recent_review_uuids: recent.into_iter().map(ReviewUuid::from_uuid).collect(),
        })
    }
}
