//! Reviews service.

use async_trait::async_trait;
use mockall::automock;
use sqlx::{Postgres, Transaction};

use crate::{
    database::Db,
    domain::{
        products::{
            records::{ProductRecord, ProductUuid},
            repository::PgProductsRepository,
        },
        reviews::{
            data::{
                NewReview, PAGE_SIZE, RECENT_REVIEWS, ReviewUpdate, mask_name, valid_comment,
                valid_rating,
            },
            errors::ReviewsServiceError,
            records::{ReviewChange, ReviewPage, ReviewRecord, ReviewSummary, ReviewUuid},
            repository::PgReviewsRepository,
        },
        tenants::records::TenantUuid,
        users::records::Actor,
    },
};

#[derive(Debug, Clone)]
pub struct PgReviewsService {
    db: Db,
    repository: PgReviewsRepository,
    products: PgProductsRepository,
}

impl PgReviewsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgReviewsRepository::new(),
            products: PgProductsRepository::new(),
        }
    }

    async fn visible_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        actor: Actor,
        product: ProductUuid,
    ) -> Result<ProductRecord, ReviewsServiceError> {
        self.products
            .find_product(tx, product)
            .await?
            .filter(|current| current.visible_to(actor))
            .ok_or(ReviewsServiceError::ProductNotFound)
    }

    /// Lock the summary, then load a review the actor is allowed to change.
    async fn owned_review(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        actor: Actor,
        product: ProductUuid,
        review: ReviewUuid,
    ) -> Result<ReviewRecord, ReviewsServiceError> {
        self.visible_product(tx, actor, product).await?;

        self.repository.lock_summary(tx, product).await?;

        let current = self
            .repository
            .find_review(tx, product, review)
            .await?
            .ok_or(ReviewsServiceError::NotFound)?;

        if !actor.is_admin() && current.author_uuid != actor.uuid {
            return Err(ReviewsServiceError::Forbidden);
        }

        Ok(current)
    }
}

fn masked(review: ReviewRecord) -> ReviewRecord {
    ReviewRecord {
        author_name: mask_name(&review.author_name),
        ..review
    }
}

#[async_trait]
impl ReviewsService for PgReviewsService {
    async fn list_reviews(
        &self,
        tenant: TenantUuid,
        actor: Actor,
        product: ProductUuid,
        page: u32,
    ) -> Result<ReviewPage, ReviewsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        self.visible_product(&mut tx, actor, product).await?;

        let summary = self
            .repository
            .find_summary(&mut tx, product)
            .await?
            .unwrap_or_else(|| ReviewSummary::empty(product));

        let reviews = self
            .repository
            .list_reviews(
                &mut tx,
                product,
                PAGE_SIZE,
                u64::from(page) * u64::from(PAGE_SIZE),
            )
            .await?;

        tx.commit().await?;

        Ok(ReviewPage {
            summary,
            reviews: reviews.into_iter().map(masked).collect(),
        })
    }

    async fn create_review(
        &self,
        tenant: TenantUuid,
        actor: Actor,
        product: ProductUuid,
        review: NewReview,
    ) -> Result<ReviewChange, ReviewsServiceError> {
        if !valid_rating(review.rating) || !valid_comment(&review.comment) {
            return Err(ReviewsServiceError::InvalidData);
        }

        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let current = self.visible_product(&mut tx, actor, product).await?;

        if !current.is_orderable() {
            return Err(ReviewsServiceError::ProductNotFound);
        }

        if !actor.is_admin()
            && !self
                .repository
                .has_delivered_purchase(&mut tx, actor.uuid, product)
                .await?
        {
            return Err(ReviewsServiceError::NotEligible);
        }

        self.repository.lock_summary(&mut tx, product).await?;

        let created = self
            .repository
            .create_review(&mut tx, product, actor.uuid, &review)
            .await?;

        let summary = self
            .repository
            .refresh_summary(&mut tx, product, RECENT_REVIEWS)
            .await?;

        tx.commit().await?;

        Ok(ReviewChange {
            review: masked(created),
            summary,
        })
    }

    async fn update_review(
        &self,
        tenant: TenantUuid,
        actor: Actor,
        product: ProductUuid,
        review: ReviewUuid,
        update: ReviewUpdate,
    ) -> Result<ReviewChange, ReviewsServiceError> {
        if update.rating.is_some_and(|rating| !valid_rating(rating))
            || update
                .comment
                .as_deref()
                .is_some_and(|comment| !valid_comment(comment))
        {
            return Err(ReviewsServiceError::InvalidData);
        }

        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let current = self.owned_review(&mut tx, actor, product, review).await?;

        let updated = self
            .repository
            .update_review(
                &mut tx,
                product,
                review,
                update.rating.unwrap_or(current.rating),
                update.comment.as_deref().unwrap_or(&current.comment),
            )
            .await?;

        let summary = self
            .repository
            .refresh_summary(&mut tx, product, RECENT_REVIEWS)
            .await?;

        tx.commit().await?;

        Ok(ReviewChange {
            review: masked(updated),
            summary,
        })
    }

    async fn delete_review(
        &self,
        tenant: TenantUuid,
        actor: Actor,
        product: ProductUuid,
        review: ReviewUuid,
    ) -> Result<ReviewSummary, ReviewsServiceError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        self.owned_review(&mut tx, actor, product, review).await?;

        let rows_affected = self
            .repository
            .delete_review(&mut tx, product, review)
            .await?;

        if rows_affected == 0 {
            return Err(ReviewsServiceError::NotFound);
        }

        let summary = self
            .repository
            .refresh_summary(&mut tx, product, RECENT_REVIEWS)
            .await?;

        tx.commit().await?;

        Ok(summary)
    }
}

/// Product reviews and their per-product aggregate.
///
/// Every write recounts the product's summary in the same transaction.
#[automock]
#[async_trait]
pub trait ReviewsService: Send + Sync {
    /// One page of reviews, newest first, with the product's summary. Author names are
    /// masked.
    async fn list_reviews(
        &self,
        tenant: TenantUuid,
        actor: Actor,
        product: ProductUuid,
        page: u32,
    ) -> Result<ReviewPage, ReviewsServiceError>;

    /// Review a public product. Buyers need a delivered order containing it; each user
    /// reviews a product once.
    async fn create_review(
        &self,
        tenant: TenantUuid,
        actor: Actor,
        product: ProductUuid,
        review: NewReview,
    ) -> Result<ReviewChange, ReviewsServiceError>;

    async fn update_review(
        &self,
        tenant: TenantUuid,
        actor: Actor,
        product: ProductUuid,
        review: ReviewUuid,
        update: ReviewUpdate,
    ) -> Result<ReviewChange, ReviewsServiceError>;

    /// Remove a review. The summary drops back to zero once the last one is gone.
    async fn delete_review(
        &self,
        tenant: TenantUuid,
        actor: Actor,
        product: ProductUuid,
        review: ReviewUuid,
    ) -> Result<ReviewSummary, ReviewsServiceError>;
}
