//! Order workflow engine.
//!
//! Each operation is one unit of work, attempted again from scratch when it loses a
//! race (a failed status compare-and-set, a clashing tracking code or a transient
//! storage conflict). Attempts that keep losing surface as
//! [`OrdersServiceError::Conflict`].

use async_trait::async_trait;
use tracing::{Span, info};

use crate::{
    domain::{
        inventory::records::StockCut,
        orders::{
            data::{NewOrder, OrderDraft, OrderFilter},
            errors::OrdersServiceError,
            messages,
            records::{OrderLineRecord, OrderRecord, OrderUuid, PaymentMethod, order_total},
            service::OrdersService,
            status::ShippingStatus,
            store::{OrderStore, OrderUnitOfWork},
            tracking::TrackingCode,
        },
        products::records::ProductRecord,
        tenants::records::TenantUuid,
        users::records::{Actor, UserRecord, UserRole},
    },
    outbox::SideEffect,
    retry::{RetryOutcome, RetryPolicy, retry},
};

/// Order Workflow
///
/// Runs each order operation as one unit of work over `S`, retrying the whole unit when
/// it loses a concurrency race.
#[derive(Debug, Clone)]
pub struct OrderWorkflow<S> {
    store: S,
    retry_policy: RetryPolicy,
}

impl<S: OrderStore> OrderWorkflow<S> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            retry_policy: RetryPolicy::default(),
        }
    }

    /// Replace the default retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    async fn create_once(
        &self,
        tenant: TenantUuid,
        actor: Actor,
        order: &NewOrder,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut work = self.store.begin(tenant).await?;

        let buyer = work
            .find_user(actor.uuid)
            .await?
            .ok_or(OrdersServiceError::UserNotFound)?;

        let address = work
            .find_address(order.address)
            .await?
            .filter(|address| address.user_uuid == buyer.uuid)
            .ok_or(OrdersServiceError::AddressNotFound)?;

        let mut lines = Vec::with_capacity(order.lines.len());

        for line in &order.lines {
            let product = work
                .find_product(line.product)
                .await?
                .filter(ProductRecord::is_orderable)
                .ok_or(OrdersServiceError::ProductNotFound(line.product))?;

            lines.push(OrderLineRecord {
                product_uuid: product.uuid,
                seller_uuid: product.seller_uuid,
                title: product.title,
                quantity: line.quantity,
                item_price: product.unit_price,
            });
        }

        let total_price =
            order_total(&lines).ok_or(OrdersServiceError::InvalidArgument("order total is too large"))?;

        let draft = OrderDraft {
            uuid: order.uuid,
            tracking_code: TrackingCode::random(),
            buyer_uuid: buyer.uuid,
            lines,
            payment_method: order.payment_method,
            total_price,
            is_paid: order.payment_authorized
                && order.payment_method == PaymentMethod::CreditCard,
            address_uuid: address.uuid,
        };

        work.insert_order(&draft).await?;

        let created = work
            .find_order(draft.uuid)
            .await?
            .ok_or(OrdersServiceError::NotFound)?;

        for seller in created.sellers() {
            work.enqueue(SideEffect::Notification(messages::new_order_notification(
                &created, seller,
            )))
            .await?;
        }

        if created.is_paid {
            enqueue_paid_emails(&mut work, &created, &buyer).await?;
        }

        work.commit().await?;

        Ok(created)
    }

    async fn transition_once(
        &self,
        tenant: TenantUuid,
        actor: Actor,
        order: OrderUuid,
        next: ShippingStatus,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut work = self.store.begin(tenant).await?;

        let current = work
            .find_order(order)
            .await?
            .ok_or(OrdersServiceError::NotFound)?;

        if !actor.is_admin() && !current.involves_seller(actor.uuid) {
            return Err(OrdersServiceError::Forbidden);
        }

        let from = current.shipping.status;

        if !from.can_transition_to(next) {
            return Err(OrdersServiceError::IllegalTransition { from, to: next });
        }

        if !work.compare_and_set_status(order, from, next).await? {
            return Err(OrdersServiceError::Conflict);
        }

        if next == ShippingStatus::Approved {
            cut_stock(&mut work, &current).await?;
        }

        let updated = work
            .find_order(order)
            .await?
            .ok_or(OrdersServiceError::NotFound)?;

        let buyer = work
            .find_user(updated.buyer_uuid)
            .await?
            .ok_or(OrdersServiceError::UserNotFound)?;

        let address = work
            .find_address(updated.shipping.address_uuid)
            .await?
            .ok_or(OrdersServiceError::AddressNotFound)?;

        if let Some(email) = messages::status_changed(&updated, &buyer, &address) {
            work.enqueue(SideEffect::Email(email)).await?;
        }

        work.commit().await?;

        Ok(updated)
    }

    async fn cancel_once(
        &self,
        tenant: TenantUuid,
        actor: Actor,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut work = self.store.begin(tenant).await?;

        let current = work
            .find_order(order)
            .await?
            .filter(|current| current.buyer_uuid == actor.uuid)
            .ok_or(OrdersServiceError::NotFound)?;

        if current.shipping.status != ShippingStatus::Pending {
            return Err(OrdersServiceError::Forbidden);
        }

        if !work
            .compare_and_set_status(order, ShippingStatus::Pending, ShippingStatus::Cancelled)
            .await?
        {
            return Err(OrdersServiceError::Conflict);
        }

        let cancelled = work
            .find_order(order)
            .await?
            .ok_or(OrdersServiceError::NotFound)?;

        for seller_uuid in cancelled.sellers() {
            let seller = work
                .find_user(seller_uuid)
                .await?
                .ok_or(OrdersServiceError::UserNotFound)?;

            work.enqueue(SideEffect::Email(messages::cancelled_by_buyer(
                &cancelled, &seller,
            )))
            .await?;
        }

        work.commit().await?;

        Ok(cancelled)
    }

    async fn mark_paid_once(
        &self,
        tenant: TenantUuid,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut work = self.store.begin(tenant).await?;

        let current = work
            .find_order(order)
            .await?
            .ok_or(OrdersServiceError::NotFound)?;

        if current.is_paid {
            work.commit().await?;

            return Ok(current);
        }

        if !work.mark_paid(order).await? {
            return Err(OrdersServiceError::Conflict);
        }

        let paid = work
            .find_order(order)
            .await?
            .ok_or(OrdersServiceError::NotFound)?;

        let buyer = work
            .find_user(paid.buyer_uuid)
            .await?
            .ok_or(OrdersServiceError::UserNotFound)?;

        enqueue_paid_emails(&mut work, &paid, &buyer).await?;

        work.commit().await?;

        Ok(paid)
    }
}

/// Cut stock for every line, in product order so concurrent approvals touching the same
/// products lock them in the same order. The first short line aborts the unit of work.
async fn cut_stock<W: OrderUnitOfWork>(
    work: &mut W,
    order: &OrderRecord,
) -> Result<(), OrdersServiceError> {
    let mut lines: Vec<&OrderLineRecord> = order.lines.iter().collect();

    lines.sort_by_key(|line| line.product_uuid);

    for line in lines {
        match work.try_cut_stock(line.product_uuid, line.quantity).await? {
            StockCut::Applied { .. } => {}
            StockCut::Insufficient { available_stock } => {
                return Err(OrdersServiceError::InsufficientStock {
                    product: line.product_uuid,
                    requested: line.quantity,
                    available: available_stock,
                });
            }
        }
    }

    Ok(())
}

/// The buyer's confirmation plus one "New Order Arrived" email per seller.
async fn enqueue_paid_emails<W: OrderUnitOfWork>(
    work: &mut W,
    order: &OrderRecord,
    buyer: &UserRecord,
) -> Result<(), OrdersServiceError> {
    work.enqueue(SideEffect::Email(messages::order_confirmation(order, buyer)))
        .await?;

    for seller_uuid in order.sellers() {
        let seller = work
            .find_user(seller_uuid)
            .await?
            .ok_or(OrdersServiceError::UserNotFound)?;

        work.enqueue(SideEffect::Email(messages::new_order_arrived(order, &seller)))
            .await?;
    }

    Ok(())
}

fn settle<T>(outcome: RetryOutcome<T, OrdersServiceError>) -> Result<T, OrdersServiceError> {
    match outcome {
        RetryOutcome::Done(value) => Ok(value),
        RetryOutcome::Failed(error) => Err(error),
        RetryOutcome::Exhausted(_) => Err(OrdersServiceError::Conflict),
    }
}

fn require_admin(actor: Actor) -> Result<(), OrdersServiceError> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(OrdersServiceError::Forbidden)
    }
}

#[async_trait]
impl<S: OrderStore> OrdersService for OrderWorkflow<S> {
    #[tracing::instrument(
        name = "orders.service.create_order",
        skip(self, order),
        fields(
            tenant_uuid = %tenant,
            order_uuid = %order.uuid,
            line_count = order.lines.len(),
            tracking_code = tracing::field::Empty
        ),
        err
    )]
    async fn create_order(
        &self,
        tenant: TenantUuid,
        actor: Actor,
        order: NewOrder,
    ) -> Result<OrderRecord, OrdersServiceError> {
        if order.lines.is_empty() {
            return Err(OrdersServiceError::InvalidArgument(
                "an order needs at least one line",
            ));
        }

        if order.lines.iter().any(|line| line.quantity == 0) {
            return Err(OrdersServiceError::InvalidArgument(
                "quantity must be at least 1",
            ));
        }

        let order = &order;

        let created = settle(
            retry(self.retry_policy, |_attempt| {
                self.create_once(tenant, actor, order)
            })
            .await,
        )?;

        Span::current().record("tracking_code", created.tracking_code.as_str());

        info!(
            order_uuid = %created.uuid,
            total_price = created.total_price,
            is_paid = created.is_paid,
            "created order"
        );

        Ok(created)
    }

    #[tracing::instrument(
        name = "orders.service.get_order",
        skip(self),
        fields(tenant_uuid = %tenant, order_uuid = %order),
        err
    )]
    async fn get_order(
        &self,
        tenant: TenantUuid,
        actor: Actor,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut work = self.store.begin(tenant).await?;

        let record = work
            .find_order(order)
            .await?
            .filter(|record| record.visible_to(actor))
            .ok_or(OrdersServiceError::NotFound)?;

        work.commit().await?;

        Ok(record)
    }

    #[tracing::instrument(
        name = "orders.service.list_orders",
        skip(self),
        fields(tenant_uuid = %tenant),
        err
    )]
    async fn list_orders(
        &self,
        tenant: TenantUuid,
        actor: Actor,
    ) -> Result<Vec<OrderRecord>, OrdersServiceError> {
        let mut work = self.store.begin(tenant).await?;

        let orders = work.list_orders(OrderFilter::for_actor(actor)).await?;

        work.commit().await?;

        Ok(orders)
    }

    #[tracing::instrument(
        name = "orders.service.transition_status",
        skip(self),
        fields(tenant_uuid = %tenant, order_uuid = %order, next = %next),
        err
    )]
    async fn transition_status(
        &self,
        tenant: TenantUuid,
        actor: Actor,
        order: OrderUuid,
        next: ShippingStatus,
    ) -> Result<OrderRecord, OrdersServiceError> {
        if actor.role == UserRole::Buyer {
            return Err(OrdersServiceError::Forbidden);
        }

        let updated = settle(
            retry(self.retry_policy, |_attempt| {
                self.transition_once(tenant, actor, order, next)
            })
            .await,
        )?;

        info!(status = %updated.shipping.status, "changed shipping status");

        Ok(updated)
    }

    #[tracing::instrument(
        name = "orders.service.cancel_order",
        skip(self),
        fields(tenant_uuid = %tenant, order_uuid = %order),
        err
    )]
    async fn cancel_order(
        &self,
        tenant: TenantUuid,
        actor: Actor,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let cancelled = settle(
            retry(self.retry_policy, |_attempt| {
                self.cancel_once(tenant, actor, order)
            })
            .await,
        )?;

        info!("buyer cancelled order");

        Ok(cancelled)
    }

    #[tracing::instrument(
        name = "orders.service.mark_paid",
        skip(self),
        fields(tenant_uuid = %tenant, order_uuid = %order),
        err
    )]
    async fn mark_paid(
        &self,
        tenant: TenantUuid,
        actor: Actor,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError> {
        require_admin(actor)?;

        settle(
            retry(self.retry_policy, |_attempt| {
                self.mark_paid_once(tenant, order)
            })
            .await,
        )
    }

    #[tracing::instrument(
        name = "orders.service.delete_order",
        skip(self),
        fields(tenant_uuid = %tenant, order_uuid = %order),
        err
    )]
    async fn delete_order(
        &self,
        tenant: TenantUuid,
        actor: Actor,
        order: OrderUuid,
    ) -> Result<(), OrdersServiceError> {
        require_admin(actor)?;

        let mut work = self.store.begin(tenant).await?;

        if !work.delete_order(order).await? {
            return Err(OrdersServiceError::NotFound);
        }

        work.commit().await?;

        info!("deleted order");

        Ok(())
    }

    #[tracing::instrument(
        name = "orders.service.total_revenue",
        skip(self),
        fields(tenant_uuid = %tenant),
        err
    )]
    async fn total_revenue(
        &self,
        tenant: TenantUuid,
        actor: Actor,
    ) -> Result<u64, OrdersServiceError> {
        require_admin(actor)?;

        let mut work = self.store.begin(tenant).await?;

        let revenue = work.total_revenue().await?;

        work.commit().await?;

        Ok(revenue)
    }
}
