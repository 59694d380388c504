//! Create Order Handler

use std::sync::Arc;

use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bazaar_app::domain::orders::{
    data::{NewOrder, NewOrderLine},
    records::{OrderUuid, PaymentMethod},
};

use crate::{
    extensions::*,
    orders::{errors::into_status_error, get::OrderResponse},
    state::State,
};

/// Create Order Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateOrderRequest {
    pub cart_items: Vec<CartItemRequest>,

    /// `credit_card` or `cash_on_delivery`
    pub payment_method: String,
    pub shipping_address_id: Uuid,

    /// Set when the card payment was authorised before checkout
    #[serde(default)]
    pub payment_authorized: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CartItemRequest {
    pub product_id: Uuid,
    pub quantity: u32,
}

impl CreateOrderRequest {
    fn into_new_order(self) -> Result<NewOrder, StatusError> {
        let payment_method = self
            .payment_method
            .parse::<PaymentMethod>()
            .map_err(|unknown| StatusError::bad_request().brief(unknown.to_string()))?;

        Ok(NewOrder {
            uuid: OrderUuid::new(),
            lines: self
                .cart_items
                .into_iter()
                .map(|item| NewOrderLine {
                    product: item.product_id.into(),
                    quantity: item.quantity,
                })
                .collect(),
            payment_method,
            address: self.shipping_address_id.into(),
            payment_authorized: self.payment_authorized,
        })
    }
}

/// Create Order Handler
///
/// Places an order at current prices. Stock is reserved when a seller approves it.
#[endpoint(
    tags("orders"),
    summary = "Create Order",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Order placed"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::NOT_FOUND, description = "Product or address not found"),
        (status_code = StatusCode::CONFLICT, description = "Concurrent update, retry"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "orders.create",
    skip(json, depot, res),
    fields(tenant_uuid = tracing::field::Empty, lines = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<CreateOrderRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;
    let new_order = json.into_inner().into_new_order()?;

    let span = tracing::Span::current();

    span.record("tenant_uuid", tracing::field::display(principal.tenant));
    span.record("lines", new_order.lines.len());

    let order = state
        .app
        .orders
        .create_order(principal.tenant, principal.actor, new_order)
        .await
        .map_err(into_status_error)?;

    res.add_header(LOCATION, format!("/orders/{}", order.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    tracing::info!(
        order_uuid = %order.uuid,
        tracking_code = %order.tracking_code,
        total_price = order.total_price,
        "placed order"
    );

    Ok(Json(order.into()))
}
