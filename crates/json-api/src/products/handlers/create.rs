//! Create Product Handler

use std::sync::Arc;

use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use bazaar_app::domain::products::{
    data::NewProduct,
    records::{ProductStatus, ProductUuid},
};

use crate::{
    extensions::*,
    products::{
        errors::into_status_error,
        get::{ProductResponse, parse_status},
    },
    state::State,
};

/// Create Product Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateProductRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,

    /// Seller's price in minor units, before the marketplace markup
    pub base_price: u64,
    #[serde(default)]
    pub available_stock: u64,

    /// Defaults to `public`
    pub status: Option<String>,
}

/// Create Product Handler
#[endpoint(
    tags("products"),
    summary = "Create Product",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Product created"),
        (status_code = StatusCode::FORBIDDEN, description = "Only sellers and administrators list products"),
        (status_code = StatusCode::CONFLICT, description = "Product already exists"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CreateProductRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<ProductResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;
    let request = json.into_inner();

    let new_product = NewProduct {
        uuid: ProductUuid::new(),
        status: parse_status(request.status.as_deref())?.unwrap_or(ProductStatus::Public),
        title: request.title,
        description: request.description,
        base_price: request.base_price,
        available_stock: request.available_stock,
    };

    let product = state
        .app
        .products
        .create_product(principal.tenant, principal.actor, new_product)
        .await
        .map_err(into_status_error)?;

    res.add_header(LOCATION, format!("/products/{}", product.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    tracing::info!(product_uuid = %product.uuid, unit_price = product.unit_price, "listed product");

    Ok(Json(product.into()))
}
