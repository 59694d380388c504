//! Get Address Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bazaar_app::domain::addresses::records::AddressRecord;

use crate::{addresses::errors::into_status_error, extensions::*, state::State};

/// Address Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AddressResponse {
    pub uuid: Uuid,
    pub user_id: Uuid,
    pub address_line: String,
    pub phone_number: String,
    pub created_at: String,
}

impl From<AddressRecord> for AddressResponse {
    fn from(address: AddressRecord) -> Self {
        Self {
            uuid: address.uuid.into_uuid(),
            user_id: address.user_uuid.into_uuid(),
            address_line: address.address_line,
            phone_number: address.phone_number,
            created_at: address.created_at.to_string(),
        }
    }
}

/// Get Address Handler
///
/// Only the owner and administrators can read an address.
#[endpoint(
    tags("addresses"),
    summary = "Get Address",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Address found"),
        (status_code = StatusCode::NOT_FOUND, description = "Address not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    address: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<AddressResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;

    let address = state
        .app
        .addresses
        .get_address(principal.tenant, principal.actor, address.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(address.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use bazaar_app::domain::addresses::{AddressesServiceError, records::AddressUuid};

    use crate::test_helpers::{BUYER, MockApp, TEST_TENANT, buyer_actor, make_address, seller_actor};

    use super::*;

    fn route() -> Router {
        Router::with_path("addresses/{address}").get(handler)
    }

    #[tokio::test]
    async fn test_owner_reads_address() -> TestResult {
        let uuid = AddressUuid::new();
        let mut app = MockApp::new();

        app.addresses
            .expect_get_address()
            .once()
            .withf(move |tenant, actor, a| {
                *tenant == TEST_TENANT && *actor == buyer_actor() && *a == uuid
            })
            .return_once(move |_, _, _| Ok(make_address(uuid)));

        let mut res = TestClient::get(format!("http://example.com/addresses/{uuid}"))
            .send(&app.service(buyer_actor(), route()))
            .await;

        let body: AddressResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.user_id, BUYER.into_uuid());
        assert_eq!(body.address_line, "1 Harbour Road");

        Ok(())
    }

    #[tokio::test]
    async fn test_other_users_address_returns_404() -> TestResult {
        let uuid = AddressUuid::new();
        let mut app = MockApp::new();

        app.addresses
            .expect_get_address()
            .once()
            .return_once(|_, _, _| Err(AddressesServiceError::NotFound));

        let res = TestClient::get(format!("http://example.com/addresses/{uuid}"))
            .send(&app.service(seller_actor(), route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
