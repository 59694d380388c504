//! Create Address Handler

use std::sync::Arc;

use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use bazaar_app::domain::addresses::{data::NewAddress, records::AddressUuid};

use crate::{
    addresses::{errors::into_status_error, get::AddressResponse},
    extensions::*,
    state::State,
};

/// Create Address Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateAddressRequest {
    pub address_line: String,
    pub phone_number: String,
}

/// Create Address Handler
///
/// The address belongs to the caller.
#[endpoint(
    tags("addresses"),
    summary = "Create Address",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Address saved"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CreateAddressRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<AddressResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let principal = depot.principal_or_401()?;
    let request = json.into_inner();

    let address = state
        .app
        .addresses
        .create_address(
            principal.tenant,
            principal.actor,
            NewAddress {
                uuid: AddressUuid::new(),
                address_line: request.address_line,
                phone_number: request.phone_number,
            },
        )
        .await
        .map_err(into_status_error)?;

    res.add_header(LOCATION, format!("/addresses/{}", address.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(address.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use bazaar_app::domain::addresses::AddressesServiceError;

    use crate::test_helpers::{MockApp, TEST_TENANT, buyer_actor, make_address};

    use super::*;

    fn route() -> Router {
        Router::with_path("addresses").post(handler)
    }

    #[tokio::test]
    async fn test_create_address_success() -> TestResult {
        let mut app = MockApp::new();

        app.addresses
            .expect_create_address()
            .once()
            .withf(|tenant, actor, new| {
                *tenant == TEST_TENANT
                    && *actor == buyer_actor()
                    && new.address_line == "1 Harbour Road"
                    && new.phone_number == "+44 20 7946 0000"
            })
            .return_once(|_, _, new| Ok(make_address(new.uuid)));

        let mut res = TestClient::post("http://example.com/addresses")
            .json(&json!({ "addressLine": "1 Harbour Road", "phoneNumber": "+44 20 7946 0000" }))
            .send(&app.service(buyer_actor(), route()))
            .await;

        let body: AddressResponse = res.take_json().await?;
        let location = res.headers().get("location").and_then(|v| v.to_str().ok());

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(location, Some(format!("/addresses/{}", body.uuid).as_str()));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_blank_address_returns_400() -> TestResult {
        let mut app = MockApp::new();

        app.addresses
            .expect_create_address()
            .once()
            .return_once(|_, _, _| Err(AddressesServiceError::InvalidData));

        let res = TestClient::post("http://example.com/addresses")
            .json(&json!({ "addressLine": "", "phoneNumber": "" }))
            .send(&app.service(buyer_actor(), route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
