//! Per-request spans, request ids and access logging.

mod parent_context;
mod request_ids;
mod spans;

use std::time::Instant;

use salvo::{
    Request, handler,
    http::StatusCode,
    prelude::{Depot, FlowCtrl, Response},
};
use tracing::{Instrument as _, Span, error, field::Empty, info, warn};
use tracing_opentelemetry::OpenTelemetrySpanExt as _;

use bazaar_app::auth::Principal;

use super::{metrics, settings};

const REQUEST_ID_DEPOT_KEY: &str = "request_id";

/// Probes scraped every few seconds; logging them would drown the access log.
const QUIET_PATHS: [&str; 2] = ["/metrics", "/healthcheck"];

#[handler]
pub(crate) async fn request_logging(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    if QUIET_PATHS.contains(&req.uri().path()) {
        ctrl.call_next(req, depot, res).await;
        return;
    }

    let started = Instant::now();

    let request_id = request_ids::resolve(req.header::<String>(request_ids::HEADER));

    depot.insert(REQUEST_ID_DEPOT_KEY, request_id.clone());
    request_ids::echo(res, &request_id);

    let method = req.method().to_string();
    let path = req.uri().path().to_owned();
    let route = spans::route_template(&path);
    let _in_flight = metrics::InFlightRequestGuard::track();

    let span = tracing::info_span!(
        parent: None,
        "http.request",
        otel.name = %format!("{method} {route}"),
        otel.kind = "server",
        request_id = %request_id,
        method = %method,
        path = %path,
        remote_addr = %req.remote_addr(),
        tenant_uuid = Empty,
        user_uuid = Empty,
        user_role = Empty,
        status = Empty,
        duration_ms = Empty
    );

    if settings::otel_parent_propagation_enabled()
        && let Some(parent) = parent_context::from_headers(req.headers())
        && let Err(source) = span.set_parent(parent)
    {
        warn!("failed to set parent context on request span: {source}");
    }

    ctrl.call_next(req, depot, res)
        .instrument(span.clone())
        .await;

    let elapsed = started.elapsed();
    let status = res.status_code.unwrap_or(StatusCode::OK);

    metrics::observe_request(&method, &route, status.as_u16(), elapsed.as_secs_f64());

    span.record("status", status.as_u16());
    span.record("duration_ms", elapsed.as_millis());

    span.in_scope(|| log_completion(status, elapsed.as_millis()));
}

/// Attach the authenticated caller to the current request span.
pub(crate) fn record_principal(principal: &Principal) {
    let span = Span::current();

    span.record("tenant_uuid", tracing::field::display(principal.tenant));
    span.record("user_uuid", tracing::field::display(principal.actor.uuid));
    span.record("user_role", tracing::field::display(principal.actor.role));
}

fn log_completion(status: StatusCode, duration_ms: u128) {
    let code = status.as_u16();

    if status.is_server_error() {
        error!(status = code, duration_ms, "request.completed");
    } else if status.is_client_error() {
        warn!(status = code, duration_ms, "request.completed");
    } else {
        info!(status = code, duration_ms, "request.completed");
    }

    let threshold_ms = u128::from(settings::slow_request_threshold_ms());

    if duration_ms > threshold_ms {
        warn!(duration_ms, threshold_ms, "slow request");
    }
}

#[cfg(test)]
mod tests {
    use salvo::{prelude::*, test::TestClient};

    use super::*;

    #[handler]
    async fn created(res: &mut Response) {
        res.status_code(StatusCode::CREATED);
    }

    #[tokio::test]
    async fn caller_request_id_is_echoed() {
        let service = Service::new(
            Router::new()
                .hoop(request_logging)
                .push(Router::with_path("orders").post(created)),
        );

        let res = TestClient::post("http://example.com/orders")
            .add_header(request_ids::HEADER, "checkout-42", true)
            .send(&service)
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(
            res.headers()
                .get(request_ids::HEADER)
                .and_then(|value| value.to_str().ok()),
            Some("checkout-42"),
            "request id must be echoed back"
        );
    }

    #[tokio::test]
    async fn probes_get_no_request_id() {
        let service = Service::new(
            Router::new()
                .hoop(request_logging)
                .push(Router::with_path("healthcheck").get(created)),
        );

        let res = TestClient::get("http://example.com/healthcheck")
            .send(&service)
            .await;

        assert!(
            res.headers().get(request_ids::HEADER).is_none(),
            "probes bypass request logging"
        );
    }
}
