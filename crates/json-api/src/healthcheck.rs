//! Liveness probe reporting the outbox backlog.

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{extensions::*, state::State};

/// Healthcheck response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HealthResponse {
    /// `ok`, or `degraded` when the database cannot be read
    pub status: String,

    /// Side effects waiting for delivery, leased ones included
    pub outbox_backlog: Option<u64>,

    /// Side effects that ran out of delivery attempts
    pub outbox_failed: Option<u64>,
}

/// Healthcheck handler
///
/// Always answers 200 while the process is serving; a database outage shows up as
/// `degraded` rather than an error so the probe does not restart a healthy server.
#[endpoint(tags("health"), summary = "Health check endpoint")]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<HealthResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let response = match state.app.outbox.counts().await {
        Ok(counts) => HealthResponse {
            status: "ok".to_string(),
            outbox_backlog: Some(counts.pending + counts.in_flight),
            outbox_failed: Some(counts.failed),
        },
        Err(error) => {
            warn!(%error, "healthcheck could not read outbox counts");

            HealthResponse {
                status: "degraded".to_string(),
                outbox_backlog: None,
                outbox_failed: None,
            }
        }
    };

    Ok(Json(response))
}
