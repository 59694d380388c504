//! Background outbox delivery.

use bazaar_app::{context::AppContext, outbox::DispatcherConfig};
use tokio::{sync::watch, task::JoinHandle};

use crate::observability::metrics;

/// Run the outbox dispatcher until `shutdown` flips to `true`, counting every pass.
pub(crate) fn spawn(
    app: &AppContext,
    config: DispatcherConfig,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    let dispatcher = app.dispatcher(config);

    tokio::spawn(async move {
        dispatcher.run(shutdown, metrics::record_dispatch).await;
    })
}
