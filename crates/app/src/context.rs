//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    auth::{AuthService, PgAuthService},
    database::{self, Db},
    domain::{
        addresses::{AddressesService, PgAddressesService},
        inventory::{InventoryService, PgInventoryService},
        notifications::{NotificationsService, PgNotificationsService},
        orders::{OrderWorkflow, OrdersService, PgOrderStore},
        products::{PgProductsService, ProductsService},
        reviews::{PgReviewsService, ReviewsService},
        users::{PgUsersService, UsersService},
    },
    outbox::{
        DispatcherConfig, EmailConfig, EmailError, EmailSender, HttpEmailSender, LogEmailSender,
        OutboxDispatcher, OutboxStore, PgOutboxStore,
    },
    retry::RetryPolicy,
};

/// App Init Error
#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to build email client")]
    Email(#[source] EmailError),
}

/// Tunables that shape how the services behave.
#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    /// Outbound email provider. Messages are only logged when absent.
    pub email: Option<EmailConfig>,

    /// Retry policy for order units of work that lose a concurrency race.
    pub order_retries: RetryPolicy,
}

/// Every service, built once over a shared pool.
#[derive(Clone)]
pub struct AppContext {
    pub auth: Arc<dyn AuthService>,
    pub users: Arc<dyn UsersService>,
    pub addresses: Arc<dyn AddressesService>,
    pub products: Arc<dyn ProductsService>,
    pub reviews: Arc<dyn ReviewsService>,
    pub inventory: Arc<dyn InventoryService>,
    pub notifications: Arc<dyn NotificationsService>,
    pub orders: Arc<dyn OrdersService>,
    pub outbox: Arc<dyn OutboxStore>,
    pub email: Arc<dyn EmailSender>,
}

impl AppContext {
    /// Build application context from a database URL.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails.
    pub async fn from_database_url(url: &str, options: AppOptions) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        Self::new(Db::new(pool), options)
    }

    /// Build every service over `db`.
    ///
    /// # Errors
    ///
    /// Returns an error when the email provider's HTTP client cannot be built.
    pub fn new(db: Db, options: AppOptions) -> Result<Self, AppInitError> {
        let email: Arc<dyn EmailSender> = match options.email {
            Some(config) => Arc::new(HttpEmailSender::new(config).map_err(AppInitError::Email)?),
            None => Arc::new(LogEmailSender),
        };

        let orders = OrderWorkflow::new(PgOrderStore::new(db.clone()))
            .with_retry_policy(options.order_retries);

        Ok(Self {
            auth: Arc::new(PgAuthService::new(db.clone())),
            users: Arc::new(PgUsersService::new(db.clone())),
            addresses: Arc::new(PgAddressesService::new(db.clone())),
            products: Arc::new(PgProductsService::new(db.clone())),
            reviews: Arc::new(PgReviewsService::new(db.clone())),
            inventory: Arc::new(PgInventoryService::new(db.clone())),
            notifications: Arc::new(PgNotificationsService::new(db.clone())),
            orders: Arc::new(orders),
            outbox: Arc::new(PgOutboxStore::new(db)),
            email,
        })
    }

    /// A dispatcher draining this context's outbox.
    #[must_use]
    pub fn dispatcher(&self, config: DispatcherConfig) -> OutboxDispatcher {
        OutboxDispatcher::new(
            Arc::clone(&self.outbox),
            Arc::clone(&self.email),
            Arc::clone(&self.notifications),
            config,
        )
    }
}
