use std::sync::Arc;

use storage::repository::{InMemoryKeyValueStore, KeyValueStore};
use storage::sqlite::SqliteKeyValueStore;

use crate::auth_service::AuthService;
use crate::config::ClientConfig;
use crate::error::AppServicesError;
use crate::http::{HttpTransport, ReqwestTransport};
use crate::session_client::SessionClient;

/// Assembles app-facing services around one shared session.
#[derive(Clone, Debug)]
pub struct AppServices {
    session: Arc<SessionClient>,
    auth: Arc<AuthService>,
}

impl AppServices {
    /// Build services that persist the session in `SQLite` and talk to the API
    /// over reqwest.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage or the HTTP client cannot be initialized.
    pub async fn new_sqlite(db_url: &str, config: &ClientConfig) -> Result<Self, AppServicesError> {
        let store: Arc<dyn KeyValueStore> = Arc::new(SqliteKeyValueStore::open(db_url).await?);
        let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::from_config(config)?);
        Ok(Self::from_parts(transport, store))
    }

    /// Build services over `transport` with a non-durable session store.
    #[must_use]
    pub fn in_memory(transport: Arc<dyn HttpTransport>) -> Self {
        Self::from_parts(transport, Arc::new(InMemoryKeyValueStore::new()))
    }

    #[must_use]
    pub fn from_parts(transport: Arc<dyn HttpTransport>, store: Arc<dyn KeyValueStore>) -> Self {
        let session = Arc::new(SessionClient::new(transport, store));
        let auth = Arc::new(AuthService::new(Arc::clone(&session)));
        Self { session, auth }
    }

    #[must_use]
    pub fn session(&self) -> Arc<SessionClient> {
        Arc::clone(&self.session)
    }

    #[must_use]
    pub fn auth(&self) -> Arc<AuthService> {
        Arc::clone(&self.auth)
    }
}
