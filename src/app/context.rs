use std::path::PathBuf;
use std::sync::Arc;

use crate::app::error::{Result, WikidashError};
use crate::config::Config;
use crate::controller::{ControllerSettings, DashboardController};
use crate::domain::Selection;
use crate::notification::NotificationChannel;
use crate::read_status::ReadStatusTracker;
use crate::service::ContentService;
use crate::store::{KeyValueStore, MemoryStore, SqliteStore};
use crate::transport::http_transport::HttpTransport;
use crate::transport::Transport;

/// Session-wide wiring: configuration, content service, notification
/// channel and durable store. Each context is independent, so tests can
/// build as many as they like.
pub struct AppContext {
    pub config: Config,
    pub service: Arc<ContentService>,
    pub notifications: NotificationChannel,
    pub store: Arc<dyn KeyValueStore + Send + Sync>,
}

impl AppContext {
    pub fn new(config: Config, db_path: Option<PathBuf>) -> Result<Self> {
        let db_path = match db_path {
            Some(p) => p,
            None => Self::default_db_path()?,
        };

        let store: Arc<dyn KeyValueStore + Send + Sync> = Arc::new(SqliteStore::new(&db_path)?);
        let transport: Arc<dyn Transport + Send + Sync> = Arc::new(HttpTransport::new(&config.http)?);

        Self::with_parts(config, transport, store)
    }

    /// Same as [`AppContext::new`] but nothing outlives the process.
    pub fn in_memory(config: Config) -> Result<Self> {
        let store: Arc<dyn KeyValueStore + Send + Sync> = Arc::new(MemoryStore::new());
        let transport: Arc<dyn Transport + Send + Sync> = Arc::new(HttpTransport::new(&config.http)?);

        Self::with_parts(config, transport, store)
    }

    pub fn with_parts(
        config: Config,
        transport: Arc<dyn Transport + Send + Sync>,
        store: Arc<dyn KeyValueStore + Send + Sync>,
    ) -> Result<Self> {
        let service = Arc::new(ContentService::new(transport, &config.api)?);
        let notifications = NotificationChannel::new(config.dashboard.notification_ttl());

        Ok(Self {
            config,
            service,
            notifications,
            store,
        })
    }

    /// Mounts a controller: loads read status once and selects today's date
    /// in the configured default language.
    pub fn controller(&self) -> DashboardController {
        DashboardController::new(
            self.service.clone(),
            self.notifications.dispatcher(),
            ReadStatusTracker::load(self.store.clone()),
            Selection::today(self.config.dashboard.default_language.clone()),
            ControllerSettings::from(&self.config.dashboard),
        )
    }

    fn default_db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| WikidashError::Config("Could not find data directory".into()))?;
        let app_dir = data_dir.join("wikidash");
        std::fs::create_dir_all(&app_dir)?;
        Ok(app_dir.join("wikidash.db"))
    }
}
