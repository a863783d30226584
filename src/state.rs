use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use crate::{
    auth::{repo::UserRepository, session::SessionStore},
    config::{AppConfig, StorageKind},
    schedule::repo::ScheduleRepository,
    storage::{FlatFileStore, JsonFileBackend, MemoryBackend, StorageBackend},
    tasks::repo::TaskRepository,
};

/// Everything a handler may touch, built once at startup and injected.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: UserRepository,
    pub tasks: TaskRepository,
    pub schedule: ScheduleRepository,
    pub sessions: SessionStore,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let backend: Arc<dyn StorageBackend> = match config.storage {
            StorageKind::File => {
                tokio::fs::create_dir_all(&config.data_dir)
                    .await
                    .with_context(|| format!("create data dir {}", config.data_dir.display()))?;
                info!(dir = %config.data_dir.display(), "using flat-file storage");
                Arc::new(JsonFileBackend::new(config.data_dir.clone()))
            }
            StorageKind::Memory => {
                info!("using in-memory storage; nothing will survive a restart");
                Arc::new(MemoryBackend::new())
            }
        };

        Ok(Self::from_parts(config, FlatFileStore::new(backend)))
    }

    pub fn from_parts(config: Arc<AppConfig>, store: FlatFileStore) -> Self {
        let sessions = SessionStore::new(time::Duration::minutes(config.session.ttl_minutes));
        Self {
            users: UserRepository::new(store.clone()),
            tasks: TaskRepository::new(store.clone()),
            schedule: ScheduleRepository::new(store),
            sessions,
            config,
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::config::SessionConfig;

        let config = Arc::new(AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            data_dir: "unused".into(),
            storage: StorageKind::Memory,
            session: SessionConfig {
                ttl_minutes: 60 * 24,
                cookie_name: "sid".into(),
                cookie_secure: false,
            },
        });
        Self::from_parts(config, FlatFileStore::new(Arc::new(MemoryBackend::new())))
    }
}
