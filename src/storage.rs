use std::{
    collections::HashMap,
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use rand::{distributions::Alphanumeric, Rng};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tokio::{fs, io::AsyncWriteExt, sync::RwLock};
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("collection {name}: i/o failure: {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("collection {name}: malformed json: {source}")]
    Malformed {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("collection {name}: cannot encode: {source}")]
    Encode {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Raw document access. One named document per collection.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// `Ok(None)` when the document does not exist yet.
    async fn read(&self, name: &str) -> Result<Option<String>, StoreError>;
    /// Replaces the whole document. Readers never observe a partial write.
    async fn write(&self, name: &str, contents: String) -> Result<(), StoreError>;
}

#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    dir: PathBuf,
}

impl JsonFileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    fn temp_path_for(&self, name: &str) -> PathBuf {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(8)
            .map(char::from)
            .collect();
        self.dir.join(format!(".{name}.{suffix}.tmp"))
    }
}

async fn write_then_rename(tmp: &Path, target: &Path, contents: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(tmp).await?;
    file.write_all(contents).await?;
    file.sync_all().await?;
    drop(file);
    fs::rename(tmp, target).await
}

#[async_trait]
impl StorageBackend for JsonFileBackend {
    async fn read(&self, name: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(name)).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                name: name.to_string(),
                source,
            }),
        }
    }

    async fn write(&self, name: &str, contents: String) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            name: name.to_string(),
            source,
        };
        fs::create_dir_all(&self.dir).await.map_err(io_err)?;

        let target = self.path_for(name);
        let tmp = self.temp_path_for(name);
        if let Err(e) = write_then_rename(&tmp, &target, contents.as_bytes()).await {
            if let Err(cleanup) = fs::remove_file(&tmp).await {
                if cleanup.kind() != io::ErrorKind::NotFound {
                    warn!(error = %cleanup, path = %tmp.display(), "temp file cleanup failed");
                }
            }
            return Err(io_err(e));
        }
        debug!(path = %target.display(), bytes = contents.len(), "collection written");
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    docs: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn read(&self, name: &str) -> Result<Option<String>, StoreError> {
        Ok(self.docs.read().await.get(name).cloned())
    }

    async fn write(&self, name: &str, contents: String) -> Result<(), StoreError> {
        self.docs.write().await.insert(name.to_string(), contents);
        Ok(())
    }
}

/// Whole-collection JSON persistence on top of a [`StorageBackend`].
#[derive(Clone)]
pub struct FlatFileStore {
    backend: Arc<dyn StorageBackend>,
}

impl FlatFileStore {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    pub async fn load<R: DeserializeOwned>(&self, name: &str) -> Result<Vec<R>, StoreError> {
        let Some(raw) = self.backend.read(name).await? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&raw).map_err(|source| StoreError::Malformed {
            name: name.to_string(),
            source,
        })
    }

    pub async fn save<R: Serialize>(&self, name: &str, records: &[R]) -> Result<(), StoreError> {
        let contents =
            serde_json::to_string_pretty(records).map_err(|source| StoreError::Encode {
                name: name.to_string(),
                source,
            })?;
        self.backend.write(name, contents).await
    }
}
