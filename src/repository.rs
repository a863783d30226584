use std::{fmt, marker::PhantomData, sync::Arc};

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, error};

use crate::{error::AppError, storage::FlatFileStore};

/// A persisted entity stored as one JSON array per collection.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    type Id: PartialEq + fmt::Display + Clone + Send + Sync;

    /// File name of the collection document.
    const COLLECTION: &'static str;
    /// Human label used in not-found messages.
    const KIND: &'static str;

    fn id(&self) -> &Self::Id;

    /// Must not collide with any id in `existing`. `None` once the id
    /// space is exhausted.
    fn next_id(existing: &[Self]) -> Option<Self::Id>;
}

/// Read-modify-write access to one collection.
///
/// Mutations hold the collection lock from load to save, so writers inside
/// this process never lose each other's updates. Reads go straight to the store.
pub struct Repository<R: Record> {
    store: FlatFileStore,
    write_lock: Arc<Mutex<()>>,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> Clone for Repository<R> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            write_lock: Arc::clone(&self.write_lock),
            _record: PhantomData,
        }
    }
}

fn not_found<R: Record>(id: &R::Id) -> AppError {
    AppError::NotFound(format!("{} {} not found", R::KIND, id))
}

impl<R: Record> Repository<R> {
    pub fn new(store: FlatFileStore) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
            _record: PhantomData,
        }
    }

    pub async fn list<F>(&self, filter: F) -> Result<Vec<R>, AppError>
    where
        F: Fn(&R) -> bool,
    {
        let all: Vec<R> = self.store.load(R::COLLECTION).await?;
        Ok(all.into_iter().filter(|r| filter(r)).collect())
    }

    pub async fn get(&self, id: &R::Id) -> Result<R, AppError> {
        let all: Vec<R> = self.store.load(R::COLLECTION).await?;
        all.into_iter()
            .find(|r| r.id() == id)
            .ok_or_else(|| not_found::<R>(id))
    }

    /// `build` sees the current collection and the id reserved for the new
    /// record; returning an error aborts without touching the store.
    pub async fn insert<F>(&self, build: F) -> Result<R, AppError>
    where
        F: FnOnce(&[R], R::Id) -> Result<R, AppError>,
    {
        let _guard = self.write_lock.lock().await;
        let mut all: Vec<R> = self.store.load(R::COLLECTION).await?;
        let id = R::next_id(&all).ok_or_else(|| {
            error!(collection = R::COLLECTION, "id space exhausted");
            AppError::Internal(anyhow::anyhow!("no free id left in {}", R::COLLECTION))
        })?;
        let record = build(&all, id)?;
        all.push(record.clone());
        self.store.save(R::COLLECTION, &all).await?;
        debug!(collection = R::COLLECTION, id = %record.id(), "record inserted");
        Ok(record)
    }

    /// Applies `apply` to a copy of the record; the store is only written when
    /// it succeeds.
    pub async fn update<F>(&self, id: &R::Id, apply: F) -> Result<R, AppError>
    where
        F: FnOnce(&mut R) -> Result<(), AppError>,
    {
        let _guard = self.write_lock.lock().await;
        let mut all: Vec<R> = self.store.load(R::COLLECTION).await?;
        let slot = all
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| not_found::<R>(id))?;

        let mut updated = slot.clone();
        apply(&mut updated)?;
        *slot = updated.clone();

        self.store.save(R::COLLECTION, &all).await?;
        debug!(collection = R::COLLECTION, %id, "record updated");
        Ok(updated)
    }

    /// Removes the record after `check` approves it, returning what was removed.
    pub async fn remove<F>(&self, id: &R::Id, check: F) -> Result<R, AppError>
    where
        F: FnOnce(&R) -> Result<(), AppError>,
    {
        let _guard = self.write_lock.lock().await;
        let mut all: Vec<R> = self.store.load(R::COLLECTION).await?;
        let index = all
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| not_found::<R>(id))?;

        check(&all[index])?;
        let removed = all.remove(index);

        self.store.save(R::COLLECTION, &all).await?;
        debug!(collection = R::COLLECTION, %id, "record removed");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryBackend, StorageBackend, StoreError};
    use async_trait::async_trait;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: u64,
        text: String,
    }

    impl Record for Note {
        type Id = u64;
        const COLLECTION: &'static str = "notes.json";
        const KIND: &'static str = "note";

        fn id(&self) -> &u64 {
            &self.id
        }

        fn next_id(existing: &[Self]) -> Option<u64> {
            existing.iter().map(|n| n.id).max().unwrap_or(0).checked_add(1)
        }
    }

    fn repo() -> Repository<Note> {
        Repository::new(FlatFileStore::new(Arc::new(MemoryBackend::new())))
    }

    async fn add(repo: &Repository<Note>, text: &str) -> Note {
        repo.insert(|_, id| {
            Ok(Note {
                id,
                text: text.into(),
            })
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn insert_assigns_fresh_ids_and_is_visible() {
        let repo = repo();
        let a = add(&repo, "a").await;
        let b = add(&repo, "b").await;
        assert_eq!((a.id, b.id), (1, 2));
        assert_eq!(repo.get(&2).await.unwrap(), b);
        assert_eq!(repo.list(|_| true).await.unwrap().len(), 2);
        assert_eq!(repo.list(|n| n.text == "a").await.unwrap(), vec![a]);
    }

    #[tokio::test]
    async fn rejected_builder_writes_nothing() {
        let repo = repo();
        add(&repo, "a").await;
        let err = repo
            .insert(|_, _| Err(AppError::Conflict("nope".into())))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(repo.list(|_| true).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_and_remove_report_missing_ids() {
        let repo = repo();
        add(&repo, "a").await;
        assert!(matches!(
            repo.update(&9, |_| Ok(())).await.unwrap_err(),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            repo.remove(&9, |_| Ok(())).await.unwrap_err(),
            AppError::NotFound(_)
        ));
        assert_eq!(repo.list(|_| true).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_apply_keeps_stored_record() {
        let repo = repo();
        let a = add(&repo, "a").await;
        let err = repo
            .update(&a.id, |n| {
                n.text = "changed".into();
                Err(AppError::Forbidden("no".into()))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert_eq!(repo.get(&a.id).await.unwrap().text, "a");
    }

    #[tokio::test]
    async fn concurrent_inserts_are_not_lost() {
        let repo = repo();
        let mut handles = Vec::new();
        for i in 0..20 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.insert(|_, id| {
                    Ok(Note {
                        id,
                        text: format!("n{i}"),
                    })
                })
                .await
                .unwrap()
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        let all = repo.list(|_| true).await.unwrap();
        assert_eq!(all.len(), 20);
        let mut ids: Vec<u64> = all.iter().map(|n| n.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 20);
    }

    #[tokio::test]
    async fn exhausted_ids_fail_without_writing() {
        let repo = repo();
        repo.insert(|_, _| {
            Ok(Note {
                id: u64::MAX,
                text: "last".into(),
            })
        })
        .await
        .unwrap();

        let err = repo
            .insert(|_, id| {
                Ok(Note {
                    id,
                    text: "overflow".into(),
                })
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
        assert_eq!(repo.list(|_| true).await.unwrap().len(), 1);
    }

    struct ReadOnly(MemoryBackend);

    #[async_trait]
    impl StorageBackend for ReadOnly {
        async fn read(&self, name: &str) -> Result<Option<String>, StoreError> {
            self.0.read(name).await
        }

        async fn write(&self, name: &str, _contents: String) -> Result<(), StoreError> {
            Err(StoreError::Io {
                name: name.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            })
        }
    }

    #[tokio::test]
    async fn storage_failure_surfaces_and_leaves_data_intact() {
        let memory = MemoryBackend::new();
        let seeded = FlatFileStore::new(Arc::new(memory.clone()));
        seeded
            .save("notes.json", &[Note { id: 1, text: "kept".into() }])
            .await
            .unwrap();

        let repo: Repository<Note> =
            Repository::new(FlatFileStore::new(Arc::new(ReadOnly(memory))));
        let err = repo
            .update(&1, |n| {
                n.text = "lost".into();
                Ok(())
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
        assert_eq!(repo.get(&1).await.unwrap().text, "kept");
    }
}
