use time::OffsetDateTime;
use tracing::warn;

use crate::{
    auth::repo_types::User,
    error::AppError,
    repository::Repository,
    storage::FlatFileStore,
};

#[derive(Clone)]
pub struct UserRepository {
    records: Repository<User>,
}

impl UserRepository {
    pub fn new(store: FlatFileStore) -> Self {
        Self {
            records: Repository::new(store),
        }
    }

    /// Find a user by (already normalized) email.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let mut found = self.records.list(|u| u.email == email).await?;
        Ok(found.pop())
    }

    /// Create a user. The uniqueness check runs under the collection lock.
    pub async fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: String,
    ) -> Result<User, AppError> {
        self.records
            .insert(|existing, id| {
                if existing.iter().any(|u| u.email == email) {
                    warn!(%email, "email already registered");
                    return Err(AppError::Conflict("Email already registered".into()));
                }
                Ok(User {
                    id,
                    name: name.to_string(),
                    email: email.to_string(),
                    password_hash,
                    created_at: OffsetDateTime::now_utc(),
                })
            })
            .await
    }

    #[cfg(test)]
    pub async fn count(&self) -> Result<usize, AppError> {
        Ok(self.records.list(|_| true).await?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBackend;
    use std::sync::Arc;

    fn users() -> UserRepository {
        UserRepository::new(FlatFileStore::new(Arc::new(MemoryBackend::new())))
    }

    #[tokio::test]
    async fn create_then_find_by_email() {
        let repo = users();
        let created = repo
            .create("Olena", "olena@example.com", "hash".into())
            .await
            .unwrap();
        let found = repo.find_by_email("olena@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.name, "Olena");
        assert!(repo.find_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_conflicts_and_keeps_count() {
        let repo = users();
        repo.create("Olena", "olena@example.com", "h1".into())
            .await
            .unwrap();
        let err = repo
            .create("Other", "olena@example.com", "h2".into())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(repo.count().await.unwrap(), 1);
    }
}
