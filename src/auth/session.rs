//! Server-side sessions keyed by an opaque cookie token.
//!
//! A session lives for a fixed window from issuance; it is never extended by
//! activity. Expired entries are dropped when looked up and swept whenever a
//! new session is issued.

use std::{collections::HashMap, sync::Arc};

use axum_extra::extract::cookie::{Cookie, SameSite};
use rand::{distributions::Alphanumeric, Rng};
use time::{Duration, OffsetDateTime};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::SessionConfig;

const TOKEN_LEN: usize = 48;

#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user_id: Uuid,
    pub user_name: String,
    pub issued_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
}

impl Session {
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        now >= self.expires_at
    }
}

#[derive(Clone)]
pub struct SessionStore {
    ttl: Duration,
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

fn new_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn create(&self, user_id: Uuid, user_name: String) -> Session {
        self.create_at(user_id, user_name, OffsetDateTime::now_utc())
            .await
    }

    pub(crate) async fn create_at(
        &self,
        user_id: Uuid,
        user_name: String,
        now: OffsetDateTime,
    ) -> Session {
        let session = Session {
            token: new_token(),
            user_id,
            user_name,
            issued_at: now,
            expires_at: now + self.ttl,
        };

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired_at(now));
        if sessions.len() < before {
            debug!(purged = before - sessions.len(), "expired sessions purged");
        }
        sessions.insert(session.token.clone(), session.clone());
        info!(
            %user_id,
            issued_at = %session.issued_at,
            expires_at = %session.expires_at,
            "session created"
        );
        session
    }

    pub async fn resolve(&self, token: &str) -> Option<Session> {
        self.resolve_at(token, OffsetDateTime::now_utc()).await
    }

    pub(crate) async fn resolve_at(&self, token: &str, now: OffsetDateTime) -> Option<Session> {
        let session = self.sessions.read().await.get(token).cloned()?;
        if session.is_expired_at(now) {
            self.sessions.write().await.remove(token);
            debug!(user_id = %session.user_id, "session expired");
            return None;
        }
        Some(session)
    }

    /// Returns whether a session was bound to `token`.
    pub async fn destroy(&self, token: &str) -> bool {
        let removed = self.sessions.write().await.remove(token);
        if let Some(s) = &removed {
            info!(user_id = %s.user_id, "session destroyed");
        }
        removed.is_some()
    }

    /// Sessions that have not expired yet.
    pub async fn active_count(&self) -> usize {
        self.active_count_at(OffsetDateTime::now_utc()).await
    }

    pub(crate) async fn active_count_at(&self, now: OffsetDateTime) -> usize {
        self.sessions
            .read()
            .await
            .values()
            .filter(|s| !s.is_expired_at(now))
            .count()
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

pub fn session_cookie(cfg: &SessionConfig, token: String) -> Cookie<'static> {
    Cookie::build((cfg.cookie_name.clone(), token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(cfg.cookie_secure)
        .max_age(Duration::minutes(cfg.ttl_minutes))
        .build()
}

pub fn removal_cookie(cfg: &SessionConfig) -> Cookie<'static> {
    Cookie::build((cfg.cookie_name.clone(), "")).path("/").build()
}
