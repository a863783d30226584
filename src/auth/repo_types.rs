use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::repository::Record;

/// User record in `users.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String, // lower-cased, unique
    pub password_hash: String, // Argon2 PHC string; persisted, never sent to clients
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Record for User {
    type Id = Uuid;
    const COLLECTION: &'static str = "users.json";
    const KIND: &'static str = "user";

    fn id(&self) -> &Uuid {
        &self.id
    }

    fn next_id(existing: &[Self]) -> Option<Uuid> {
        loop {
            let id = Uuid::new_v4();
            if existing.iter().all(|u| u.id != id) {
                return Some(id);
            }
        }
    }
}
