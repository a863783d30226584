use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::repository::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    #[serde(rename = "Висока")]
    High,
    #[serde(rename = "Середня")]
    Medium,
    #[serde(rename = "Низька")]
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "Висока",
            Priority::Medium => "Середня",
            Priority::Low => "Низька",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPriority;

impl FromStr for Priority {
    type Err = UnknownPriority;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str() == s.trim())
            .ok_or(UnknownPriority)
    }
}

/// Task record in `tasks.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub user_id: Uuid, // owner
    pub title: String,
    pub completed: bool,
    pub priority: Priority,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

fn now_millis() -> u64 {
    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    u64::try_from(millis).unwrap_or(0)
}

impl Record for Task {
    type Id = String;
    const COLLECTION: &'static str = "tasks.json";
    const KIND: &'static str = "task";

    fn id(&self) -> &String {
        &self.id
    }

    /// Wall-clock milliseconds, bumped past the largest existing id when the
    /// clock would collide with it or has gone backwards.
    fn next_id(existing: &[Self]) -> Option<String> {
        let now = now_millis();
        let max = existing.iter().filter_map(|t| t.id.parse::<u64>().ok()).max();
        let next = match max {
            Some(max) if max >= now => max.checked_add(1)?,
            _ => now,
        };
        Some(next.to_string())
    }
}
