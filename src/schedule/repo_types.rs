use serde::{Deserialize, Serialize};

use crate::repository::Record;

/// Timetable entry in `schedule.json`. Entries have no owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleItem {
    pub id: u64,
    pub day: String,
    pub subject: String,
    pub time: String,
    pub room: String,
}

impl Record for ScheduleItem {
    type Id = u64;
    const COLLECTION: &'static str = "schedule.json";
    const KIND: &'static str = "schedule entry";

    fn id(&self) -> &u64 {
        &self.id
    }

    fn next_id(existing: &[Self]) -> Option<u64> {
        existing.iter().map(|i| i.id).max().unwrap_or(0).checked_add(1)
    }
}
