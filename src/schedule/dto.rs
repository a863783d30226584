use serde::Deserialize;

use crate::{
    error::AppError,
    schedule::repo_types::ScheduleItem,
    validation::{check_length, check_required, finish},
};

pub const FIELD_MAX: usize = 100;

#[derive(Debug, Default, Deserialize)]
pub struct CreateScheduleRequest {
    pub day: Option<String>,
    pub subject: Option<String>,
    pub time: Option<String>,
    pub room: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewScheduleItem {
    pub day: String,
    pub subject: String,
    pub time: String,
    pub room: String,
}

fn trimmed(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

impl CreateScheduleRequest {
    pub fn validate(self) -> Result<NewScheduleItem, AppError> {
        let mut errors = Vec::new();
        check_required(&mut errors, "day", self.day.as_deref(), 1, FIELD_MAX);
        check_required(&mut errors, "subject", self.subject.as_deref(), 1, FIELD_MAX);
        check_required(&mut errors, "time", self.time.as_deref(), 1, FIELD_MAX);
        check_required(&mut errors, "room", self.room.as_deref(), 1, FIELD_MAX);
        finish(errors)?;

        Ok(NewScheduleItem {
            day: trimmed(self.day),
            subject: trimmed(self.subject),
            time: trimmed(self.time),
            room: trimmed(self.room),
        })
    }
}

/// Partial update; the id in the path always wins over anything in the body.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateScheduleRequest {
    pub day: Option<String>,
    pub subject: Option<String>,
    pub time: Option<String>,
    pub room: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchedulePatch {
    pub day: Option<String>,
    pub subject: Option<String>,
    pub time: Option<String>,
    pub room: Option<String>,
}

impl UpdateScheduleRequest {
    pub fn validate(self) -> Result<SchedulePatch, AppError> {
        let mut errors = Vec::new();
        for (field, value) in [
            ("day", &self.day),
            ("subject", &self.subject),
            ("time", &self.time),
            ("room", &self.room),
        ] {
            if let Some(v) = value {
                check_length(&mut errors, field, v, 1, FIELD_MAX);
            }
        }
        finish(errors)?;

        let clean = |v: Option<String>| v.map(|s| s.trim().to_string());
        Ok(SchedulePatch {
            day: clean(self.day),
            subject: clean(self.subject),
            time: clean(self.time),
            room: clean(self.room),
        })
    }
}

impl SchedulePatch {
    pub fn apply(self, item: &mut ScheduleItem) {
        if let Some(day) = self.day {
            item.day = day;
        }
        if let Some(subject) = self.subject {
            item.subject = subject;
        }
        if let Some(time) = self.time {
            item.time = time;
        }
        if let Some(room) = self.room {
            item.room = room;
        }
    }
}

/// `GET /schedule?day=` filter: case-insensitive substring of the day.
#[derive(Debug, Default, Deserialize)]
pub struct ScheduleFilter {
    pub day: Option<String>,
}

impl ScheduleFilter {
    pub fn matches(&self, item: &ScheduleItem) -> bool {
        match self.day.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => item
                .day
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> ScheduleItem {
        ScheduleItem {
            id: 1,
            day: "Понеділок".into(),
            subject: "Web".into(),
            time: "10:10".into(),
            room: "214".into(),
        }
    }

    #[test]
    fn create_requires_every_field() {
        let err = CreateScheduleRequest {
            day: Some("Monday".into()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref e) if e.len() == 3));
    }

    #[test]
    fn day_filter_ignores_case() {
        let f = ScheduleFilter {
            day: Some("понеділ".into()),
        };
        assert!(f.matches(&item()));
        let f = ScheduleFilter {
            day: Some("friday".into()),
        };
        assert!(!f.matches(&item()));
        assert!(ScheduleFilter::default().matches(&item()));
    }

    #[test]
    fn patch_keeps_unspecified_fields() {
        let mut it = item();
        UpdateScheduleRequest {
            room: Some(" 301 ".into()),
            ..Default::default()
        }
        .validate()
        .unwrap()
        .apply(&mut it);
        assert_eq!(it.room, "301");
        assert_eq!(it.subject, "Web");
        assert_eq!(it.id, 1);
    }

    #[test]
    fn patch_rejects_blank_values() {
        let err = UpdateScheduleRequest {
            subject: Some(String::new()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
