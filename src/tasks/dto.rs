use serde::Deserialize;

use crate::{
    error::AppError,
    tasks::repo_types::{Priority, Task},
    validation::{check_length, finish},
};

pub const TITLE_MAX: usize = 255;

fn priority_error() -> String {
    let allowed: Vec<&str> = Priority::ALL.iter().map(|p| p.as_str()).collect();
    format!("priority must be one of: {}", allowed.join(", "))
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateTaskRequest {
    pub title: Option<String>,
    pub priority: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub priority: Priority,
}

impl CreateTaskRequest {
    pub fn validate(self) -> Result<NewTask, AppError> {
        let mut errors = Vec::new();
        let title = self.title.as_deref().unwrap_or_default().trim().to_string();
        check_length(&mut errors, "title", &title, 1, TITLE_MAX);
        let priority = match self.priority.as_deref().map(str::parse::<Priority>) {
            Some(Ok(p)) => Some(p),
            Some(Err(_)) => {
                errors.push(priority_error());
                None
            }
            None => {
                errors.push("priority is required".into());
                None
            }
        };
        finish(errors)?;

        let priority =
            priority.ok_or_else(|| AppError::Validation(vec!["priority is required".into()]))?;
        Ok(NewTask { title, priority })
    }
}

/// Partial update; absent fields stay as they are.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
}

impl UpdateTaskRequest {
    pub fn validate(self) -> Result<TaskPatch, AppError> {
        let mut errors = Vec::new();
        if let Some(title) = self.title.as_deref() {
            check_length(&mut errors, "title", title, 1, TITLE_MAX);
        }
        let priority = match self.priority.as_deref().map(str::parse::<Priority>) {
            Some(Ok(p)) => Some(p),
            Some(Err(_)) => {
                errors.push(priority_error());
                None
            }
            None => None,
        };
        finish(errors)?;

        Ok(TaskPatch {
            title: self.title.map(|t| t.trim().to_string()),
            completed: self.completed,
            priority,
        })
    }
}

impl TaskPatch {
    pub fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
    }
}

/// `GET /tasks` query string.
#[derive(Debug, Default, Deserialize)]
pub struct TaskFilter {
    pub completed: Option<bool>,
    pub priority: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TaskMatcher {
    completed: Option<bool>,
    priority: Option<Priority>,
}

impl TaskFilter {
    pub fn matcher(&self) -> Result<TaskMatcher, AppError> {
        let priority = match self.priority.as_deref() {
            Some(raw) => Some(
                raw.parse::<Priority>()
                    .map_err(|_| AppError::Validation(vec![priority_error()]))?,
            ),
            None => None,
        };
        Ok(TaskMatcher {
            completed: self.completed,
            priority,
        })
    }
}

impl TaskMatcher {
    pub fn matches(&self, task: &Task) -> bool {
        self.completed.map_or(true, |c| task.completed == c)
            && self.priority.map_or(true, |p| task.priority == p)
    }
}
