use time::OffsetDateTime;
use tracing::warn;
use uuid::Uuid;

use crate::{
    error::AppError,
    repository::Repository,
    storage::FlatFileStore,
    tasks::{
        dto::{CreateTaskRequest, TaskFilter, UpdateTaskRequest},
        repo_types::Task,
    },
};

fn ensure_owner(task: &Task, user_id: Uuid) -> Result<(), AppError> {
    if task.user_id == user_id {
        return Ok(());
    }
    warn!(task_id = %task.id, owner = %task.user_id, %user_id, "task ownership violation");
    Err(AppError::Forbidden(
        "Access denied: you are not the owner of this task".into(),
    ))
}

/// Per-user task access. Every operation is scoped to the acting user.
#[derive(Clone)]
pub struct TaskRepository {
    records: Repository<Task>,
}

impl TaskRepository {
    pub fn new(store: FlatFileStore) -> Self {
        Self {
            records: Repository::new(store),
        }
    }

    pub async fn list_for(&self, user_id: Uuid, filter: &TaskFilter) -> Result<Vec<Task>, AppError> {
        let matcher = filter.matcher()?;
        self.records
            .list(|t| t.user_id == user_id && matcher.matches(t))
            .await
    }

    pub async fn get_owned(&self, user_id: Uuid, id: &str) -> Result<Task, AppError> {
        let task = self.records.get(&id.to_string()).await?;
        ensure_owner(&task, user_id)?;
        Ok(task)
    }

    pub async fn create(&self, user_id: Uuid, req: CreateTaskRequest) -> Result<Task, AppError> {
        let new = req.validate()?;
        self.records
            .insert(|_, id| {
                Ok(Task {
                    id,
                    user_id,
                    title: new.title,
                    completed: false,
                    priority: new.priority,
                    created_at: OffsetDateTime::now_utc(),
                })
            })
            .await
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        id: &str,
        req: UpdateTaskRequest,
    ) -> Result<Task, AppError> {
        let patch = req.validate()?;
        self.records
            .update(&id.to_string(), |task| {
                ensure_owner(task, user_id)?;
                patch.apply(task);
                Ok(())
            })
            .await
    }

    pub async fn delete(&self, user_id: Uuid, id: &str) -> Result<Task, AppError> {
        self.records
            .remove(&id.to_string(), |task| ensure_owner(task, user_id))
            .await
    }
}
