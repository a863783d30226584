use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use axum_extra::extract::WithRejection;
use tracing::{info, instrument};

use crate::{
    auth::{dto::MessageResponse, AuthContext},
    error::AppError,
    state::AppState,
    tasks::{
        dto::{CreateTaskRequest, TaskFilter, UpdateTaskRequest},
        repo_types::Task,
    },
};

pub fn task_routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/:id",
            get(get_task).put(update_task).delete(delete_task),
        )
}

#[instrument(skip(state, auth), fields(user_id = %auth.user_id))]
pub async fn list_tasks(
    State(state): State<AppState>,
    auth: AuthContext,
    WithRejection(Query(filter), _): WithRejection<Query<TaskFilter>, AppError>,
) -> Result<Json<Vec<Task>>, AppError> {
    let tasks = state.tasks.list_for(auth.user_id, &filter).await?;
    Ok(Json(tasks))
}

#[instrument(skip(state, auth), fields(user_id = %auth.user_id))]
pub async fn get_task(
    State(state): State<AppState>,
    auth: AuthContext,
    WithRejection(Path(id), _): WithRejection<Path<String>, AppError>,
) -> Result<Json<Task>, AppError> {
    Ok(Json(state.tasks.get_owned(auth.user_id, &id).await?))
}

#[instrument(skip(state, auth, payload), fields(user_id = %auth.user_id))]
pub async fn create_task(
    State(state): State<AppState>,
    auth: AuthContext,
    WithRejection(Json(payload), _): WithRejection<Json<CreateTaskRequest>, AppError>,
) -> Result<(StatusCode, Json<Task>), AppError> {
    let task = state.tasks.create(auth.user_id, payload).await?;
    info!(task_id = %task.id, "task created");
    Ok((StatusCode::CREATED, Json(task)))
}

#[instrument(skip(state, auth, payload), fields(user_id = %auth.user_id))]
pub async fn update_task(
    State(state): State<AppState>,
    auth: AuthContext,
    WithRejection(Path(id), _): WithRejection<Path<String>, AppError>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateTaskRequest>, AppError>,
) -> Result<Json<Task>, AppError> {
    let task = state.tasks.update(auth.user_id, &id, payload).await?;
    info!(task_id = %task.id, "task updated");
    Ok(Json(task))
}

#[instrument(skip(state, auth), fields(user_id = %auth.user_id))]
pub async fn delete_task(
    State(state): State<AppState>,
    auth: AuthContext,
    WithRejection(Path(id), _): WithRejection<Path<String>, AppError>,
) -> Result<Json<MessageResponse>, AppError> {
    state.tasks.delete(auth.user_id, &id).await?;
    info!(task_id = %id, "task deleted");
    Ok(Json(MessageResponse::new("Task deleted")))
}
