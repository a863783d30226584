use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use axum_extra::extract::WithRejection;
use tracing::{info, instrument};

use crate::{
    error::AppError,
    schedule::{
        dto::{CreateScheduleRequest, ScheduleFilter, UpdateScheduleRequest},
        repo_types::ScheduleItem,
    },
    state::AppState,
};

pub fn schedule_routes() -> Router<AppState> {
    Router::new()
        .route("/schedule", get(list_schedule).post(create_entry))
        .route(
            "/schedule/:id",
            get(get_entry).put(update_entry).delete(delete_entry),
        )
}

#[instrument(skip(state))]
pub async fn list_schedule(
    State(state): State<AppState>,
    WithRejection(Query(filter), _): WithRejection<Query<ScheduleFilter>, AppError>,
) -> Result<Json<Vec<ScheduleItem>>, AppError> {
    Ok(Json(state.schedule.list(&filter).await?))
}

#[instrument(skip(state))]
pub async fn get_entry(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<u64>, AppError>,
) -> Result<Json<ScheduleItem>, AppError> {
    Ok(Json(state.schedule.get(id).await?))
}

#[instrument(skip(state, payload))]
pub async fn create_entry(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateScheduleRequest>, AppError>,
) -> Result<(StatusCode, Json<ScheduleItem>), AppError> {
    let item = state.schedule.create(payload).await?;
    info!(id = item.id, "schedule entry created");
    Ok((StatusCode::CREATED, Json(item)))
}

#[instrument(skip(state, payload))]
pub async fn update_entry(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<u64>, AppError>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateScheduleRequest>, AppError>,
) -> Result<Json<ScheduleItem>, AppError> {
    let item = state.schedule.update(id, payload).await?;
    info!(id, "schedule entry updated");
    Ok(Json(item))
}

#[instrument(skip(state))]
pub async fn delete_entry(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<u64>, AppError>,
) -> Result<StatusCode, AppError> {
    state.schedule.delete(id).await?;
    info!(id, "schedule entry deleted");
    Ok(StatusCode::NO_CONTENT)
}
