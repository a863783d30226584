use crate::{
    error::AppError,
    repository::Repository,
    schedule::{
        dto::{CreateScheduleRequest, ScheduleFilter, UpdateScheduleRequest},
        repo_types::ScheduleItem,
    },
    storage::FlatFileStore,
};

/// Shared timetable; no ownership checks apply.
#[derive(Clone)]
pub struct ScheduleRepository {
    records: Repository<ScheduleItem>,
}

impl ScheduleRepository {
    pub fn new(store: FlatFileStore) -> Self {
        Self {
            records: Repository::new(store),
        }
    }

    pub async fn list(&self, filter: &ScheduleFilter) -> Result<Vec<ScheduleItem>, AppError> {
        self.records.list(|i| filter.matches(i)).await
    }

    pub async fn get(&self, id: u64) -> Result<ScheduleItem, AppError> {
        self.records.get(&id).await
    }

    pub async fn create(&self, req: CreateScheduleRequest) -> Result<ScheduleItem, AppError> {
        let new = req.validate()?;
        self.records
            .insert(|_, id| {
                Ok(ScheduleItem {
                    id,
                    day: new.day,
                    subject: new.subject,
                    time: new.time,
                    room: new.room,
                })
            })
            .await
    }

    pub async fn update(
        &self,
        id: u64,
        req: UpdateScheduleRequest,
    ) -> Result<ScheduleItem, AppError> {
        let patch = req.validate()?;
        self.records
            .update(&id, |item| {
                patch.apply(item);
                Ok(())
            })
            .await
    }

    pub async fn delete(&self, id: u64) -> Result<ScheduleItem, AppError> {
        self.records.remove(&id, |_| Ok(())).await
    }
}
