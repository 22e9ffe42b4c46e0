use chrono::NaiveDate;
use tokio::sync::RwLock;
use tracing::{debug, error};

use crate::client::ApiClient;
use crate::error::ClientResult;
use crate::models::{
    TemplateSummary, WorkoutQuery, WorkoutSession, WorkoutSessionDetail, WorkoutSessionDraft,
    WorkoutSessionUpdate,
};
use crate::stores::error_message;

const FETCH_WORKOUTS_FAILED: &str = "Failed to load workouts";
const FETCH_WORKOUT_FAILED: &str = "Failed to load workout";
const CREATE_WORKOUT_FAILED: &str = "Failed to create workout";
const UPDATE_WORKOUT_FAILED: &str = "Failed to update workout";
const DELETE_WORKOUT_FAILED: &str = "Failed to delete workout";
const FETCH_TEMPLATES_FAILED: &str = "Failed to load templates";

/// Sessions shown in the recent list
pub const RECENT_WORKOUTS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkoutFilters {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub page: u32,
    pub page_size: u32,
}

impl Default for WorkoutFilters {
    fn default() -> Self {
        Self {
            start_date: None,
            end_date: None,
            page: 1,
            page_size: super::exercise::DEFAULT_PAGE_SIZE,
        }
    }
}

impl WorkoutFilters {
    fn query(&self) -> WorkoutQuery {
        WorkoutQuery {
            start_date: self.start_date,
            end_date: self.end_date,
            page: Some(self.page),
            page_size: Some(self.page_size),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkoutState {
    pub workouts: Vec<WorkoutSession>,
    pub current: Option<WorkoutSessionDetail>,
    pub templates: Vec<TemplateSummary>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Newest sessions by date, at most [`RECENT_WORKOUTS`]
pub fn recent_workouts(workouts: &[WorkoutSession]) -> Vec<WorkoutSession> {
    let mut sorted = workouts.to_vec();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted.truncate(RECENT_WORKOUTS);
    sorted
}

/// Training log plus the user's templates
pub struct WorkoutStore {
    client: ApiClient,
    state: RwLock<WorkoutState>,
    filters: RwLock<WorkoutFilters>,
}

impl WorkoutStore {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            state: RwLock::new(WorkoutState::default()),
            filters: RwLock::new(WorkoutFilters::default()),
        }
    }

    pub async fn state(&self) -> WorkoutState {
        self.state.read().await.clone()
    }

    pub async fn filters(&self) -> WorkoutFilters {
        self.filters.read().await.clone()
    }

    pub async fn set_filters(&self, change: impl FnOnce(&mut WorkoutFilters)) {
        change(&mut *self.filters.write().await);
    }

    pub async fn clear_filters(&self) {
        *self.filters.write().await = WorkoutFilters::default();
    }

    pub async fn workout_count(&self) -> usize {
        self.state.read().await.workouts.len()
    }

    pub async fn recent_workouts(&self) -> Vec<WorkoutSession> {
        recent_workouts(&self.state.read().await.workouts)
    }

    pub async fn fetch_workouts(&self) -> ClientResult<Vec<WorkoutSession>> {
        self.begin().await;
        let query = self.filters.read().await.query();
        let result = match self.client.list_workouts(&query).await {
            Ok(page) => {
                debug!(count = page.items.len(), total = page.total, "Loaded workouts");
                self.state.write().await.workouts = page.items.clone();
                Ok(page.items)
            }
            Err(e) => Err(e),
        };
        self.finish(result, FETCH_WORKOUTS_FAILED).await
    }

    pub async fn fetch_workout(&self, id: i64) -> ClientResult<WorkoutSessionDetail> {
        self.begin().await;
        let result = match self.client.get_workout(id).await {
            Ok(detail) => {
                self.state.write().await.current = Some(detail.clone());
                Ok(detail)
            }
            Err(e) => Err(e),
        };
        self.finish(result, FETCH_WORKOUT_FAILED).await
    }

    /// Create a session and put it at the top of the list
    pub async fn create_workout(&self, draft: &WorkoutSessionDraft) -> ClientResult<WorkoutSessionDetail> {
        self.begin().await;
        let result = match self.client.create_workout(draft).await {
            Ok(detail) => {
                self.state
                    .write()
                    .await
                    .workouts
                    .insert(0, detail.session.clone());
                Ok(detail)
            }
            Err(e) => Err(e),
        };
        self.finish(result, CREATE_WORKOUT_FAILED).await
    }

    pub async fn update_workout(
        &self,
        id: i64,
        update: &WorkoutSessionUpdate,
    ) -> ClientResult<WorkoutSession> {
        self.begin().await;
        let result = match self.client.update_workout(id, update).await {
            Ok(session) => {
                let mut state = self.state.write().await;
                if let Some(listed) = state.workouts.iter_mut().find(|w| w.id == id) {
                    *listed = session.clone();
                }
                if let Some(current) = state.current.as_mut().filter(|c| c.session.id == id) {
                    current.session = session.clone();
                }
                Ok(session)
            }
            Err(e) => Err(e),
        };
        self.finish(result, UPDATE_WORKOUT_FAILED).await
    }

    pub async fn delete_workout(&self, id: i64) -> ClientResult<()> {
        self.begin().await;
        let result = match self.client.delete_workout(id).await {
            Ok(()) => {
                let mut state = self.state.write().await;
                state.workouts.retain(|w| w.id != id);
                if state.current.as_ref().is_some_and(|c| c.session.id == id) {
                    state.current = None;
                }
                Ok(())
            }
            Err(e) => Err(e),
        };
        self.finish(result, DELETE_WORKOUT_FAILED).await
    }

    pub async fn fetch_templates(&self) -> ClientResult<Vec<TemplateSummary>> {
        self.begin().await;
        let result = match self.client.list_templates().await {
            Ok(templates) => {
                self.state.write().await.templates = templates.clone();
                Ok(templates)
            }
            Err(e) => Err(e),
        };
        self.finish(result, FETCH_TEMPLATES_FAILED).await
    }

    async fn begin(&self) {
        let mut state = self.state.write().await;
        state.loading = true;
        state.error = None;
    }

    async fn finish<T>(&self, result: ClientResult<T>, fallback: &str) -> ClientResult<T> {
        let mut state = self.state.write().await;
        state.loading = false;
        if let Err(e) = &result {
            error!(error = %e, "{}", fallback);
            state.error = Some(error_message(e, fallback));
        }
        result
    }
}
