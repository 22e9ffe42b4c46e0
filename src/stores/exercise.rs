use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, error};

use crate::client::ApiClient;
use crate::error::ClientResult;
use crate::models::{Exercise, ExerciseDraft, ExerciseQuery, ExerciseUpdate};
use crate::stores::error_message;

const FETCH_EXERCISES_FAILED: &str = "Failed to load exercises";
const FETCH_EXERCISE_FAILED: &str = "Failed to load exercise";
const CREATE_EXERCISE_FAILED: &str = "Failed to create exercise";
const UPDATE_EXERCISE_FAILED: &str = "Failed to update exercise";
const DELETE_EXERCISE_FAILED: &str = "Failed to delete exercise";

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Equipment family an exercise is listed under
pub fn equipment_category(equipment: &str) -> &'static str {
    match equipment {
        "dumbbell" => "dumbbell",
        "machine" | "cable" => "machine",
        "bodyweight" => "bodyweight",
        "cardio" => "cardio",
        _ => "barbell",
    }
}

/// Coarse muscle group for a server muscle name
pub fn muscle_group(muscle: &str) -> &'static str {
    match muscle {
        "back" => "back",
        "shoulders" => "shoulders",
        "biceps" => "biceps",
        "triceps" => "triceps",
        "legs" | "glutes" | "hamstrings" => "legs",
        "core" => "core",
        "full_body" => "full_body",
        _ => "chest",
    }
}

/// Exercise as shown in lists
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseSummary {
    pub id: i64,
    pub name: String,
    /// See [`equipment_category`]
    pub category: String,
    /// Primary muscle first, then the secondary ones
    pub muscle_groups: Vec<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Exercise> for ExerciseSummary {
    fn from(exercise: &Exercise) -> Self {
        let muscle_groups = std::iter::once(exercise.primary_muscle.as_str())
            .chain(exercise.secondary_muscles.iter().flatten().map(String::as_str))
            .map(|m| muscle_group(m).to_string())
            .collect();

        Self {
            id: exercise.id,
            name: exercise.name.clone(),
            category: equipment_category(&exercise.equipment).to_string(),
            muscle_groups,
            description: exercise.description.clone().filter(|d| !d.is_empty()),
            created_at: exercise.created_at,
            updated_at: exercise.updated_at,
        }
    }
}

/// List filters.
///
/// `search`, `equipment` and paging go to the server. `category` and
/// `muscle_group` use the coarse groupings of [`ExerciseSummary`] and are
/// applied locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseFilters {
    pub category: Option<String>,
    pub muscle_group: Option<String>,
    pub equipment: Option<String>,
    pub search: Option<String>,
    pub page: u32,
    pub page_size: u32,
}

impl Default for ExerciseFilters {
    fn default() -> Self {
        Self {
            category: None,
            muscle_group: None,
            equipment: None,
            search: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ExerciseFilters {
    fn query(&self) -> ExerciseQuery {
        ExerciseQuery {
            search: self.search.clone().filter(|s| !s.is_empty()),
            equipment: self.equipment.clone(),
            page: Some(self.page),
            page_size: Some(self.page_size),
            ..Default::default()
        }
    }

    /// Case-insensitive search on name or description, then exact category
    /// and muscle group
    pub fn matches(&self, exercise: &ExerciseSummary) -> bool {
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            let in_name = exercise.name.to_lowercase().contains(&needle);
            let in_description = exercise
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle));
            if !in_name && !in_description {
                return false;
            }
        }

        if let Some(category) = &self.category {
            if &exercise.category != category {
                return false;
            }
        }

        match &self.muscle_group {
            Some(group) => exercise.muscle_groups.contains(group),
            None => true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExerciseState {
    pub exercises: Vec<ExerciseSummary>,
    pub current: Option<Exercise>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Exercise library with local filtering
pub struct ExerciseStore {
    client: ApiClient,
    state: RwLock<ExerciseState>,
    filters: RwLock<ExerciseFilters>,
}

impl ExerciseStore {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            state: RwLock::new(ExerciseState::default()),
            filters: RwLock::new(ExerciseFilters::default()),
        }
    }

    pub async fn state(&self) -> ExerciseState {
        self.state.read().await.clone()
    }

    pub async fn filters(&self) -> ExerciseFilters {
        self.filters.read().await.clone()
    }

    /// Change some filters, keeping the rest
    pub async fn set_filters(&self, change: impl FnOnce(&mut ExerciseFilters)) {
        change(&mut *self.filters.write().await);
    }

    pub async fn clear_filters(&self) {
        *self.filters.write().await = ExerciseFilters::default();
    }

    pub async fn filtered_exercises(&self) -> Vec<ExerciseSummary> {
        let filters = self.filters.read().await;
        self.state
            .read()
            .await
            .exercises
            .iter()
            .filter(|e| filters.matches(e))
            .cloned()
            .collect()
    }

    pub async fn exercise_count(&self) -> usize {
        self.state.read().await.exercises.len()
    }

    /// Load the page selected by the current filters
    pub async fn fetch_exercises(&self) -> ClientResult<Vec<ExerciseSummary>> {
        self.begin().await;
        let query = self.filters.read().await.query();
        let result = match self.client.list_exercises(&query).await {
            Ok(page) => {
                let summaries: Vec<ExerciseSummary> =
                    page.items.iter().map(ExerciseSummary::from).collect();
                debug!(count = summaries.len(), total = page.total, "Loaded exercises");
                self.state.write().await.exercises = summaries.clone();
                Ok(summaries)
            }
            Err(e) => Err(e),
        };
        self.finish(result, FETCH_EXERCISES_FAILED).await
    }

    pub async fn fetch_exercise(&self, id: i64) -> ClientResult<Exercise> {
        self.begin().await;
        let result = match self.client.get_exercise(id).await {
            Ok(exercise) => {
                self.state.write().await.current = Some(exercise.clone());
                Ok(exercise)
            }
            Err(e) => Err(e),
        };
        self.finish(result, FETCH_EXERCISE_FAILED).await
    }

    pub async fn create_exercise(&self, draft: &ExerciseDraft) -> ClientResult<Exercise> {
        self.begin().await;
        let result = match self.client.create_exercise(draft).await {
            Ok(exercise) => {
                self.state
                    .write()
                    .await
                    .exercises
                    .push(ExerciseSummary::from(&exercise));
                Ok(exercise)
            }
            Err(e) => Err(e),
        };
        self.finish(result, CREATE_EXERCISE_FAILED).await
    }

    pub async fn update_exercise(&self, id: i64, update: &ExerciseUpdate) -> ClientResult<Exercise> {
        self.begin().await;
        let result = match self.client.update_exercise(id, update).await {
            Ok(exercise) => {
                let mut state = self.state.write().await;
                if let Some(listed) = state.exercises.iter_mut().find(|e| e.id == id) {
                    *listed = ExerciseSummary::from(&exercise);
                }
                if state.current.as_ref().is_some_and(|c| c.id == id) {
                    state.current = Some(exercise.clone());
                }
                Ok(exercise)
            }
            Err(e) => Err(e),
        };
        self.finish(result, UPDATE_EXERCISE_FAILED).await
    }

    pub async fn delete_exercise(&self, id: i64) -> ClientResult<()> {
        self.begin().await;
        let result = match self.client.delete_exercise(id).await {
            Ok(()) => {
                let mut state = self.state.write().await;
                state.exercises.retain(|e| e.id != id);
                if state.current.as_ref().is_some_and(|c| c.id == id) {
                    state.current = None;
                }
                Ok(())
            }
            Err(e) => Err(e),
        };
        self.finish(result, DELETE_EXERCISE_FAILED).await
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
