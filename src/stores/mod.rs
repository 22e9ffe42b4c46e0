//! Cached client state over the API, one store per feature area.
//!
//! Each store keeps `loading` and `error` next to its data. A failed
//! operation records a user-facing message and still returns the error.

pub mod analysis;
pub mod exercise;
pub mod user;
pub mod workout;

pub use analysis::{AnalysisState, AnalysisStore, DateRange};
pub use exercise::{ExerciseFilters, ExerciseState, ExerciseStore, ExerciseSummary};
pub use user::{UserState, UserStore};
pub use workout::{WorkoutFilters, WorkoutState, WorkoutStore};

use crate::error::ClientError;

/// Server message, else the first validation failure, else `fallback`
pub(crate) fn error_message(error: &ClientError, fallback: &str) -> String {
    match error {
        ClientError::Http { message, .. } if !message.is_empty() => message.clone(),
        ClientError::Validation(validation) => validation
            .first()
            .map(str::to_string)
            .unwrap_or_else(|| fallback.to_string()),
        _ => fallback.to_string(),
    }
}
