use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One logged set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSet {
    pub id: i64,
    pub session_id: i64,
    pub exercise_id: i64,
    pub set_order: i32,
    pub weight: f64,
    pub reps: i32,
    #[serde(default)]
    pub rpe: Option<i32>,
    #[serde(default)]
    pub rest_seconds: Option<i32>,
    #[serde(default)]
    pub tempo: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(with = "super::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "super::timestamp")]
    pub updated_at: DateTime<Utc>,
}

/// Set to add to a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSetDraft {
    pub exercise_id: i64,
    pub set_order: i32,
    pub weight: f64,
    pub reps: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpe: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_seconds: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tempo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkoutSetUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exercise_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set_order: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reps: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpe: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rest_seconds: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tempo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Training session without its sets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSession {
    pub id: i64,
    pub user_id: i64,
    pub date: NaiveDate,
    #[serde(default)]
    pub duration_min: Option<i32>,
    #[serde(default)]
    pub body_weight: Option<f64>,
    #[serde(default)]
    pub overall_rpe: Option<i32>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub template_name: Option<String>,
    #[serde(with = "super::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "super::timestamp")]
    pub updated_at: DateTime<Utc>,
}

/// Training session including its sets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSessionDetail {
    #[serde(flatten)]
    pub session: WorkoutSession,
    #[serde(default)]
    pub sets: Vec<WorkoutSet>,
}

/// New session, optionally with its sets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutSessionDraft {
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_min: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_rpe: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_name: Option<String>,
    #[serde(default)]
    pub sets: Vec<WorkoutSetDraft>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkoutSessionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_min: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_rpe: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_name: Option<String>,
}

/// Filters for the session listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkoutQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct SaveTemplate {
    pub template_name: String,
}

/// Acknowledgement returned when a session is saved as a template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateSaved {
    #[serde(default)]
    pub message: Option<String>,
    pub template_name: String,
}

/// Start a new session by copying the latest session of a template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FromTemplate {
    pub template_name: String,
    pub date: NaiveDate,
}

/// Template name with how many sessions use it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateSummary {
    pub name: String,
    pub usage_count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TemplateList {
    pub templates: Vec<TemplateSummary>,
}
