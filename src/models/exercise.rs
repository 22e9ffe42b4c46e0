use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Exercise from the shared library or a user's custom list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub name_en: Option<String>,
    pub primary_muscle: String,
    #[serde(default)]
    pub secondary_muscles: Option<Vec<String>>,
    /// `compound` or `isolation`
    pub category: String,
    pub equipment: String,
    pub difficulty: i32,
    #[serde(default)]
    pub description: Option<String>,
    pub is_custom: bool,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(with = "super::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "super::timestamp")]
    pub updated_at: DateTime<Utc>,
}

/// New custom exercise
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseDraft {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_en: Option<String>,
    pub primary_muscle: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_muscles: Option<Vec<String>>,
    pub category: String,
    pub equipment: String,
    #[serde(default = "default_difficulty")]
    pub difficulty: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_difficulty() -> i32 {
    1
}

/// Partial exercise update
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExerciseUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_en: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_muscle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_muscles: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equipment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Filters for the exercise listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExerciseQuery {
    pub muscle_group: Option<String>,
    pub category: Option<String>,
    pub equipment: Option<String>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct MuscleGroups {
    pub muscle_groups: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct EquipmentTypes {
    pub equipment_types: Vec<String>,
}
