use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneRmCalculateRequest {
    pub weight: f64,
    pub reps: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpe: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneRmCalculateResponse {
    pub estimated_1rm: f64,
    pub effective_reps: i32,
    /// Estimate per formula, keyed by formula name
    pub method_weights: HashMap<String, f64>,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneRmTrendPoint {
    pub date: NaiveDate,
    pub estimated_1rm: f64,
    #[serde(default)]
    pub source_weight: Option<f64>,
    #[serde(default)]
    pub source_reps: Option<i32>,
    #[serde(default)]
    pub source_rpe: Option<i32>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// Estimated one-rep-max history for one exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneRmTrend {
    pub exercise_id: i64,
    pub exercise_name: String,
    #[serde(default)]
    pub current_1rm: Option<f64>,
    #[serde(default)]
    pub previous_1rm: Option<f64>,
    #[serde(default)]
    pub change_percentage: Option<f64>,
    pub trend: Vec<OneRmTrendPoint>,
}

/// Aggregation window for volume statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumePeriod {
    #[default]
    Week,
    Month,
}

impl VolumePeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
        }
    }
}

impl fmt::Display for VolumePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for VolumePeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            other => Err(format!("unknown period '{other}', expected week or month")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeStatsPoint {
    pub date: NaiveDate,
    pub total_sets: u32,
    pub total_reps: u32,
    /// Sum of weight times reps
    pub total_volume: f64,
    pub exercises_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeStats {
    pub period: VolumePeriod,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_sessions: u32,
    pub total_sets: u32,
    pub total_reps: u32,
    pub total_volume: f64,
    pub daily_stats: Vec<VolumeStatsPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MuscleVolume {
    pub muscle_group: String,
    pub total_sets: u32,
    pub total_volume: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MuscleBalance {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub muscle_volumes: Vec<MuscleVolume>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseProgress {
    pub exercise_id: i64,
    pub exercise_name: String,
    #[serde(default)]
    pub starting_1rm: Option<f64>,
    #[serde(default)]
    pub current_1rm: Option<f64>,
    #[serde(default)]
    pub progress_percentage: Option<f64>,
    /// `improving`, `plateau` or `declining`
    pub trend: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressReport {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub total_sessions: u32,
    pub total_volume: f64,
    pub exercises_progress: Vec<ExerciseProgress>,
    pub summary: String,
}
