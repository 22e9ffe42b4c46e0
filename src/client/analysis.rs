use chrono::NaiveDate;

use crate::adapters::ApiRequest;
use crate::client::ApiClient;
use crate::error::ClientResult;
use crate::models::{
    MuscleBalance, OneRmCalculateRequest, OneRmCalculateResponse, OneRmTrend, ProgressReport,
    VolumePeriod, VolumeStats,
};
use crate::validation;

impl ApiClient {
    /// Server-side one-rep-max estimate for a single set
    pub async fn calculate_one_rm(
        &self,
        input: &OneRmCalculateRequest,
    ) -> ClientResult<OneRmCalculateResponse> {
        validation::weight(input.weight)?;
        validation::reps(i64::from(input.reps))?;
        validation::rpe(input.rpe.map(f64::from))?;
        self.post("/api/analysis/1rm/calculate", input).await
    }

    pub async fn one_rm_trend(&self, exercise_id: i64, days: Option<u32>) -> ClientResult<OneRmTrend> {
        let mut request = ApiRequest::get(format!("/api/analysis/1rm/{exercise_id}"));
        if let Some(days) = days {
            request = request.with_param("days", days);
        }
        self.execute(request).await
    }

    pub async fn volume_stats(
        &self,
        period: VolumePeriod,
        start_date: Option<NaiveDate>,
    ) -> ClientResult<VolumeStats> {
        let mut request = ApiRequest::get("/api/analysis/volume").with_param("period", period);
        if let Some(start) = start_date {
            request = request.with_param("start_date", start.format("%Y-%m-%d"));
        }
        self.execute(request).await
    }

    pub async fn muscle_balance(&self, days: Option<u32>) -> ClientResult<MuscleBalance> {
        let mut request = ApiRequest::get("/api/analysis/muscle-balance");
        if let Some(days) = days {
            request = request.with_param("days", days);
        }
        self.execute(request).await
    }

    pub async fn progress_report(&self, days: Option<u32>) -> ClientResult<ProgressReport> {
        let mut request = ApiRequest::get("/api/analysis/progress-report");
        if let Some(days) = days {
            request = request.with_param("days", days);
        }
        self.execute(request).await
    }
}
