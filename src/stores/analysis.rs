use chrono::{Local, NaiveDate};
use std::ops::RangeInclusive;
use tokio::sync::RwLock;
use tracing::{debug, error};

use crate::client::ApiClient;
use crate::error::ClientResult;
use crate::models::{MuscleBalance, OneRmTrend, ProgressReport, VolumePeriod, VolumeStats};
use crate::stores::error_message;

const ONE_RM_FAILED: &str = "Failed to load 1RM data";
const VOLUME_FAILED: &str = "Failed to load volume statistics";
const BALANCE_FAILED: &str = "Failed to load muscle balance";
const PROGRESS_FAILED: &str = "Failed to load progress report";

// Lookback windows the server accepts, in days
const ONE_RM_DAYS: RangeInclusive<u32> = 7..=365;
const BALANCE_DAYS: RangeInclusive<u32> = 7..=90;
const PROGRESS_DAYS: RangeInclusive<u32> = 30..=365;

/// Dates the analysis views are scoped to.
///
/// The server counts its windows back from today, so `start_date` becomes a
/// lookback in days; `end_date` trims later points locally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl DateRange {
    /// Days from `start_date` to `today`, clamped to `bounds`
    pub fn lookback_days(&self, today: NaiveDate, bounds: &RangeInclusive<u32>) -> Option<u32> {
        let start = self.start_date?;
        let days = (today - start).num_days().max(0);
        let days = u32::try_from(days).unwrap_or(u32::MAX);
        Some(days.clamp(*bounds.start(), *bounds.end()))
    }

    /// True if `date` is not after `end_date`
    pub fn admits(&self, date: NaiveDate) -> bool {
        self.end_date.map_or(true, |end| date <= end)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisState {
    pub one_rm: Option<OneRmTrend>,
    pub volume: Option<VolumeStats>,
    pub muscle_balance: Option<MuscleBalance>,
    pub progress: Option<ProgressReport>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Server-computed training analytics for the selected date range
pub struct AnalysisStore {
    client: ApiClient,
    state: RwLock<AnalysisState>,
    range: RwLock<DateRange>,
}

impl AnalysisStore {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            state: RwLock::new(AnalysisState::default()),
            range: RwLock::new(DateRange::default()),
        }
    }

    pub async fn state(&self) -> AnalysisState {
        self.state.read().await.clone()
    }

    pub async fn date_range(&self) -> DateRange {
        *self.range.read().await
    }

    pub async fn set_date_range(&self, change: impl FnOnce(&mut DateRange)) {
        change(&mut *self.range.write().await);
    }

    pub async fn clear_date_range(&self) {
        *self.range.write().await = DateRange::default();
    }

    pub async fn fetch_one_rm_trend(&self, exercise_id: i64) -> ClientResult<OneRmTrend> {
        self.begin().await;
        let range = self.date_range().await;
        let days = range.lookback_days(today(), &ONE_RM_DAYS);
        let result = match self.client.one_rm_trend(exercise_id, days).await {
            Ok(mut trend) => {
                trend.trend.retain(|point| range.admits(point.date));
                debug!(exercise_id, points = trend.trend.len(), "Loaded 1RM trend");
                self.state.write().await.one_rm = Some(trend.clone());
                Ok(trend)
            }
            Err(e) => Err(e),
        };
        self.finish(result, ONE_RM_FAILED).await
    }

    pub async fn fetch_volume_stats(&self, period: VolumePeriod) -> ClientResult<VolumeStats> {
        self.begin().await;
        let range = self.date_range().await;
        let result = match self.client.volume_stats(period, range.start_date).await {
            Ok(mut stats) => {
                stats.daily_stats.retain(|point| range.admits(point.date));
                self.state.write().await.volume = Some(stats.clone());
                Ok(stats)
            }
            Err(e) => Err(e),
        };
        self.finish(result, VOLUME_FAILED).await
    }

    pub async fn fetch_muscle_balance(&self) -> ClientResult<MuscleBalance> {
        self.begin().await;
        let days = self.date_range().await.lookback_days(today(), &BALANCE_DAYS);
        let result = match self.client.muscle_balance(days).await {
            Ok(balance) => {
                self.state.write().await.muscle_balance = Some(balance.clone());
                Ok(balance)
            }
            Err(e) => Err(e),
        };
        self.finish(result, BALANCE_FAILED).await
    }

    pub async fn fetch_progress_report(&self) -> ClientResult<ProgressReport> {
        self.begin().await;
        let days = self.date_range().await.lookback_days(today(), &PROGRESS_DAYS);
        let result = match self.client.progress_report(days).await {
            Ok(report) => {
                self.state.write().await.progress = Some(report.clone());
                Ok(report)
            }
            Err(e) => Err(e),
        };
        self.finish(result, PROGRESS_FAILED).await
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

fn today() -> NaiveDate {
    Local::now().date_naive()
}
