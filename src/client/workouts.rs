use chrono::NaiveDate;

use crate::client::ApiClient;
use crate::error::ClientResult;
use crate::models::{
    FromTemplate, Page, SaveTemplate, TemplateList, TemplateSaved, TemplateSummary,
    WorkoutQuery, WorkoutSession, WorkoutSessionDetail, WorkoutSessionDraft,
    WorkoutSessionUpdate, WorkoutSet, WorkoutSetDraft, WorkoutSetUpdate,
};
use crate::validation;

fn check_set(set: &WorkoutSetDraft) -> ClientResult<()> {
    validation::weight(set.weight)?;
    validation::reps(i64::from(set.reps))?;
    validation::rpe(set.rpe.map(f64::from))?;
    Ok(())
}

impl ApiClient {
    /// Sessions, newest first
    pub async fn list_workouts(&self, query: &WorkoutQuery) -> ClientResult<Page<WorkoutSession>> {
        self.get_with_query("/api/workouts", query).await
    }

    pub async fn get_workout(&self, id: i64) -> ClientResult<WorkoutSessionDetail> {
        self.get(&format!("/api/workouts/{id}")).await
    }

    pub async fn create_workout(&self, draft: &WorkoutSessionDraft) -> ClientResult<WorkoutSessionDetail> {
        validation::rpe(draft.overall_rpe.map(f64::from))?;
        for set in &draft.sets {
            check_set(set)?;
        }
        self.post("/api/workouts", draft).await
    }

    pub async fn update_workout(
        &self,
        id: i64,
        update: &WorkoutSessionUpdate,
    ) -> ClientResult<WorkoutSession> {
        validation::rpe(update.overall_rpe.map(f64::from))?;
        self.put(&format!("/api/workouts/{id}"), update).await
    }

    pub async fn delete_workout(&self, id: i64) -> ClientResult<()> {
        self.delete(&format!("/api/workouts/{id}")).await
    }

    pub async fn add_set(&self, session_id: i64, set: &WorkoutSetDraft) -> ClientResult<WorkoutSet> {
        check_set(set)?;
        self.post(&format!("/api/workouts/{session_id}/sets"), set)
            .await
    }

    pub async fn update_set(
        &self,
        session_id: i64,
        set_id: i64,
        update: &WorkoutSetUpdate,
    ) -> ClientResult<WorkoutSet> {
        if let Some(weight) = update.weight {
            validation::weight(weight)?;
        }
        if let Some(reps) = update.reps {
            validation::reps(i64::from(reps))?;
        }
        validation::rpe(update.rpe.map(f64::from))?;

        self.put(&format!("/api/workouts/{session_id}/sets/{set_id}"), update)
            .await
    }

    pub async fn delete_set(&self, session_id: i64, set_id: i64) -> ClientResult<()> {
        self.delete(&format!("/api/workouts/{session_id}/sets/{set_id}"))
            .await
    }

    /// Tag a session so it can be repeated later
    pub async fn save_as_template(&self, session_id: i64, name: &str) -> ClientResult<TemplateSaved> {
        validation::required("template_name", name)?;
        let body = SaveTemplate {
            template_name: name.to_string(),
        };
        self.post(&format!("/api/workouts/{session_id}/save-template"), &body)
            .await
    }

    /// New session on `date` with the sets of the template's latest session
    pub async fn start_from_template(
        &self,
        name: &str,
        date: NaiveDate,
    ) -> ClientResult<WorkoutSessionDetail> {
        validation::required("template_name", name)?;
        let body = FromTemplate {
            template_name: name.to_string(),
            date,
        };
        self.post("/api/workouts/from-template", &body).await
    }

    /// Templates, most used first
    pub async fn list_templates(&self) -> ClientResult<Vec<TemplateSummary>> {
        let list: TemplateList = self.get("/api/workouts/templates/list").await?;
        Ok(list.templates)
    }
}
