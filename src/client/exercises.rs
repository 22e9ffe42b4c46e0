use crate::client::ApiClient;
use crate::error::ClientResult;
use crate::models::{
    EquipmentTypes, Exercise, ExerciseDraft, ExerciseQuery, ExerciseUpdate, MuscleGroups, Page,
};
use crate::validation;

impl ApiClient {
    /// Shared and custom exercises matching the filters
    pub async fn list_exercises(&self, query: &ExerciseQuery) -> ClientResult<Page<Exercise>> {
        self.get_with_query("/api/exercises", query).await
    }

    pub async fn get_exercise(&self, id: i64) -> ClientResult<Exercise> {
        self.get(&format!("/api/exercises/{id}")).await
    }

    pub async fn create_exercise(&self, draft: &ExerciseDraft) -> ClientResult<Exercise> {
        validation::required("name", &draft.name)?;
        validation::required("primary_muscle", &draft.primary_muscle)?;
        self.post("/api/exercises", draft).await
    }

    pub async fn update_exercise(&self, id: i64, update: &ExerciseUpdate) -> ClientResult<Exercise> {
        self.put(&format!("/api/exercises/{id}"), update).await
    }

    pub async fn delete_exercise(&self, id: i64) -> ClientResult<()> {
        self.delete(&format!("/api/exercises/{id}")).await
    }

    pub async fn muscle_groups(&self) -> ClientResult<Vec<String>> {
        let groups: MuscleGroups = self.get("/api/exercises/muscle-groups").await?;
        Ok(groups.muscle_groups)
    }

    pub async fn equipment_types(&self) -> ClientResult<Vec<String>> {
        let types: EquipmentTypes = self.get("/api/exercises/equipment-types").await?;
        Ok(types.equipment_types)
    }
}
