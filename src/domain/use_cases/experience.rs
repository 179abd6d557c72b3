use std::sync::Arc;

use uuid::Uuid;

use crate::entities::experience::{Experience, ExperiencePatch, ExperienceSort, NewExperience};
use crate::errors::AppError;
use crate::repositories::experience::ExperienceRepository;

#[derive(Clone)]
pub struct ExperienceHandler {
    pub repo: Arc<dyn ExperienceRepository>,
}

impl ExperienceHandler {
    pub fn new(repo: Arc<dyn ExperienceRepository>) -> Self {
        ExperienceHandler { repo }
    }

    pub async fn list(&self, sort: ExperienceSort) -> Result<Vec<Experience>, AppError> {
        self.repo.list(sort).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Experience, AppError> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Experience not found".to_string()))
    }

    pub async fn create(&self, new: NewExperience) -> Result<Experience, AppError> {
        let experience = Experience::try_from(new)?;
        let saved = self.repo.insert(&experience).await?;
        tracing::info!(id = %saved.id, "Experience created");
        Ok(saved)
    }

    pub async fn update(&self, id: Uuid, patch: ExperiencePatch) -> Result<Experience, AppError> {
        let current = self.get(id).await?;
        let experience = patch.apply(&current)?;
        self.repo.update(&experience).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.repo
            .delete(id)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound("Experience not found".to_string()))
    }
}
