use std::sync::Arc;

use uuid::Uuid;

use crate::entities::project::{NewProject, Project, ProjectPatch, ProjectSort};
use crate::entities::upload::UploadedFile;
use crate::errors::AppError;
use crate::repositories::project::ProjectRepository;
use crate::storage::{policy::UploadDestination, MediaUploader};
use crate::use_cases::media::{discard_replaced, PendingUploads};

#[derive(Clone)]
pub struct ProjectHandler {
    pub repo: Arc<dyn ProjectRepository>,
    pub uploader: MediaUploader,
}

impl ProjectHandler {
    pub fn new(repo: Arc<dyn ProjectRepository>, uploader: MediaUploader) -> Self {
        ProjectHandler { repo, uploader }
    }

    pub async fn list(&self, sort: ProjectSort) -> Result<Vec<Project>, AppError> {
        self.repo.list(sort).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Project, AppError> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Project not found".to_string()))
    }

    /// Validates, uploads the optional image, then persists.
    pub async fn create(&self, new: NewProject, image: Option<UploadedFile>) -> Result<Project, AppError> {
        let mut project = Project::try_from(new)?;

        let mut uploads = PendingUploads::new(&self.uploader);
        if let Some(url) = uploads.upload(image, UploadDestination::ProjectImage).await? {
            project.image = Some(url);
        }

        let saved = uploads.persist(self.repo.insert(&project)).await?;
        tracing::info!(id = %saved.id, "Project created");
        Ok(saved)
    }

    pub async fn update(
        &self,
        id: Uuid,
        patch: ProjectPatch,
        image: Option<UploadedFile>,
    ) -> Result<Project, AppError> {
        let current = self.get(id).await?;
        let mut project = patch.apply(&current)?;

        let mut uploads = PendingUploads::new(&self.uploader);
        if let Some(url) = uploads.upload(image, UploadDestination::ProjectImage).await? {
            project.image = Some(url);
        }

        let saved = uploads.persist(self.repo.update(&project)).await?;
        discard_replaced(&self.uploader, current.image.as_ref(), saved.image.as_ref()).await;
        Ok(saved)
    }

    /// Removes the record; its image is cleaned up afterwards and a cleanup
    /// failure does not fail the delete.
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let project = self.repo
            .delete(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;

        if let Some(image) = project.image {
            self.uploader.discard(&image).await;
        }
        tracing::info!(%id, "Project deleted");
        Ok(())
    }
}
