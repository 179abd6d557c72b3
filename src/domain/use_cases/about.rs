use std::sync::Arc;

use crate::entities::about::{About, AboutPatch, NewAbout};
use crate::entities::upload::UploadedFile;
use crate::errors::AppError;
use crate::repositories::about::AboutRepository;
use crate::storage::{policy::UploadDestination, MediaUploader};
use crate::use_cases::media::{discard_replaced, PendingUploads};

/// Files that may accompany an About write.
#[derive(Debug, Default)]
pub struct AboutFiles {
    pub profile_image: Option<UploadedFile>,
    pub resume: Option<UploadedFile>,
}

#[derive(Clone)]
pub struct AboutHandler {
    pub repo: Arc<dyn AboutRepository>,
    pub uploader: MediaUploader,
}

impl AboutHandler {
    pub fn new(repo: Arc<dyn AboutRepository>, uploader: MediaUploader) -> Self {
        AboutHandler { repo, uploader }
    }

    pub async fn get(&self) -> Result<About, AppError> {
        self.repo
            .get()
            .await?
            .ok_or_else(|| AppError::NotFound("About information not found".to_string()))
    }

    /// Creates the singleton. A second create is a `Conflict`, whether it is
    /// caught by the early check or by the storage constraint.
    pub async fn create(&self, new: NewAbout, files: AboutFiles) -> Result<About, AppError> {
        let mut about = About::try_from(new)?;
        if self.repo.get().await?.is_some() {
            return Err(AppError::Conflict(
                "About information already exists. Use PUT to update.".to_string(),
            ));
        }

        let mut uploads = PendingUploads::new(&self.uploader);
        self.attach(&mut uploads, &mut about, files).await?;

        let saved = uploads.persist(self.repo.insert(&about)).await?;
        tracing::info!("About information created");
        Ok(saved)
    }

    /// Upsert: patches the stored record, or creates one from the patch when
    /// none exists (required fields must then be present).
    pub async fn update(&self, patch: AboutPatch, files: AboutFiles) -> Result<About, AppError> {
        let current = self.repo.get().await?;
        let mut about = match &current {
            Some(existing) => patch.apply(existing)?,
            None => About::try_from(patch.into_new())?,
        };

        let mut uploads = PendingUploads::new(&self.uploader);
        self.attach(&mut uploads, &mut about, files).await?;

        let saved = uploads.persist(self.repo.upsert(&about)).await?;
        if let Some(previous) = current {
            discard_replaced(&self.uploader, previous.profile_image.as_ref(), saved.profile_image.as_ref()).await;
            discard_replaced(&self.uploader, previous.resume_link.as_ref(), saved.resume_link.as_ref()).await;
        }
        Ok(saved)
    }

    pub async fn delete(&self) -> Result<(), AppError> {
        let about = self.repo
            .delete()
            .await?
            .ok_or_else(|| AppError::NotFound("About information not found".to_string()))?;

        self.uploader.discard_all(about.blob_refs()).await;
        tracing::info!("About information deleted");
        Ok(())
    }

    async fn attach(
        &self,
        uploads: &mut PendingUploads<'_>,
        about: &mut About,
        files: AboutFiles,
    ) -> Result<(), AppError> {
        if let Some(url) = uploads.upload(files.profile_image, UploadDestination::AboutProfileImage).await? {
            about.profile_image = Some(url);
        }
        if let Some(url) = uploads.upload(files.resume, UploadDestination::AboutResume).await? {
            about.resume_link = Some(url);
        }
        Ok(())
    }
}
