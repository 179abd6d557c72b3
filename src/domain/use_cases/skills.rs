use std::sync::Arc;

use uuid::Uuid;

use crate::entities::skill::{NewSkill, Skill, SkillPatch, SkillSort};
use crate::entities::upload::UploadedFile;
use crate::errors::AppError;
use crate::repositories::skill::SkillRepository;
use crate::storage::{policy::UploadDestination, MediaUploader};
use crate::use_cases::media::{discard_replaced, PendingUploads};

#[derive(Clone)]
pub struct SkillHandler {
    pub repo: Arc<dyn SkillRepository>,
    pub uploader: MediaUploader,
}

impl SkillHandler {
    pub fn new(repo: Arc<dyn SkillRepository>, uploader: MediaUploader) -> Self {
        SkillHandler { repo, uploader }
    }

    pub async fn list(&self, sort: SkillSort) -> Result<Vec<Skill>, AppError> {
        self.repo.list(sort).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Skill, AppError> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Skill not found".to_string()))
    }

    pub async fn create(&self, new: NewSkill, icon: Option<UploadedFile>) -> Result<Skill, AppError> {
        let mut skill = Skill::try_from(new)?;

        let mut uploads = PendingUploads::new(&self.uploader);
        if let Some(url) = uploads.upload(icon, UploadDestination::SkillIcon).await? {
            skill.icon = Some(url);
        }

        let saved = uploads.persist(self.repo.insert(&skill)).await?;
        tracing::info!(id = %saved.id, "Skill created");
        Ok(saved)
    }

    pub async fn update(&self, id: Uuid, patch: SkillPatch, icon: Option<UploadedFile>) -> Result<Skill, AppError> {
        let current = self.get(id).await?;
        let mut skill = patch.apply(&current)?;

        let mut uploads = PendingUploads::new(&self.uploader);
        if let Some(url) = uploads.upload(icon, UploadDestination::SkillIcon).await? {
            skill.icon = Some(url);
        }

        let saved = uploads.persist(self.repo.update(&skill)).await?;
        discard_replaced(&self.uploader, current.icon.as_ref(), saved.icon.as_ref()).await;
        Ok(saved)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let skill = self.repo
            .delete(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Skill not found".to_string()))?;

        if let Some(icon) = skill.icon {
            self.uploader.discard(&icon).await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::skill::MockSkillRepository;
    use crate::storage::MockBlobStore;

    #[tokio::test]
    async fn invalid_level_never_reaches_storage() {
        let mut repo = MockSkillRepository::new();
        repo.expect_insert().times(0);

        let handler = SkillHandler::new(Arc::new(repo), MediaUploader::new(Arc::new(MockBlobStore::new())));
        let err = handler
            .create(NewSkill { name: "Rust".into(), level: Some(150), ..Default::default() }, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn icon_given_as_text_is_not_treated_as_a_blob() {
        let mut skill = Skill::try_from(NewSkill {
            name: "Rust".into(),
            level: Some(80),
            icon: Some("devicon-rust-plain".into()),
            ..Default::default()
        })
        .unwrap();
        skill.category = "Backend".into();
        let id = skill.id;

        let mut repo = MockSkillRepository::new();
        repo.expect_get_by_id().returning(move |_| Ok(Some(skill.clone())));
        repo.expect_update().returning(|s| Ok(s.clone()));
        let mut store = MockBlobStore::new();
        store.expect_delete().times(0);

        let handler = SkillHandler::new(Arc::new(repo), MediaUploader::new(Arc::new(store)));
        let patch = SkillPatch { level: Some(95), ..Default::default() };
        let saved = handler.update(id, patch, None).await.unwrap();
        assert_eq!(saved.level, 95);
        assert_eq!(saved.icon.as_deref(), Some("devicon-rust-plain"));
    }
}
