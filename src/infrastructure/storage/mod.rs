pub mod cloudinary;
pub mod disk;
pub mod policy;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use derive_more::Display;
use tracing::warn;

use crate::entities::upload::UploadedFile;
use crate::errors::AppError;
use policy::UploadDestination;

#[derive(Debug, Display)]
pub enum UploadError {
    #[display("Unsupported file type: {_0}")]
    UnsupportedType(String),

    #[display("File too large: maximum size is {_0}")]
    PayloadTooLarge(String),

    #[display("Uploaded file is empty")]
    EmptyFile,

    #[display("File storage unavailable: {_0}")]
    UpstreamUnavailable(String),
}

impl std::error::Error for UploadError {}

impl From<reqwest::Error> for UploadError {
    fn from(err: reqwest::Error) -> Self {
        UploadError::UpstreamUnavailable(err.to_string())
    }
}

impl From<std::io::Error> for UploadError {
    fn from(err: std::io::Error) -> Self {
        UploadError::UpstreamUnavailable(err.to_string())
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::UpstreamUnavailable(detail) => {
                tracing::error!("Blob store failure: {}", detail);
                AppError::UpstreamUnavailable("File storage is unavailable".to_string())
            }
            other => AppError::BadRequest(other.to_string()),
        }
    }
}

/// Object storage as seen by the content use cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Short backend name for health reporting.
    fn backend(&self) -> &'static str;

    /// Stores `bytes` as `folder/name` and returns the stable public URL.
    async fn put(&self, bytes: Vec<u8>, content_type: &str, name: &str, folder: &str) -> Result<String, UploadError>;

    /// Removes the blob behind `url`. URLs this store did not issue are ignored.
    async fn delete(&self, url: &str) -> Result<(), UploadError>;
}

/// Applies upload policy in front of a [`BlobStore`] and owns blob naming.
#[derive(Clone)]
pub struct MediaUploader {
    store: Arc<dyn BlobStore>,
}

impl MediaUploader {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        MediaUploader { store }
    }

    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    pub async fn upload(&self, file: UploadedFile, destination: UploadDestination) -> Result<String, UploadError> {
        let policy = destination.policy();
        let accepted = policy.check(&file)?;
        let name = blob_name(policy.prefix, accepted.extension);

        let url = self
            .store
            .put(file.bytes, accepted.content_type, &name, policy.folder)
            .await?;

        tracing::info!(?destination, %url, "Stored upload");
        Ok(url)
    }

    /// Best-effort removal: failures are logged and swallowed.
    pub async fn discard(&self, url: &str) {
        if let Err(e) = self.store.delete(url).await {
            warn!(%url, error = %e, "Failed to delete blob");
        }
    }

    pub async fn discard_all<I>(&self, urls: I)
    where
        I: IntoIterator<Item = String>,
    {
        for url in urls {
            self.discard(&url).await;
        }
    }
}

/// `<prefix>_<unix-millis>_<random hex>.<ext>`; the client filename plays no part.
pub fn blob_name(prefix: &str, extension: &str) -> String {
    format!(
        "{}_{}_{}.{}",
        prefix,
        Utc::now().timestamp_millis(),
        hex::encode(rand::random::<[u8; 6]>()),
        extension
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];

    fn png() -> UploadedFile {
        UploadedFile {
            file_name: Some("../../etc/passwd.png".into()),
            content_type: Some("image/png".into()),
            bytes: PNG.to_vec(),
        }
    }

    #[tokio::test]
    async fn disallowed_type_never_reaches_store() {
        let mut store = MockBlobStore::new();
        store.expect_put().times(0);

        let uploader = MediaUploader::new(Arc::new(store));
        let text = UploadedFile {
            file_name: Some("notes.txt".into()),
            content_type: Some("text/plain".into()),
            bytes: b"hello".to_vec(),
        };
        let err = uploader.upload(text, UploadDestination::ProjectImage).await.unwrap_err();
        assert!(matches!(err, UploadError::UnsupportedType(_)));
    }

    #[tokio::test]
    async fn upload_uses_policy_folder_and_generated_name() {
        let mut store = MockBlobStore::new();
        store
            .expect_put()
            .times(1)
            .returning(|_, content_type, name, folder| {
                assert_eq!(content_type, "image/png");
                assert_eq!(folder, "portfolio/projects");
                assert!(name.starts_with("project_"));
                assert!(name.ends_with(".png"));
                assert!(!name.contains("passwd"));
                Ok(format!("https://cdn.example.com/{folder}/{name}"))
            });

        let uploader = MediaUploader::new(Arc::new(store));
        let url = uploader.upload(png(), UploadDestination::ProjectImage).await.unwrap();
        assert!(url.starts_with("https://cdn.example.com/portfolio/projects/project_"));
    }

    #[tokio::test]
    async fn discard_swallows_store_failures() {
        let mut store = MockBlobStore::new();
        store
            .expect_delete()
            .times(1)
            .returning(|_| Err(UploadError::UpstreamUnavailable("timeout".into())));

        MediaUploader::new(Arc::new(store)).discard("https://cdn.example.com/x.png").await;
    }

    #[test]
    fn blob_names_are_unique() {
        let a = blob_name("skill", "gif");
        let b = blob_name("skill", "gif");
        assert_ne!(a, b);
        assert!(a.starts_with("skill_") && a.ends_with(".gif"));
    }
}
