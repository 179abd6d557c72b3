use crate::entities::upload::UploadedFile;
use crate::errors::AppError;
use crate::storage::{policy::UploadDestination, MediaUploader};

/// Blobs uploaded for a single write. Rolled back if the write never lands.
pub struct PendingUploads<'a> {
    uploader: &'a MediaUploader,
    urls: Vec<String>,
}

impl<'a> PendingUploads<'a> {
    pub fn new(uploader: &'a MediaUploader) -> Self {
        PendingUploads { uploader, urls: Vec::new() }
    }

    /// Uploads `file` when present. A failure discards whatever this batch
    /// already stored before returning the error.
    pub async fn upload(
        &mut self,
        file: Option<UploadedFile>,
        destination: UploadDestination,
    ) -> Result<Option<String>, AppError> {
        let Some(file) = file else {
            return Ok(None);
        };

        match self.uploader.upload(file, destination).await {
            Ok(url) => {
                self.urls.push(url.clone());
                Ok(Some(url))
            }
            Err(e) => {
                self.uploader.discard_all(self.urls.drain(..)).await;
                Err(e.into())
            }
        }
    }

    /// Awaits the write; on error the uploaded blobs are discarded.
    pub async fn persist<T, F>(self, write: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        match write.await {
            Ok(saved) => Ok(saved),
            Err(e) => {
                if !self.urls.is_empty() {
                    tracing::warn!(count = self.urls.len(), "Write failed, discarding uploads");
                    self.uploader.discard_all(self.urls).await;
                }
                Err(e)
            }
        }
    }
}

/// Best-effort cleanup of a blob reference that a write replaced or cleared.
pub async fn discard_replaced(uploader: &MediaUploader, before: Option<&String>, after: Option<&String>) {
    if let Some(old) = before {
        if after != Some(old) {
            uploader.discard(old).await;
        }
    }
}
