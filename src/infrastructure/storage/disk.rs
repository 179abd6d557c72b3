use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::storage::{BlobStore, UploadError};

/// URL path segment under which disk blobs are served.
pub const UPLOADS_ROUTE: &str = "/uploads/";

/// Stores blobs under a local directory; they are served back by the
/// `/uploads/{path}` route.
#[derive(Debug, Clone)]
pub struct DiskBlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl DiskBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Self {
        DiskBlobStore {
            root: root.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a relative blob path onto the storage root, refusing anything that
    /// could escape it.
    pub fn resolve(root: &Path, relative: &str) -> Option<PathBuf> {
        let relative = Path::new(relative.trim_start_matches('/'));
        let safe = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if !safe || relative.as_os_str().is_empty() {
            return None;
        }
        Some(root.join(relative))
    }

    fn relative_path<'a>(&self, url: &'a str) -> Option<&'a str> {
        let rest = url.strip_prefix(self.public_base_url.as_str())?;
        rest.strip_prefix(UPLOADS_ROUTE)
    }
}

#[async_trait]
impl BlobStore for DiskBlobStore {
    fn backend(&self) -> &'static str {
        "disk"
    }

    async fn put(&self, bytes: Vec<u8>, _content_type: &str, name: &str, folder: &str) -> Result<String, UploadError> {
        let relative = format!("{}/{}", folder.trim_matches('/'), name);
        let path = Self::resolve(&self.root, &relative)
            .ok_or_else(|| UploadError::UpstreamUnavailable(format!("invalid blob path {relative}")))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, bytes).await?;

        Ok(format!("{}{}{}", self.public_base_url, UPLOADS_ROUTE, relative))
    }

    async fn delete(&self, url: &str) -> Result<(), UploadError> {
        let Some(path) = self
            .relative_path(url)
            .and_then(|relative| Self::resolve(&self.root, relative))
        else {
            tracing::debug!(%url, "Not a disk blob, skipping delete");
            return Ok(());
        };

        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
