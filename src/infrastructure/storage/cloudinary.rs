use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::storage::{BlobStore, UploadError};

const API_BASE: &str = "https://api.cloudinary.com";
const DELIVERY_HOST: &str = "res.cloudinary.com";

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: String,
}

#[derive(Deserialize)]
struct DestroyResponse {
    result: String,
}

/// Signed uploads to Cloudinary's REST API.
pub struct CloudinaryStore {
    client: reqwest::Client,
    api_base: String,
    cloud_name: String,
    api_key: String,
    api_secret: Zeroizing<String>,
}

impl CloudinaryStore {
    pub fn new(cloud_name: &str, api_key: &str, api_secret: &str) -> Self {
        CloudinaryStore {
            client: reqwest::Client::new(),
            api_base: API_BASE.to_string(),
            cloud_name: cloud_name.to_string(),
            api_key: api_key.to_string(),
            api_secret: Zeroizing::new(api_secret.to_string()),
        }
    }

    /// Points the client at another API host, e.g. a local stub.
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self, resource_type: &str, action: &str) -> String {
        format!("{}/v1_1/{}/{}/{}", self.api_base, self.cloud_name, resource_type, action)
    }

    fn sign(&self, params: &[(&str, &str)]) -> String {
        sign_params(params, &self.api_secret)
    }

    async fn error_from(response: reqwest::Response) -> UploadError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        UploadError::UpstreamUnavailable(format!("cloudinary responded {status}: {body}"))
    }
}

/// Cloudinary request signature: parameters sorted by name, joined as
/// `k=v&k=v`, with the API secret appended, hashed with SHA-256.
pub fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted: Vec<_> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Extracts `(resource_type, public_id)` from a delivery URL issued for `cloud_name`.
///
/// `https://res.cloudinary.com/demo/image/upload/v1712/portfolio/projects/project_1.jpg`
/// yields `("image", "portfolio/projects/project_1")`. Raw files keep their extension.
pub fn public_id_from_url(url: &str, cloud_name: &str) -> Option<(String, String)> {
    let parsed = url::Url::parse(url).ok()?;
    if parsed.host_str()? != DELIVERY_HOST {
        return None;
    }

    let segments: Vec<&str> = parsed.path_segments()?.collect();
    let (cloud, resource_type, delivery, rest) = match segments.as_slice() {
        [cloud, resource_type, delivery, rest @ ..] if !rest.is_empty() => {
            (*cloud, *resource_type, *delivery, rest)
        }
        _ => return None,
    };
    if cloud != cloud_name || delivery != "upload" {
        return None;
    }

    // Skip transformation segments and the version marker
    let start = rest
        .iter()
        .position(|s| is_version(s))
        .map(|i| i + 1)
        .unwrap_or(0);
    let id_segments = &rest[start..];
    if id_segments.is_empty() {
        return None;
    }

    let joined = id_segments.join("/");
    let public_id = if resource_type == "raw" {
        joined
    } else {
        match joined.rsplit_once('.') {
            Some((stem, ext)) if !ext.contains('/') => stem.to_string(),
            _ => joined,
        }
    };

    Some((resource_type.to_string(), public_id))
}

fn is_version(segment: &str) -> bool {
    segment
        .strip_prefix('v')
        .is_some_and(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
}

#[async_trait]
impl BlobStore for CloudinaryStore {
    fn backend(&self) -> &'static str {
        "cloudinary"
    }

    async fn put(&self, bytes: Vec<u8>, content_type: &str, name: &str, folder: &str) -> Result<String, UploadError> {
        // Images and PDFs are delivered by Cloudinary with the extension re-added;
        // raw documents need it baked into the public id.
        let public_id = if content_type.starts_with("image/") || content_type == "application/pdf" {
            name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(name)
        } else {
            name
        };
        let timestamp = Utc::now().timestamp().to_string();
        let signature = self.sign(&[
            ("folder", folder),
            ("public_id", public_id),
            ("timestamp", timestamp.as_str()),
        ]);

        let file = Part::bytes(bytes)
            .file_name(name.to_string())
            .mime_str(content_type)?;
        let form = Form::new()
            .part("file", file)
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", folder.to_string())
            .text("public_id", public_id.to_string())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let response = self
            .client
            .post(self.endpoint("auto", "upload"))
            .multipart(form)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let body: UploadResponse = response.json().await?;
        Ok(body.secure_url)
    }

    async fn delete(&self, url: &str) -> Result<(), UploadError> {
        let Some((resource_type, public_id)) = public_id_from_url(url, &self.cloud_name) else {
            tracing::debug!(%url, "Not a Cloudinary asset of this cloud, skipping delete");
            return Ok(());
        };

        let timestamp = Utc::now().timestamp().to_string();
        let signature = self.sign(&[("public_id", public_id.as_str()), ("timestamp", timestamp.as_str())]);
        let params = [
            ("public_id", public_id.as_str()),
            ("timestamp", timestamp.as_str()),
            ("api_key", self.api_key.as_str()),
            ("signature", signature.as_str()),
            ("signature_algorithm", "sha256"),
        ];

        let response = self
            .client
            .post(self.endpoint(&resource_type, "destroy"))
            .form(&params)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let body: DestroyResponse = response.json().await?;
        match body.result.as_str() {
            "ok" | "not found" => Ok(()),
            other => Err(UploadError::UpstreamUnavailable(format!("destroy returned {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_versioned_image_url() {
        let parsed = public_id_from_url(
            "https://res.cloudinary.com/demo/image/upload/v1712345678/portfolio/projects/project_1_ab.jpg",
            "demo",
        );
        assert_eq!(
            parsed,
            Some(("image".to_string(), "portfolio/projects/project_1_ab".to_string()))
        );
    }

    #[test]
    fn raw_urls_keep_extension_and_transformations_are_skipped() {
        let raw = public_id_from_url(
            "https://res.cloudinary.com/demo/raw/upload/v1/portfolio/resumes/about_resume_1.docx",
            "demo",
        );
        assert_eq!(raw.unwrap().1, "portfolio/resumes/about_resume_1.docx");

        let transformed = public_id_from_url(
            "https://res.cloudinary.com/demo/image/upload/c_fill,w_200/v9/portfolio/about/me.png",
            "demo",
        );
        assert_eq!(transformed.unwrap().1, "portfolio/about/me");
    }

    #[test]
    fn foreign_urls_are_not_ours() {
        assert_eq!(public_id_from_url("https://example.com/image/upload/v1/a.png", "demo"), None);
        assert_eq!(
            public_id_from_url("https://res.cloudinary.com/other/image/upload/v1/a.png", "demo"),
            None
        );
        assert_eq!(public_id_from_url("not a url", "demo"), None);
    }

    #[test]
    fn signature_sorts_params_and_skips_empty_values() {
        let a = sign_params(&[("timestamp", "1315060510"), ("public_id", "sample"), ("eager", "")], "abcd");
        let b = sign_params(&[("public_id", "sample"), ("timestamp", "1315060510")], "abcd");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);

        let mut hasher = Sha256::new();
        hasher.update(b"public_id=sample&timestamp=1315060510abcd");
        assert_eq!(a, hex::encode(hasher.finalize()));
    }
}
