use crate::entities::upload::UploadedFile;
use crate::storage::UploadError;

const MIB: usize = 1024 * 1024;

const IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];
const ICON_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp", "image/gif"];
const RESUME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/webp",
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// Container formats `infer` may report for Word documents it cannot look inside.
const DOCUMENT_CONTAINERS: &[&str] = &["application/zip", "application/x-ole-storage"];

/// Where an uploaded file is headed. Each destination carries its own policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadDestination {
    ProjectImage,
    SkillIcon,
    AboutProfileImage,
    AboutResume,
}

#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub folder: &'static str,
    pub prefix: &'static str,
    pub max_file_size_bytes: usize,
    pub allowed_mime_types: &'static [&'static str],
}

/// The content type and extension the file will be stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedFile {
    pub content_type: &'static str,
    pub extension: &'static str,
}

impl UploadDestination {
    pub fn policy(&self) -> UploadPolicy {
        match self {
            UploadDestination::ProjectImage => UploadPolicy {
                folder: "portfolio/projects",
                prefix: "project",
                max_file_size_bytes: 5 * MIB,
                allowed_mime_types: IMAGE_TYPES,
            },
            UploadDestination::SkillIcon => UploadPolicy {
                folder: "portfolio/skills",
                prefix: "skill",
                max_file_size_bytes: MIB,
                allowed_mime_types: ICON_TYPES,
            },
            UploadDestination::AboutProfileImage => UploadPolicy {
                folder: "portfolio/about",
                prefix: "about_profile",
                max_file_size_bytes: 5 * MIB,
                allowed_mime_types: IMAGE_TYPES,
            },
            UploadDestination::AboutResume => UploadPolicy {
                folder: "portfolio/resumes",
                prefix: "about_resume",
                max_file_size_bytes: 10 * MIB,
                allowed_mime_types: RESUME_TYPES,
            },
        }
    }
}

impl UploadPolicy {
    /// Checks size and type before any byte leaves the process. A declared type
    /// outside the allowed set is refused outright; the stored type is then taken
    /// from the file content, falling back to the declared type only for Word
    /// documents that sniff as a generic container.
    pub fn check(&self, file: &UploadedFile) -> Result<AcceptedFile, UploadError> {
        if file.is_empty() {
            return Err(UploadError::EmptyFile);
        }
        if file.len() > self.max_file_size_bytes {
            return Err(UploadError::PayloadTooLarge(human_size(self.max_file_size_bytes)));
        }

        let sniffed = infer::get(&file.bytes).map(|kind| kind.mime_type());
        let declared = file
            .content_type
            .as_deref()
            .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase());

        if let Some(declared) = declared.as_deref().filter(|d| !self.allows(d)) {
            return Err(self.unsupported(Some(declared)));
        }

        let content_type = match sniffed {
            Some(mime) if self.allows(mime) => mime,
            sniffed if sniffed.is_none_or(|mime| DOCUMENT_CONTAINERS.contains(&mime)) => {
                match declared.as_deref().and_then(|d| self.allowed_document(d)) {
                    Some(doc) => doc,
                    None => return Err(self.unsupported(sniffed.or(declared.as_deref()))),
                }
            }
            other => return Err(self.unsupported(other)),
        };

        Ok(AcceptedFile {
            content_type: self.canonical(content_type),
            extension: extension_for(content_type),
        })
    }

    fn allows(&self, mime: &str) -> bool {
        self.allowed_mime_types.contains(&mime)
    }

    fn allowed_document(&self, declared: &str) -> Option<&'static str> {
        self.allowed_mime_types
            .iter()
            .copied()
            .find(|allowed| *allowed == declared && allowed.starts_with("application/"))
    }

    fn canonical(&self, mime: &str) -> &'static str {
        self.allowed_mime_types
            .iter()
            .copied()
            .find(|allowed| *allowed == mime)
            .unwrap_or("application/octet-stream")
    }

    fn unsupported(&self, found: Option<&str>) -> UploadError {
        UploadError::UnsupportedType(format!(
            "{} (allowed: {})",
            found.unwrap_or("unknown"),
            self.allowed_mime_types.join(", ")
        ))
    }
}

fn extension_for(mime: &str) -> &'static str {
    match mime {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "application/pdf" => "pdf",
        "application/msword" => "doc",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => "docx",
        _ => "bin",
    }
}

fn human_size(bytes: usize) -> String {
    if bytes % MIB == 0 {
        format!("{} MiB", bytes / MIB)
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];
    const GIF: &[u8] = b"GIF89a\x01\x00\x01\x00";
    const PDF: &[u8] = b"%PDF-1.7\n%\xE2\xE3\xCF\xD3\n";

    fn file(bytes: &[u8], content_type: &str) -> UploadedFile {
        UploadedFile {
            file_name: Some("upload".into()),
            content_type: Some(content_type.into()),
            bytes: bytes.to_vec(),
        }
    }

    #[test]
    fn project_image_accepts_png() {
        let accepted = UploadDestination::ProjectImage.policy().check(&file(PNG, "image/png")).unwrap();
        assert_eq!(accepted, AcceptedFile { content_type: "image/png", extension: "png" });
    }

    #[test]
    fn content_wins_over_declared_type() {
        let disguised = file(b"<?php echo 'hi'; ?>", "image/png");
        assert!(matches!(
            UploadDestination::ProjectImage.policy().check(&disguised),
            Err(UploadError::UnsupportedType(_))
        ));
    }

    #[test]
    fn declared_type_outside_the_class_is_refused() {
        for declared in ["text/plain", "application/pdf"] {
            assert!(matches!(
                UploadDestination::ProjectImage.policy().check(&file(PNG, declared)),
                Err(UploadError::UnsupportedType(found)) if found.starts_with(declared)
            ));
        }
    }

    #[test]
    fn declared_type_parameters_are_ignored() {
        let png = file(PNG, "Image/PNG; charset=binary");
        assert!(UploadDestination::ProjectImage.policy().check(&png).is_ok());
    }

    #[test]
    fn gif_only_allowed_for_icons() {
        assert!(UploadDestination::SkillIcon.policy().check(&file(GIF, "image/gif")).is_ok());
        assert!(UploadDestination::ProjectImage.policy().check(&file(GIF, "image/gif")).is_err());
    }

    #[test]
    fn resume_accepts_pdf_but_profile_image_does_not() {
        let pdf = file(PDF, "application/pdf");
        let accepted = UploadDestination::AboutResume.policy().check(&pdf).unwrap();
        assert_eq!(accepted.extension, "pdf");
        assert!(UploadDestination::AboutProfileImage.policy().check(&pdf).is_err());
    }

    #[test]
    fn size_and_emptiness_are_enforced() {
        let policy = UploadDestination::SkillIcon.policy();
        assert!(matches!(policy.check(&file(&[], "image/png")), Err(UploadError::EmptyFile)));

        let mut big = PNG.to_vec();
        big.resize(MIB + 1, 0);
        assert!(matches!(
            policy.check(&file(&big, "image/png")),
            Err(UploadError::PayloadTooLarge(limit)) if limit == "1 MiB"
        ));
    }
}
