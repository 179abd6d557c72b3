use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::entities::fields::{check_entity, null_as_default, trim_optional, trim_required};
use crate::entities::option_fields::PatchString;
use crate::errors::AppError;
use crate::utils::sanitize::{is_blank_html, sanitize_html};

// ───── Database Models ───────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow, Validate)]
pub struct SocialLinks {
    #[serde(default)]
    #[validate(url(message = "GitHub link must be a valid URL"))]
    pub github: Option<String>,

    #[serde(default)]
    #[validate(url(message = "LinkedIn link must be a valid URL"))]
    pub linkedin: Option<String>,

    #[serde(default)]
    #[validate(url(message = "Twitter link must be a valid URL"))]
    pub twitter: Option<String>,
}

impl SocialLinks {
    fn normalize(&mut self) {
        trim_optional(&mut self.github);
        trim_optional(&mut self.linkedin);
        trim_optional(&mut self.twitter);
    }
}

/// The single "about me" record. The table carries a `singleton` column with a
/// unique constraint, so a second insert fails at the storage layer.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow, Validate)]
#[serde(rename_all = "camelCase")]
pub struct About {
    pub id: Uuid,

    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,

    #[validate(custom(function = "validate_description"))]
    pub description: String,

    #[validate(email(message = "A valid contact email is required"))]
    pub contact_email: String,

    pub profile_image: Option<String>,
    pub resume_link: Option<String>,

    #[sqlx(flatten)]
    #[validate(nested)]
    pub social_links: SocialLinks,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl About {
    /// Trims text fields and sanitizes the rich-text description.
    pub fn normalize(&mut self) {
        trim_required(&mut self.name);
        trim_required(&mut self.title);
        trim_required(&mut self.contact_email);
        self.description = sanitize_html(self.description.trim());
        trim_optional(&mut self.profile_image);
        trim_optional(&mut self.resume_link);
        self.social_links.normalize();
    }

    /// Blob references this record owns.
    pub fn blob_refs(&self) -> Vec<String> {
        self.profile_image
            .iter()
            .chain(self.resume_link.iter())
            .cloned()
            .collect()
    }
}

fn validate_description(description: &str) -> Result<(), ValidationError> {
    if is_blank_html(description) {
        let mut err = ValidationError::new("required");
        err.message = Some("Description is required".into());
        return Err(err);
    }
    Ok(())
}

// ───── Input & Validation ───────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAbout {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub contact_email: String,

    #[serde(default)]
    pub profile_image: Option<String>,

    #[serde(default)]
    pub resume_link: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub social_links: SocialLinks,
}

impl TryFrom<NewAbout> for About {
    type Error = AppError;

    fn try_from(new: NewAbout) -> Result<Self, Self::Error> {
        let now = Utc::now();
        let mut about = About {
            id: Uuid::new_v4(),
            name: new.name,
            title: new.title,
            description: new.description,
            contact_email: new.contact_email,
            profile_image: new.profile_image,
            resume_link: new.resume_link,
            social_links: new.social_links,
            created_at: now,
            updated_at: now,
        };
        about.normalize();
        check_entity(&about, &[])?;
        Ok(about)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SocialLinksPatch {
    #[serde(default)]
    pub github: PatchString,

    #[serde(default)]
    pub linkedin: PatchString,

    #[serde(default)]
    pub twitter: PatchString,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutPatch {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub contact_email: Option<String>,

    #[serde(default)]
    pub profile_image: PatchString,

    #[serde(default)]
    pub resume_link: PatchString,

    #[serde(default)]
    pub social_links: Option<SocialLinksPatch>,
}

impl AboutPatch {
    pub fn apply(self, current: &About) -> Result<About, AppError> {
        let mut about = current.clone();
        if let Some(name) = self.name {
            about.name = name;
        }
        if let Some(title) = self.title {
            about.title = title;
        }
        if let Some(description) = self.description {
            about.description = description;
        }
        if let Some(contact_email) = self.contact_email {
            about.contact_email = contact_email;
        }
        self.profile_image.apply_to(&mut about.profile_image);
        self.resume_link.apply_to(&mut about.resume_link);
        if let Some(links) = self.social_links {
            links.github.apply_to(&mut about.social_links.github);
            links.linkedin.apply_to(&mut about.social_links.linkedin);
            links.twitter.apply_to(&mut about.social_links.twitter);
        }
        about.updated_at = Utc::now();

        about.normalize();
        check_entity(&about, &[])?;
        Ok(about)
    }

    /// Upsert path: with no stored record the patch has to stand on its own.
    pub fn into_new(self) -> NewAbout {
        let links = self.social_links.unwrap_or_default();
        NewAbout {
            name: self.name.unwrap_or_default(),
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            contact_email: self.contact_email.unwrap_or_default(),
            profile_image: self.profile_image.into_value(),
            resume_link: self.resume_link.into_value(),
            social_links: SocialLinks {
                github: links.github.into_value(),
                linkedin: links.linkedin.into_value(),
                twitter: links.twitter.into_value(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NewAbout {
        NewAbout {
            name: "Jane Doe".into(),
            title: "Full Stack Developer".into(),
            description: "<p>I build things<script>alert(1)</script></p>".into(),
            contact_email: "jane@example.com".into(),
            social_links: SocialLinks {
                github: Some("https://github.com/jane".into()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn description_is_sanitized() {
        let about = About::try_from(sample()).unwrap();
        assert_eq!(about.description, "<p>I build things</p>");
    }

    #[test]
    fn rejects_invalid_email_and_links() {
        let err = About::try_from(NewAbout {
            contact_email: "not-an-email".into(),
            social_links: SocialLinks {
                twitter: Some("twitter handle".into()),
                ..Default::default()
            },
            ..sample()
        })
        .unwrap_err();

        match err {
            AppError::ValidationError(fields) => {
                let names: Vec<_> = fields.iter().map(|f| f.field.as_str()).collect();
                assert_eq!(names, vec!["contact_email", "social_links.twitter"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_editor_output_is_missing_description() {
        let err = About::try_from(NewAbout { description: "<p><br></p>".into(), ..sample() }).unwrap_err();
        assert_eq!(err.message(), "Description is required");
    }

    #[test]
    fn patch_keeps_unmentioned_links() {
        let about = About::try_from(sample()).unwrap();
        let patch: AboutPatch =
            serde_json::from_str(r#"{"socialLinks":{"linkedin":"https://linkedin.com/in/jane"}}"#).unwrap();
        let updated = patch.apply(&about).unwrap();
        assert_eq!(updated.social_links.github.as_deref(), Some("https://github.com/jane"));
        assert_eq!(updated.social_links.linkedin.as_deref(), Some("https://linkedin.com/in/jane"));
    }

    #[test]
    fn patch_without_record_requires_fields() {
        let patch = AboutPatch { name: Some("Jane".into()), ..Default::default() };
        assert!(About::try_from(patch.into_new()).is_err());
    }
}
