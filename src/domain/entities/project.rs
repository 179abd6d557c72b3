use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::entities::fields::{
    check_entity, normalize_technologies, null_as_default, optional_bool_like, trim_optional,
    trim_required,
};
use crate::entities::option_fields::PatchString;
use crate::errors::AppError;

// ───── Database Models ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,

    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    pub technologies: Vec<String>,
    pub image: Option<String>,

    #[validate(url(message = "Live demo must be a valid URL"))]
    pub live_demo: Option<String>,

    #[validate(url(message = "Source code must be a valid URL"))]
    pub source_code: Option<String>,

    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn normalize(&mut self) {
        trim_required(&mut self.title);
        trim_required(&mut self.description);
        normalize_technologies(&mut self.technologies);
        trim_optional(&mut self.image);
        trim_optional(&mut self.live_demo);
        trim_optional(&mut self.source_code);
    }
}

// ───── Input & Validation ───────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub technologies: Vec<String>,

    #[serde(default)]
    pub image: Option<String>,

    #[serde(default)]
    pub live_demo: Option<String>,

    #[serde(default)]
    pub source_code: Option<String>,

    #[serde(default, deserialize_with = "optional_bool_like")]
    pub featured: Option<bool>,
}

impl TryFrom<NewProject> for Project {
    type Error = AppError;

    fn try_from(new: NewProject) -> Result<Self, Self::Error> {
        let now = Utc::now();
        let mut project = Project {
            id: Uuid::new_v4(),
            title: new.title,
            description: new.description,
            technologies: new.technologies,
            image: new.image,
            live_demo: new.live_demo,
            source_code: new.source_code,
            featured: new.featured.unwrap_or(false),
            created_at: now,
            updated_at: now,
        };
        project.normalize();
        check_entity(&project, &[])?;
        Ok(project)
    }
}

/// Partial update. Absent keys leave the stored value untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub technologies: Option<Vec<String>>,

    #[serde(default)]
    pub image: PatchString,

    #[serde(default)]
    pub live_demo: PatchString,

    #[serde(default)]
    pub source_code: PatchString,

    #[serde(default, deserialize_with = "optional_bool_like")]
    pub featured: Option<bool>,
}

impl ProjectPatch {
    /// Applies the patch to a copy of `current`, leaving `current` as it was on failure.
    pub fn apply(self, current: &Project) -> Result<Project, AppError> {
        let mut project = current.clone();
        if let Some(title) = self.title {
            project.title = title;
        }
        if let Some(description) = self.description {
            project.description = description;
        }
        if let Some(technologies) = self.technologies {
            project.technologies = technologies;
        }
        self.image.apply_to(&mut project.image);
        self.live_demo.apply_to(&mut project.live_demo);
        self.source_code.apply_to(&mut project.source_code);
        if let Some(featured) = self.featured {
            project.featured = featured;
        }
        project.updated_at = Utc::now();

        project.normalize();
        check_entity(&project, &[])?;
        Ok(project)
    }
}

// ───── Listing ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProjectSort {
    #[default]
    Newest,
    Oldest,
    Title,
}

impl ProjectSort {
    pub fn order_by(&self) -> &'static str {
        match self {
            ProjectSort::Newest => "created_at DESC",
            ProjectSort::Oldest => "created_at ASC",
            ProjectSort::Title => "LOWER(title) ASC, created_at DESC",
        }
    }
}

impl FromStr for ProjectSort {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "newest" => Ok(ProjectSort::Newest),
            "oldest" => Ok(ProjectSort::Oldest),
            "title" => Ok(ProjectSort::Title),
            other => Err(AppError::BadRequest(format!("Unknown sort key: {}", other))),
        }
    }
}
