use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::entities::fields::{
    check_entity, null_as_default, optional_int_like, trim_optional, trim_required,
};
use crate::entities::option_fields::PatchString;
use crate::errors::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: Uuid,

    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(range(min = 0, max = 100, message = "Level must be between 0 and 100"))]
    pub level: i32,

    pub category: String,
    pub icon: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Skill {
    pub fn normalize(&mut self) {
        trim_required(&mut self.name);
        trim_required(&mut self.category);
        trim_optional(&mut self.icon);
    }
}

/// Out-of-range input saturates so the range check reports it instead of an overflow.
fn level_from(raw: i64) -> i32 {
    i32::try_from(raw).unwrap_or(if raw < 0 { i32::MIN } else { i32::MAX })
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSkill {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(default, deserialize_with = "optional_int_like")]
    pub level: Option<i64>,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub icon: Option<String>,
}

impl TryFrom<NewSkill> for Skill {
    type Error = AppError;

    fn try_from(new: NewSkill) -> Result<Self, Self::Error> {
        let now = Utc::now();
        let mut skill = Skill {
            id: Uuid::new_v4(),
            name: new.name,
            level: new.level.map(level_from).unwrap_or_default(),
            category: new.category.unwrap_or_default(),
            icon: new.icon,
            created_at: now,
            updated_at: now,
        };
        skill.normalize();

        let missing: &[(&'static str, &'static str)] = if new.level.is_none() {
            &[("level", "Level is required")]
        } else {
            &[]
        };
        check_entity(&skill, missing)?;
        Ok(skill)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillPatch {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "optional_int_like")]
    pub level: Option<i64>,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub icon: PatchString,
}

impl SkillPatch {
    pub fn apply(self, current: &Skill) -> Result<Skill, AppError> {
        let mut skill = current.clone();
        if let Some(name) = self.name {
            skill.name = name;
        }
        if let Some(level) = self.level {
            skill.level = level_from(level);
        }
        if let Some(category) = self.category {
            skill.category = category;
        }
        self.icon.apply_to(&mut skill.icon);
        skill.updated_at = Utc::now();

        skill.normalize();
        check_entity(&skill, &[])?;
        Ok(skill)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SkillSort {
    #[default]
    Category,
    Name,
    Level,
}

impl SkillSort {
    pub fn order_by(&self) -> &'static str {
        match self {
            SkillSort::Category => "category ASC, level DESC, name ASC",
            SkillSort::Name => "LOWER(name) ASC",
            SkillSort::Level => "level DESC, name ASC",
        }
    }
}

impl FromStr for SkillSort {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "category" => Ok(SkillSort::Category),
            "name" => Ok(SkillSort::Name),
            "level" => Ok(SkillSort::Level),
            other => Err(AppError::BadRequest(format!("Unknown sort key: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_is_coerced_from_strings() {
        let new: NewSkill = serde_json::from_str(r#"{"name":"Rust","level":"80"}"#).unwrap();
        let skill = Skill::try_from(new).unwrap();
        assert_eq!(skill.level, 80);
        assert_eq!(skill.category, "");
    }

    #[test]
    fn level_is_required_and_bounded() {
        let missing = Skill::try_from(NewSkill { name: "Rust".into(), ..Default::default() });
        assert_eq!(missing.unwrap_err().message(), "Level is required");

        let too_high = Skill::try_from(NewSkill {
            name: "Rust".into(),
            level: Some(101),
            ..Default::default()
        });
        assert_eq!(too_high.unwrap_err().message(), "Level must be between 0 and 100");

        let overflow = Skill::try_from(NewSkill {
            name: "Rust".into(),
            level: Some(i64::MAX),
            ..Default::default()
        });
        assert!(overflow.is_err());
    }

    #[test]
    fn patch_changes_only_level() {
        let skill = Skill::try_from(NewSkill {
            name: "Rust".into(),
            level: Some(80),
            category: Some("Backend".into()),
            icon: Some("rust.svg".into()),
        })
        .unwrap();

        let patch: SkillPatch = serde_json::from_str(r#"{"level":95}"#).unwrap();
        let updated = patch.apply(&skill).unwrap();
        assert_eq!(updated.level, 95);
        assert_eq!(updated.name, "Rust");
        assert_eq!(updated.category, "Backend");
        assert_eq!(updated.icon.as_deref(), Some("rust.svg"));
        assert_eq!(updated.created_at, skill.created_at);
    }
}
