use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::entities::fields::{
    check_entity, normalize_technologies, null_as_default, optional_bool_like, optional_date,
    parse_date, trim_optional, trim_required,
};
use crate::entities::option_fields::{OptionField, PatchString};
use crate::errors::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_date_order", skip_on_field_errors = false))]
pub struct Experience {
    pub id: Uuid,

    #[validate(length(min = 1, message = "Company is required"))]
    pub company: String,

    #[validate(length(min = 1, message = "Position is required"))]
    pub position: String,

    pub location: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,

    #[sqlx(rename = "is_current")]
    pub current: bool,

    pub description: Option<String>,
    pub technologies: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Experience {
    /// A current position never carries an end date.
    pub fn normalize(&mut self) {
        trim_required(&mut self.company);
        trim_required(&mut self.position);
        trim_optional(&mut self.location);
        trim_optional(&mut self.description);
        normalize_technologies(&mut self.technologies);
        if self.current {
            self.end_date = None;
        }
    }
}

/// Parses a submitted end date. Only called for past positions, since a current
/// one discards whatever end date was sent.
fn parse_end_date(raw: &str) -> Result<Option<NaiveDate>, AppError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse_date(raw)
        .map(Some)
        .ok_or_else(|| AppError::invalid_field("end_date", "End date must be a valid date"))
}

fn validate_date_order(experience: &Experience) -> Result<(), ValidationError> {
    match experience.end_date {
        Some(end) if end < experience.start_date => {
            let mut err = ValidationError::new("date_order");
            err.message = Some("End date cannot be before start date".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExperience {
    #[serde(default, deserialize_with = "null_as_default")]
    pub company: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub position: String,

    #[serde(default)]
    pub location: Option<String>,

    #[serde(default, deserialize_with = "optional_date")]
    pub start_date: Option<NaiveDate>,

    /// Raw until `current` is known.
    #[serde(default)]
    pub end_date: Option<String>,

    #[serde(default, deserialize_with = "optional_bool_like")]
    pub current: Option<bool>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub technologies: Vec<String>,
}

impl TryFrom<NewExperience> for Experience {
    type Error = AppError;

    fn try_from(new: NewExperience) -> Result<Self, Self::Error> {
        let now = Utc::now();
        let current = new.current.unwrap_or(false);
        let end_date = match new.end_date.as_deref() {
            Some(raw) if !current => parse_end_date(raw)?,
            _ => None,
        };
        let mut experience = Experience {
            id: Uuid::new_v4(),
            company: new.company,
            position: new.position,
            location: new.location,
            start_date: new.start_date.unwrap_or_default(),
            end_date,
            current,
            description: new.description,
            technologies: new.technologies,
            created_at: now,
            updated_at: now,
        };
        experience.normalize();

        let missing: &[(&'static str, &'static str)] = if new.start_date.is_none() {
            &[("start_date", "Start date is required")]
        } else {
            &[]
        };
        check_entity(&experience, missing)?;
        Ok(experience)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperiencePatch {
    #[serde(default)]
    pub company: Option<String>,

    #[serde(default)]
    pub position: Option<String>,

    #[serde(default)]
    pub location: PatchString,

    #[serde(default, deserialize_with = "optional_date")]
    pub start_date: Option<NaiveDate>,

    #[serde(default)]
    pub end_date: PatchString,

    #[serde(default, deserialize_with = "optional_bool_like")]
    pub current: Option<bool>,

    #[serde(default)]
    pub description: PatchString,

    #[serde(default)]
    pub technologies: Option<Vec<String>>,
}

impl ExperiencePatch {
    pub fn apply(self, current: &Experience) -> Result<Experience, AppError> {
        let mut experience = current.clone();
        if let Some(company) = self.company {
            experience.company = company;
        }
        if let Some(position) = self.position {
            experience.position = position;
        }
        self.location.apply_to(&mut experience.location);
        if let Some(start_date) = self.start_date {
            experience.start_date = start_date;
        }
        if let Some(is_current) = self.current {
            experience.current = is_current;
        }
        if !experience.current {
            let end_date = match self.end_date {
                OptionField::SetToValue(raw) => OptionField::from(parse_end_date(&raw)?),
                OptionField::SetToNull => OptionField::SetToNull,
                OptionField::Unchanged => OptionField::Unchanged,
            };
            end_date.apply_to(&mut experience.end_date);
        }
        self.description.apply_to(&mut experience.description);
        if let Some(technologies) = self.technologies {
            experience.technologies = technologies;
        }
        experience.updated_at = Utc::now();

        experience.normalize();
        check_entity(&experience, &[])?;
        Ok(experience)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExperienceSort {
    #[default]
    Newest,
    StartDate,
}

impl ExperienceSort {
    pub fn order_by(&self) -> &'static str {
        match self {
            ExperienceSort::Newest => "created_at DESC",
            ExperienceSort::StartDate => "is_current DESC, start_date DESC",
        }
    }
}

impl FromStr for ExperienceSort {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "newest" => Ok(ExperienceSort::Newest),
            "start_date" | "startdate" => Ok(ExperienceSort::StartDate),
            other => Err(AppError::BadRequest(format!("Unknown sort key: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> NewExperience {
        NewExperience {
            company: "Acme".into(),
            position: "Engineer".into(),
            start_date: Some(date(2023, 1, 15)),
            ..Default::default()
        }
    }

    #[test]
    fn current_position_drops_end_date() {
        let experience = Experience::try_from(NewExperience {
            current: Some(true),
            end_date: Some("2024-01-01".into()),
            ..sample()
        })
        .unwrap();
        assert!(experience.current);
        assert_eq!(experience.end_date, None);
    }

    #[test]
    fn patching_to_current_clears_end_date() {
        let experience = Experience::try_from(NewExperience {
            end_date: Some("2024-01-01".into()),
            ..sample()
        })
        .unwrap();
        assert_eq!(experience.end_date, Some(date(2024, 1, 1)));

        let patch: ExperiencePatch = serde_json::from_str(r#"{"current":"true"}"#).unwrap();
        let updated = patch.apply(&experience).unwrap();
        assert_eq!(updated.end_date, None);
    }

    #[test]
    fn end_date_cannot_precede_start_date() {
        let err = Experience::try_from(NewExperience {
            end_date: Some("2022-12-31".into()),
            ..sample()
        })
        .unwrap_err();
        assert_eq!(err.message(), "End date cannot be before start date");
    }

    #[test]
    fn start_date_is_required() {
        let err = Experience::try_from(NewExperience { start_date: None, ..sample() }).unwrap_err();
        assert_eq!(err.message(), "Start date is required");
    }

    #[test]
    fn timestamps_are_accepted_as_dates() {
        let new: NewExperience = serde_json::from_str(
            r#"{"company":"Acme","position":"Dev","startDate":"2023-01-15T00:00:00.000Z","endDate":"2024-02-01T12:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(new.start_date, Some(date(2023, 1, 15)));

        let experience = Experience::try_from(new).unwrap();
        assert_eq!(experience.end_date, Some(date(2024, 2, 1)));
    }

    #[test]
    fn blank_end_date_is_open_ended() {
        let experience = Experience::try_from(NewExperience {
            end_date: Some("  ".into()),
            ..sample()
        })
        .unwrap();
        assert_eq!(experience.end_date, None);
    }

    #[test]
    fn end_date_is_ignored_for_a_current_position() {
        let new: NewExperience = serde_json::from_str(
            r#"{"company":"Acme","position":"Dev","startDate":"2023-01-15","endDate":"someday","current":"true"}"#,
        )
        .unwrap();
        let experience = Experience::try_from(new).unwrap();
        assert_eq!(experience.end_date, None);

        let patch: ExperiencePatch = serde_json::from_str(r#"{"endDate":"not a date"}"#).unwrap();
        assert!(patch.apply(&experience).unwrap().end_date.is_none());
    }

    #[test]
    fn malformed_end_date_of_a_past_position_is_reported() {
        let err = Experience::try_from(NewExperience {
            end_date: Some("someday".into()),
            ..sample()
        })
        .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(ref fields) if fields[0].field == "end_date"));
    }

    #[test]
    fn patch_null_end_date_reopens_a_past_position() {
        let experience = Experience::try_from(NewExperience {
            end_date: Some("2024-01-01".into()),
            ..sample()
        })
        .unwrap();
        let patch: ExperiencePatch = serde_json::from_str(r#"{"endDate":null}"#).unwrap();
        assert_eq!(patch.apply(&experience).unwrap().end_date, None);
    }
}
