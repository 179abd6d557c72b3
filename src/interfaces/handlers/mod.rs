pub mod about;
pub mod auth;
pub mod experience;
pub mod home;
pub mod json_error;
pub mod payload;
pub mod projects;
pub mod skills;
pub mod system;
pub mod uploads;
pub mod visitors;

use actix_web::HttpResponse;
use serde::Deserialize;

/// `?sort=<key>` on list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct SortQuery {
    pub sort: Option<String>,
}

impl SortQuery {
    pub fn parse<S>(&self) -> Result<S, crate::errors::AppError>
    where
        S: std::str::FromStr<Err = crate::errors::AppError> + Default,
    {
        match self.sort.as_deref() {
            Some(key) => key.parse(),
            None => Ok(S::default()),
        }
    }
}

pub(crate) fn msg(message: &str) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "msg": message }))
}
