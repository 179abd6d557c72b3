use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::entities::experience::{ExperiencePatch, ExperienceSort, NewExperience};
use crate::errors::AppError;
use crate::handlers::payload::{EntityPayload, FormParts, FromForm};
use crate::handlers::{msg, SortQuery};
use crate::use_cases::extractors::AuthClaims;
use crate::utils::valid_uuid::valid_uuid;
use crate::AppState;

impl FromForm for NewExperience {
    fn from_form(form: &FormParts) -> Result<Self, AppError> {
        form.body().json::<Vec<String>>("technologies")?.parse()
    }
}

impl FromForm for ExperiencePatch {
    fn from_form(form: &FormParts) -> Result<Self, AppError> {
        form.body().json::<Vec<String>>("technologies")?.parse()
    }
}

#[instrument(skip(state))]
pub async fn list_experience(
    state: web::Data<AppState>,
    query: web::Query<SortQuery>,
) -> Result<impl Responder, AppError> {
    let sort: ExperienceSort = query.parse()?;
    Ok(HttpResponse::Ok().json(state.experience_handler.list(sort).await?))
}

#[instrument(skip(state))]
pub async fn get_experience(
    experience_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let id = valid_uuid(&experience_id)?;
    Ok(HttpResponse::Ok().json(state.experience_handler.get(id).await?))
}

#[instrument(skip(_claims, state, payload))]
pub async fn create_experience(
    _claims: AuthClaims,
    state: web::Data<AppState>,
    payload: EntityPayload<NewExperience>,
) -> Result<impl Responder, AppError> {
    let experience = state.experience_handler.create(payload.data).await?;
    Ok(HttpResponse::Created().json(experience))
}

#[instrument(skip(_claims, state, payload))]
pub async fn update_experience(
    _claims: AuthClaims,
    experience_id: web::Path<String>,
    state: web::Data<AppState>,
    payload: EntityPayload<ExperiencePatch>,
) -> Result<impl Responder, AppError> {
    let id = valid_uuid(&experience_id)?;
    let experience = state.experience_handler.update(id, payload.data).await?;
    Ok(HttpResponse::Ok().json(experience))
}

#[instrument(skip(_claims, state))]
pub async fn delete_experience(
    _claims: AuthClaims,
    experience_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let id = valid_uuid(&experience_id)?;
    state.experience_handler.delete(id).await?;
    Ok(msg("Experience deleted"))
}
