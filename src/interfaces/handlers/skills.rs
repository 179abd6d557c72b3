use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::entities::skill::{NewSkill, SkillPatch, SkillSort};
use crate::errors::AppError;
use crate::handlers::payload::{EntityPayload, FormParts, FromForm};
use crate::handlers::{msg, SortQuery};
use crate::use_cases::extractors::AuthClaims;
use crate::utils::valid_uuid::valid_uuid;
use crate::AppState;

impl FromForm for NewSkill {
    fn from_form(form: &FormParts) -> Result<Self, AppError> {
        form.body().parse()
    }
}

impl FromForm for SkillPatch {
    fn from_form(form: &FormParts) -> Result<Self, AppError> {
        form.body().parse()
    }
}

#[instrument(skip(state))]
pub async fn list_skills(
    state: web::Data<AppState>,
    query: web::Query<SortQuery>,
) -> Result<impl Responder, AppError> {
    let sort: SkillSort = query.parse()?;
    Ok(HttpResponse::Ok().json(state.skill_handler.list(sort).await?))
}

#[instrument(skip(state))]
pub async fn get_skill(
    skill_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let id = valid_uuid(&skill_id)?;
    Ok(HttpResponse::Ok().json(state.skill_handler.get(id).await?))
}

#[instrument(skip(_claims, state, payload))]
pub async fn create_skill(
    _claims: AuthClaims,
    state: web::Data<AppState>,
    mut payload: EntityPayload<NewSkill>,
) -> Result<impl Responder, AppError> {
    let icon = payload.take_file("icon");
    let skill = state.skill_handler.create(payload.data, icon).await?;
    Ok(HttpResponse::Created().json(skill))
}

#[instrument(skip(_claims, state, payload))]
pub async fn update_skill(
    _claims: AuthClaims,
    skill_id: web::Path<String>,
    state: web::Data<AppState>,
    mut payload: EntityPayload<SkillPatch>,
) -> Result<impl Responder, AppError> {
    let id = valid_uuid(&skill_id)?;
    let icon = payload.take_file("icon");
    let skill = state.skill_handler.update(id, payload.data, icon).await?;
    Ok(HttpResponse::Ok().json(skill))
}

#[instrument(skip(_claims, state))]
pub async fn delete_skill(
    _claims: AuthClaims,
    skill_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let id = valid_uuid(&skill_id)?;
    state.skill_handler.delete(id).await?;
    Ok(msg("Skill deleted"))
}
