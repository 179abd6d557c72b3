use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::entities::project::{NewProject, ProjectPatch, ProjectSort};
use crate::errors::AppError;
use crate::handlers::payload::{EntityPayload, FormParts, FromForm};
use crate::handlers::{msg, SortQuery};
use crate::use_cases::extractors::AuthClaims;
use crate::utils::valid_uuid::valid_uuid;
use crate::AppState;

impl FromForm for NewProject {
    fn from_form(form: &FormParts) -> Result<Self, AppError> {
        form.body().json::<Vec<String>>("technologies")?.parse()
    }
}

impl FromForm for ProjectPatch {
    fn from_form(form: &FormParts) -> Result<Self, AppError> {
        form.body().json::<Vec<String>>("technologies")?.parse()
    }
}

#[instrument(skip(state))]
pub async fn list_projects(
    state: web::Data<AppState>,
    query: web::Query<SortQuery>,
) -> Result<impl Responder, AppError> {
    let sort: ProjectSort = query.parse()?;
    let projects = state.project_handler.list(sort).await?;
    Ok(HttpResponse::Ok().json(projects))
}

#[instrument(skip(state))]
pub async fn get_project(
    project_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let id = valid_uuid(&project_id)?;
    let project = state.project_handler.get(id).await?;
    Ok(HttpResponse::Ok().json(project))
}

#[instrument(skip(_claims, state, payload))]
pub async fn create_project(
    _claims: AuthClaims,
    state: web::Data<AppState>,
    mut payload: EntityPayload<NewProject>,
) -> Result<impl Responder, AppError> {
    let image = payload.take_file("image");
    let project = state.project_handler.create(payload.data, image).await?;
    Ok(HttpResponse::Created().json(project))
}

#[instrument(skip(_claims, state, payload))]
pub async fn update_project(
    _claims: AuthClaims,
    project_id: web::Path<String>,
    state: web::Data<AppState>,
    mut payload: EntityPayload<ProjectPatch>,
) -> Result<impl Responder, AppError> {
    let id = valid_uuid(&project_id)?;
    let image = payload.take_file("image");
    let project = state.project_handler.update(id, payload.data, image).await?;
    Ok(HttpResponse::Ok().json(project))
}

#[instrument(skip(claims, state))]
pub async fn delete_project(
    claims: AuthClaims,
    project_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let id = valid_uuid(&project_id)?;
    state.project_handler.delete(id).await?;
    tracing::info!(admin = claims.username(), %id, "Project deleted");
    Ok(msg("Project deleted"))
}
