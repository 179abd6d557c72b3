use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::entities::about::{AboutPatch, NewAbout, SocialLinks, SocialLinksPatch};
use crate::errors::AppError;
use crate::handlers::msg;
use crate::handlers::payload::{EntityPayload, FormParts, FromForm};
use crate::use_cases::about::AboutFiles;
use crate::use_cases::extractors::AuthClaims;
use crate::AppState;

impl FromForm for NewAbout {
    fn from_form(form: &FormParts) -> Result<Self, AppError> {
        form.body().json::<SocialLinks>("socialLinks")?.parse()
    }
}

impl FromForm for AboutPatch {
    fn from_form(form: &FormParts) -> Result<Self, AppError> {
        form.body().json::<SocialLinksPatch>("socialLinks")?.parse()
    }
}

fn take_files<T>(payload: &mut EntityPayload<T>) -> AboutFiles {
    AboutFiles {
        profile_image: payload.take_file("profileImage"),
        resume: payload.take_file("resume"),
    }
}

#[instrument(skip(state))]
pub async fn get_about(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(state.about_handler.get().await?))
}

#[instrument(skip(_claims, state, payload))]
pub async fn create_about(
    _claims: AuthClaims,
    state: web::Data<AppState>,
    mut payload: EntityPayload<NewAbout>,
) -> Result<impl Responder, AppError> {
    let files = take_files(&mut payload);
    let about = state.about_handler.create(payload.data, files).await?;
    Ok(HttpResponse::Created().json(about))
}

#[instrument(skip(_claims, state, payload))]
pub async fn update_about(
    _claims: AuthClaims,
    state: web::Data<AppState>,
    mut payload: EntityPayload<AboutPatch>,
) -> Result<impl Responder, AppError> {
    let files = take_files(&mut payload);
    let about = state.about_handler.update(payload.data, files).await?;
    Ok(HttpResponse::Ok().json(about))
}

#[instrument(skip(claims, state))]
pub async fn delete_about(
    claims: AuthClaims,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    state.about_handler.delete().await?;
    tracing::info!(admin = claims.username(), "About record deleted");
    Ok(msg("About info deleted successfully"))
}
