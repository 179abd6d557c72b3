use actix_web::{get, post, web, HttpRequest, HttpResponse};
use tracing::instrument;

use crate::entities::admin::LoginRequest;
use crate::entities::token::TokenValidity;
use crate::errors::AuthError;
use crate::use_cases::extractors::AuthClaims;
use crate::utils::get_client_ip::get_client_ip;
use crate::AppState;

#[post("/login")]
#[instrument(skip(state, req, credentials))]
pub async fn login(
    req: HttpRequest,
    state: web::Data<AppState>,
    credentials: web::Json<LoginRequest>,
) -> Result<HttpResponse, AuthError> {
    let client_ip = get_client_ip(&req, state.trust_proxy);
    if let Err(retry_after) = state.login_throttle.check(&client_ip) {
        tracing::warn!(%client_ip, retry_after, "Login throttled");
        return Err(AuthError::TooManyAttempts(retry_after));
    }

    let response = state.auth_handler.login(credentials.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Reached only with a token the middleware already accepted.
#[get("/validate")]
pub async fn validate(claims: AuthClaims) -> HttpResponse {
    tracing::debug!(admin = claims.username(), "Token validated");
    HttpResponse::Ok().json(TokenValidity { valid: true })
}
