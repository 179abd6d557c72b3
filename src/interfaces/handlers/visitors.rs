use actix_web::{http::header, web, HttpRequest, HttpResponse, Responder};
use tracing::instrument;

use crate::errors::AppError;
use crate::utils::get_client_ip::get_client_ip;
use crate::AppState;

#[instrument(skip(req, state))]
pub async fn record_visit(req: HttpRequest, state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let ip = get_client_ip(&req, state.trust_proxy);
    let user_agent = req
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let total = state.visitor_handler.record_visit(&ip, user_agent).await?;
    Ok(HttpResponse::Ok().json(total))
}

#[instrument(skip(state))]
pub async fn total_visitors(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(state.visitor_handler.total().await?))
}
