use actix_web::{get, web, HttpResponse, Responder};
use serde_json::json;

use crate::AppState;

/// Service banner listing the public entry points.
#[get("/")]
pub async fn home(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "service": "portfolio-cms",
        "version": env!("CARGO_PKG_VERSION"),
        "storage": state.storage_backend(),
        "endpoints": ["/api/health", "/api/about", "/api/projects", "/api/skills", "/api/experience"],
    }))
}
