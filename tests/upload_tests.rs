#[macro_use]
mod test_utils;

use std::sync::Arc;

use actix_web::{http::StatusCode, test, web, App};
use chrono::Duration;
use serde_json::Value;

use portfolio_cms::{
    auth::jwt::JwtService,
    entities::{experience::Experience, project::Project, skill::Skill},
    middlewares::auth::AuthMiddleware,
    routes::configure_routes,
    shared_repos::SharedRepositories,
    storage::disk::DiskBlobStore,
    AppState,
};
use test_utils::{
    MemoryAbout, MemoryAdmins, MemoryTable, MemoryVisitors, MultipartBody, TestContext, JWT_SECRET,
    PNG_BYTES,
};

/// Same wiring as the server with the disk backend rooted at `dir`.
fn disk_state(dir: &std::path::Path) -> (web::Data<AppState>, Arc<MemoryTable<Project>>) {
    let projects = Arc::new(MemoryTable::<Project>::default());
    let repos = SharedRepositories {
        admin_repo: Arc::new(MemoryAdmins::default()),
        about_repo: Arc::new(MemoryAbout::default()),
        project_repo: projects.clone(),
        skill_repo: Arc::new(MemoryTable::<Skill>::default()),
        experience_repo: Arc::new(MemoryTable::<Experience>::default()),
        visitor_repo: Arc::new(MemoryVisitors::default()),
    };
    let jwt = JwtService::from_secret(JWT_SECRET, Duration::minutes(30));
    let state = AppState::from_parts(repos, Arc::new(DiskBlobStore::new(dir, "")), Arc::new(jwt))
        .with_uploads_dir(dir.to_path_buf());
    (web::Data::new(state), projects)
}

#[actix_web::test]
async fn disk_uploads_are_served_back_and_removed_with_their_project() {
    let dir = tempfile::tempdir().unwrap();
    let (state, projects) = disk_state(dir.path());
    let token_ctx = TestContext::new();
    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .wrap(AuthMiddleware)
            .configure(configure_routes),
    )
    .await;

    // The token is signed with the shared test secret, so any context can issue it
    let (content_type, body) = MultipartBody::new()
        .text("title", "Portfolio")
        .text("description", "Personal site")
        .file("image", "shot.png", "image/png", PNG_BYTES)
        .finish();
    let req = test::TestRequest::post()
        .uri("/api/projects")
        .insert_header(token_ctx.bearer())
        .insert_header(("Content-Type", content_type))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let project: Value = test::read_body_json(resp).await;

    let image = project["image"].as_str().unwrap().to_string();
    assert!(image.starts_with("/uploads/portfolio/projects/project_"));
    assert!(image.ends_with(".png"));
    assert_eq!(projects.len(), 1);

    let req = test::TestRequest::get().uri(&image).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("content-type").unwrap(), "image/png");
    assert_eq!(test::read_body(resp).await.as_ref(), PNG_BYTES);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/projects/{}", project["id"].as_str().unwrap()))
        .insert_header(token_ctx.bearer())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri(&image).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn upload_paths_cannot_escape_the_root() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _) = disk_state(dir.path());
    let app = test::init_service(App::new().app_data(state).configure(configure_routes)).await;

    let req = test::TestRequest::get().uri("/uploads/../Cargo.toml").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn uploads_route_is_inert_for_remote_storage() {
    let ctx = TestContext::new();
    let app = test_app!(ctx);

    let req = test::TestRequest::get().uri("/uploads/portfolio/projects/x.png").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}
