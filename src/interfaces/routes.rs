use actix_web::web;

use crate::handlers::{
    about, auth, experience, home::home, json_error, projects, skills, system, uploads, visitors,
};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(json_error::config_extractors);
    cfg.service(home);

    cfg.service(
        web::scope("/api")
            .service(system::health_check)
            .service(
                web::scope("/auth")
                    .service(auth::login)
                    .service(auth::validate)
            )
            .service(
                web::resource("/about")
                    .route(web::get().to(about::get_about))
                    .route(web::post().to(about::create_about))
                    .route(web::put().to(about::update_about))
                    .route(web::delete().to(about::delete_about))
            )
            .service(
                web::scope("/projects")
                    .service(
                        web::resource("")
                            .route(web::get().to(projects::list_projects))
                            .route(web::post().to(projects::create_project))
                    )
                    .service(
                        web::resource("/{project_id}")
                            .route(web::get().to(projects::get_project))
                            .route(web::put().to(projects::update_project))
                            .route(web::delete().to(projects::delete_project))
                    )
            )
            .service(
                web::scope("/skills")
                    .service(
                        web::resource("")
                            .route(web::get().to(skills::list_skills))
                            .route(web::post().to(skills::create_skill))
                    )
                    .service(
                        web::resource("/{skill_id}")
                            .route(web::get().to(skills::get_skill))
                            .route(web::put().to(skills::update_skill))
                            .route(web::delete().to(skills::delete_skill))
                    )
            )
            .service(
                web::scope("/experience")
                    .service(
                        web::resource("")
                            .route(web::get().to(experience::list_experience))
                            .route(web::post().to(experience::create_experience))
                    )
                    .service(
                        web::resource("/{experience_id}")
                            .route(web::get().to(experience::get_experience))
                            .route(web::put().to(experience::update_experience))
                            .route(web::delete().to(experience::delete_experience))
                    )
            )
            .service(
                web::scope("/visitors")
                    .service(web::resource("/visit").route(web::post().to(visitors::record_visit)))
                    .service(web::resource("/total").route(web::get().to(visitors::total_visitors)))
            )
    );

    cfg.service(
        web::resource("/uploads/{path:.*}").route(web::get().to(uploads::serve_upload))
    );
}
