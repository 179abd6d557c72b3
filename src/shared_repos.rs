use std::sync::Arc;

use crate::repositories::{
    about::AboutRepository,
    admin::AdminRepository,
    experience::ExperienceRepository,
    project::ProjectRepository,
    skill::SkillRepository,
    sqlx_repo::{
        SqlxAboutRepo, SqlxAdminRepo, SqlxExperienceRepo, SqlxProjectRepo, SqlxSkillRepo,
        SqlxVisitorRepo,
    },
    visitor::VisitorRepository,
};

/// One handle per table, shared by the use cases.
#[derive(Clone)]
pub struct SharedRepositories {
    pub admin_repo: Arc<dyn AdminRepository>,
    pub about_repo: Arc<dyn AboutRepository>,
    pub project_repo: Arc<dyn ProjectRepository>,
    pub skill_repo: Arc<dyn SkillRepository>,
    pub experience_repo: Arc<dyn ExperienceRepository>,
    pub visitor_repo: Arc<dyn VisitorRepository>,
}

impl SharedRepositories {
    pub fn postgres(pool: sqlx::PgPool) -> Self {
        SharedRepositories {
            admin_repo: Arc::new(SqlxAdminRepo::new(pool.clone())),
            about_repo: Arc::new(SqlxAboutRepo::new(pool.clone())),
            project_repo: Arc::new(SqlxProjectRepo::new(pool.clone())),
            skill_repo: Arc::new(SqlxSkillRepo::new(pool.clone())),
            experience_repo: Arc::new(SqlxExperienceRepo::new(pool.clone())),
            visitor_repo: Arc::new(SqlxVisitorRepo::new(pool)),
        }
    }
}
