use std::{path::PathBuf, sync::Arc, time::Duration};

mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;
pub mod shared_repos;

pub use domain::{entities, password, use_cases};
pub use interfaces::{handlers, repositories, middlewares, routes};
pub use infrastructure::{auth, db, limiter, storage, utils};

use auth::jwt::JwtService;
use limiter::rate_limiter::LoginThrottle;
use repositories::token::TokenService;
use settings::{AppConfig, StorageBackend};
use shared_repos::SharedRepositories;
use storage::{cloudinary::CloudinaryStore, disk::DiskBlobStore, BlobStore, MediaUploader};
use use_cases::{
    about::AboutHandler, auth::AuthHandler, experience::ExperienceHandler,
    projects::ProjectHandler, skills::SkillHandler, visitors::VisitorHandler,
};

pub struct AppState {
    pub auth_handler: AuthHandler,
    pub about_handler: AboutHandler,
    pub project_handler: ProjectHandler,
    pub skill_handler: SkillHandler,
    pub experience_handler: ExperienceHandler,
    pub visitor_handler: VisitorHandler,
    pub login_throttle: LoginThrottle,
    /// Set when uploads are kept on local disk and served by this process.
    pub uploads_dir: Option<PathBuf>,
    pub trust_proxy: bool,
}

impl AppState {
    pub fn new(config: &AppConfig, pool: sqlx::PgPool) -> Result<Self, errors::AppError> {
        let blob_store: Arc<dyn BlobStore> = match config.storage_backend {
            StorageBackend::Disk => {
                Arc::new(DiskBlobStore::new(&config.uploads_dir, &config.public_base_url))
            }
            StorageBackend::Cloudinary => {
                let (cloud, key, secret) = config.cloudinary_credentials().ok_or_else(|| {
                    errors::AppError::InternalError("Cloudinary credentials are not configured".to_string())
                })?;
                Arc::new(CloudinaryStore::new(cloud, key, secret))
            }
        };

        let state = AppState::from_parts(
            SharedRepositories::postgres(pool),
            blob_store,
            Arc::new(JwtService::new(config)),
        )
        .with_login_throttle(LoginThrottle::new(
            config.login_max_attempts,
            Duration::from_secs(config.login_refill_seconds),
        ))
        .with_trust_proxy(config.trust_proxy);

        Ok(match config.storage_backend {
            StorageBackend::Disk => state.with_uploads_dir(config.uploads_dir.clone()),
            StorageBackend::Cloudinary => state,
        })
    }

    /// Wires the use cases over any repository and blob store implementations.
    pub fn from_parts(
        repos: SharedRepositories,
        blob_store: Arc<dyn BlobStore>,
        token_service: Arc<dyn TokenService>,
    ) -> Self {
        let uploader = MediaUploader::new(blob_store);

        AppState {
            auth_handler: AuthHandler::new(repos.admin_repo, token_service),
            about_handler: AboutHandler::new(repos.about_repo, uploader.clone()),
            project_handler: ProjectHandler::new(repos.project_repo, uploader.clone()),
            skill_handler: SkillHandler::new(repos.skill_repo, uploader),
            experience_handler: ExperienceHandler::new(repos.experience_repo),
            visitor_handler: VisitorHandler::new(repos.visitor_repo),
            login_throttle: LoginThrottle::new(10, Duration::from_secs(6)),
            uploads_dir: None,
            trust_proxy: false,
        }
    }

    pub fn with_login_throttle(mut self, throttle: LoginThrottle) -> Self {
        self.login_throttle = throttle;
        self
    }

    pub fn with_uploads_dir(mut self, dir: PathBuf) -> Self {
        self.uploads_dir = Some(dir);
        self
    }

    pub fn with_trust_proxy(mut self, trust: bool) -> Self {
        self.trust_proxy = trust;
        self
    }

    pub fn storage_backend(&self) -> &'static str {
        self.project_handler.uploader.backend()
    }
}
