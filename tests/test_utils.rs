#![allow(dead_code)]

use std::{collections::HashSet, sync::Arc, time::Duration as StdDuration};

use actix_web::web;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use portfolio_cms::{
    auth::{jwt::JwtService, password::hash_password},
    entities::{
        about::About,
        admin::{Admin, AdminInsert},
        experience::{Experience, ExperienceSort},
        project::{Project, ProjectSort},
        skill::{Skill, SkillSort},
    },
    errors::AppError,
    limiter::rate_limiter::LoginThrottle,
    repositories::{
        about::AboutRepository, admin::AdminRepository, experience::ExperienceRepository,
        project::ProjectRepository, skill::SkillRepository, visitor::VisitorRepository,
    },
    shared_repos::SharedRepositories,
    storage::{BlobStore, UploadError},
    AppState,
};

pub const JWT_SECRET: &str = "test_jwt_secret_that_is_long_enough_for_hs512_1234567890";
pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "password123";

/// Smallest byte sequence `infer` recognises as PNG.
pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];

/// Builds the service under test with the same middleware stack as the binary.
macro_rules! test_app {
    ($ctx:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($ctx.state.clone())
                .wrap(portfolio_cms::middlewares::auth::AuthMiddleware)
                .wrap(actix_web::middleware::NormalizePath::trim())
                .configure(portfolio_cms::routes::configure_routes),
        )
        .await
    };
}

// ───── In-memory repositories ────────────────────────────────────────

#[derive(Default)]
pub struct MemoryAdmins {
    pub admins: Mutex<Vec<Admin>>,
}

#[async_trait]
impl AdminRepository for MemoryAdmins {
    async fn check_connection(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn get_admin_by_username(&self, username: &str) -> Result<Option<Admin>, AppError> {
        Ok(self.admins.lock().iter().find(|a| a.username == username).cloned())
    }

    async fn create_admin(&self, admin: &AdminInsert) -> Result<Admin, AppError> {
        let mut admins = self.admins.lock();
        if admins.iter().any(|a| a.username == admin.username) {
            return Err(AppError::Conflict("Admin already exists".to_string()));
        }
        let created = Admin {
            id: Uuid::new_v4(),
            username: admin.username.clone(),
            password_hash: admin.password_hash.clone(),
            created_at: Utc::now(),
        };
        admins.push(created.clone());
        Ok(created)
    }

    async fn update_password(&self, username: &str, password_hash: &str) -> Result<bool, AppError> {
        let mut admins = self.admins.lock();
        match admins.iter_mut().find(|a| a.username == username) {
            Some(admin) => {
                admin.password_hash = password_hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[derive(Default)]
pub struct MemoryAbout {
    pub record: Mutex<Option<About>>,
}

#[async_trait]
impl AboutRepository for MemoryAbout {
    async fn get(&self) -> Result<Option<About>, AppError> {
        Ok(self.record.lock().clone())
    }

    async fn insert(&self, about: &About) -> Result<About, AppError> {
        let mut record = self.record.lock();
        if record.is_some() {
            return Err(AppError::Conflict(
                "About information already exists. Use PUT to update.".to_string(),
            ));
        }
        *record = Some(about.clone());
        Ok(about.clone())
    }

    async fn upsert(&self, about: &About) -> Result<About, AppError> {
        *self.record.lock() = Some(about.clone());
        Ok(about.clone())
    }

    async fn delete(&self) -> Result<Option<About>, AppError> {
        Ok(self.record.lock().take())
    }
}

/// Rows kept in insertion order, newest last.
pub struct MemoryTable<T> {
    pub rows: Mutex<Vec<T>>,
}

impl<T> Default for MemoryTable<T> {
    fn default() -> Self {
        MemoryTable { rows: Mutex::new(Vec::new()) }
    }
}

impl<T: Clone> MemoryTable<T> {
    pub fn len(&self) -> usize {
        self.rows.lock().len()
    }

    fn find(&self, pred: impl Fn(&T) -> bool) -> Option<T> {
        self.rows.lock().iter().find(|row| pred(row)).cloned()
    }

    fn replace(&self, pred: impl Fn(&T) -> bool, row: &T) -> Option<T> {
        let mut rows = self.rows.lock();
        let slot = rows.iter_mut().find(|r| pred(r))?;
        *slot = row.clone();
        Some(row.clone())
    }

    fn remove(&self, pred: impl Fn(&T) -> bool) -> Option<T> {
        let mut rows = self.rows.lock();
        let index = rows.iter().position(|r| pred(r))?;
        Some(rows.remove(index))
    }
}

#[async_trait]
impl ProjectRepository for MemoryTable<Project> {
    async fn list(&self, sort: ProjectSort) -> Result<Vec<Project>, AppError> {
        let mut rows = self.rows.lock().clone();
        match sort {
            ProjectSort::Newest => rows.reverse(),
            ProjectSort::Oldest => {}
            ProjectSort::Title => rows.sort_by(|a, b| a.title.cmp(&b.title)),
        }
        Ok(rows)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Project>, AppError> {
        Ok(self.find(|p| p.id == id))
    }

    async fn insert(&self, project: &Project) -> Result<Project, AppError> {
        self.rows.lock().push(project.clone());
        Ok(project.clone())
    }

    async fn update(&self, project: &Project) -> Result<Project, AppError> {
        self.replace(|p| p.id == project.id, project)
            .ok_or_else(|| AppError::NotFound("Project not found".to_string()))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Project>, AppError> {
        Ok(self.remove(|p| p.id == id))
    }
}

#[async_trait]
impl SkillRepository for MemoryTable<Skill> {
    async fn list(&self, sort: SkillSort) -> Result<Vec<Skill>, AppError> {
        let mut rows = self.rows.lock().clone();
        match sort {
            SkillSort::Category => rows.sort_by(|a, b| a.category.cmp(&b.category).then(a.name.cmp(&b.name))),
            SkillSort::Name => rows.sort_by(|a, b| a.name.cmp(&b.name)),
            SkillSort::Level => rows.sort_by(|a, b| b.level.cmp(&a.level)),
        }
        Ok(rows)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Skill>, AppError> {
        Ok(self.find(|s| s.id == id))
    }

    async fn insert(&self, skill: &Skill) -> Result<Skill, AppError> {
        self.rows.lock().push(skill.clone());
        Ok(skill.clone())
    }

    async fn update(&self, skill: &Skill) -> Result<Skill, AppError> {
        self.replace(|s| s.id == skill.id, skill)
            .ok_or_else(|| AppError::NotFound("Skill not found".to_string()))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Skill>, AppError> {
        Ok(self.remove(|s| s.id == id))
    }
}

#[async_trait]
impl ExperienceRepository for MemoryTable<Experience> {
    async fn list(&self, _sort: ExperienceSort) -> Result<Vec<Experience>, AppError> {
        let mut rows = self.rows.lock().clone();
        rows.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Ok(rows)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Experience>, AppError> {
        Ok(self.find(|e| e.id == id))
    }

    async fn insert(&self, experience: &Experience) -> Result<Experience, AppError> {
        self.rows.lock().push(experience.clone());
        Ok(experience.clone())
    }

    async fn update(&self, experience: &Experience) -> Result<Experience, AppError> {
        self.replace(|e| e.id == experience.id, experience)
            .ok_or_else(|| AppError::NotFound("Experience not found".to_string()))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Experience>, AppError> {
        Ok(self.remove(|e| e.id == id))
    }
}

#[derive(Default)]
pub struct MemoryVisitors {
    pub ips: Mutex<HashSet<String>>,
}

#[async_trait]
impl VisitorRepository for MemoryVisitors {
    async fn record_visit(&self, ip: &str, _user_agent: Option<String>) -> Result<bool, AppError> {
        Ok(self.ips.lock().insert(ip.to_string()))
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.ips.lock().len() as i64)
    }
}

// ───── Blob store ────────────────────────────────────────────────────

/// Keeps every call for later assertions. Deletes can be made to fail.
#[derive(Default)]
pub struct RecordingBlobStore {
    pub puts: Mutex<Vec<String>>,
    pub deletes: Mutex<Vec<String>>,
    pub fail_deletes: bool,
}

impl RecordingBlobStore {
    pub fn failing_deletes() -> Self {
        RecordingBlobStore { fail_deletes: true, ..Default::default() }
    }

    pub fn put_count(&self) -> usize {
        self.puts.lock().len()
    }
}

#[async_trait]
impl BlobStore for RecordingBlobStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn put(&self, _bytes: Vec<u8>, _content_type: &str, name: &str, folder: &str) -> Result<String, UploadError> {
        let url = format!("https://blobs.test/{}/{}", folder, name);
        self.puts.lock().push(url.clone());
        Ok(url)
    }

    async fn delete(&self, url: &str) -> Result<(), UploadError> {
        self.deletes.lock().push(url.to_string());
        if self.fail_deletes {
            return Err(UploadError::UpstreamUnavailable("blob store offline".to_string()));
        }
        Ok(())
    }
}

// ───── Context ───────────────────────────────────────────────────────

pub struct TestContext {
    pub state: web::Data<AppState>,
    pub jwt: JwtService,
    pub admins: Arc<MemoryAdmins>,
    pub about: Arc<MemoryAbout>,
    pub projects: Arc<MemoryTable<Project>>,
    pub skills: Arc<MemoryTable<Skill>>,
    pub experiences: Arc<MemoryTable<Experience>>,
    pub visitors: Arc<MemoryVisitors>,
    pub blobs: Arc<RecordingBlobStore>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_blob_store(RecordingBlobStore::default())
    }

    pub fn with_blob_store(blobs: RecordingBlobStore) -> Self {
        Self::build(blobs, LoginThrottle::new(100, StdDuration::from_secs(1)))
    }

    pub fn with_login_throttle(max_attempts: u32) -> Self {
        Self::build(
            RecordingBlobStore::default(),
            LoginThrottle::new(max_attempts, StdDuration::from_secs(60)),
        )
    }

    fn build(blobs: RecordingBlobStore, throttle: LoginThrottle) -> Self {
        let admins = Arc::new(MemoryAdmins::default());
        admins.admins.lock().push(Admin {
            id: Uuid::new_v4(),
            username: ADMIN_USERNAME.to_string(),
            password_hash: hash_password(ADMIN_PASSWORD).expect("hash seed password"),
            created_at: Utc::now(),
        });

        let about = Arc::new(MemoryAbout::default());
        let projects = Arc::new(MemoryTable::<Project>::default());
        let skills = Arc::new(MemoryTable::<Skill>::default());
        let experiences = Arc::new(MemoryTable::<Experience>::default());
        let visitors = Arc::new(MemoryVisitors::default());
        let blobs = Arc::new(blobs);
        let jwt = JwtService::from_secret(JWT_SECRET, Duration::minutes(30));

        let repos = SharedRepositories {
            admin_repo: admins.clone(),
            about_repo: about.clone(),
            project_repo: projects.clone(),
            skill_repo: skills.clone(),
            experience_repo: experiences.clone(),
            visitor_repo: visitors.clone(),
        };
        let state = AppState::from_parts(repos, blobs.clone(), Arc::new(jwt.clone()))
            .with_login_throttle(throttle);

        TestContext {
            state: web::Data::new(state),
            jwt,
            admins,
            about,
            projects,
            skills,
            experiences,
            visitors,
            blobs,
        }
    }

    /// `Authorization` header value for the seeded admin.
    pub fn bearer(&self) -> (&'static str, String) {
        let admin = self.admins.admins.lock()[0].clone();
        let token = self.jwt.create_jwt(&admin).expect("issue token");
        ("Authorization", format!("Bearer {}", token))
    }
}

// ───── Multipart ─────────────────────────────────────────────────────

const BOUNDARY: &str = "----portfolio-test-boundary";

/// Hand-built `multipart/form-data` body.
#[derive(Default)]
pub struct MultipartBody {
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// `(content type header value, body)`.
    pub fn finish(mut self) -> (String, Vec<u8>) {
        self.body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        (format!("multipart/form-data; boundary={BOUNDARY}"), self.body)
    }
}
