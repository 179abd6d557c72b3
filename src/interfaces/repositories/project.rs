use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    entities::project::{Project, ProjectSort},
    errors::AppError,
    repositories::sqlx_repo::SqlxProjectRepo,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn list(&self, sort: ProjectSort) -> Result<Vec<Project>, AppError>;
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Project>, AppError>;
    async fn insert(&self, project: &Project) -> Result<Project, AppError>;
    /// Overwrites the stored row with `project`; `NotFound` when it has gone.
    async fn update(&self, project: &Project) -> Result<Project, AppError>;
    /// Removes the row and hands it back so its blobs can be cleaned up.
    async fn delete(&self, id: Uuid) -> Result<Option<Project>, AppError>;
}

impl SqlxProjectRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxProjectRepo { pool }
    }
}

#[async_trait]
impl ProjectRepository for SqlxProjectRepo {
    async fn list(&self, sort: ProjectSort) -> Result<Vec<Project>, AppError> {
        let sql = format!("SELECT * FROM projects ORDER BY {}", sort.order_by());
        let projects = sqlx::query_as::<_, Project>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(projects)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Project>, AppError> {
        let project = sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(project)
    }

    async fn insert(&self, project: &Project) -> Result<Project, AppError> {
        let row = sqlx::query_as::<_, Project>(
            r#"INSERT INTO projects (
                id, title, description, technologies, image,
                live_demo, source_code, featured, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *"#,
        )
        .bind(project.id)
        .bind(&project.title)
        .bind(&project.description)
        .bind(&project.technologies)
        .bind(&project.image)
        .bind(&project.live_demo)
        .bind(&project.source_code)
        .bind(project.featured)
        .bind(project.created_at)
        .bind(project.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update(&self, project: &Project) -> Result<Project, AppError> {
        sqlx::query_as::<_, Project>(
            r#"UPDATE projects SET
                title = $2,
                description = $3,
                technologies = $4,
                image = $5,
                live_demo = $6,
                source_code = $7,
                featured = $8,
                updated_at = $9
            WHERE id = $1
            RETURNING *"#,
        )
        .bind(project.id)
        .bind(&project.title)
        .bind(&project.description)
        .bind(&project.technologies)
        .bind(&project.image)
        .bind(&project.live_demo)
        .bind(&project.source_code)
        .bind(project.featured)
        .bind(project.updated_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Project>, AppError> {
        let project = sqlx::query_as::<_, Project>("DELETE FROM projects WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(project)
    }
}
