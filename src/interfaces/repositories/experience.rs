use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    entities::experience::{Experience, ExperienceSort},
    errors::AppError,
    repositories::sqlx_repo::SqlxExperienceRepo,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExperienceRepository: Send + Sync {
    async fn list(&self, sort: ExperienceSort) -> Result<Vec<Experience>, AppError>;
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Experience>, AppError>;
    async fn insert(&self, experience: &Experience) -> Result<Experience, AppError>;
    async fn update(&self, experience: &Experience) -> Result<Experience, AppError>;
    async fn delete(&self, id: Uuid) -> Result<Option<Experience>, AppError>;
}

impl SqlxExperienceRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxExperienceRepo { pool }
    }
}

#[async_trait]
impl ExperienceRepository for SqlxExperienceRepo {
    async fn list(&self, sort: ExperienceSort) -> Result<Vec<Experience>, AppError> {
        let sql = format!("SELECT * FROM experiences ORDER BY {}", sort.order_by());
        let experiences = sqlx::query_as::<_, Experience>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(experiences)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Experience>, AppError> {
        let experience = sqlx::query_as::<_, Experience>("SELECT * FROM experiences WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(experience)
    }

    async fn insert(&self, experience: &Experience) -> Result<Experience, AppError> {
        let row = sqlx::query_as::<_, Experience>(
            r#"INSERT INTO experiences (
                id, company, position, location, start_date, end_date,
                is_current, description, technologies, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *"#,
        )
        .bind(experience.id)
        .bind(&experience.company)
        .bind(&experience.position)
        .bind(&experience.location)
        .bind(experience.start_date)
        .bind(experience.end_date)
        .bind(experience.current)
        .bind(&experience.description)
        .bind(&experience.technologies)
        .bind(experience.created_at)
        .bind(experience.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update(&self, experience: &Experience) -> Result<Experience, AppError> {
        sqlx::query_as::<_, Experience>(
            r#"UPDATE experiences SET
                company = $2,
                position = $3,
                location = $4,
                start_date = $5,
                end_date = $6,
                is_current = $7,
                description = $8,
                technologies = $9,
                updated_at = $10
            WHERE id = $1
            RETURNING *"#,
        )
        .bind(experience.id)
        .bind(&experience.company)
        .bind(&experience.position)
        .bind(&experience.location)
        .bind(experience.start_date)
        .bind(experience.end_date)
        .bind(experience.current)
        .bind(&experience.description)
        .bind(&experience.technologies)
        .bind(experience.updated_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Experience not found".to_string()))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Experience>, AppError> {
        let experience = sqlx::query_as::<_, Experience>("DELETE FROM experiences WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(experience)
    }
}
