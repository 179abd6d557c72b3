use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    entities::skill::{Skill, SkillSort},
    errors::AppError,
    repositories::sqlx_repo::SqlxSkillRepo,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SkillRepository: Send + Sync {
    async fn list(&self, sort: SkillSort) -> Result<Vec<Skill>, AppError>;
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Skill>, AppError>;
    async fn insert(&self, skill: &Skill) -> Result<Skill, AppError>;
    async fn update(&self, skill: &Skill) -> Result<Skill, AppError>;
    async fn delete(&self, id: Uuid) -> Result<Option<Skill>, AppError>;
}

impl SqlxSkillRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxSkillRepo { pool }
    }
}

#[async_trait]
impl SkillRepository for SqlxSkillRepo {
    async fn list(&self, sort: SkillSort) -> Result<Vec<Skill>, AppError> {
        let sql = format!("SELECT * FROM skills ORDER BY {}", sort.order_by());
        let skills = sqlx::query_as::<_, Skill>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(skills)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Skill>, AppError> {
        let skill = sqlx::query_as::<_, Skill>("SELECT * FROM skills WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(skill)
    }

    async fn insert(&self, skill: &Skill) -> Result<Skill, AppError> {
        let row = sqlx::query_as::<_, Skill>(
            r#"INSERT INTO skills (id, name, level, category, icon, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *"#,
        )
        .bind(skill.id)
        .bind(&skill.name)
        .bind(skill.level)
        .bind(&skill.category)
        .bind(&skill.icon)
        .bind(skill.created_at)
        .bind(skill.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update(&self, skill: &Skill) -> Result<Skill, AppError> {
        sqlx::query_as::<_, Skill>(
            r#"UPDATE skills SET
                name = $2,
                level = $3,
                category = $4,
                icon = $5,
                updated_at = $6
            WHERE id = $1
            RETURNING *"#,
        )
        .bind(skill.id)
        .bind(&skill.name)
        .bind(skill.level)
        .bind(&skill.category)
        .bind(&skill.icon)
        .bind(skill.updated_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Skill not found".to_string()))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Skill>, AppError> {
        let skill = sqlx::query_as::<_, Skill>("DELETE FROM skills WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(skill)
    }
}
