use async_trait::async_trait;

use crate::{
    errors::AppError,
    repositories::sqlx_repo::SqlxVisitorRepo,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VisitorRepository: Send + Sync {
    /// Records the address once; returns `true` when it was new.
    async fn record_visit(&self, ip: &str, user_agent: Option<String>) -> Result<bool, AppError>;
    async fn count(&self) -> Result<i64, AppError>;
}

impl SqlxVisitorRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxVisitorRepo { pool }
    }
}

#[async_trait]
impl VisitorRepository for SqlxVisitorRepo {
    async fn record_visit(&self, ip: &str, user_agent: Option<String>) -> Result<bool, AppError> {
        let result = sqlx::query(
            "INSERT INTO visitors (ip, user_agent) VALUES ($1, $2) ON CONFLICT (ip) DO NOTHING",
        )
        .bind(ip)
        .bind(user_agent)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<i64, AppError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM visitors")
            .fetch_one(&self.pool)
            .await?;

        Ok(total)
    }
}
