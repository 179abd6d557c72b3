use async_trait::async_trait;

use crate::{
    entities::admin::{Admin, AdminInsert},
    errors::AppError,
    repositories::sqlx_repo::SqlxAdminRepo,
};


#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdminRepository: Send + Sync {
    async fn check_connection(&self) -> Result<(), AppError>;
    async fn get_admin_by_username(&self, username: &str) -> Result<Option<Admin>, AppError>;
    async fn create_admin(&self, admin: &AdminInsert) -> Result<Admin, AppError>;
    /// Returns `false` when no account has that username.
    async fn update_password(&self, username: &str, password_hash: &str) -> Result<bool, AppError>;
}

impl SqlxAdminRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxAdminRepo { pool }
    }
}

#[async_trait]
impl AdminRepository for SqlxAdminRepo {
    async fn check_connection(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(AppError::from)
    }

    async fn get_admin_by_username(&self, username: &str) -> Result<Option<Admin>, AppError> {
        let admin = sqlx::query_as::<_, Admin>(
            "SELECT id, username, password_hash, created_at FROM admins WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(admin)
    }

    async fn create_admin(&self, admin: &AdminInsert) -> Result<Admin, AppError> {
        sqlx::query_as::<_, Admin>(
            r#"INSERT INTO admins (username, password_hash)
            VALUES ($1, $2)
            RETURNING id, username, password_hash, created_at"#,
        )
        .bind(&admin.username)
        .bind(&admin.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => AppError::Conflict("Admin already exists".to_string()),
            other => other,
        })
    }

    async fn update_password(&self, username: &str, password_hash: &str) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE admins SET password_hash = $2 WHERE username = $1")
            .bind(username)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
