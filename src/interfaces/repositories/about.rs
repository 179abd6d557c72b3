use async_trait::async_trait;

use crate::{
    entities::about::About,
    errors::AppError,
    repositories::sqlx_repo::SqlxAboutRepo,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AboutRepository: Send + Sync {
    /// Retrieves the "About" record, if one exists
    async fn get(&self) -> Result<Option<About>, AppError>;

    /// Inserts the record; `Conflict` when one already exists
    async fn insert(&self, about: &About) -> Result<About, AppError>;

    /// Inserts, or overwrites the existing record keeping its id and creation time
    async fn upsert(&self, about: &About) -> Result<About, AppError>;

    /// Removes the record and returns it
    async fn delete(&self) -> Result<Option<About>, AppError>;
}

impl SqlxAboutRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxAboutRepo { pool }
    }
}

const ABOUT_COLUMNS: &str = "id, name, title, description, contact_email, profile_image, \
    resume_link, github, linkedin, twitter, created_at, updated_at";

#[async_trait]
impl AboutRepository for SqlxAboutRepo {
    async fn get(&self) -> Result<Option<About>, AppError> {
        let sql = format!("SELECT {ABOUT_COLUMNS} FROM about WHERE singleton LIMIT 1");
        let about = sqlx::query_as::<_, About>(&sql)
            .fetch_optional(&self.pool)
            .await?;

        Ok(about)
    }

    async fn insert(&self, about: &About) -> Result<About, AppError> {
        let sql = format!(
            r#"INSERT INTO about ({ABOUT_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {ABOUT_COLUMNS}"#
        );
        bind_about(sqlx::query_as::<_, About>(&sql), about)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match AppError::from(e) {
                AppError::Conflict(_) => {
                    AppError::Conflict("About information already exists. Use PUT to update.".to_string())
                }
                other => other,
            })
    }

    async fn upsert(&self, about: &About) -> Result<About, AppError> {
        let sql = format!(
            r#"INSERT INTO about ({ABOUT_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (singleton) DO UPDATE SET
                name = EXCLUDED.name,
                title = EXCLUDED.title,
                description = EXCLUDED.description,
                contact_email = EXCLUDED.contact_email,
                profile_image = EXCLUDED.profile_image,
                resume_link = EXCLUDED.resume_link,
                github = EXCLUDED.github,
                linkedin = EXCLUDED.linkedin,
                twitter = EXCLUDED.twitter,
                updated_at = EXCLUDED.updated_at
            RETURNING {ABOUT_COLUMNS}"#
        );
        let row = bind_about(sqlx::query_as::<_, About>(&sql), about)
            .fetch_one(&self.pool)
            .await?;

        Ok(row)
    }

    async fn delete(&self) -> Result<Option<About>, AppError> {
        let sql = format!("DELETE FROM about WHERE singleton RETURNING {ABOUT_COLUMNS}");
        let about = sqlx::query_as::<_, About>(&sql)
            .fetch_optional(&self.pool)
            .await?;

        Ok(about)
    }
}

type AboutQuery<'q> = sqlx::query::QueryAs<'q, sqlx::Postgres, About, sqlx::postgres::PgArguments>;

fn bind_about<'q>(query: AboutQuery<'q>, about: &'q About) -> AboutQuery<'q> {
    query
        .bind(about.id)
        .bind(&about.name)
        .bind(&about.title)
        .bind(&about.description)
        .bind(&about.contact_email)
        .bind(&about.profile_image)
        .bind(&about.resume_link)
        .bind(&about.social_links.github)
        .bind(&about.social_links.linkedin)
        .bind(&about.social_links.twitter)
        .bind(about.created_at)
        .bind(about.updated_at)
}
