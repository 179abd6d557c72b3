use std::sync::Arc;

use validator::Validate;

use crate::auth::password::{hash_password, verify_dummy_password, verify_password};
use crate::domain::password::password_weakness;
use crate::entities::admin::{AdminInsert, LoginRequest, LoginResponse};
use crate::entities::token::Claims;
use crate::errors::{AppError, AuthError};
use crate::repositories::admin::AdminRepository;
use crate::repositories::token::TokenService;

/// What [`AuthHandler::provision_admin`] did.
#[derive(Debug, PartialEq, Eq)]
pub enum AdminProvision {
    Created,
    PasswordReset,
    AlreadyExists,
}

#[derive(Clone)]
pub struct AuthHandler {
    pub admin_repo: Arc<dyn AdminRepository>,
    pub token_service: Arc<dyn TokenService>,
}

impl AuthHandler {
    pub fn new(admin_repo: Arc<dyn AdminRepository>, token_service: Arc<dyn TokenService>) -> Self {
        AuthHandler {
            admin_repo,
            token_service,
        }
    }

    /// Verifies the credentials and issues a bearer token. Unknown usernames and
    /// wrong passwords are indistinguishable to the caller.
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AuthError> {
        request.validate()?;

        let admin = self.admin_repo
            .get_admin_by_username(request.username.trim())
            .await?;

        let Some(admin) = admin else {
            verify_dummy_password(&request.password);
            tracing::warn!("Login attempt for unknown admin");
            return Err(AuthError::InvalidCredentials);
        };

        let is_password_valid = verify_password(&request.password, &admin.password_hash)
            .map_err(|e| {
                tracing::error!("Stored password hash unusable for {}: {}", admin.username, e);
                AuthError::InvalidCredentials
            })?;
        if !is_password_valid {
            tracing::warn!("Wrong password for admin {}", admin.username);
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.token_service.create_jwt(&admin)?;

        tracing::info!("Admin {} logged in", admin.username);
        Ok(LoginResponse { token })
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        Ok(self.token_service.decode_jwt(token)?.claims)
    }

    /// Creates the account if missing. An existing account keeps its password
    /// unless `reset_password` is set.
    pub async fn provision_admin(
        &self,
        username: &str,
        password: &str,
        reset_password: bool,
    ) -> Result<AdminProvision, AppError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AppError::BadRequest("Username and password are required".to_string()));
        }
        if let Some(warning) = password_weakness(password, username) {
            tracing::warn!("{}", warning);
        }

        if self.admin_repo.get_admin_by_username(username).await?.is_some() {
            if !reset_password {
                return Ok(AdminProvision::AlreadyExists);
            }
            let password_hash = hash_password(password)?;
            self.admin_repo.update_password(username, &password_hash).await?;
            return Ok(AdminProvision::PasswordReset);
        }

        let password_hash = hash_password(password)?;
        self.admin_repo
            .create_admin(&AdminInsert { username: username.to_string(), password_hash })
            .await?;
        Ok(AdminProvision::Created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::JwtService;
    use crate::entities::admin::Admin;
    use crate::repositories::admin::MockAdminRepository;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    const SECRET: &str = "a-test-secret-that-is-at-least-32-bytes-long";

    fn seeded_repo() -> MockAdminRepository {
        let hash = hash_password("password123").unwrap();
        let mut repo = MockAdminRepository::new();
        repo.expect_get_admin_by_username().returning(move |username| {
            Ok((username == "admin").then(|| Admin {
                id: Uuid::new_v4(),
                username: "admin".into(),
                password_hash: hash.clone(),
                created_at: Utc::now(),
            }))
        });
        repo
    }

    fn handler(repo: MockAdminRepository) -> AuthHandler {
        AuthHandler::new(
            Arc::new(repo),
            Arc::new(JwtService::from_secret(SECRET, Duration::hours(24))),
        )
    }

    fn login(username: &str, password: &str) -> LoginRequest {
        LoginRequest { username: username.into(), password: password.into() }
    }

    #[tokio::test]
    async fn valid_credentials_issue_a_verifiable_token() {
        let auth = handler(seeded_repo());
        let response = auth.login(login("admin", "password123")).await.unwrap();

        let claims = auth.verify_token(&response.token).unwrap();
        assert_eq!(claims.username, "admin");
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_look_the_same() {
        let auth = handler(seeded_repo());
        assert!(matches!(
            auth.login(login("admin", "nope")).await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login(login("ghost", "password123")).await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn blank_fields_are_rejected_before_lookup() {
        let mut repo = MockAdminRepository::new();
        repo.expect_get_admin_by_username().times(0);
        let auth = handler(repo);
        assert!(matches!(auth.login(login("", "")).await, Err(AuthError::MissingFields)));
    }

    #[tokio::test]
    async fn database_outage_during_login_is_a_bad_gateway() {
        use actix_web::ResponseError;

        let mut repo = MockAdminRepository::new();
        repo.expect_get_admin_by_username()
            .returning(|_| Err(AppError::UpstreamUnavailable("Database unavailable".into())));

        let err = handler(repo).login(login("admin", "password123")).await.unwrap_err();
        assert!(matches!(err, AuthError::Upstream(_)));
        assert_eq!(err.status_code(), actix_web::http::StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn provisioning_is_idempotent() {
        let auth = handler(seeded_repo());
        assert_eq!(
            auth.provision_admin("admin", "password123", false).await.unwrap(),
            AdminProvision::AlreadyExists
        );
    }

    #[tokio::test]
    async fn provisioning_creates_missing_admin() {
        let mut repo = MockAdminRepository::new();
        repo.expect_get_admin_by_username().returning(|_| Ok(None));
        repo.expect_create_admin().times(1).returning(|insert| {
            assert!(insert.password_hash.starts_with("$argon2id$"));
            Ok(Admin {
                id: Uuid::new_v4(),
                username: insert.username.clone(),
                password_hash: insert.password_hash.clone(),
                created_at: Utc::now(),
            })
        });

        let auth = handler(repo);
        assert_eq!(
            auth.provision_admin(" owner ", "a-Long-passphrase-2024!", false).await.unwrap(),
            AdminProvision::Created
        );
    }
}
