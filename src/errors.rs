use std::borrow::Cow;
use std::fmt;

use actix_multipart::MultipartError;
use actix_web::{
    error::ResponseError,
    http::{header::{ContentType, RETRY_AFTER}, StatusCode},
    HttpResponse
};
use derive_more::Display;
use jsonwebtoken::errors::{ErrorKind, Error as JwtError};
use once_cell::sync::OnceCell;
use serde::Serialize;
use serde_json::json;
use validator::{ValidationErrors, ValidationErrorsKind};

static EXPOSE_ERROR_DETAILS: OnceCell<bool> = OnceCell::new();

/// Enables the `error` detail field on 500 responses. Called once at startup with
/// `!config.is_production()`; unset means details stay hidden.
pub fn expose_error_details(expose: bool) {
    let _ = EXPOSE_ERROR_DETAILS.set(expose);
}

fn error_details_exposed() -> bool {
    EXPOSE_ERROR_DETAILS.get().copied().unwrap_or(false)
}

#[derive(Debug)]
pub enum AppError {
    ValidationError(Vec<FieldError>),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    UpstreamUnavailable(String),
    InternalError(String),
}

impl AppError {
    /// Single-field validation failure.
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        AppError::ValidationError(vec![FieldError {
            field: field.to_string(),
            message: message.into(),
        }])
    }

    /// The stable, client-facing `msg` value.
    pub fn message(&self) -> String {
        match self {
            AppError::ValidationError(errors) => errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::UpstreamUnavailable(msg) => msg.clone(),
            AppError::InternalError(_) => "Server error".to_string(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ValidationError(errors) => {
                let messages = errors.iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "validation error: {}", messages)
            }
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::UpstreamUnavailable(msg) => write!(f, "Upstream unavailable: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal server error: {}", msg)
        }
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::ValidationError(errors) => json!({
                "msg": self.message(),
                "errors": errors
            }),
            AppError::InternalError(detail) => {
                tracing::error!("Unexpected error: {}", detail);
                if error_details_exposed() {
                    json!({"msg": self.message(), "error": detail})
                } else {
                    json!({"msg": self.message()})
                }
            }
            AppError::UpstreamUnavailable(detail) => {
                tracing::error!("Upstream unavailable: {}", detail);
                json!({"msg": self.message()})
            }
            _ => json!({"msg": self.message()}),
        };
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut field_errors = Vec::new();
        collect_field_errors(&errors, None, &mut field_errors);
        field_errors.sort_by(|a, b| a.field.cmp(&b.field));
        AppError::ValidationError(field_errors)
    }
}

fn collect_field_errors(errors: &ValidationErrors, prefix: Option<&str>, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let path = match prefix {
            Some(p) => format!("{}.{}", p, field),
            None => field.to_string(),
        };
        match kind {
            ValidationErrorsKind::Field(errs) => {
                out.extend(errs.iter().map(|e| FieldError {
                    field: path.clone(),
                    message: e
                        .message
                        .as_ref()
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {}", path)),
                }));
            }
            ValidationErrorsKind::Struct(nested) => collect_field_errors(nested, Some(&path), out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_field_errors(nested, Some(&format!("{}[{}]", path, index)), out);
                }
            }
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(e) if e.code() == Some(Cow::Borrowed("23505")) => {
                AppError::Conflict("Record already exists".into())
            }
            sqlx::Error::Database(e) if e.code() == Some(Cow::Borrowed("23514")) => {
                AppError::BadRequest(format!("Constraint violated: {}", e.message()))
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                AppError::UpstreamUnavailable(format!("Database unavailable: {}", err))
            }
            _ => AppError::InternalError(format!("Database error: {}", err))
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        match err {
            MultipartError::ContentTypeIncompatible => {
                AppError::BadRequest("Request must be multipart/form-data".to_string())
            }
            MultipartError::Payload(_) => {
                AppError::BadRequest("Payload too large".to_string())
            }
            _ => AppError::BadRequest(format!("Malformed multipart body: {}", err)),
        }
    }
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        AppError::InternalError(err.to_string())
    }
}

#[derive(Debug, Display)]
pub enum AuthError {
    #[display("Invalid credentials")]
    InvalidCredentials,

    #[display("Please provide username and password")]
    MissingFields,

    #[display("No token, authorization denied")]
    MissingCredentials,

    #[display("Token is not valid")]
    InvalidToken,

    #[display("Token has expired")]
    TokenExpired,

    #[display("Token creation error")]
    TokenCreation,

    #[display("Too many login attempts, try again in {_0} seconds")]
    TooManyAttempts(u64),

    #[display("Credential store error: {_0}")]
    Store(String),

    #[display("{_0}")]
    Upstream(String),
}

impl std::error::Error for AuthError {}

impl ResponseError for AuthError {
    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        match self {
            AuthError::TooManyAttempts(retry_after) => {
                builder.insert_header((RETRY_AFTER, retry_after.to_string()));
            }
            AuthError::TokenCreation | AuthError::Store(_) => {
                tracing::error!("Authentication failure: {}", self);
                return builder.json(json!({"msg": "Server error"}));
            }
            AuthError::Upstream(_) => {
                tracing::error!("Credential store unavailable: {}", self);
            }
            _ => {}
        }
        builder.json(json!({"msg": self.to_string()}))
    }

    fn status_code(&self) -> StatusCode {
        match *self {
            AuthError::InvalidCredentials => StatusCode::BAD_REQUEST,
            AuthError::MissingFields => StatusCode::BAD_REQUEST,
            AuthError::MissingCredentials => StatusCode::UNAUTHORIZED,
            AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthError::TokenExpired => StatusCode::UNAUTHORIZED,
            AuthError::TokenCreation => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::TooManyAttempts(_) => StatusCode::TOO_MANY_REQUESTS,
            AuthError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<JwtError> for AuthError {
    fn from(e: JwtError) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        }
    }
}

/// A store outage keeps its 502; anything else from the store is a server error.
impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::UpstreamUnavailable(msg) => AuthError::Upstream(msg),
            other => AuthError::Store(other.to_string()),
        }
    }
}

impl From<ValidationErrors> for AuthError {
    fn from(_: ValidationErrors) -> Self {
        AuthError::MissingFields
    }
}

#[derive(Debug, Display)]
pub enum PasswordError {
    #[display("Invalid password parameters: {_0}")]
    InvalidParameters(String),

    #[display("Password hashing failed: {_0}")]
    HashingError(String),

    #[display("Invalid password hash format: {_0}")]
    InvalidHashFormat(String),

    #[display("Password verification failed: {_0}")]
    VerificationError(String),
}

impl std::error::Error for PasswordError {}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}
