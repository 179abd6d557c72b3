use jsonwebtoken::{encode, Header, decode, Validation, TokenData, Algorithm};
use chrono::{Utc, Duration};
use crate::entities::admin::Admin;
use crate::entities::token::Claims;
use crate::repositories::token::TokenService;
use crate::settings::{AppConfig, JwtKeys};
use crate::errors::AuthError;

const JWT_ALGORITHM: Algorithm = Algorithm::HS512;


#[derive(Clone)]
pub struct JwtService {
    keys: JwtKeys,
    expiration: Duration,
}
impl JwtService {
    pub fn new(config: &AppConfig) -> Self {
        JwtService {
            keys: JwtKeys::from(config),
            expiration: Duration::minutes(config.jwt_expiration_minutes),
        }
    }

    pub fn from_secret(secret: &str, expiration: Duration) -> Self {
        JwtService {
            keys: JwtKeys::from_secret(secret),
            expiration,
        }
    }

    pub fn create_jwt(&self, admin: &Admin) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = (now + self.expiration).timestamp().max(0) as usize;

        let claims = Claims {
            sub: admin.id.to_string(),
            username: admin.username.clone(),
            iat: now.timestamp().max(0) as usize,
            exp,
        };

        encode(&Header::new(JWT_ALGORITHM), &claims, &self.keys.encoding).map_err(|e| {
            tracing::warn!("Failed to create JWT: {}", e);
            AuthError::TokenCreation
        })
    }

    pub fn decode_jwt(&self, token: &str) -> Result<TokenData<Claims>, AuthError> {
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        decode::<Claims>(
            token,
            &self.keys.decoding,
            &validation
        )
        .map_err(AuthError::from)
    }
}


impl TokenService for JwtService {
    fn create_jwt(&self, admin: &Admin) -> Result<String, AuthError> {
        self.create_jwt(admin)
    }

    fn decode_jwt(&self, token: &str) -> Result<TokenData<Claims>, AuthError> {
        self.decode_jwt(token)
    }
}
