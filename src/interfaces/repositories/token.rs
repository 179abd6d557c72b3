use jsonwebtoken::TokenData;
use crate::{entities::{admin::Admin, token::Claims}, errors::AuthError};


#[cfg_attr(test, mockall::automock)]
pub trait TokenService: Send + Sync {
    /// Issues a signed, time-limited token for the admin
    fn create_jwt(&self, admin: &Admin) -> Result<String, AuthError>;

    /// Verifies signature and expiry and returns the claims
    fn decode_jwt(&self, token: &str) -> Result<TokenData<Claims>, AuthError>;
}
