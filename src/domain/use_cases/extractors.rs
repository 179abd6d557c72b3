use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{ready, Ready};

use crate::{entities::token::Claims, errors::AuthError};

/// The admin behind the request, as verified by `AuthMiddleware`.
///
/// Taking this as a handler argument makes the route fail closed: if the
/// middleware is ever not mounted in front of it, the request is refused with 401
/// instead of running unauthenticated.
#[derive(Debug)]
pub struct AuthClaims(pub Claims);

impl AuthClaims {
    pub fn username(&self) -> &str {
        &self.0.username
    }
}

impl FromRequest for AuthClaims {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<Claims>().cloned();
        ready(
            claims
                .map(AuthClaims)
                .ok_or_else(|| AuthError::MissingCredentials.into()),
        )
    }
}
