use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::Identity;
use crate::error::AppError;

/// Extracts the authenticated caller from request extensions.
///
/// `AuthMiddleware` inserts the `Identity` after validating the token, so any
/// handler behind it can take `identity: Identity` as an argument. On a route
/// the middleware does not cover, extraction fails with 401.
impl FromRequest for Identity {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<Identity>().copied() {
            Some(identity) => ready(Ok(identity)),
            None => {
                let err = AppError::Unauthenticated("Missing token".to_string());
                ready(Err(err.into()))
            }
        }
    }
}
