//! Authenticated caller identity carried in bearer tokens.

use serde::{Deserialize, Serialize};

/// Claims of the JWT issued by the auth service.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub sub: String,
    pub email: String,
    pub hub_id: i32,
    pub name: String,
    pub roles: Vec<String>,
    pub exp: usize,
}

/// Returns `true` when `role` is present in `roles`.
pub fn check_role<S: AsRef<str>>(role: &str, roles: &[S]) -> bool {
    roles.iter().any(|r| r.as_ref() == role)
}

impl AuthenticatedUser {
    pub fn has_role(&self, role: &str) -> bool {
        check_role(role, &self.roles)
    }

    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        roles.iter().any(|role| self.has_role(role))
    }
}

#[cfg(feature = "server")]
mod extractor {
    use std::future::{Ready, ready};

    use actix_web::dev::Payload;
    use actix_web::error::{ErrorInternalServerError, ErrorUnauthorized};
    use actix_web::http::header;
    use actix_web::{FromRequest, HttpRequest, web};
    use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

    use super::AuthenticatedUser;
    use crate::models::config::ServerConfig;

    impl AuthenticatedUser {
        /// Decodes and validates an HS256 token signed with `secret`.
        pub fn from_jwt(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
            let data = decode::<AuthenticatedUser>(
                token,
                &DecodingKey::from_secret(secret.as_bytes()),
                &Validation::default(),
            )?;
            Ok(data.claims)
        }

        /// Signs the claims with `secret`.
        pub fn to_jwt(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
            encode(
                &Header::default(),
                self,
                &EncodingKey::from_secret(secret.as_bytes()),
            )
        }
    }

    fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, actix_web::Error> {
        let config = req
            .app_data::<web::Data<ServerConfig>>()
            .ok_or_else(|| ErrorInternalServerError("server config is not registered"))?;

        let token = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| ErrorUnauthorized("missing bearer token"))?;

        AuthenticatedUser::from_jwt(token.trim(), &config.secret).map_err(|err| {
            log::warn!("Rejected bearer token: {err}");
            ErrorUnauthorized("invalid bearer token")
        })
    }

    impl FromRequest for AuthenticatedUser {
        type Error = actix_web::Error;
        type Future = Ready<Result<Self, Self::Error>>;

        fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
            ready(authenticate(req))
        }
    }
}
