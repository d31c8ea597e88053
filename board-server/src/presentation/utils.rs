use actix_web::dev::Payload;
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest, error::ErrorUnauthorized};
use futures_util::future::{Ready, ready};
use uuid::Uuid;

use crate::application::auth_service::AuthService;
use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::infrastructure::security::JwtKeys;
use crate::presentation::middleware::RequestId;

pub fn ensure_owner(owner_id: &Uuid, user_id: &Uuid) -> Result<(), DomainError> {
    if owner_id != user_id {
        Err(DomainError::Forbidden)
    } else {
        Ok(())
    }
}

/// Resolved by `require_bearer` and stored in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub email: String,
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>() {
            Some(user) => ready(Ok(user.clone())),
            None => ready(Err(ErrorUnauthorized("missing authenticated user"))),
        }
    }
}

pub async fn extract_user_from_token<R: UserRepository + 'static>(
    token: &str,
    keys: &JwtKeys,
    auth_service: &AuthService<R>,
) -> Result<AuthenticatedUser, DomainError> {
    let claims = keys
        .verify_token(token)
        .map_err(|_| DomainError::Unauthorized)?;
    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| DomainError::Unauthorized)?;

    // tokens outlive deleted accounts
    let user = auth_service
        .get_user(user_id)
        .await
        .map_err(|_| DomainError::Unauthorized)?;

    Ok(AuthenticatedUser {
        id: user.id,
        email: user.email,
    })
}

pub fn request_id(req: &HttpRequest) -> String {
    req.extensions()
        .get::<RequestId>()
        .map(|rid| rid.0.clone())
        .unwrap_or_else(|| "unknown".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::MemoryUserRepository;
    use std::sync::Arc;

    #[test]
    fn foreign_owner_is_forbidden() {
        let me = Uuid::new_v4();
        assert!(ensure_owner(&me, &me).is_ok());
        assert!(matches!(
            ensure_owner(&Uuid::new_v4(), &me),
            Err(DomainError::Forbidden)
        ));
    }

    #[tokio::test]
    async fn token_resolves_to_registered_user() {
        let keys = JwtKeys::new("secret".into(), 1);
        let auth = AuthService::new(Arc::new(MemoryUserRepository::default()), keys.clone());
        let issued = auth.register("kim@example.com", "secret1").await.unwrap();

        let user = extract_user_from_token(&issued.token, &keys, &auth)
            .await
            .unwrap();
        assert_eq!(user.id, issued.user.id);
        assert_eq!(user.email, "kim@example.com");
    }

    #[tokio::test]
    async fn token_for_unknown_user_is_unauthorized() {
        let keys = JwtKeys::new("secret".into(), 1);
        let auth = AuthService::new(Arc::new(MemoryUserRepository::default()), keys.clone());
        let token = keys.generate_token(Uuid::new_v4()).unwrap();

        let err = extract_user_from_token(&token, &keys, &auth)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized));
    }
}
