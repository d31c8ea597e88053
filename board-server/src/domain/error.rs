use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("user not found: {0}")]
    UserNotFound(Uuid),
    #[error("user already exists: {0}")]
    UserAlreadyExists(String),
    #[error("post not found: {0}")]
    PostNotFound(Uuid),
    #[error("comment not found: {0}")]
    CommentNotFound(Uuid),
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: &'static str,
    },
    #[error("forbidden")]
    Forbidden,
    #[error("unauthorized")]
    Unauthorized,
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// Machine-readable code clients branch on.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            DomainError::UserAlreadyExists(_) => Some("auth/email-already-in-use"),
            DomainError::Unauthorized => Some("auth/invalid-credential"),
            DomainError::Validation { .. } => Some("invalid-argument"),
            DomainError::Forbidden => Some("permission-denied"),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl ResponseError for DomainError {
    fn status_code(&self) -> StatusCode {
        match self {
            DomainError::UserNotFound(_)
            | DomainError::PostNotFound(_)
            | DomainError::CommentNotFound(_) => StatusCode::NOT_FOUND,
            DomainError::Validation { .. } => StatusCode::BAD_REQUEST,
            DomainError::Unauthorized => StatusCode::UNAUTHORIZED,
            DomainError::Forbidden => StatusCode::FORBIDDEN,
            DomainError::UserAlreadyExists(_) => StatusCode::CONFLICT,
            DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // internal details stay in the logs
        let message = match self {
            DomainError::Internal(_) => "internal error".to_string(),
            other => other.to_string(),
        };
        let details = match self {
            DomainError::PostNotFound(resource)
            | DomainError::UserNotFound(resource)
            | DomainError::CommentNotFound(resource) => Some(json!({ "resource": resource })),
            DomainError::Validation { field, .. } => Some(json!({ "field": field })),
            DomainError::Forbidden => {
                Some(json!({ "message": "only the author may change this resource" }))
            }
            _ => None,
        };
        let body = ErrorBody {
            error: message.as_str(),
            code: self.code(),
            details,
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_of(err: DomainError) -> serde_json::Value {
        let resp = err.error_response();
        let bytes = to_bytes(resp.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[actix_rt::test]
    async fn duplicate_user_is_conflict_with_code() {
        let err = DomainError::UserAlreadyExists("a@b.c".into());
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        let body = body_of(err).await;
        assert_eq!(body["code"], "auth/email-already-in-use");
    }

    #[actix_rt::test]
    async fn internal_error_hides_details() {
        let body = body_of(DomainError::Internal("password=hunter2".into())).await;
        assert_eq!(body["error"], "internal error");
        assert!(body.get("code").is_none());
    }

    #[test]
    fn not_found_variants_are_404() {
        let id = Uuid::new_v4();
        for err in [
            DomainError::PostNotFound(id),
            DomainError::CommentNotFound(id),
            DomainError::UserNotFound(id),
        ] {
            assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        }
    }
}
