use serde::Deserialize;
use thiserror::Error;

use crate::messages;
use crate::validation::FieldError;

/// Error code the auth backend uses for a duplicate registration.
pub const EMAIL_IN_USE: &str = "auth/email-already-in-use";

#[derive(Debug, Error)]
pub enum BoardClientError {
    #[cfg(feature = "native")]
    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("HTTP error {status}: {message}")]
    Http {
        status: u16,
        code: Option<String>,
        message: String,
    },
    #[error("Not found")]
    NotFound,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden")]
    Forbidden,
    #[error("Invalid input: {0}")]
    Validation(FieldError),
    #[error("Storage error: {0}")]
    Storage(String),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    code: Option<String>,
}

impl BoardClientError {
    /// Builds the error for a non-success response from its status and body.
    pub fn from_status(status: u16, body: &str) -> Self {
        let (message, code) = match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) => (parsed.error, parsed.code),
            Err(_) => (body.to_string(), None),
        };
        match status {
            401 => BoardClientError::Unauthorized,
            403 => BoardClientError::Forbidden,
            404 => BoardClientError::NotFound,
            _ => BoardClientError::Http {
                status,
                code,
                message,
            },
        }
    }

    #[cfg(feature = "native")]
    pub async fn from_http_response(resp: reqwest::Response) -> Self {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        Self::from_status(status, &body)
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            BoardClientError::Http { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Message shown when account creation fails. Only the duplicate-email
    /// code gets its own text.
    pub fn register_message(&self) -> &'static str {
        match self.code() {
            Some(EMAIL_IN_USE) => messages::EMAIL_IN_USE,
            _ => messages::REGISTER_FAILED,
        }
    }
}

impl From<FieldError> for BoardClientError {
    fn from(err: FieldError) -> Self {
        BoardClientError::Validation(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_with_known_code_gets_friendly_message() {
        let err = BoardClientError::from_status(
            409,
            r#"{"error":"user already exists","code":"auth/email-already-in-use"}"#,
        );
        assert_eq!(err.code(), Some(EMAIL_IN_USE));
        assert_eq!(err.register_message(), messages::EMAIL_IN_USE);
    }

    #[test]
    fn other_failures_collapse_to_generic_message() {
        let err = BoardClientError::from_status(500, "boom");
        assert!(matches!(&err, BoardClientError::Http { message, .. } if message == "boom"));
        assert_eq!(err.register_message(), messages::REGISTER_FAILED);
        assert_eq!(
            BoardClientError::Unauthorized.register_message(),
            messages::REGISTER_FAILED
        );
    }

    #[test]
    fn auth_statuses_map_to_dedicated_variants() {
        assert!(matches!(
            BoardClientError::from_status(401, "{}"),
            BoardClientError::Unauthorized
        ));
        assert!(matches!(
            BoardClientError::from_status(403, ""),
            BoardClientError::Forbidden
        ));
        assert!(matches!(
            BoardClientError::from_status(404, ""),
            BoardClientError::NotFound
        ));
    }
}
