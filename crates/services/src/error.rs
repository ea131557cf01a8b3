//! Shared error types for the services crate.

use std::error::Error as StdError;
use std::fmt;

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use quest_core::QuizError;
use quest_core::model::CredentialsError;
use storage::sqlite::SqliteInitError;

/// Failure before any HTTP response was received.
///
/// Wraps the transport's own error; `Display` is the original message.
#[derive(Debug)]
pub struct TransportError {
    source: Box<dyn StdError + Send + Sync>,
}

impl TransportError {
    pub fn new(source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// The wrapped error, if it is a `T`.
    #[must_use]
    pub fn downcast_ref<T: StdError + 'static>(&self) -> Option<&T> {
        self.source.downcast_ref::<T>()
    }

    #[must_use]
    pub fn into_inner(self) -> Box<dyn StdError + Send + Sync> {
        self.source
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.source, f)
    }
}

impl StdError for TransportError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source.source()
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self::new(err)
    }
}

/// Body of a non-success response, parsed on a best-effort basis.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorBody {
    Json(Value),
    Text(String),
    Empty,
}

impl ErrorBody {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return Self::Empty;
        }
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => Self::Json(value),
            Err(_) => Self::Text(raw.to_owned()),
        }
    }

    /// The non-empty `message` string of a JSON object body.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Json(value) => value
                .get("message")
                .and_then(Value::as_str)
                .filter(|message| !message.is_empty()),
            _ => None,
        }
    }
}

/// Errors emitted by `SessionClient`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Non-success status. `message` prefers the server's own `message` field.
    #[error("{message}")]
    HttpStatus {
        status: StatusCode,
        message: String,
        body: ErrorBody,
    },

    #[error("invalid JSON response: {0}")]
    JsonParse(#[source] serde_json::Error),

    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),
}

impl ApiError {
    pub(crate) fn from_status(status: StatusCode, raw: &str) -> Self {
        let body = ErrorBody::parse(raw);
        let message = body.message().map_or_else(
            || format!("request failed with status {}", status.as_u16()),
            str::to_owned,
        );
        Self::HttpStatus {
            status,
            message,
            body,
        }
    }

    /// HTTP status for `HttpStatus` errors.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}

/// Errors emitted by `AuthService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    #[error(transparent)]
    Credentials(#[from] CredentialsError),
    #[error("missing access token")]
    MissingToken,
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors emitted by `QuizRunner`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizRunError {
    #[error("no quiz for course {0}")]
    NotFound(String),
    #[error(transparent)]
    Quiz(#[from] QuizError),
}

/// Errors emitted while loading configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_prefers_server_message() {
        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, r#"{"message":"Unauthorized"}"#);
        assert_eq!(err.to_string(), "Unauthorized");
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
        assert!(err.is_unauthorized());
    }

    #[test]
    fn status_error_falls_back_to_generic_message() {
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert_eq!(err.to_string(), "request failed with status 500");
        let ApiError::HttpStatus { body, .. } = err else {
            panic!("expected status error");
        };
        assert_eq!(body, ErrorBody::Text("boom".into()));
    }

    #[test]
    fn error_body_variants() {
        assert_eq!(ErrorBody::parse(""), ErrorBody::Empty);
        assert_eq!(ErrorBody::parse(r#"{"message":""}"#).message(), None);
        assert_eq!(ErrorBody::parse(r#"["message"]"#).message(), None);
        assert_eq!(
            ErrorBody::parse(r#"{"message":"nope"}"#).message(),
            Some("nope")
        );
    }

    #[test]
    fn transport_error_keeps_original_message() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
        let err = ApiError::from(TransportError::new(io));
        assert_eq!(err.to_string(), "connection refused");
        let ApiError::Transport(inner) = err else {
            panic!("expected transport error");
        };
        assert!(inner.downcast_ref::<std::io::Error>().is_some());
    }
}
