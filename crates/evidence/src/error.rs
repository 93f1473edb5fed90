//! Error types for the evidence query engine.
//!
//! Every failure raised inside the engine is one of the variants below and is
//! propagated to the caller unchanged. Nothing is retried or swallowed
//! locally; the resource layer decides how to render each class.
//!
//! # Error Mapping
//!
//! | Error | HTTP equivalent |
//! |-------|-----------------|
//! | NotFound | 404 |
//! | InvalidFilterCombination | 400 |
//! | SerializationUnsupported | 406 |
//! | Backend::Timeout | 504 |
//! | Backend::Unavailable / ConnectionFailed | 503 |
//! | Backend (other) | 500 |

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

/// The primary error type for all engine operations.
#[derive(Error, Debug)]
pub enum EvidenceError {
    /// The requested code or identifier has no match in the index.
    #[error("{kind} not found: {id}")]
    NotFound { kind: String, id: String },

    /// A boolean operator name outside `AND`/`OR`/`NOT` was supplied.
    #[error("invalid boolean operator '{operator}' for filter '{dimension}'")]
    InvalidFilterCombination { dimension: String, operator: String },

    /// The requested output format cannot represent this result.
    #[error("cannot render result as {format}: {reason}")]
    SerializationUnsupported { format: String, reason: String },

    /// Errors raised by the search backend.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Errors originating from the search backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The backend is currently unavailable.
    #[error("backend unavailable: {backend_name}: {message}")]
    Unavailable {
        backend_name: String,
        message: String,
    },

    /// The backend did not answer within the deadline.
    #[error("backend timeout in {backend_name}: {message}")]
    Timeout {
        backend_name: String,
        message: String,
    },

    /// Connection to the backend failed.
    #[error("connection failed to {backend_name}: {message}")]
    ConnectionFailed {
        backend_name: String,
        message: String,
    },

    /// The backend rejected or failed to execute the query.
    #[error("query execution failed in {backend_name}: {message}")]
    QueryError {
        backend_name: String,
        message: String,
    },

    /// The backend answered with a body that could not be decoded.
    #[error("serialization error: {message}")]
    SerializationError { message: String },
}

impl EvidenceError {
    /// Creates a `NotFound` error for the given kind of entity.
    pub fn not_found(kind: impl Into<String>, id: impl Into<String>) -> Self {
        EvidenceError::NotFound {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Creates a `SerializationUnsupported` error.
    pub fn unsupported_format(format: impl Into<String>, reason: impl Into<String>) -> Self {
        EvidenceError::SerializationUnsupported {
            format: format.into(),
            reason: reason.into(),
        }
    }

    /// Returns the HTTP status class the resource layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            EvidenceError::NotFound { .. } => 404,
            EvidenceError::InvalidFilterCombination { .. } => 400,
            EvidenceError::SerializationUnsupported { .. } => 406,
            EvidenceError::Backend(BackendError::Timeout { .. }) => 504,
            EvidenceError::Backend(
                BackendError::Unavailable { .. } | BackendError::ConnectionFailed { .. },
            ) => 503,
            EvidenceError::Backend(_) => 500,
        }
    }

    /// Returns true for backend failures (all of which are fatal).
    pub fn is_backend(&self) -> bool {
        matches!(self, EvidenceError::Backend(_))
    }
}

/// Result type alias for engine operations.
pub type EvidenceResult<T> = Result<T, EvidenceError>;

impl From<serde_json::Error> for EvidenceError {
    fn from(err: serde_json::Error) -> Self {
        EvidenceError::Backend(BackendError::SerializationError {
            message: err.to_string(),
        })
    }
}

impl From<csv::Error> for EvidenceError {
    fn from(err: csv::Error) -> Self {
        EvidenceError::unsupported_format("csv", err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = EvidenceError::not_found("ECO code", "ECO:0000317");
        assert_eq!(err.to_string(), "ECO code not found: ECO:0000317");
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn test_invalid_filter_display() {
        let err = EvidenceError::InvalidFilterCombination {
            dimension: "gene".to_string(),
            operator: "XOR".to_string(),
        };
        assert!(err.to_string().contains("'XOR'"));
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_backend_status_codes() {
        let timeout: EvidenceError = BackendError::Timeout {
            backend_name: "elasticsearch".to_string(),
            message: "1m elapsed".to_string(),
        }
        .into();
        assert_eq!(timeout.status_code(), 504);
        assert!(timeout.is_backend());

        let unavailable: EvidenceError = BackendError::Unavailable {
            backend_name: "elasticsearch".to_string(),
            message: "no route".to_string(),
        }
        .into();
        assert_eq!(unavailable.status_code(), 503);

        let query: EvidenceError = BackendError::QueryError {
            backend_name: "elasticsearch".to_string(),
            message: "parsing_exception".to_string(),
        }
        .into();
        assert_eq!(query.status_code(), 500);
    }

    #[test]
    fn test_from_serde_json_error() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: EvidenceError = err.into();
        assert!(matches!(
            err,
            EvidenceError::Backend(BackendError::SerializationError { .. })
        ));
    }
}
