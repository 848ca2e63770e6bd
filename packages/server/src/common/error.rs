use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Failures surfaced to callers of the matching and scheduling core.
///
/// Every variant maps to an [`ErrorKind`] so transports can report a
/// structured `{kind, message}` pair.
#[derive(Error, Debug)]
pub enum MatchError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Permission denied: {0}")]
    Unauthorized(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

/// Machine-readable error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Unauthorized,
    InvalidTransition,
    ValidationError,
    Timeout,
    Storage,
}

impl MatchError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        MatchError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Another request changed the entity between our read and our write.
    pub fn stale(entity: &'static str, id: impl std::fmt::Display) -> Self {
        MatchError::InvalidTransition(format!(
            "{} {} was modified concurrently, reload and retry",
            entity, id
        ))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            MatchError::NotFound { .. } => ErrorKind::NotFound,
            MatchError::Unauthorized(_) => ErrorKind::Unauthorized,
            MatchError::InvalidTransition(_) => ErrorKind::InvalidTransition,
            MatchError::Validation(_) => ErrorKind::ValidationError,
            MatchError::Timeout(_) => ErrorKind::Timeout,
            MatchError::Storage(_) => ErrorKind::Storage,
        }
    }
}

pub type MatchResult<T> = std::result::Result<T, MatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_names_entity() {
        let err = MatchError::not_found("CoffeeChat", "abc");
        assert_eq!(err.to_string(), "CoffeeChat not found: abc");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_storage_wraps_anyhow() {
        let err: MatchError = anyhow::anyhow!("connection reset").into();
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn test_stale_is_invalid_transition() {
        let err = MatchError::stale("CoffeeChat", "abc");
        assert_eq!(err.kind(), ErrorKind::InvalidTransition);
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::InvalidTransition).unwrap();
        assert_eq!(json, "\"invalid_transition\"");
        let json = serde_json::to_string(&ErrorKind::ValidationError).unwrap();
        assert_eq!(json, "\"validation_error\"");
    }
}
