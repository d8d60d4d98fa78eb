//! Error handling
//!
//! Typed errors for gateway calls and store operations. Every store
//! operation reports failure through [`StoreError`]; callers decide what to
//! show the user by looking at [`StoreError::kind`].

use thiserror::Error;

use crate::models::EntryId;

/// Errors reported by a persistence gateway
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The request never got a response (connection refused, DNS, timeout)
    #[error("Could not reach the backend: {0}")]
    Transport(String),

    /// The backend has no entry with this id
    #[error("Entry not found: '{id}'")]
    NotFound { id: EntryId },

    /// The backend answered with a non-success status
    #[error("Backend rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The response body could not be decoded
    #[error("Invalid response from backend: {0}")]
    Decode(String),

    /// The configured base URL cannot be used
    #[error("Invalid backend URL '{url}': {details}")]
    InvalidUrl { url: String, details: String },
}

impl From<reqwest::Error> for GatewayError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            GatewayError::Decode(error.to_string())
        } else {
            GatewayError::Transport(error.to_string())
        }
    }
}

/// Errors returned by [`crate::EntryStore`] operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// The gateway call failed; the list was not changed
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The store task has shut down
    #[error("Entry store is closed")]
    Closed,
}

/// Coarse failure category, for deciding how to surface an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    NotFound,
    Rejected,
    Decode,
    Closed,
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Gateway(GatewayError::Transport(_)) => ErrorKind::Transport,
            StoreError::Gateway(GatewayError::NotFound { .. }) => ErrorKind::NotFound,
            StoreError::Gateway(GatewayError::Rejected { .. }) => ErrorKind::Rejected,
            StoreError::Gateway(GatewayError::Decode(_)) => ErrorKind::Decode,
            StoreError::Gateway(GatewayError::InvalidUrl { .. }) => ErrorKind::Transport,
            StoreError::Closed => ErrorKind::Closed,
        }
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StoreError::Gateway(GatewayError::Transport(_)) => {
                Some("Check that the backend is running and api_url is correct.")
            }
            StoreError::Gateway(GatewayError::InvalidUrl { .. }) => {
                Some("Set a valid URL with: taskline config set api_url http://host:port/api")
            }
            StoreError::Gateway(GatewayError::NotFound { .. }) => {
                Some("The entry may have been deleted. Run `taskline list` to refresh.")
            }
            _ => None,
        }
    }
}

/// Result type for gateway calls
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        let err = StoreError::from(GatewayError::NotFound {
            id: EntryId::new("42"),
        });
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.recovery_suggestion().is_some());

        let err = StoreError::from(GatewayError::Transport("connection refused".into()));
        assert_eq!(err.kind(), ErrorKind::Transport);

        assert_eq!(StoreError::Closed.kind(), ErrorKind::Closed);
    }

    #[test]
    fn test_error_display() {
        let err = StoreError::from(GatewayError::Rejected {
            status: 400,
            message: "description is required".into(),
        });

        let msg = err.to_string();
        assert!(msg.contains("400"));
        assert!(msg.contains("description is required"));
    }

    #[test]
    fn test_not_found_display() {
        let err = GatewayError::NotFound {
            id: EntryId::new("abc"),
        };
        assert!(err.to_string().contains("'abc'"));
    }
}
