//! Error types for the nebula-connect crate
//!
//! `ApiError` is `Clone` because a failure outcome is delivered through a
//! completion cell that many observers may read; non-clone sources (I/O and
//! codec errors) are captured as their kind and message.

use std::io;
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Error, Debug, Clone)]
pub enum ApiError {
    #[error("Transport error: {message}")]
    Transport { kind: io::ErrorKind, message: String },

    #[error("Server returned status {status}")]
    Status { status: u16, body: Vec<u8> },

    #[error("Failed to decode response message: {0}")]
    Decode(String),

    #[error("Failed to encode outgoing message: {0}")]
    Encode(String),

    #[error("Timed out after {waited:?} waiting for completion")]
    WaitTimeout { waited: Duration },

    #[error("Completion delivered twice for the same request")]
    DoubleCompletion,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<io::Error> for ApiError {
    fn from(err: io::Error) -> Self {
        ApiError::Transport {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl ApiError {
    /// The HTTP-style status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if this error is transient (temporary, worth retrying upstream).
    ///
    /// Retry policy itself belongs to the dispatcher's transport, not to this
    /// crate; this predicate only classifies.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Transport { kind, .. } => Self::is_io_transient(*kind),
            // 5xx may resolve on retry, 4xx will not
            ApiError::Status { status, .. } => *status >= 500,
            ApiError::WaitTimeout { .. } => true,
            _ => false,
        }
    }

    fn is_io_transient(kind: io::ErrorKind) -> bool {
        use io::ErrorKind::*;
        matches!(
            kind,
            ConnectionRefused
                | ConnectionReset
                | ConnectionAborted
                | NotConnected
                | BrokenPipe
                | TimedOut
                | Interrupted
                | WouldBlock
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_accessor() {
        let err = ApiError::Status {
            status: 404,
            body: Vec::new(),
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(ApiError::DoubleCompletion.status(), None);
    }

    #[test]
    fn test_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::ConnectionRefused, "refused");
        let err = ApiError::from(io_err);
        match &err {
            ApiError::Transport { kind, message } => {
                assert_eq!(*kind, io::ErrorKind::ConnectionRefused);
                assert!(message.contains("refused"));
            }
            other => panic!("Expected Transport, got {:?}", other),
        }
    }

    #[test]
    fn test_transient_classification() {
        let refused = io::Error::new(io::ErrorKind::ConnectionRefused, "refused");
        assert!(ApiError::from(refused).is_transient());

        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        assert!(!ApiError::from(denied).is_transient());

        assert!(ApiError::Status {
            status: 503,
            body: Vec::new()
        }
        .is_transient());
        assert!(!ApiError::Status {
            status: 404,
            body: Vec::new()
        }
        .is_transient());

        assert!(ApiError::WaitTimeout {
            waited: Duration::from_secs(5)
        }
        .is_transient());
        assert!(!ApiError::DoubleCompletion.is_transient());
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::Status {
            status: 500,
            body: b"oops".to_vec(),
        };
        assert_eq!(err.to_string(), "Server returned status 500");

        let err = ApiError::InvalidRequest("body required for CREATE".to_string());
        assert!(err.to_string().contains("body required for CREATE"));
    }

    #[test]
    fn test_error_is_clone() {
        let err = ApiError::Status {
            status: 404,
            body: b"missing".to_vec(),
        };
        let copy = err.clone();
        assert_eq!(copy.status(), Some(404));
    }
}
