//! Error types for the client pool

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("Invalid capacity settings: initial {initial}, max {max}")]
    InvalidCapacity { initial: usize, max: usize },

    #[error("Client is nil - rejecting")]
    RejectedNilHandle,

    #[error("Pool has been shut down")]
    PoolClosed,

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
}

pub type PoolResult<T> = Result<T, PoolError>;

/// Failure while tearing down a client's transport resources.
///
/// The pool never propagates this; it is logged and the handle is dropped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to release client: {reason}")]
pub struct ReleaseError {
    pub reason: String,
}

impl ReleaseError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = PoolError::InvalidCapacity { initial: 3, max: 2 };
        assert_eq!(err.to_string(), "Invalid capacity settings: initial 3, max 2");
        assert_eq!(
            PoolError::RejectedNilHandle.to_string(),
            "Client is nil - rejecting"
        );
        assert_eq!(
            ReleaseError::new("socket busy").to_string(),
            "Failed to release client: socket busy"
        );
    }
}
