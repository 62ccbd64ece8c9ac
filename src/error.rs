//! Error taxonomy for the League Engine. The façade is the single
//! translation point, so one engine-facing enum and one store-facing
//! enum cover the whole crate.

use crate::store::StoreError;

/// Error kinds the façade can return. Not retryable unless noted.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("precondition failed: {0}")]
    Precondition(String),

    /// A concurrent actor won the race. Most operations absorb this as a
    /// no-op; the façade only surfaces it where the caller needs to know,
    /// such as join-code collisions.
    #[error("concurrent update conflict: {0}")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Retryable store-level failure. Callers should retry with backoff.
    #[error("transient store error: {0}")]
    Transient(String),

    /// Post-condition violated. Fatal; should page an operator.
    #[error("invariant violated: {0}")]
    Invariant(String),
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => EngineError::NotFound(msg),
            StoreError::Conflict(msg) => EngineError::Conflict(msg),
            StoreError::Transient(msg) => EngineError::Transient(msg),
            StoreError::PermissionDenied(msg) => EngineError::PermissionDenied(msg),
        }
    }
}
