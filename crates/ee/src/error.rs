use thiserror::Error;

// ---------------------------------------------------------------------------
// EmitterError
// ---------------------------------------------------------------------------

/// Errors raised while configuring an emitter.
///
/// Dispatch itself never fails: unknown events, unknown listeners and skipped
/// bulk entries are silent no-ops, and listener panics propagate untouched.
#[derive(Debug, Error)]
pub enum EmitterError {
    #[error("Invalid emitter options: {0}")]
    InvalidOptions(#[from] serde_json::Error),

    #[error("max_listeners must be greater than zero (use None to disable the leak warning)")]
    ZeroMaxListeners,
}

/// Convenience alias — the default error type is `EmitterError`.
pub type Result<T, E = EmitterError> = std::result::Result<T, E>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
