//! Error types for the enumeration engine.

use thiserror::Error;

/// Result type alias for engine operations.
pub type KStarResult<T> = Result<T, KStarError>;

/// Errors raised by the engine.
///
/// Timeout and unsolvability are *statuses* on the run outcome, not
/// errors; only conditions that abort a run surface here.
#[derive(Error, Debug)]
pub enum KStarError {
    /// The task is malformed (e.g. a negative action cost). Detected
    /// once at startup; fatal.
    #[error("malformed task: {0}")]
    Task(String),

    /// The configuration is unusable (e.g. k = 0).
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A memory or bookkeeping limit was reached. Plans emitted before
    /// the limit remain valid.
    #[error("resource limit reached: {0}")]
    ResourceExhausted(String),

    /// An internal invariant was violated (negative detour cost, heap
    /// order break, disconnected traceback). Always a bug.
    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),
}

#[cfg(test)]
mod tests {
    use super::KStarError;

    #[test]
    fn messages_carry_context() {
        let err = KStarError::Task("action 3 has cost -1".into());
        assert!(err.to_string().contains("cost -1"));
        let err = KStarError::InternalInvariant("delta -2 on sidetrack 7".into());
        assert!(err.to_string().starts_with("internal invariant"));
    }
}
