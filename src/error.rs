// logview-tui/src/error.rs
use thiserror::Error;

/// Errors surfaced by the log view configuration and store entry points.
#[derive(Debug, Error)]
pub enum LogViewError {
    /// A highlight pattern failed to compile. The previously active
    /// pattern (or none) stays in effect.
    #[error("invalid highlight pattern: {0}")]
    Configuration(#[from] regex::Error),

    /// An internal precondition was broken by the caller, e.g. colorizing
    /// a wrapped continuation line.
    #[error("invariant violation: {0}")]
    InvariantViolation(&'static str),
}
