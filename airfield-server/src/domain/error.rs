//! Domain error types.
//!
//! These errors represent validation failures in the domain layer. They are
//! distinct from store and resolver errors.

use super::CodeKind;

/// Domain-level errors for validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// Lookup code was empty after trimming
    #[error("{0} code is required")]
    EmptyCode(CodeKind),

    /// Lookup code has the wrong shape for its kind
    #[error("invalid {kind} code {code:?}: {reason}")]
    InvalidCode {
        kind: CodeKind,
        code: String,
        reason: &'static str,
    },

    /// Latitude or longitude out of range
    #[error("coordinates out of range: ({latitude}, {longitude})")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    /// UTC offset outside [-43200, 43200] seconds
    #[error("offset {0}s is outside [-43200, 43200]")]
    OffsetOutOfRange(i64),

    /// Timezone identifier is blank or contains whitespace
    #[error("invalid timezone identifier: {0:?}")]
    InvalidTimezoneId(String),
}
