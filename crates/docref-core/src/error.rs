//! Error types module
//!
//! `ResolveError` is the final outcome of a failed resolution. Component
//! failures (listing, signing, HEAD checks) never surface here; they are logged
//! and the resolver moves on to the next candidate.

use std::fmt;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like missing references
    Debug,
    /// Warning level - for recoverable issues like unreachable URLs
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata describing how an error should be presented to the user
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "NO_MATCHING_OBJECT")
    fn error_code(&self) -> &'static str;

    /// Whether a manual retry may succeed
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the user
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// Why a resolution was abandoned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelCause {
    /// The caller signalled cancellation
    Caller,
    /// The overall resolution budget elapsed
    DeadlineExceeded,
}

impl fmt::Display for CancelCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelCause::Caller => write!(f, "cancelled by caller"),
            CancelCause::DeadlineExceeded => write!(f, "deadline exceeded"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("Reference is empty")]
    NormalizationEmpty,

    #[error("No matching object for reference: {reference}")]
    NoMatchingObject { reference: String },

    #[error("No access URL could be generated for reference: {reference}")]
    AccessUnavailable { reference: String },

    #[error("No accessible URL for reference: {reference}")]
    Unreachable { reference: String },

    #[error("Resolution cancelled: {0}")]
    Cancelled(CancelCause),
}

/// Result type for resolution
pub type ResolveResult<T> = Result<T, ResolveError>;

/// (error_code, is_recoverable, suggested_action, log_level)
fn resolve_error_static_metadata(
    err: &ResolveError,
) -> (&'static str, bool, Option<&'static str>, LogLevel) {
    match err {
        ResolveError::NormalizationEmpty => ("NORMALIZATION_EMPTY", false, None, LogLevel::Debug),
        ResolveError::NoMatchingObject { .. } => (
            "NO_MATCHING_OBJECT",
            false,
            Some("Upload the file again"),
            LogLevel::Warn,
        ),
        ResolveError::AccessUnavailable { .. } => (
            "ACCESS_UNAVAILABLE",
            false,
            Some("Check bucket permissions"),
            LogLevel::Error,
        ),
        ResolveError::Unreachable { .. } => (
            "UNREACHABLE",
            true,
            Some("Retry in a few moments"),
            LogLevel::Warn,
        ),
        ResolveError::Cancelled(_) => ("CANCELLED", true, Some("Retry"), LogLevel::Debug),
    }
}

impl ErrorMetadata for ResolveError {
    fn error_code(&self) -> &'static str {
        resolve_error_static_metadata(self).0
    }

    fn is_recoverable(&self) -> bool {
        resolve_error_static_metadata(self).1
    }

    fn suggested_action(&self) -> Option<&'static str> {
        resolve_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        resolve_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            ResolveError::NormalizationEmpty => "This document has no file attached".to_string(),
            ResolveError::NoMatchingObject { .. } => "The file could not be found".to_string(),
            ResolveError::AccessUnavailable { .. } => {
                "Could not generate access to the file".to_string()
            }
            ResolveError::Unreachable { .. } => {
                "The file is temporarily unreachable".to_string()
            }
            ResolveError::Cancelled(CancelCause::DeadlineExceeded) => {
                "Loading the file took too long".to_string()
            }
            ResolveError::Cancelled(CancelCause::Caller) => "Loading was cancelled".to_string(),
        }
    }
}
