//! Docref Core Library
//!
//! This crate provides the domain models, error taxonomy and configuration
//! shared by the storage backends and the reference resolver.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::Config;
pub use error::{CancelCause, ErrorMetadata, LogLevel, ResolveError, ResolveResult};
pub use models::{AccessKind, Candidate, ResolvedAccess, EXTERNAL_BUCKET};
pub use storage_types::StorageBackend;
