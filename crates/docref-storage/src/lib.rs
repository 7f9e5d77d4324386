//! Docref Storage Library
//!
//! This crate provides the object storage abstraction consumed by the reference
//! resolver, with implementations for an HTTP object API, S3 and the local
//! filesystem.
//!
//! # Operations
//!
//! The resolver needs only three primitives from a backend:
//!
//! - **list** a folder of a bucket (bounded page, sorted by name)
//! - **create_signed_url** for a key, valid for a given duration
//! - **public_url** for a key, assuming the bucket is publicly readable
//!
//! Keys must not contain `..` or a leading `/`.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-rest")]
pub mod rest;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use docref_core::StorageBackend;
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-rest")]
pub use rest::RestStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{ListOptions, ObjectEntry, ObjectStorage, StorageError, StorageResult};
