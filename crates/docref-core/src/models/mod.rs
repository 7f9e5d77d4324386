//! Data models for reference resolution
//!
//! Candidates are derived from a stored reference; a `ResolvedAccess` is the
//! only artifact handed back to callers.

mod access;
mod candidate;

pub use access::*;
pub use candidate::*;
