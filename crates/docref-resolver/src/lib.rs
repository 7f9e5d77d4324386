//! Docref Resolver Library
//!
//! Turns historically inconsistent stored file references (legacy relative
//! paths, bucket-prefixed paths, storage URLs, external URLs) into a single
//! URL that is verified to exist and be reachable right now.
//!
//! ```no_run
//! # async fn demo(storage: std::sync::Arc<dyn docref_storage::ObjectStorage>) {
//! use docref_resolver::{ReferenceResolver, ResolverOptions};
//!
//! let resolver = ReferenceResolver::new(storage, ResolverOptions::default());
//! match resolver.resolve("documents/u1/thesis.pdf", "documents").await {
//!     Ok(access) => println!("{}", access.url),
//!     Err(e) => eprintln!("{}", e),
//! }
//! # }
//! ```

pub mod access;
pub mod normalizer;
pub mod probe;
pub mod reachability;
pub mod resolver;
pub mod url_pattern;

// Re-export commonly used types
pub use access::{AccessUrl, AccessUrlProvider};
pub use docref_core::{
    AccessKind, CancelCause, Candidate, ErrorMetadata, ResolveError, ResolveResult,
    ResolvedAccess,
};
pub use normalizer::PathNormalizer;
pub use probe::ExistenceProbe;
pub use reachability::{HttpReachability, ReachabilityCheck};
pub use resolver::{ReferenceResolver, ResolverOptions};
pub use tokio_util::sync::CancellationToken;
pub use url_pattern::StorageUrlPattern;
