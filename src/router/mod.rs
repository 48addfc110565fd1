//! # Router Module
//!
//! Route registration and request-time resolution.
//!
//! ## Lifecycle
//!
//! The registry has two states, encoded as two types:
//!
//! 1. **Open** ([`RouteRegistry`]) - routes are registered in order. Name
//!    clashes and colliding concrete variants are rejected here, at
//!    registration time, not at request time.
//!
//! 2. **Sealed** ([`SealedRegistry`]) - [`RouteRegistry::seal`] flattens every
//!    route's variants into one table of `(anchored regex, route, wildcard
//!    indices)` rows and compiles it. The sealed registry is immutable,
//!    `Send + Sync`, and resolves paths without locking.
//!
//! ## Example
//!
//! ```rust
//! use wildroute::router::RouteRegistry;
//!
//! let mut registry = RouteRegistry::new();
//! registry.register_uri("/post/{year}/{slug?}", Some("post.show"), &[("year", "[0-9]{4}")])?;
//! let sealed = registry.seal()?;
//!
//! let resolved = sealed.resolve("/post/2024/hello-world")?;
//! assert_eq!(resolved.get("year"), Some("2024"));
//! assert_eq!(resolved.get("slug"), Some("hello-world"));
//! assert!(sealed.resolve("/post/abcd").is_err());
//! # Ok::<(), wildroute::RouteError>(())
//! ```
//!
//! ## Precedence
//!
//! Resolution walks the table in registration order and returns the first
//! match. There is no "most specific wins" rule: `/user/{id}` registered
//! before `/user/me` captures `/user/me` too.

mod core;

pub(crate) use core::EntryFailure;
pub use core::{
    ParamVec, Resolved, RouteId, RouteRegistry, SealedRegistry, TableEntry, DEFAULT_SLOW_RESOLVE,
    MAX_INLINE_PARAMS,
};
