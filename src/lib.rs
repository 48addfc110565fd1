//! # wildroute
//!
//! **wildroute** compiles URI patterns with named wildcards into anchored
//! regular expressions and resolves request paths against them.
//!
//! ## Overview
//!
//! A route is declared with a pattern such as `/post/{year}/{slug?}`:
//!
//! - `{name}` is a required wildcard, `{name?}` an optional one
//! - each wildcard can be constrained with a regex fragment; unconstrained
//!   wildcards match `[A-Za-z0-9_%-]+`
//! - every subset of optional wildcards produces one concrete variant, so the
//!   pattern above matches both `/post/2024/hello` and `/post/2024`
//!
//! Routes are registered in order into a [`RouteRegistry`] and then sealed
//! into an immutable [`SealedRegistry`] whose lookup walks one flattened table
//! of compiled variants. The first matching entry wins.
//!
//! ## Architecture
//!
//! - **[`pattern`]** - validation, wildcard extraction, optional-wildcard
//!   expansion, constraint binding and the [`RouteBuilder`] lifecycle
//! - **[`router`]** - registration, sealing and resolution
//! - **[`cache`]** - persisted compiled tables with format versioning
//! - **[`manifest`]** - declarative route files (YAML, JSON, TOML)
//! - **[`hot_reload`]** - rebuild and atomically swap the sealed registry on
//!   manifest changes
//! - **[`runtime_config`]** / **[`logging`]** - environment configuration and
//!   structured logging
//! - **[`cli`]** - the `wildroute` command line
//!
//! ## Quick Start
//!
//! ```rust
//! use wildroute::{HttpMethod, RouteBuilder, RouteRegistry};
//!
//! let mut registry = RouteRegistry::new();
//! registry.add(
//!     RouteBuilder::new("/post/{year}/{slug?}")?
//!         .name("post.show")?
//!         .constraint("year", "[0-9]{4}")?
//!         .method(HttpMethod::Get, "PostController")?,
//! )?;
//! let sealed = registry.seal()?;
//!
//! let resolved = sealed.resolve("/post/2024")?;
//! assert_eq!(resolved.route.name(), Some("post.show"));
//! assert_eq!(resolved.get("year"), Some("2024"));
//! assert_eq!(resolved.get("slug"), None);
//! assert_eq!(resolved.handler(HttpMethod::Get), Some("PostController"));
//! # Ok::<(), wildroute::RouteError>(())
//! ```

pub mod cache;
pub mod cli;
pub mod error;
pub mod hot_reload;
pub mod logging;
pub mod manifest;
pub mod pattern;
pub mod router;
pub mod runtime_config;

pub use error::{ErrorKind, RouteError, RouteResult, SyntaxViolation};
pub use pattern::{HttpMethod, RouteBuilder, RouteKind, RoutePattern};
pub use router::{Resolved, RouteId, RouteRegistry, SealedRegistry};
