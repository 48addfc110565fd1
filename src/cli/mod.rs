//! # CLI Module
//!
//! Command-line access to route manifests: compile them, inspect the
//! flattened table, and resolve paths.
//!
//! ## Commands
//!
//! ### `inspect`
//!
//! Print every route with its method bindings, concrete variants and compiled
//! regexes (`--format json` prints the persisted table instead):
//!
//! ```bash
//! wildroute inspect --routes routes.yaml
//! ```
//!
//! ### `resolve`
//!
//! Resolve one or more paths, printing the matched route and captured values
//! or `no route`:
//!
//! ```bash
//! wildroute resolve --routes routes.yaml /post/2024/hello /post/abcd
//! wildroute resolve --routes routes.yaml --cache routes.table.json --method GET /post/2024
//! ```
//!
//! ### `compile`
//!
//! Write the compiled table so later runs can skip validation and expansion:
//!
//! ```bash
//! wildroute compile --routes routes.yaml --out routes.table.json
//! ```
//!
//! ### `watch`
//!
//! Resolve paths read line by line from stdin while the manifest is watched
//! and hot-reloaded:
//!
//! ```bash
//! printf '/post/2024\n/about\n' | wildroute watch --routes routes.yaml
//! ```
//!
//! `--routes` can also be supplied through `WILDROUTE_ROUTES`. See
//! [`crate::runtime_config`] for the remaining environment variables.

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{run_cli, run_with_config, serve_lines, Cli, Commands, OutputFormat};
