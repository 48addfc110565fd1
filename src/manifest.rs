//! # Route Manifest
//!
//! Declarative route files, so a route table can be described outside code.
//!
//! ```yaml
//! routes:
//!   - uri: /post/{year}/{slug?}
//!     name: post.show
//!     methods:
//!       GET: PostController
//!     where:
//!       year: "[0-9]{4}"
//!     middlewares: [auth]
//! ```
//!
//! The same structure is accepted as JSON (`.json`) or TOML (`.toml`,
//! `[[routes]]` tables). Routes are registered in file order, which is their
//! resolution precedence.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::pattern::RouteBuilder;
use crate::router::{RouteRegistry, SealedRegistry};

/// One declared route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDecl {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// HTTP method token -> handler identifier
    #[serde(default)]
    pub methods: BTreeMap<String, String>,
    /// Wildcard name -> regex fragment
    #[serde(default, rename = "where")]
    pub constraints: BTreeMap<String, String>,
    #[serde(default)]
    pub middlewares: Vec<String>,
}

/// A route declaration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub routes: Vec<RouteDecl>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Yaml,
    Json,
    Toml,
}

impl ManifestFormat {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Ok(ManifestFormat::Yaml),
            Some("json") => Ok(ManifestFormat::Json),
            Some("toml") => Ok(ManifestFormat::Toml),
            other => bail!(
                "unsupported route manifest extension {:?} for `{}` (expected yaml, yml, json or toml)",
                other,
                path.display()
            ),
        }
    }
}

pub fn parse_manifest(content: &str, format: ManifestFormat) -> Result<Manifest> {
    let manifest = match format {
        ManifestFormat::Yaml => serde_yaml::from_str(content).context("invalid YAML route manifest")?,
        ManifestFormat::Json => serde_json::from_str(content).context("invalid JSON route manifest")?,
        ManifestFormat::Toml => toml::from_str(content).context("invalid TOML route manifest")?,
    };
    Ok(manifest)
}

pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let format = ManifestFormat::from_path(path)?;
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read route manifest `{}`", path.display()))?;
    parse_manifest(&content, format)
        .with_context(|| format!("failed to parse route manifest `{}`", path.display()))
}

impl RouteDecl {
    /// Turn the declaration into a builder, tagging it with `provenance`.
    pub fn to_builder(&self, provenance: String) -> Result<RouteBuilder, crate::RouteError> {
        let mut builder = RouteBuilder::new(self.uri.as_str())?.provenance(provenance);
        if let Some(name) = &self.name {
            builder = builder.name(name.as_str())?;
        }
        for (method, handler) in &self.methods {
            builder = builder.method_str(method, handler.as_str())?;
        }
        for (wildcard, regex) in &self.constraints {
            builder = builder.constraint(wildcard, regex)?;
        }
        for middleware in &self.middlewares {
            builder = builder.middleware(middleware.as_str());
        }
        Ok(builder)
    }
}

/// Register every declared route, in order, and seal the registry.
///
/// `origin` prefixes each route's provenance tag (`<origin>#<index>`).
pub fn build_registry(manifest: &Manifest, origin: &str) -> Result<SealedRegistry> {
    let mut registry = RouteRegistry::new();
    for (index, decl) in manifest.routes.iter().enumerate() {
        let builder = decl
            .to_builder(format!("{origin}#{index}"))
            .with_context(|| format!("route #{index} `{}` in {origin}", decl.uri))?;
        registry
            .add(builder)
            .with_context(|| format!("route #{index} `{}` in {origin}", decl.uri))?;
    }
    let sealed = registry
        .seal()
        .with_context(|| format!("failed to seal routes from {origin}"))?;
    info!(origin = %origin, routes_count = sealed.len(), "Route manifest compiled");
    Ok(sealed)
}

/// Load a manifest file and compile it into a sealed registry.
pub fn load_registry(path: &Path) -> Result<SealedRegistry> {
    let manifest = load_manifest(path)?;
    build_registry(&manifest, &path.display().to_string())
}
