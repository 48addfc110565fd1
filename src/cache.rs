//! # Compiled Table Cache
//!
//! Persists a [`SealedRegistry`] so a process can start without re-validating
//! and re-expanding every route.
//!
//! ## Layout
//!
//! A JSON document with:
//! - `version` - [`FORMAT_VERSION`] of the compiler that wrote it
//! - `source_hash` - SHA-256 prefix of the manifest the table was compiled
//!   from, when it was compiled from one
//! - `routes` - per-route metadata (uri, name, wildcards, constraints,
//!   variants, method bindings) indexed by route id
//! - `entries` - the flattened `(regex, route id, wildcard indices)` rows in
//!   resolution order
//!
//! A table written by a different [`FORMAT_VERSION`], or compiled from a
//! manifest whose content no longer matches `source_hash`, is rejected and
//! [`load_or_rebuild`] falls back to a full rebuild.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::pattern::RoutePattern;
use crate::router::{RouteId, SealedRegistry};

/// Bump whenever the persisted layout or the compilation rules change.
pub const FORMAT_VERSION: u32 = 2;

/// One flattened lookup row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    pub regex: String,
    pub route: RouteId,
    pub indices: Vec<usize>,
}

/// Serializable form of a sealed registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledTable {
    pub version: u32,
    /// Content hash of the manifest this table was compiled from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_hash: Option<String>,
    pub routes: Vec<RoutePattern>,
    pub entries: Vec<TableRow>,
}

/// First 16 hex characters of the SHA-256 of `content`.
#[must_use]
pub fn source_hash(content: &[u8]) -> String {
    let digest = Sha256::digest(content);
    digest.iter().take(8).map(|b| format!("{b:02x}")).collect()
}

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

/// Failure to read, parse or trust a persisted table
#[derive(Debug)]
pub enum CacheError {
    Io { path: PathBuf, source: io::Error },
    Format(serde_json::Error),
    VersionMismatch { found: u32, expected: u32 },
    /// Structurally valid JSON that does not describe a usable registry
    Corrupt(String),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::Io { path, source } => {
                write!(f, "route table cache `{}`: {}", path.display(), source)
            }
            CacheError::Format(e) => write!(f, "route table cache is not valid JSON: {}", e),
            CacheError::VersionMismatch { found, expected } => write!(
                f,
                "route table cache format version {} does not match compiler version {}",
                found, expected
            ),
            CacheError::Corrupt(reason) => write!(f, "route table cache is corrupt: {}", reason),
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CacheError::Io { source, .. } => Some(source),
            CacheError::Format(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(e: serde_json::Error) -> Self {
        CacheError::Format(e)
    }
}

impl SealedRegistry {
    /// Snapshot this registry in persistable form.
    #[must_use]
    pub fn to_table(&self) -> CompiledTable {
        CompiledTable {
            version: FORMAT_VERSION,
            source_hash: None,
            routes: self.routes().iter().map(|r| (**r).clone()).collect(),
            entries: self
                .entries()
                .iter()
                .map(|e| TableRow {
                    regex: e.regex().to_string(),
                    route: e.route(),
                    indices: e.indices().to_vec(),
                })
                .collect(),
        }
    }

    /// Rebuild a sealed registry from a persisted table without re-validating routes.
    pub fn from_table(table: CompiledTable) -> Result<Self, CacheError> {
        if table.version != FORMAT_VERSION {
            return Err(CacheError::VersionMismatch {
                found: table.version,
                expected: FORMAT_VERSION,
            });
        }
        for (row, entry) in table.entries.iter().enumerate() {
            let Some(route) = table.routes.get(entry.route.0) else {
                return Err(CacheError::Corrupt(format!(
                    "row {} references unknown route {}",
                    row, entry.route
                )));
            };
            if let Some(bad) = entry
                .indices
                .iter()
                .find(|&&i| i >= route.wildcard_names().len())
            {
                return Err(CacheError::Corrupt(format!(
                    "row {} references wildcard {} of `{}`",
                    row,
                    bad,
                    route.uri()
                )));
            }
            if !route
                .variants()
                .iter()
                .any(|v| v.regex == entry.regex && v.indices == entry.indices)
            {
                return Err(CacheError::Corrupt(format!(
                    "row {} `{}` is not a variant of `{}`",
                    row,
                    entry.regex,
                    route.uri()
                )));
            }
        }
        let entries = table
            .entries
            .into_iter()
            .map(|e| (e.regex, e.route, e.indices))
            .collect();
        SealedRegistry::assemble(table.routes, entries).map_err(|failure| {
            CacheError::Corrupt(format!(
                "`{}` for `{}` does not compile: {}",
                failure.regex, failure.uri, failure.reason
            ))
        })
    }
}

/// Write `table` as JSON to `path`.
pub fn write_table(path: &Path, table: &CompiledTable) -> Result<(), CacheError> {
    let json = serde_json::to_vec_pretty(table)?;
    fs::write(path, json).map_err(|source| CacheError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a table from `path`, checking its format version before anything else.
pub fn read_table(path: &Path) -> Result<CompiledTable, CacheError> {
    let raw = fs::read_to_string(path).map_err(|source| CacheError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let probe: VersionProbe = serde_json::from_str(&raw)?;
    if probe.version != FORMAT_VERSION {
        return Err(CacheError::VersionMismatch {
            found: probe.version,
            expected: FORMAT_VERSION,
        });
    }
    Ok(serde_json::from_str(&raw)?)
}

/// Load the sealed registry cached at `cache`, or rebuild and re-cache it.
///
/// The cache is ignored when it cannot be read, was written by another format
/// version, or was compiled from content other than what `source` (the
/// declaration file it was built from) holds now.
pub fn load_or_rebuild<F>(
    cache: &Path,
    source: Option<&Path>,
    rebuild: F,
) -> anyhow::Result<SealedRegistry>
where
    F: FnOnce() -> anyhow::Result<SealedRegistry>,
{
    let expected_hash = match source {
        Some(source) => match fs::read(source) {
            Ok(content) => Some(source_hash(&content)),
            Err(e) => {
                warn!(source = %source.display(), error = %e, "Route source unreadable, skipping cache");
                return rebuild();
            }
        },
        None => None,
    };

    match read_table(cache) {
        Ok(table) if expected_hash.is_some() && table.source_hash != expected_hash => {
            info!(
                cache = %cache.display(),
                cached_hash = ?table.source_hash,
                source_hash = ?expected_hash,
                "Route table cache was compiled from other content, rebuilding"
            );
        }
        Ok(table) => match SealedRegistry::from_table(table) {
            Ok(registry) => {
                info!(
                    cache = %cache.display(),
                    routes_count = registry.len(),
                    "Route table loaded from cache"
                );
                return Ok(registry);
            }
            Err(e) => {
                warn!(cache = %cache.display(), error = %e, "Route table cache rejected, rebuilding");
            }
        },
        Err(e) => {
            warn!(cache = %cache.display(), error = %e, "Route table cache rejected, rebuilding");
        }
    }

    let registry = rebuild()?;
    let mut table = registry.to_table();
    table.source_hash = expected_hash;
    if let Err(e) = write_table(cache, &table) {
        warn!(cache = %cache.display(), error = %e, "Failed to write route table cache");
    }
    Ok(registry)
}
