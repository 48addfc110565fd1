//! # Hot Reload Module
//!
//! Live reloading of a route manifest without restarting the process.
//!
//! A sealed registry is never mutated. Reloading compiles a brand new
//! [`SealedRegistry`] from the manifest and publishes it through an
//! [`ArcSwap`], so in-flight resolutions keep using the snapshot they loaded
//! and later ones see the new table.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use arc_swap::ArcSwap;
//! use wildroute::hot_reload::watch_manifest;
//! use wildroute::manifest::load_registry;
//!
//! let shared = Arc::new(ArcSwap::from_pointee(load_registry("routes.yaml".as_ref())?));
//! let watcher = watch_manifest("routes.yaml", Arc::clone(&shared), |registry| {
//!     println!("Reloaded {} routes", registry.len());
//! })?;
//!
//! let resolved = shared.load().resolve("/post/2024")?;
//! // Keep `watcher` alive for as long as reloads are wanted
//! ```
//!
//! ## Error Handling
//!
//! If the edited manifest fails to parse or compile, the error is logged and
//! the previous registry stays published.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{error, info};

use crate::manifest::load_registry;
use crate::router::SealedRegistry;

/// Recompile the manifest at `path` and publish it into `shared`.
///
/// On failure `shared` is left untouched. Returns the number of routes in the
/// newly published registry.
pub fn reload(path: &Path, shared: &ArcSwap<SealedRegistry>) -> anyhow::Result<usize> {
    reload_with_threshold(path, shared, None)
}

fn reload_with_threshold(
    path: &Path,
    shared: &ArcSwap<SealedRegistry>,
    slow_threshold: Option<Duration>,
) -> anyhow::Result<usize> {
    let mut registry = load_registry(path)?;
    if let Some(threshold) = slow_threshold {
        registry = registry.with_slow_threshold(threshold);
    }
    let count = registry.len();
    shared.store(Arc::new(registry));
    info!(manifest = %path.display(), routes_count = count, "hot-reload: route table swapped");
    Ok(count)
}

/// Watch a manifest file and swap a rebuilt registry into `shared` when it changes.
///
/// `on_reload` runs after each successful swap with the new registry.
pub fn watch_manifest<P, F>(
    manifest_path: P,
    shared: Arc<ArcSwap<SealedRegistry>>,
    on_reload: F,
) -> notify::Result<RecommendedWatcher>
where
    P: AsRef<Path>,
    F: FnMut(&SealedRegistry) + Send + 'static,
{
    watch_manifest_with_threshold(manifest_path, shared, None, on_reload)
}

/// Like [`watch_manifest`], applying `slow_threshold` to every rebuilt registry.
pub fn watch_manifest_with_threshold<P, F>(
    manifest_path: P,
    shared: Arc<ArcSwap<SealedRegistry>>,
    slow_threshold: Option<Duration>,
    mut on_reload: F,
) -> notify::Result<RecommendedWatcher>
where
    P: AsRef<Path>,
    F: FnMut(&SealedRegistry) + Send + 'static,
{
    let path: PathBuf = manifest_path.as_ref().to_path_buf();
    let watch_path = path.clone();

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<notify::Event, notify::Error>| match res {
            Ok(event) => {
                if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    match reload_with_threshold(&watch_path, &shared, slow_threshold) {
                        Ok(_) => on_reload(&**shared.load()),
                        Err(e) => error!(
                            manifest = %watch_path.display(),
                            error = %format!("{e:#}"),
                            "hot-reload: keeping previous route table"
                        ),
                    }
                }
            }
            Err(e) => error!(error = %e, "hot-reload: watch error"),
        },
        Config::default(),
    )?;

    watcher.watch(&path, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}
