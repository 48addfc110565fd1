//! Registry core - registration, sealing and the resolve hot path.
//!
//! # Hot path
//!
//! [`SealedRegistry::resolve`] performs reads only: one anchored regex (or
//! literal compare) per flattened table entry, in registration order, until
//! the first match. [`SealedRegistry::resolve_method`] walks the same table
//! but skips routes that do not answer the request method.

#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]
#![deny(clippy::unnecessary_to_owned)]

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, info, warn};

use crate::error::{RouteError, RouteResult};
use crate::pattern::{capture_slots, HttpMethod, RouteBuilder, RoutePattern};

/// Maximum number of wildcard values before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Default threshold above which a resolution is logged as slow
pub const DEFAULT_SLOW_RESOLVE: Duration = Duration::from_millis(1);

/// Captured wildcard values, stack-allocated for up to [`MAX_INLINE_PARAMS`].
///
/// Names are `Arc<str>` shared with the sealed table; values are per-request.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Dense route identifier: the registration index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteId(pub usize);

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Result of a successful resolution
#[derive(Debug, Clone)]
pub struct Resolved {
    /// Identity of the matched route
    pub id: RouteId,
    /// The matched route definition
    pub route: Arc<RoutePattern>,
    /// Values of the wildcards present in the matched variant
    pub params: ParamVec,
}

impl Resolved {
    /// Captured value for a wildcard name
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Handler bound to `method` on the matched route
    #[inline]
    #[must_use]
    pub fn handler(&self, method: HttpMethod) -> Option<&str> {
        self.route.handler(method)
    }

    /// Note: This allocates - use [`Resolved::get`] in hot paths instead
    #[must_use]
    pub fn params_map(&self) -> HashMap<String, String> {
        self.params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

/// Route collection in its `Open` state.
///
/// Registration order is significant: earlier routes win when several
/// variants match the same path.
#[derive(Debug, Default)]
pub struct RouteRegistry {
    routes: Vec<RoutePattern>,
    names: HashMap<String, RouteId>,
    variants: HashMap<String, Vec<RouteId>>,
}

impl RouteRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Register a finalized route.
    ///
    /// Rejects a name already in use, and any concrete variant that an earlier
    /// route already produces for an overlapping HTTP method.
    pub fn register(&mut self, route: RoutePattern) -> RouteResult<RouteId> {
        if let Some(name) = route.name() {
            if let Some(existing) = self.names.get(name) {
                return Err(RouteError::DuplicateRouteName {
                    uri: route.uri().to_string(),
                    name: name.to_string(),
                    existing_uri: self.routes[existing.0].uri().to_string(),
                });
            }
        }
        for variant in route.variants() {
            let Some(ids) = self.variants.get(&variant.pattern) else {
                continue;
            };
            if let Some(existing) = ids
                .iter()
                .map(|id| &self.routes[id.0])
                .find(|existing| existing.shares_method_with(&route))
            {
                return Err(RouteError::DuplicateUriVariant {
                    uri: route.uri().to_string(),
                    variant: variant.pattern.clone(),
                    existing_uri: existing.uri().to_string(),
                });
            }
        }

        let id = RouteId(self.routes.len());
        if let Some(name) = route.name() {
            self.names.insert(name.to_string(), id);
        }
        for variant in route.variants() {
            self.variants
                .entry(variant.pattern.clone())
                .or_default()
                .push(id);
        }
        debug!(
            route_id = id.0,
            uri = %route.uri(),
            name = ?route.name(),
            variants = route.variants().len(),
            provenance = ?route.provenance(),
            "Route registered"
        );
        self.routes.push(route);
        Ok(id)
    }

    /// Finalize a builder and register the result.
    pub fn add(&mut self, builder: RouteBuilder) -> RouteResult<RouteId> {
        self.register(builder.finalize())
    }

    /// Declare, constrain and register a route in one call.
    pub fn register_uri(
        &mut self,
        uri: &str,
        name: Option<&str>,
        constraints: &[(&str, &str)],
    ) -> RouteResult<RouteId> {
        let mut builder = RouteBuilder::new(uri)?;
        if let Some(name) = name {
            builder = builder.name(name)?;
        }
        for (wildcard, regex) in constraints {
            builder = builder.constraint(wildcard, regex)?;
        }
        self.add(builder)
    }

    /// Close registration and compile the flattened lookup table.
    pub fn seal(self) -> RouteResult<SealedRegistry> {
        let entries: Vec<(String, RouteId, Vec<usize>)> = self
            .routes
            .iter()
            .enumerate()
            .flat_map(|(i, route)| {
                route
                    .variants()
                    .iter()
                    .map(move |v| (v.regex.clone(), RouteId(i), v.indices.clone()))
            })
            .collect();

        SealedRegistry::assemble(self.routes, entries).map_err(|failure| {
            RouteError::InvalidRegex {
                uri: failure.uri,
                name: failure.variant,
                regex: failure.regex,
                reason: failure.reason,
            }
        })
    }
}

/// How one table entry compares against a path
#[derive(Debug, Clone)]
enum Matcher {
    /// Wildcard-free variant, compared for equality
    Literal(String),
    Regex(Regex),
}

/// One row of the flattened lookup table
#[derive(Debug, Clone)]
pub struct TableEntry {
    regex: String,
    route: RouteId,
    indices: Vec<usize>,
    slots: Vec<usize>,
    matcher: Matcher,
}

impl TableEntry {
    /// The anchored pattern string
    #[must_use]
    pub fn regex(&self) -> &str {
        &self.regex
    }

    #[must_use]
    pub fn route(&self) -> RouteId {
        self.route
    }

    /// Wildcard indices present in this variant, left to right
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }
}

/// Why a table row could not be compiled
#[derive(Debug, Clone)]
pub(crate) struct EntryFailure {
    pub uri: String,
    pub variant: String,
    pub regex: String,
    pub reason: String,
}

/// Route collection in its `Sealed` state: immutable, shareable, resolvable.
///
/// Rebuilding means sealing a new registry and swapping it in (see
/// [`crate::hot_reload`]); a sealed registry is never mutated in place.
#[derive(Debug, Clone)]
pub struct SealedRegistry {
    routes: Vec<Arc<RoutePattern>>,
    wildcard_names: Vec<Vec<Arc<str>>>,
    names: HashMap<String, RouteId>,
    table: Vec<TableEntry>,
    slow_threshold: Duration,
}

impl SealedRegistry {
    /// Build the sealed state from routes and their flattened rows.
    ///
    /// Rows must reference valid route ids; callers check that beforehand.
    pub(crate) fn assemble(
        routes: Vec<RoutePattern>,
        entries: Vec<(String, RouteId, Vec<usize>)>,
    ) -> Result<Self, EntryFailure> {
        let mut table = Vec::with_capacity(entries.len());
        for (regex, id, indices) in entries {
            let route = &routes[id.0];
            let variant = route.variants().iter().find(|v| v.regex == regex);
            let matcher = match variant {
                Some(v) if v.indices.is_empty() && indices.is_empty() => {
                    Matcher::Literal(v.pattern.clone())
                }
                _ => Matcher::Regex(Regex::new(&regex).map_err(|e| EntryFailure {
                    uri: route.uri().to_string(),
                    variant: variant.map_or_else(String::new, |v| v.pattern.clone()),
                    regex: regex.clone(),
                    reason: e.to_string(),
                })?),
            };
            let slots = capture_slots(&indices, route.constraints());
            table.push(TableEntry {
                regex,
                route: id,
                indices,
                slots,
                matcher,
            });
        }

        let mut names = HashMap::new();
        let mut wildcard_names = Vec::with_capacity(routes.len());
        for (i, route) in routes.iter().enumerate() {
            if let Some(name) = route.name() {
                names.insert(name.to_string(), RouteId(i));
            }
            wildcard_names.push(
                route
                    .wildcard_names()
                    .iter()
                    .map(|n| Arc::<str>::from(n.as_str()))
                    .collect(),
            );
        }
        let routes: Vec<Arc<RoutePattern>> = routes.into_iter().map(Arc::new).collect();

        let routes_summary: Vec<&str> = routes.iter().take(10).map(|r| r.uri()).collect();
        info!(
            routes_count = routes.len(),
            table_entries = table.len(),
            routes_summary = ?routes_summary,
            "Route registry sealed"
        );

        Ok(Self {
            routes,
            wildcard_names,
            names,
            table,
            slow_threshold: DEFAULT_SLOW_RESOLVE,
        })
    }

    /// Set the duration above which a resolution is logged as slow.
    #[must_use]
    pub fn with_slow_threshold(mut self, threshold: Duration) -> Self {
        self.slow_threshold = threshold;
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    #[must_use]
    pub fn route(&self, id: RouteId) -> Option<&Arc<RoutePattern>> {
        self.routes.get(id.0)
    }

    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<(RouteId, &Arc<RoutePattern>)> {
        let id = *self.names.get(name)?;
        self.routes.get(id.0).map(|route| (id, route))
    }

    /// Routes in registration order
    #[must_use]
    pub fn routes(&self) -> &[Arc<RoutePattern>] {
        &self.routes
    }

    /// Flattened lookup table in resolution order
    #[must_use]
    pub fn entries(&self) -> &[TableEntry] {
        &self.table
    }

    /// Resolve a request path against the flattened table.
    ///
    /// First match in registration order wins. The error carries only the
    /// requested path.
    pub fn resolve(&self, path: &str) -> RouteResult<Resolved> {
        self.resolve_filtered(path, None)
    }

    /// Resolve `path` for a request made with `method`.
    ///
    /// Rows whose route does not answer `method` are skipped, so two routes
    /// sharing a concrete variant under disjoint methods are both reachable.
    /// A route without method bindings answers every method.
    pub fn resolve_method(&self, path: &str, method: HttpMethod) -> RouteResult<Resolved> {
        self.resolve_filtered(path, Some(method))
    }

    fn resolve_filtered(&self, path: &str, method: Option<HttpMethod>) -> RouteResult<Resolved> {
        let start = std::time::Instant::now();
        let result = self.find(path, method);
        let elapsed = start.elapsed();

        match &result {
            Some(resolved) => {
                if elapsed > self.slow_threshold {
                    warn!(
                        path = %path,
                        method = ?method,
                        route_id = resolved.id.0,
                        uri = %resolved.route.uri(),
                        duration_us = elapsed.as_micros(),
                        "Slow route resolution detected"
                    );
                } else {
                    debug!(
                        path = %path,
                        method = ?method,
                        route_id = resolved.id.0,
                        uri = %resolved.route.uri(),
                        params = ?resolved.params,
                        duration_us = elapsed.as_micros(),
                        "Route resolved"
                    );
                }
            }
            None => {
                debug!(
                    path = %path,
                    method = ?method,
                    duration_us = elapsed.as_micros(),
                    "No route matched"
                );
            }
        }

        result.ok_or_else(|| RouteError::RouteNotFound {
            path: path.to_string(),
        })
    }

    fn find(&self, path: &str, method: Option<HttpMethod>) -> Option<Resolved> {
        for entry in &self.table {
            let route = &self.routes[entry.route.0];
            if let Some(method) = method {
                if !route.answers(method) {
                    continue;
                }
            }
            let mut params = ParamVec::new();
            match &entry.matcher {
                Matcher::Literal(literal) => {
                    if literal != path {
                        continue;
                    }
                }
                Matcher::Regex(regex) => {
                    let Some(captures) = regex.captures(path) else {
                        continue;
                    };
                    let names = &self.wildcard_names[entry.route.0];
                    for (index, slot) in entry.indices.iter().zip(&entry.slots) {
                        if let (Some(name), Some(value)) = (names.get(*index), captures.get(*slot))
                        {
                            params.push((Arc::clone(name), value.as_str().to_owned()));
                        }
                    }
                }
            }
            return Some(Resolved {
                id: entry.route,
                route: Arc::clone(route),
                params,
            });
        }
        None
    }
}
