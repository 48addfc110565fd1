use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::constraint::{compile_regex, CompiledVariant, ConstraintBinder};
use super::power_set::{expand, MAX_OPTIONAL_WILDCARDS};
use super::validate::validate;
use super::wildcard::{extract, WildcardData};
use crate::error::{RouteError, RouteResult};

static ROUTE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.\-]+$").expect("route name regex should be valid"));

/// HTTP methods a route can bind a handler to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Copy,
    Head,
    Options,
    Link,
    Unlink,
    Purge,
    Lock,
    Unlock,
    Propfind,
    View,
    Trace,
    Connect,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 17] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
        HttpMethod::Copy,
        HttpMethod::Head,
        HttpMethod::Options,
        HttpMethod::Link,
        HttpMethod::Unlink,
        HttpMethod::Purge,
        HttpMethod::Lock,
        HttpMethod::Unlock,
        HttpMethod::Propfind,
        HttpMethod::View,
        HttpMethod::Trace,
        HttpMethod::Connect,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Copy => "COPY",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Link => "LINK",
            HttpMethod::Unlink => "UNLINK",
            HttpMethod::Purge => "PURGE",
            HttpMethod::Lock => "LOCK",
            HttpMethod::Unlock => "UNLOCK",
            HttpMethod::Propfind => "PROPFIND",
            HttpMethod::View => "VIEW",
            HttpMethod::Trace => "TRACE",
            HttpMethod::Connect => "CONNECT",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    /// Method tokens are case-sensitive, as in HTTP itself.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .iter()
            .find(|m| m.as_str() == s)
            .copied()
            .ok_or_else(|| s.to_string())
    }
}

impl TryFrom<&http::Method> for HttpMethod {
    type Error = String;

    fn try_from(method: &http::Method) -> Result<Self, Self::Error> {
        method.as_str().parse()
    }
}

/// Handler bound to one HTTP method. Opaque to routing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodBinding {
    pub handler: String,
    /// `true` for the HEAD binding derived from GET
    #[serde(default)]
    pub derived: bool,
}

/// Whether a route carries wildcards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    Static,
    Dynamic,
}

impl fmt::Display for RouteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteKind::Static => write!(f, "static"),
            RouteKind::Dynamic => write!(f, "dynamic"),
        }
    }
}

/// Mutable route declaration.
///
/// Every step validates immediately and consumes the builder, so an invalid
/// declaration never reaches [`RouteBuilder::finalize`].
///
/// ```rust
/// use wildroute::pattern::{HttpMethod, RouteBuilder};
///
/// let route = RouteBuilder::new("/post/{year}/{slug?}")?
///     .name("post.show")?
///     .constraint("year", "[0-9]{4}")?
///     .method(HttpMethod::Get, "PostController")?
///     .finalize();
/// assert_eq!(route.variants().len(), 2);
/// # Ok::<(), wildroute::RouteError>(())
/// ```
#[derive(Debug, Clone)]
pub struct RouteBuilder {
    uri: String,
    name: Option<String>,
    wildcards: WildcardData,
    constraints: ConstraintBinder,
    methods: BTreeMap<HttpMethod, MethodBinding>,
    middlewares: Vec<String>,
    provenance: Option<String>,
}

impl RouteBuilder {
    /// Validate `uri` and extract its wildcards.
    pub fn new(uri: impl Into<String>) -> RouteResult<Self> {
        let uri = uri.into();
        validate(&uri)?;
        let wildcards = extract(&uri)?;
        let optional = wildcards.optional.iter().filter(|o| **o).count();
        if optional > MAX_OPTIONAL_WILDCARDS {
            return Err(RouteError::TooManyOptionalWildcards {
                uri,
                count: optional,
                max: MAX_OPTIONAL_WILDCARDS,
            });
        }
        let constraints = ConstraintBinder::new(&wildcards);
        Ok(Self {
            uri,
            name: None,
            wildcards,
            constraints,
            methods: BTreeMap::new(),
            middlewares: Vec::new(),
            provenance: None,
        })
    }

    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    #[must_use]
    pub fn wildcards(&self) -> &WildcardData {
        &self.wildcards
    }

    pub fn name(mut self, name: impl Into<String>) -> RouteResult<Self> {
        let name = name.into();
        if !ROUTE_NAME.is_match(&name) {
            return Err(RouteError::InvalidRouteName {
                uri: self.uri,
                name,
            });
        }
        self.name = Some(name);
        Ok(self)
    }

    /// Bind a "where" clause to a declared wildcard.
    pub fn constraint(mut self, wildcard: &str, regex: &str) -> RouteResult<Self> {
        self.constraints
            .bind(&self.uri, &self.wildcards, wildcard, regex)?;
        Ok(self)
    }

    pub fn method(mut self, method: HttpMethod, handler: impl Into<String>) -> RouteResult<Self> {
        if self.methods.contains_key(&method) {
            return Err(RouteError::DuplicateMethod {
                uri: self.uri,
                method: method.to_string(),
            });
        }
        self.methods.insert(
            method,
            MethodBinding {
                handler: handler.into(),
                derived: false,
            },
        );
        Ok(self)
    }

    /// Like [`RouteBuilder::method`], parsing the method token first.
    pub fn method_str(self, method: &str, handler: impl Into<String>) -> RouteResult<Self> {
        match method.parse::<HttpMethod>() {
            Ok(m) => self.method(m, handler),
            Err(method) => Err(RouteError::UnsupportedMethod {
                uri: self.uri,
                method,
            }),
        }
    }

    #[must_use]
    pub fn middleware(mut self, id: impl Into<String>) -> Self {
        self.middlewares.push(id.into());
        self
    }

    /// Record where this route was declared (`file:line` or any symbolic tag).
    #[must_use]
    pub fn provenance(mut self, tag: impl Into<String>) -> Self {
        self.provenance = Some(tag.into());
        self
    }

    /// Fill defaults, expand optional wildcards and compile every variant.
    #[must_use]
    pub fn finalize(mut self) -> RoutePattern {
        if let Some(get) = self.methods.get(&HttpMethod::Get).cloned() {
            self.methods
                .entry(HttpMethod::Head)
                .or_insert(MethodBinding {
                    handler: get.handler,
                    derived: true,
                });
        }

        let constraints = self.constraints.finish();
        let variants: Vec<CompiledVariant> =
            expand(&self.wildcards.positional_form, &self.wildcards.optional)
                .iter()
                .map(|variant| compile_regex(variant, &constraints))
                .collect();

        debug!(
            uri = %self.uri,
            name = ?self.name,
            wildcards = ?self.wildcards.names,
            variants = variants.len(),
            "Route finalized"
        );

        RoutePattern {
            uri: self.uri,
            name: self.name,
            wildcards: self.wildcards,
            constraints,
            variants,
            methods: self.methods,
            middlewares: self.middlewares,
            provenance: self.provenance,
        }
    }
}

/// Immutable, fully compiled route definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutePattern {
    uri: String,
    name: Option<String>,
    wildcards: WildcardData,
    /// Resolved fragment per wildcard index
    constraints: Vec<String>,
    variants: Vec<CompiledVariant>,
    methods: BTreeMap<HttpMethod, MethodBinding>,
    middlewares: Vec<String>,
    provenance: Option<String>,
}

impl RoutePattern {
    /// Shorthand for `RouteBuilder::new(uri)?.finalize()`.
    pub fn parse(uri: &str) -> RouteResult<Self> {
        Ok(RouteBuilder::new(uri)?.finalize())
    }

    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn has_wildcards(&self) -> bool {
        !self.wildcards.is_empty()
    }

    #[must_use]
    pub fn kind(&self) -> RouteKind {
        if self.has_wildcards() {
            RouteKind::Dynamic
        } else {
            RouteKind::Static
        }
    }

    #[must_use]
    pub fn wildcards(&self) -> &WildcardData {
        &self.wildcards
    }

    #[must_use]
    pub fn wildcard_names(&self) -> &[String] {
        &self.wildcards.names
    }

    #[must_use]
    pub fn optional_flags(&self) -> &[bool] {
        &self.wildcards.optional
    }

    #[must_use]
    pub fn positional_form(&self) -> &str {
        &self.wildcards.positional_form
    }

    /// Fragments aligned with [`RoutePattern::wildcard_names`]
    #[must_use]
    pub fn constraints(&self) -> &[String] {
        &self.constraints
    }

    #[must_use]
    pub fn constraint(&self, wildcard: &str) -> Option<&str> {
        self.wildcards
            .index_of(wildcard)
            .and_then(|i| self.constraints.get(i))
            .map(String::as_str)
    }

    #[must_use]
    pub fn variants(&self) -> &[CompiledVariant] {
        &self.variants
    }

    #[must_use]
    pub fn methods(&self) -> &BTreeMap<HttpMethod, MethodBinding> {
        &self.methods
    }

    #[must_use]
    pub fn handler(&self, method: HttpMethod) -> Option<&str> {
        self.methods.get(&method).map(|b| b.handler.as_str())
    }

    #[must_use]
    pub fn middlewares(&self) -> &[String] {
        &self.middlewares
    }

    #[must_use]
    pub fn provenance(&self) -> Option<&str> {
        self.provenance.as_deref()
    }

    /// Whether this route answers `method`; a route without bindings answers every method.
    #[must_use]
    pub fn answers(&self, method: HttpMethod) -> bool {
        self.methods.is_empty() || self.methods.contains_key(&method)
    }

    /// Whether two routes can answer the same method.
    ///
    /// A route without any method binding answers every method.
    #[must_use]
    pub fn shares_method_with(&self, other: &RoutePattern) -> bool {
        if self.methods.is_empty() || other.methods.is_empty() {
            return true;
        }
        self.methods.keys().any(|m| other.methods.contains_key(m))
    }
}
