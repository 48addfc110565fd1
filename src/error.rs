//! Error taxonomy for route compilation and resolution.
//!
//! Every variant except [`RouteError::RouteNotFound`] is a configuration
//! defect raised while a route is being declared or registered. Each one names
//! the offending route by its declared `uri` and the rule that was broken.

use std::fmt;

/// A single rule broken by a raw URI pattern.
///
/// Several of these can be reported at once inside
/// [`RouteError::InvalidPathSyntax`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxViolation {
    /// The pattern does not begin with `/`
    MissingLeadingSlash,
    /// `//` somewhere in the pattern
    ExtraSlashes,
    /// `\` somewhere in the pattern
    Backslash,
    /// `{{` or `}}` somewhere in the pattern
    DoubleBraces,
    /// Any whitespace character
    Whitespace,
}

impl fmt::Display for SyntaxViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxViolation::MissingLeadingSlash => write!(f, "must start with a forward slash"),
            SyntaxViolation::ExtraSlashes => write!(f, "`//` extra-slashes"),
            SyntaxViolation::Backslash => write!(f, "`\\` backslash"),
            SyntaxViolation::DoubleBraces => write!(f, "`{{{{` or `}}}}` double-braces"),
            SyntaxViolation::Whitespace => write!(f, "whitespace"),
        }
    }
}

/// Fieldless discriminant of [`RouteError`], handy for matching in callers and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidPathSyntax,
    UnbalancedBraces,
    ReservedWildcardForm,
    DuplicateWildcardName,
    TooManyOptionalWildcards,
    UnknownWildcardName,
    DuplicateConstraint,
    InvalidRegex,
    InvalidRouteName,
    UnsupportedMethod,
    DuplicateMethod,
    DuplicateRouteName,
    DuplicateUriVariant,
    RouteNotFound,
}

/// Route compilation or resolution error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// One or more syntax rules broken by the raw pattern
    InvalidPathSyntax {
        uri: String,
        violations: Vec<SyntaxViolation>,
    },
    /// Brace counts disagree with the number of well-formed wildcard tokens
    UnbalancedBraces {
        uri: String,
        open: usize,
        close: usize,
        matches: usize,
    },
    /// A purely numeric wildcard such as `{0}`, reserved for positional use
    ReservedWildcardForm { uri: String, token: String },
    /// The same wildcard name bound to more than one position
    DuplicateWildcardName { uri: String, name: String },
    /// More optional wildcards than the variant expansion supports
    TooManyOptionalWildcards { uri: String, count: usize, max: usize },
    /// A constraint for a wildcard the pattern does not declare
    UnknownWildcardName { uri: String, name: String },
    /// A second constraint for an already-constrained wildcard
    DuplicateConstraint { uri: String, name: String },
    /// A constraint fragment that is not a valid regular expression.
    ///
    /// `name` is the wildcard, or the concrete variant when the assembled
    /// variant regex failed to compile while sealing.
    InvalidRegex {
        uri: String,
        name: String,
        regex: String,
        reason: String,
    },
    /// Route name outside `[A-Za-z0-9_.-]+`
    InvalidRouteName { uri: String, name: String },
    /// HTTP method outside the supported set
    UnsupportedMethod { uri: String, method: String },
    /// The same HTTP method bound twice on one route
    DuplicateMethod { uri: String, method: String },
    /// Route name already taken by an earlier registration
    DuplicateRouteName {
        uri: String,
        name: String,
        existing_uri: String,
    },
    /// Concrete variant already registered for an overlapping method
    DuplicateUriVariant {
        uri: String,
        variant: String,
        existing_uri: String,
    },
    /// No registered variant matches the requested path
    RouteNotFound { path: String },
}

impl RouteError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            RouteError::InvalidPathSyntax { .. } => ErrorKind::InvalidPathSyntax,
            RouteError::UnbalancedBraces { .. } => ErrorKind::UnbalancedBraces,
            RouteError::ReservedWildcardForm { .. } => ErrorKind::ReservedWildcardForm,
            RouteError::DuplicateWildcardName { .. } => ErrorKind::DuplicateWildcardName,
            RouteError::TooManyOptionalWildcards { .. } => ErrorKind::TooManyOptionalWildcards,
            RouteError::UnknownWildcardName { .. } => ErrorKind::UnknownWildcardName,
            RouteError::DuplicateConstraint { .. } => ErrorKind::DuplicateConstraint,
            RouteError::InvalidRegex { .. } => ErrorKind::InvalidRegex,
            RouteError::InvalidRouteName { .. } => ErrorKind::InvalidRouteName,
            RouteError::UnsupportedMethod { .. } => ErrorKind::UnsupportedMethod,
            RouteError::DuplicateMethod { .. } => ErrorKind::DuplicateMethod,
            RouteError::DuplicateRouteName { .. } => ErrorKind::DuplicateRouteName,
            RouteError::DuplicateUriVariant { .. } => ErrorKind::DuplicateUriVariant,
            RouteError::RouteNotFound { .. } => ErrorKind::RouteNotFound,
        }
    }

    /// The declared pattern this error concerns, `None` for resolution errors.
    #[must_use]
    pub fn uri(&self) -> Option<&str> {
        match self {
            RouteError::InvalidPathSyntax { uri, .. }
            | RouteError::UnbalancedBraces { uri, .. }
            | RouteError::ReservedWildcardForm { uri, .. }
            | RouteError::DuplicateWildcardName { uri, .. }
            | RouteError::TooManyOptionalWildcards { uri, .. }
            | RouteError::UnknownWildcardName { uri, .. }
            | RouteError::DuplicateConstraint { uri, .. }
            | RouteError::InvalidRegex { uri, .. }
            | RouteError::InvalidRouteName { uri, .. }
            | RouteError::UnsupportedMethod { uri, .. }
            | RouteError::DuplicateMethod { uri, .. }
            | RouteError::DuplicateRouteName { uri, .. }
            | RouteError::DuplicateUriVariant { uri, .. } => Some(uri),
            RouteError::RouteNotFound { .. } => None,
        }
    }
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::InvalidPathSyntax { uri, violations } => {
                let joined: Vec<String> = violations.iter().map(ToString::to_string).collect();
                write!(f, "Route path `{}` {}", uri, joined.join(" and "))
            }
            RouteError::UnbalancedBraces {
                uri,
                open,
                close,
                matches,
            } => write!(
                f,
                "Route path `{}` contains unmatched braces ({} open, {} close, {} matches)",
                uri, open, close, matches
            ),
            RouteError::ReservedWildcardForm { uri, token } => write!(
                f,
                "Route path `{}` uses `{}`: wildcards in the form of `{{n}}` are reserved",
                uri, token
            ),
            RouteError::DuplicateWildcardName { uri, name } => write!(
                f,
                "Must declare one unique wildcard per capturing group, duplicated `{{{}}}` detected in route `{}`",
                name, uri
            ),
            RouteError::TooManyOptionalWildcards { uri, count, max } => write!(
                f,
                "Route `{}` declares {} optional wildcards, at most {} are supported",
                uri, count, max
            ),
            RouteError::UnknownWildcardName { uri, name } => {
                write!(f, "Wildcard `{{{}}}` doesn't exist in route `{}`", name, uri)
            }
            RouteError::DuplicateConstraint { uri, name } => write!(
                f,
                "Where clause for `{{{}}}` wildcard has been already declared in route `{}`",
                name, uri
            ),
            RouteError::InvalidRegex {
                uri,
                name,
                regex,
                reason,
            } => write!(
                f,
                "Invalid regex pattern `{}` for `{{{}}}` in route `{}`: {}",
                regex, name, uri, reason
            ),
            RouteError::InvalidRouteName { uri, name } => write!(
                f,
                "Route name `{}` for `{}` must contain only alphanumeric, underscore, hyphen or dot characters",
                name, uri
            ),
            RouteError::UnsupportedMethod { uri, method } => {
                write!(f, "Unknown HTTP method `{}` for route `{}`", method, uri)
            }
            RouteError::DuplicateMethod { uri, method } => write!(
                f,
                "HTTP method `{}` has been already bound for route `{}`",
                method, uri
            ),
            RouteError::DuplicateRouteName {
                uri,
                name,
                existing_uri,
            } => write!(
                f,
                "Route name `{}` for `{}` is already taken by route `{}`",
                name, uri, existing_uri
            ),
            RouteError::DuplicateUriVariant {
                uri,
                variant,
                existing_uri,
            } => write!(
                f,
                "Route `{}` variant `{}` collides with route `{}` for the same HTTP method",
                uri, variant, existing_uri
            ),
            RouteError::RouteNotFound { path } => write!(f, "No route found for `{}`", path),
        }
    }
}

impl std::error::Error for RouteError {}

/// Result alias for route compilation and resolution
pub type RouteResult<T> = Result<T, RouteError>;
