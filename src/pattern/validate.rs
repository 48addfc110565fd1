//! Raw URI pattern syntax checks.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{RouteError, RouteResult, SyntaxViolation};

/// `{identifier}` or `{identifier?}`; identifier = letter or underscore followed by word characters
pub(crate) static WILDCARD_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)(\?)?\}").expect("wildcard token regex should be valid")
});

/// Positional placeholders such as `{0}`, reserved for internal use
pub(crate) static POSITIONAL_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([0-9]+)\}").expect("positional token regex should be valid"));

/// Whether the pattern contains any brace at all
#[inline]
#[must_use]
pub fn has_handlebars(pattern: &str) -> bool {
    pattern.contains('{') || pattern.contains('}')
}

/// Validate raw URI pattern syntax.
///
/// Plain syntax violations are collected and reported together. Brace checks
/// only run when the pattern contains braces: reserved `{n}` tokens are
/// rejected first, then the brace counts must agree with the number of
/// well-formed wildcard tokens.
pub fn validate(pattern: &str) -> RouteResult<()> {
    let violations = syntax_violations(pattern);
    if !violations.is_empty() {
        return Err(RouteError::InvalidPathSyntax {
            uri: pattern.to_string(),
            violations,
        });
    }
    if !has_handlebars(pattern) {
        return Ok(());
    }
    if let Some(reserved) = POSITIONAL_TOKEN.find(pattern) {
        return Err(RouteError::ReservedWildcardForm {
            uri: pattern.to_string(),
            token: reserved.as_str().to_string(),
        });
    }
    let open = pattern.matches('{').count();
    let close = pattern.matches('}').count();
    let matches = WILDCARD_TOKEN.find_iter(pattern).count();
    if open != close || open != matches {
        return Err(RouteError::UnbalancedBraces {
            uri: pattern.to_string(),
            open,
            close,
            matches,
        });
    }
    Ok(())
}

fn syntax_violations(pattern: &str) -> Vec<SyntaxViolation> {
    let mut violations = Vec::new();
    if !pattern.starts_with('/') {
        violations.push(SyntaxViolation::MissingLeadingSlash);
    }
    if pattern.contains("//") {
        violations.push(SyntaxViolation::ExtraSlashes);
    }
    if pattern.contains('\\') {
        violations.push(SyntaxViolation::Backslash);
    }
    if pattern.contains("{{") || pattern.contains("}}") {
        violations.push(SyntaxViolation::DoubleBraces);
    }
    if pattern.chars().any(char::is_whitespace) {
        violations.push(SyntaxViolation::Whitespace);
    }
    violations
}
