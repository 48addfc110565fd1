//! Wildcard extraction and the positional form.
//!
//! `/user/{id}/{slug?}` becomes `/user/{0}/{1}` with names `["id", "slug"]`
//! and optional flags `[false, true]`.

use serde::{Deserialize, Serialize};

use super::validate::WILDCARD_TOKEN;
use crate::error::{RouteError, RouteResult};

/// Wildcards found in one pattern, indexed by occurrence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WildcardData {
    /// Pattern with every wildcard token replaced by `{n}`
    pub positional_form: String,
    /// Canonical names (without `?`) in order of appearance
    pub names: Vec<String>,
    /// `true` where the wildcard at that index was declared with `?`
    pub optional: Vec<bool>,
}

impl WildcardData {
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Occurrence index of a wildcard name
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Indices of the optional wildcards, ascending
    #[must_use]
    pub fn optional_indices(&self) -> Vec<usize> {
        self.optional
            .iter()
            .enumerate()
            .filter_map(|(i, opt)| opt.then_some(i))
            .collect()
    }
}

/// Scan `pattern` left to right and rewrite its wildcards to positional form.
///
/// Fails with [`RouteError::DuplicateWildcardName`] when a canonical name
/// appears twice, optional or not.
pub fn extract(pattern: &str) -> RouteResult<WildcardData> {
    let mut positional_form = String::with_capacity(pattern.len());
    let mut names: Vec<String> = Vec::new();
    let mut optional = Vec::new();
    let mut last = 0;

    for caps in WILDCARD_TOKEN.captures_iter(pattern) {
        let (Some(token), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let name = name.as_str();
        if names.iter().any(|n| n == name) {
            return Err(RouteError::DuplicateWildcardName {
                uri: pattern.to_string(),
                name: name.to_string(),
            });
        }
        positional_form.push_str(&pattern[last..token.start()]);
        positional_form.push('{');
        positional_form.push_str(&names.len().to_string());
        positional_form.push('}');
        last = token.end();

        names.push(name.to_string());
        optional.push(caps.get(2).is_some());
    }
    positional_form.push_str(&pattern[last..]);

    Ok(WildcardData {
        positional_form,
        names,
        optional,
    })
}
