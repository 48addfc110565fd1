//! Per-wildcard regex constraints ("where" clauses) and variant regex synthesis.

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::power_set::Variant;
use super::validate::POSITIONAL_TOKEN;
use super::wildcard::WildcardData;
use crate::error::{RouteError, RouteResult};

/// Fragment used for every wildcard without an explicit constraint
pub const DEFAULT_CONSTRAINT: &str = "[A-Za-z0-9_%-]+";

/// Constraints bound so far, one optional slot per wildcard index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintBinder {
    bound: Vec<Option<String>>,
}

impl ConstraintBinder {
    #[must_use]
    pub fn new(wildcards: &WildcardData) -> Self {
        Self {
            bound: vec![None; wildcards.len()],
        }
    }

    /// Bind `fragment` to the wildcard called `name`.
    ///
    /// One constraint per wildcard; a second binding is rejected rather than
    /// overwriting the first.
    pub fn bind(
        &mut self,
        uri: &str,
        wildcards: &WildcardData,
        name: &str,
        fragment: &str,
    ) -> RouteResult<()> {
        let Some(index) = wildcards.index_of(name) else {
            return Err(RouteError::UnknownWildcardName {
                uri: uri.to_string(),
                name: name.to_string(),
            });
        };
        if self.bound.get(index).is_some_and(Option::is_some) {
            return Err(RouteError::DuplicateConstraint {
                uri: uri.to_string(),
                name: name.to_string(),
            });
        }
        check_fragment(fragment).map_err(|reason| RouteError::InvalidRegex {
            uri: uri.to_string(),
            name: name.to_string(),
            regex: fragment.to_string(),
            reason,
        })?;
        if let Some(slot) = self.bound.get_mut(index) {
            *slot = Some(fragment.to_string());
        }
        Ok(())
    }

    /// Explicit constraint for the wildcard at `index`, if any
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.bound.get(index).and_then(|c| c.as_deref())
    }

    /// Resolved fragments per wildcard index, defaults filled in
    #[must_use]
    pub fn finish(self) -> Vec<String> {
        self.bound
            .into_iter()
            .map(|c| c.unwrap_or_else(|| DEFAULT_CONSTRAINT.to_string()))
            .collect()
    }
}

/// Compile `fragment` on its own and attempt a zero-length match against it.
fn check_fragment(fragment: &str) -> Result<bool, String> {
    Regex::new(fragment)
        .map(|re| re.is_match(""))
        .map_err(|e| e.to_string())
}

/// Number of capturing groups a fragment brings with it
fn inner_groups(fragment: &str) -> usize {
    Regex::new(fragment)
        .map(|re| re.captures_len().saturating_sub(1))
        .unwrap_or(0)
}

/// A variant together with its anchored regex
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledVariant {
    /// Concrete pattern in positional form
    pub pattern: String,
    /// Surviving wildcard indices, left to right
    pub indices: Vec<usize>,
    /// `^...$` with every `{n}` replaced by `(<fragment>)`
    pub regex: String,
}

/// Build the anchored regex for one variant.
///
/// Literal text between tokens is escaped, so `.` in `/feed.xml` matches a
/// dot only.
#[must_use]
pub fn compile_regex(variant: &Variant, fragments: &[String]) -> CompiledVariant {
    let pattern = &variant.pattern;
    let mut out = String::with_capacity(pattern.len() + 16);
    out.push('^');
    let mut last = 0;
    for caps in POSITIONAL_TOKEN.captures_iter(pattern) {
        let (Some(token), Some(index)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.push_str(&regex::escape(&pattern[last..token.start()]));
        let fragment = index
            .as_str()
            .parse::<usize>()
            .ok()
            .and_then(|i| fragments.get(i))
            .map_or(DEFAULT_CONSTRAINT, String::as_str);
        out.push('(');
        out.push_str(fragment);
        out.push(')');
        last = token.end();
    }
    out.push_str(&regex::escape(&pattern[last..]));
    out.push('$');

    CompiledVariant {
        pattern: pattern.clone(),
        indices: variant.indices.clone(),
        regex: out,
    }
}

/// Capture-group slot of each surviving wildcard in a compiled variant.
///
/// Slots shift when a constraint carries capturing groups of its own, e.g.
/// `(en|fr)` adds one group after the wildcard's outer group.
#[must_use]
pub fn capture_slots(indices: &[usize], fragments: &[String]) -> Vec<usize> {
    let mut slot = 1;
    indices
        .iter()
        .map(|&index| {
            let current = slot;
            let inner = fragments
                .get(index)
                .map_or(0, |fragment| inner_groups(fragment));
            slot += 1 + inner;
            current
        })
        .collect()
}
