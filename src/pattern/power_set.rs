//! Optional-wildcard expansion.
//!
//! Every optional wildcard is either fully present or fully removed, so a
//! pattern with `k` optionals describes `2^k` concrete variants. Each variant
//! records which positional indices survive, in left-to-right order, so that
//! regex capture groups can later be mapped back to wildcard names.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::validate::POSITIONAL_TOKEN;

/// Most optional wildcards one pattern may declare.
///
/// Expansion produces `2^k` variants, each compiled into its own regex.
pub const MAX_OPTIONAL_WILDCARDS: usize = 16;

/// One concrete pattern produced by fixing the present/absent choice of every optional wildcard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Concrete pattern in positional form, e.g. `/post/{0}`
    pub pattern: String,
    /// Positional indices still present, in the order their `{n}` tokens appear
    pub indices: Vec<usize>,
}

/// Presence masks for `k` optional positions, all-present first and all-absent last.
///
/// `masks[c][i]` is `true` when optional position `i` is kept in combination `c`.
/// `k` must not exceed [`MAX_OPTIONAL_WILDCARDS`]; route builders reject larger patterns.
#[must_use]
pub fn power_set(k: usize) -> Vec<SmallVec<[bool; 8]>> {
    let total = 1usize << k;
    (0..total)
        .map(|mask| (0..k).map(|bit| mask & (1 << bit) == 0).collect())
        .collect()
}

/// Expand a positional form into its concrete variants.
///
/// Without optional wildcards the single variant is the positional form with
/// every index present. When normalization collapses two combinations to the
/// same string, the first one generated wins.
#[must_use]
pub fn expand(positional_form: &str, optional: &[bool]) -> Vec<Variant> {
    let optionals: Vec<usize> = optional
        .iter()
        .enumerate()
        .filter_map(|(i, opt)| opt.then_some(i))
        .collect();

    if optionals.is_empty() {
        return vec![Variant {
            pattern: positional_form.to_string(),
            indices: (0..optional.len()).collect(),
        }];
    }

    let mut seen = HashSet::new();
    let mut variants = Vec::with_capacity(1 << optionals.len());
    for presence in power_set(optionals.len()) {
        let mut concrete = positional_form.to_string();
        let mut removed = false;
        for (slot, &index) in optionals.iter().enumerate() {
            if !presence[slot] {
                concrete = concrete.replace(&format!("{{{index}}}"), "");
                removed = true;
            }
        }
        if removed {
            concrete = normalize(&concrete);
        }
        if !seen.insert(concrete.clone()) {
            continue;
        }
        let indices = surviving_indices(&concrete);
        variants.push(Variant {
            pattern: concrete,
            indices,
        });
    }
    variants
}

/// Positional indices of the `{n}` tokens in `variant`, left to right
#[must_use]
pub fn surviving_indices(variant: &str) -> Vec<usize> {
    POSITIONAL_TOKEN
        .captures_iter(variant)
        .filter_map(|caps| caps.get(1).and_then(|m| m.as_str().parse().ok()))
        .collect()
}

/// Collapse repeated slashes and drop a trailing slash, keeping `/` for the root.
#[must_use]
pub fn normalize(path: &str) -> String {
    let mut out = String::with_capacity(path.len() + 1);
    for c in path.chars() {
        if c == '/' && out.ends_with('/') {
            continue;
        }
        out.push(c);
    }
    while out.len() > 1 && out.ends_with('/') {
        out.pop();
    }
    if !out.starts_with('/') {
        out.insert(0, '/');
    }
    out
}
