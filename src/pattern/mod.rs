//! # Pattern Module
//!
//! Turns a declarative URI pattern such as `/post/{year}/{slug?}` into an
//! immutable, fully compiled [`RoutePattern`].
//!
//! ## Pipeline
//!
//! 1. **Validation** ([`validate()`]) - leading slash, no `//`, `\`, `{{`, `}}`
//!    or whitespace, balanced braces, no reserved `{n}` tokens.
//! 2. **Extraction** ([`extract`]) - wildcards are rewritten to their
//!    positional form (`/post/{0}/{1}`), names and optionality recorded.
//! 3. **Expansion** ([`expand`]) - every present/absent combination of the
//!    optional wildcards becomes one concrete variant (`/post/{0}/{1}`,
//!    `/post/{0}`).
//! 4. **Constraints** ([`ConstraintBinder`]) - each wildcard gets a regex
//!    fragment, [`DEFAULT_CONSTRAINT`] when none was declared.
//! 5. **Compilation** ([`compile_regex`]) - each variant becomes an anchored
//!    regex such as `^/post/([0-9]{4})$`.
//!
//! Steps 1-4 run inside [`RouteBuilder`]; [`RouteBuilder::finalize`] runs
//! step 5 and yields the immutable [`RoutePattern`].

mod constraint;
mod power_set;
mod route;
#[cfg(test)]
mod tests;
mod validate;
mod wildcard;

pub use constraint::{capture_slots, compile_regex, CompiledVariant, ConstraintBinder, DEFAULT_CONSTRAINT};
pub use power_set::{
    expand, normalize, power_set, surviving_indices, Variant, MAX_OPTIONAL_WILDCARDS,
};
pub use route::{HttpMethod, MethodBinding, RouteBuilder, RouteKind, RoutePattern};
pub use validate::{has_handlebars, validate};
pub use wildcard::{extract, WildcardData};
