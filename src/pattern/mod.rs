//! # Pattern Module
//!
//! Route templates and their parsed, immutable model.
//!
//! ## Overview
//!
//! A template such as `products/{category}/{id:int}/{slug?}` is parsed once at
//! registration into a [`RoutePattern`]:
//!
//! - an ordered list of [`PathSegment`]s, each holding one or more [`Part`]s
//!   (literal text, an optional-aware separator, or a named parameter)
//! - a flattened parameter list for lookups by name
//! - the merged defaults (inline `{x=1}` plus out-of-line values)
//! - parameter policies, kept as deferred tokens until the route table resolves them
//! - required values used to select routes during link generation
//! - an inbound [`RoutePrecedence`] used to break ties between matches
//!
//! Parsing is pure: the same template text always produces structurally
//! equal patterns, and a finished pattern is never mutated, so it can be
//! shared across threads behind an `Arc`.
//!
//! ## Example
//!
//! ```rust
//! use pathroute::pattern::{parse, Part};
//!
//! let pattern = parse("files/{name}.{ext?}").unwrap();
//! let parts = pattern.segments()[1].parts();
//! assert!(matches!(parts[1], Part::Separator(_)));
//! ```

mod builder;
mod parser;
#[cfg(test)]
mod tests;
mod types;

pub use builder::{parse, RoutePatternBuilder};
pub use types::{
    ParameterKind, ParameterPart, ParameterPolicyReference, Part, PathSegment, RoutePattern, RoutePrecedence,
};
