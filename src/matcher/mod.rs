//! # Matcher Module
//!
//! Request-path matching: the tokenizer, the per-pattern matcher, the
//! jump tables and the DFA that narrows a route table to a candidate set.
//!
//! ## Architecture
//!
//! Matching a request runs in three steps:
//!
//! 1. **Tokenize**: [`tokenize`] splits the path into [`PathSpan`]s inside a
//!    caller-owned [`SegmentBuffer`]. No substring is allocated.
//! 2. **Narrow**: the [`Dfa`] walks one [`JumpTable`] per segment and yields the
//!    indices of patterns that may match.
//! 3. **Verify**: each candidate's [`RoutePatternMatcher`] runs its two-pass
//!    match (reject, then capture) and produces the route values.
//!
//! All comparisons are ordinal and case-insensitive.
//!
//! ## Example
//!
//! ```rust
//! use pathroute::matcher::RoutePatternMatcher;
//! use pathroute::pattern::parse;
//! use std::sync::Arc;
//!
//! let matcher = RoutePatternMatcher::new(Arc::new(parse("{controller}/{action}/{id}").unwrap()));
//! let values = matcher.match_path("/Bank/DoAction/123").unwrap();
//! assert_eq!(values.get_str("controller"), Some("Bank"));
//! assert_eq!(values.get_str("id"), Some("123"));
//! ```

mod dfa;
mod jump_table;
mod pattern_matcher;
mod tokenizer;

pub use dfa::{Dfa, DfaState};
pub use jump_table::{CustomHashTable, JumpTable, JumpTableKind, JumpTableThresholds};
pub use pattern_matcher::RoutePatternMatcher;
pub use tokenizer::{is_truncated, tokenize, PathSpan, SegmentBuffer, DEFAULT_MAX_SEGMENTS};
