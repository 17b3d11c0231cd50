//! # Policy Module
//!
//! Parameter policies: constraints that restrict which values a parameter
//! accepts, and transformers that rewrite values during URL generation.
//!
//! Constraints are a closed sum type ([`RouteConstraint`]) with one variant
//! per built-in key plus [`RouteConstraint::Custom`] for host-supplied
//! predicates. Tokens written in templates (`int`, `range(1,20)`,
//! `regex(^\d+$)`) resolve through a [`ParameterPolicyFactory`] built over a
//! caller-owned [`ConstraintMap`].
//!
//! | Key | Arguments | Accepts |
//! |-----|-----------|---------|
//! | `int`, `long` | - | 32/64-bit integers |
//! | `bool` | - | `true` / `false` |
//! | `guid` | - | UUIDs |
//! | `datetime` | - | invariant dates and date-times |
//! | `decimal`, `double`, `float` | - | numbers |
//! | `alpha` | - | ASCII letters |
//! | `required` | - | non-empty values |
//! | `file`, `nonfile` | - | values that do / do not end in `name.ext` |
//! | `minlength(n)`, `maxlength(n)` | count | character length bounds |
//! | `length(n)`, `length(min,max)` | counts | character length |
//! | `min(n)`, `max(n)`, `range(min,max)` | integers | integer bounds |
//! | `regex(pattern)` | raw text | case-insensitive regex match |

mod constraint;
mod factory;
mod resolved;

pub use constraint::{
    CustomRouteConstraint, ParameterPolicy, ParameterTransformer, RegexConstraint, RouteConstraint, RouteDirection,
    DEFAULT_REGEX_SIZE_LIMIT,
};
pub use factory::{ConstraintMap, ParameterPolicyFactory, PolicyFactory};
pub use resolved::{BoundConstraint, ResolvedPolicies};
