//! Built-in route constraints and the extension traits for host-supplied
//! policies.

use crate::text::eq_ignore_case;
use crate::values::{RouteValue, RouteValueDictionary};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::{Regex, RegexBuilder};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Default compiled-size bound for `regex(...)` constraints (1 MiB).
pub const DEFAULT_REGEX_SIZE_LIMIT: usize = 1 << 20;

/// Which way a route is being used when a constraint is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDirection {
    /// Matching an incoming request path
    IncomingRequest,
    /// Generating a URL from values
    UrlGeneration,
}

/// Host-supplied constraint.
pub trait CustomRouteConstraint: Send + Sync + fmt::Debug {
    /// Return `true` when the value under `key` is acceptable.
    fn matches(&self, key: &str, values: &RouteValueDictionary, direction: RouteDirection) -> bool;
}

/// Rewrites a parameter value during URL generation (e.g. slugify).
pub trait ParameterTransformer: Send + Sync + fmt::Debug {
    /// Return the text to emit, or `None` to treat the value as empty.
    fn transform_outbound(&self, value: &RouteValue) -> Option<String>;
}

/// Compiled `regex(...)` constraint. Compares equal by source text.
#[derive(Debug, Clone)]
pub struct RegexConstraint {
    source: String,
    regex: Regex,
}

impl RegexConstraint {
    /// Compile case-insensitively with a bounded program size.
    pub fn new(source: &str, size_limit: usize) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(source)
            .case_insensitive(true)
            .size_limit(size_limit)
            .build()?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// The pattern as written in the template.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Unanchored match, as written; templates add `^...$` themselves.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl PartialEq for RegexConstraint {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// A route constraint. Every built-in key of the default constraint map
/// resolves to one of these variants.
#[derive(Debug, Clone)]
pub enum RouteConstraint {
    /// 32-bit integer
    Int,
    /// 64-bit integer
    Long,
    /// `true` / `false`
    Bool,
    /// GUID / UUID in any common textual form
    Guid,
    /// Invariant date or date-time
    DateTime,
    /// Fixed-point decimal (no exponent)
    Decimal,
    /// 64-bit float
    Double,
    /// 32-bit float
    Float,
    /// ASCII letters only
    Alpha,
    /// Non-empty value
    Required,
    /// Last path segment looks like a file name (`name.ext`)
    File,
    /// Negation of [`RouteConstraint::File`]
    NonFile,
    /// At least `n` characters
    MinLength(usize),
    /// At most `n` characters
    MaxLength(usize),
    /// Between `min` and `max` characters inclusive
    Length {
        /// Minimum length
        min: usize,
        /// Maximum length
        max: usize,
    },
    /// Integer value at least `n`
    Min(i64),
    /// Integer value at most `n`
    Max(i64),
    /// Integer value within `[min, max]`
    Range {
        /// Lower bound
        min: i64,
        /// Upper bound
        max: i64,
    },
    /// Regular expression
    Regex(RegexConstraint),
    /// Host-supplied constraint
    Custom(Arc<dyn CustomRouteConstraint>),
}

impl PartialEq for RouteConstraint {
    fn eq(&self, other: &Self) -> bool {
        use RouteConstraint::*;
        match (self, other) {
            (MinLength(a), MinLength(b)) | (MaxLength(a), MaxLength(b)) => a == b,
            (Length { min: a, max: b }, Length { min: c, max: d }) => a == c && b == d,
            (Min(a), Min(b)) | (Max(a), Max(b)) => a == b,
            (Range { min: a, max: b }, Range { min: c, max: d }) => a == c && b == d,
            (Regex(a), Regex(b)) => a == b,
            (Custom(a), Custom(b)) => Arc::ptr_eq(a, b),
            (a, b) => std::mem::discriminant(a) == std::mem::discriminant(b) && a.is_unit(),
        }
    }
}

impl RouteConstraint {
    fn is_unit(&self) -> bool {
        matches!(
            self,
            RouteConstraint::Int
                | RouteConstraint::Long
                | RouteConstraint::Bool
                | RouteConstraint::Guid
                | RouteConstraint::DateTime
                | RouteConstraint::Decimal
                | RouteConstraint::Double
                | RouteConstraint::Float
                | RouteConstraint::Alpha
                | RouteConstraint::Required
                | RouteConstraint::File
                | RouteConstraint::NonFile
        )
    }

    /// Evaluate against `values[key]`. An absent or null value fails.
    #[must_use]
    pub fn matches(&self, key: &str, values: &RouteValueDictionary, direction: RouteDirection) -> bool {
        if let RouteConstraint::Custom(custom) = self {
            return custom.matches(key, values, direction);
        }
        match values.get(key) {
            None | Some(RouteValue::Null) => false,
            Some(value) => self.matches_value(value),
        }
    }

    /// Evaluate a single value.
    #[must_use]
    pub fn matches_value(&self, value: &RouteValue) -> bool {
        match self {
            RouteConstraint::Int => match value {
                RouteValue::Int(i) => i32::try_from(*i).is_ok(),
                RouteValue::Str(s) => s.trim().parse::<i32>().is_ok(),
                _ => false,
            },
            RouteConstraint::Long => match value {
                RouteValue::Int(_) => true,
                RouteValue::Str(s) => s.trim().parse::<i64>().is_ok(),
                _ => false,
            },
            RouteConstraint::Bool => match value {
                RouteValue::Bool(_) => true,
                RouteValue::Str(s) => {
                    let s = s.trim();
                    eq_ignore_case(s, "true") || eq_ignore_case(s, "false")
                }
                _ => false,
            },
            RouteConstraint::Guid => {
                text(value).is_some_and(|s| uuid::Uuid::parse_str(s.trim()).is_ok())
            }
            RouteConstraint::DateTime => text(value).is_some_and(|s| is_invariant_datetime(s.trim())),
            RouteConstraint::Decimal => match value {
                RouteValue::Int(_) => true,
                RouteValue::Float(f) => f.is_finite(),
                RouteValue::Str(s) => is_decimal(s.trim()),
                _ => false,
            },
            RouteConstraint::Double => match value {
                RouteValue::Int(_) | RouteValue::Float(_) => true,
                RouteValue::Str(s) => s.trim().parse::<f64>().is_ok(),
                _ => false,
            },
            RouteConstraint::Float => match value {
                RouteValue::Int(_) | RouteValue::Float(_) => true,
                RouteValue::Str(s) => s.trim().parse::<f32>().is_ok(),
                _ => false,
            },
            RouteConstraint::Alpha => {
                text(value).is_some_and(|s| s.bytes().all(|b| b.is_ascii_alphabetic()))
            }
            RouteConstraint::Required => text(value).is_some_and(|s| !s.is_empty()),
            RouteConstraint::File => text(value).is_some_and(|s| is_file_name(&s)),
            RouteConstraint::NonFile => text(value).is_some_and(|s| !is_file_name(&s)),
            RouteConstraint::MinLength(n) => text(value).is_some_and(|s| s.chars().count() >= *n),
            RouteConstraint::MaxLength(n) => text(value).is_some_and(|s| s.chars().count() <= *n),
            RouteConstraint::Length { min, max } => text(value).is_some_and(|s| {
                let len = s.chars().count();
                len >= *min && len <= *max
            }),
            RouteConstraint::Min(n) => integer(value).is_some_and(|v| v >= *n),
            RouteConstraint::Max(n) => integer(value).is_some_and(|v| v <= *n),
            RouteConstraint::Range { min, max } => integer(value).is_some_and(|v| v >= *min && v <= *max),
            RouteConstraint::Regex(re) => text(value).is_some_and(|s| re.is_match(&s)),
            // Custom constraints need the whole value map; see `matches`.
            RouteConstraint::Custom(_) => false,
        }
    }
}

fn text(value: &RouteValue) -> Option<Cow<'_, str>> {
    value.to_route_string()
}

fn integer(value: &RouteValue) -> Option<i64> {
    match value {
        RouteValue::Int(i) => Some(*i),
        RouteValue::Str(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn is_decimal(s: &str) -> bool {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    let (whole, fraction) = match digits.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (digits, None),
    };
    let whole_ok = whole.bytes().all(|b| b.is_ascii_digit());
    let fraction_ok = fraction.map_or(true, |f| f.bytes().all(|b| b.is_ascii_digit()));
    whole_ok && fraction_ok && (!whole.is_empty() || fraction.is_some_and(|f| !f.is_empty()))
}

fn is_invariant_datetime(s: &str) -> bool {
    const DATE_TIME_FORMATS: [&str; 6] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
    ];
    const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

    DateTime::parse_from_rfc3339(s).is_ok()
        || DATE_TIME_FORMATS
            .iter()
            .any(|f| NaiveDateTime::parse_from_str(s, f).is_ok())
        || DATE_FORMATS.iter().any(|f| NaiveDate::parse_from_str(s, f).is_ok())
}

fn is_file_name(s: &str) -> bool {
    let last = s.rsplit('/').next().unwrap_or(s);
    match last.rfind('.') {
        Some(dot) => dot > 0 && dot + 1 < last.len(),
        None => false,
    }
}

/// A policy attached to a route parameter.
#[derive(Debug, Clone)]
pub enum ParameterPolicy {
    /// Restricts acceptable values
    Constraint(RouteConstraint),
    /// Rewrites values during URL generation
    Transformer(Arc<dyn ParameterTransformer>),
}

impl ParameterPolicy {
    /// The constraint, if this policy is one.
    #[must_use]
    pub fn as_constraint(&self) -> Option<&RouteConstraint> {
        match self {
            ParameterPolicy::Constraint(c) => Some(c),
            ParameterPolicy::Transformer(_) => None,
        }
    }

    /// The transformer, if this policy is one.
    #[must_use]
    pub fn as_transformer(&self) -> Option<&Arc<dyn ParameterTransformer>> {
        match self {
            ParameterPolicy::Transformer(t) => Some(t),
            ParameterPolicy::Constraint(_) => None,
        }
    }
}

impl PartialEq for ParameterPolicy {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ParameterPolicy::Constraint(a), ParameterPolicy::Constraint(b)) => a == b,
            (ParameterPolicy::Transformer(a), ParameterPolicy::Transformer(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<RouteConstraint> for ParameterPolicy {
    fn from(c: RouteConstraint) -> Self {
        ParameterPolicy::Constraint(c)
    }
}
