//! Constraint map and token resolution.
//!
//! The constraint map is an explicit, caller-owned registry from key to a
//! typed factory function. Nothing is global: a [`ParameterPolicyFactory`] is
//! handed to the route table builder, and every deferred token on every
//! pattern resolves through it exactly once.

use super::constraint::{ParameterPolicy, RegexConstraint, RouteConstraint, DEFAULT_REGEX_SIZE_LIMIT};
use crate::error::ConstraintResolutionError;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type SplitFn = dyn Fn(&[&str]) -> Result<ParameterPolicy, String> + Send + Sync;
type RawFn = dyn Fn(Option<&str>) -> Result<ParameterPolicy, ConstraintResolutionError> + Send + Sync;

/// Builds a policy from the argument text of a token.
#[derive(Clone)]
pub enum PolicyFactory {
    /// Arguments split on `,` and trimmed; `int` gets `[]`, `range(1,20)` gets `["1", "20"]`
    Split(Arc<SplitFn>),
    /// The whole argument text, unsplit (`None` when the token has no parentheses)
    Raw(Arc<RawFn>),
}

impl PolicyFactory {
    /// Factory over split arguments.
    pub fn split<F>(f: F) -> Self
    where
        F: Fn(&[&str]) -> Result<ParameterPolicy, String> + Send + Sync + 'static,
    {
        PolicyFactory::Split(Arc::new(f))
    }

    /// Factory over the raw argument text.
    pub fn raw<F>(f: F) -> Self
    where
        F: Fn(Option<&str>) -> Result<ParameterPolicy, ConstraintResolutionError> + Send + Sync + 'static,
    {
        PolicyFactory::Raw(Arc::new(f))
    }

    /// Factory for a policy that takes no arguments.
    pub fn fixed(policy: impl Into<ParameterPolicy>) -> Self {
        let policy = policy.into();
        PolicyFactory::split(move |args| {
            if args.is_empty() {
                Ok(policy.clone())
            } else {
                Err(format!("expected no arguments, got {}", args.len()))
            }
        })
    }
}

impl fmt::Debug for PolicyFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyFactory::Split(_) => f.write_str("PolicyFactory::Split"),
            PolicyFactory::Raw(_) => f.write_str("PolicyFactory::Raw"),
        }
    }
}

/// Key to factory registry. Keys are case-insensitive.
#[derive(Clone, Debug)]
pub struct ConstraintMap {
    entries: HashMap<String, PolicyFactory>,
}

impl ConstraintMap {
    /// An empty map.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// The built-in constraints, with `regex(...)` compiled under `regex_size_limit`.
    #[must_use]
    pub fn with_builtins(regex_size_limit: usize) -> Self {
        let mut map = Self::empty();

        map.insert("int", PolicyFactory::fixed(RouteConstraint::Int));
        map.insert("long", PolicyFactory::fixed(RouteConstraint::Long));
        map.insert("bool", PolicyFactory::fixed(RouteConstraint::Bool));
        map.insert("guid", PolicyFactory::fixed(RouteConstraint::Guid));
        map.insert("datetime", PolicyFactory::fixed(RouteConstraint::DateTime));
        map.insert("decimal", PolicyFactory::fixed(RouteConstraint::Decimal));
        map.insert("double", PolicyFactory::fixed(RouteConstraint::Double));
        map.insert("float", PolicyFactory::fixed(RouteConstraint::Float));
        map.insert("alpha", PolicyFactory::fixed(RouteConstraint::Alpha));
        map.insert("required", PolicyFactory::fixed(RouteConstraint::Required));
        map.insert("file", PolicyFactory::fixed(RouteConstraint::File));
        map.insert("nonfile", PolicyFactory::fixed(RouteConstraint::NonFile));

        map.insert(
            "minlength",
            PolicyFactory::split(|args| Ok(RouteConstraint::MinLength(one_arg(args)?).into())),
        );
        map.insert(
            "maxlength",
            PolicyFactory::split(|args| Ok(RouteConstraint::MaxLength(one_arg(args)?).into())),
        );
        map.insert(
            "length",
            PolicyFactory::split(|args| match args {
                [n] => {
                    let n = number(n)?;
                    Ok(RouteConstraint::Length { min: n, max: n }.into())
                }
                [min, max] => {
                    let (min, max) = (number(min)?, number(max)?);
                    if min > max {
                        return Err(format!("minimum {min} exceeds maximum {max}"));
                    }
                    Ok(RouteConstraint::Length { min, max }.into())
                }
                _ => Err(format!("expected 1 or 2 arguments, got {}", args.len())),
            }),
        );
        map.insert(
            "min",
            PolicyFactory::split(|args| Ok(RouteConstraint::Min(one_arg(args)?).into())),
        );
        map.insert(
            "max",
            PolicyFactory::split(|args| Ok(RouteConstraint::Max(one_arg(args)?).into())),
        );
        map.insert(
            "range",
            PolicyFactory::split(|args| match args {
                [min, max] => {
                    let (min, max): (i64, i64) = (number(min)?, number(max)?);
                    if min > max {
                        return Err(format!("minimum {min} exceeds maximum {max}"));
                    }
                    Ok(RouteConstraint::Range { min, max }.into())
                }
                _ => Err(format!("expected 2 arguments, got {}", args.len())),
            }),
        );
        map.insert(
            "regex",
            PolicyFactory::raw(move |source| {
                let source = source.ok_or_else(|| ConstraintResolutionError::InvalidArguments {
                    key: "regex".to_string(),
                    reason: "expected a pattern argument".to_string(),
                })?;
                RegexConstraint::new(source, regex_size_limit)
                    .map(|re| RouteConstraint::Regex(re).into())
                    .map_err(|e| ConstraintResolutionError::InvalidRegex {
                        pattern: source.to_string(),
                        message: e.to_string(),
                    })
            }),
        );

        map
    }

    /// Register or replace a factory.
    pub fn insert(&mut self, key: &str, factory: PolicyFactory) -> &mut Self {
        self.entries.insert(key.to_ascii_lowercase(), factory);
        self
    }

    /// Look up a factory by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PolicyFactory> {
        self.entries.get(&key.to_ascii_lowercase())
    }

    /// Registered keys, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<_> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

impl Default for ConstraintMap {
    fn default() -> Self {
        Self::with_builtins(DEFAULT_REGEX_SIZE_LIMIT)
    }
}

fn one_arg<T>(args: &[&str]) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match args {
        [value] => number(value),
        _ => Err(format!("expected 1 argument, got {}", args.len())),
    }
}

fn number<T>(text: &str) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    text.parse()
        .map_err(|e| format!("'{text}' is not a valid number: {e}"))
}

/// Resolves constraint tokens against a [`ConstraintMap`].
#[derive(Clone, Debug, Default)]
pub struct ParameterPolicyFactory {
    map: ConstraintMap,
}

impl ParameterPolicyFactory {
    /// Factory over `map`.
    #[must_use]
    pub fn new(map: ConstraintMap) -> Self {
        Self { map }
    }

    /// The underlying map.
    #[must_use]
    pub fn map(&self) -> &ConstraintMap {
        &self.map
    }

    /// Resolve a token such as `int`, `length(2,5)` or `regex(^a+$)`.
    ///
    /// # Errors
    ///
    /// - [`ConstraintResolutionError::MalformedToken`] for unbalanced parentheses or an empty key
    /// - [`ConstraintResolutionError::UnknownConstraint`] when the key is not registered
    /// - [`ConstraintResolutionError::InvalidArguments`] / [`ConstraintResolutionError::InvalidRegex`]
    ///   when the factory rejects the arguments
    pub fn resolve(&self, token: &str) -> Result<ParameterPolicy, ConstraintResolutionError> {
        let malformed = || ConstraintResolutionError::MalformedToken {
            token: token.to_string(),
        };

        let (key, args) = match token.find('(') {
            Some(open) => {
                let inner = token[open + 1..].strip_suffix(')').ok_or_else(malformed)?;
                (&token[..open], Some(inner))
            }
            None if token.contains(')') => return Err(malformed()),
            None => (token, None),
        };
        if key.is_empty() {
            return Err(malformed());
        }

        let factory = self
            .map
            .get(key)
            .ok_or_else(|| ConstraintResolutionError::UnknownConstraint { key: key.to_string() })?;

        match factory {
            PolicyFactory::Split(f) => {
                let split: Vec<&str> = match args {
                    None => Vec::new(),
                    Some(a) if a.trim().is_empty() => Vec::new(),
                    Some(a) => a.split(',').map(str::trim).collect(),
                };
                f(&split).map_err(|reason| ConstraintResolutionError::InvalidArguments {
                    key: key.to_string(),
                    reason,
                })
            }
            PolicyFactory::Raw(f) => f(args),
        }
    }
}
