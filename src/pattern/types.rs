use crate::error::ConstraintResolutionError;
use crate::policy::{ParameterPolicy, ParameterPolicyFactory};
use crate::text::eq_ignore_case;
use crate::values::{RouteValue, RouteValueDictionary};
use once_cell::sync::OnceCell;
use std::fmt;

/// How a parameter consumes path text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    /// `{name}`: exactly one segment (or a span inside a complex segment)
    Standard,
    /// `{name?}`: may be absent
    Optional,
    /// `{*name}` / `{**name}`: the remainder of the path
    CatchAll,
}

/// A constraint attached to a parameter, either already resolved or kept as
/// the raw token until the route table resolves it.
///
/// A deferred reference resolves at most once; the result is cached in the
/// reference itself and shared by every clone made after resolution.
#[derive(Debug, Clone)]
pub enum ParameterPolicyReference {
    /// A policy instance supplied by the host
    Resolved(ParameterPolicy),
    /// Raw token text such as `int` or `range(1,20)`
    Deferred {
        /// The token as written
        content: String,
        /// Resolution result
        cache: OnceCell<ParameterPolicy>,
    },
}

impl ParameterPolicyReference {
    /// Reference to raw token text, resolved later.
    pub fn deferred(content: impl Into<String>) -> Self {
        ParameterPolicyReference::Deferred {
            content: content.into(),
            cache: OnceCell::new(),
        }
    }

    /// Reference to an already-built policy.
    pub fn resolved(policy: impl Into<ParameterPolicy>) -> Self {
        ParameterPolicyReference::Resolved(policy.into())
    }

    /// Raw token text for deferred references.
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        match self {
            ParameterPolicyReference::Resolved(_) => None,
            ParameterPolicyReference::Deferred { content, .. } => Some(content),
        }
    }

    /// The policy, if this reference has been resolved.
    #[must_use]
    pub fn policy(&self) -> Option<&ParameterPolicy> {
        match self {
            ParameterPolicyReference::Resolved(policy) => Some(policy),
            ParameterPolicyReference::Deferred { cache, .. } => cache.get(),
        }
    }

    /// Resolve through `factory`, caching the result.
    pub fn resolve(&self, factory: &ParameterPolicyFactory) -> Result<&ParameterPolicy, ConstraintResolutionError> {
        match self {
            ParameterPolicyReference::Resolved(policy) => Ok(policy),
            ParameterPolicyReference::Deferred { content, cache } => {
                cache.get_or_try_init(|| factory.resolve(content))
            }
        }
    }
}

impl PartialEq for ParameterPolicyReference {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ParameterPolicyReference::Resolved(a), ParameterPolicyReference::Resolved(b)) => a == b,
            (
                ParameterPolicyReference::Deferred { content: a, .. },
                ParameterPolicyReference::Deferred { content: b, .. },
            ) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for ParameterPolicyReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterPolicyReference::Resolved(policy) => write!(f, "{policy:?}"),
            ParameterPolicyReference::Deferred { content, .. } => f.write_str(content),
        }
    }
}

/// A named parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterPart {
    pub(crate) name: String,
    pub(crate) default: Option<RouteValue>,
    pub(crate) kind: ParameterKind,
    pub(crate) encode_slashes: bool,
    pub(crate) policies: Vec<ParameterPolicyReference>,
}

impl ParameterPart {
    /// Parameter name as written in the template.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Default value, inline or merged from out-of-line defaults.
    #[must_use]
    pub fn default(&self) -> Option<&RouteValue> {
        self.default.as_ref()
    }

    /// Standard, optional or catch-all.
    #[must_use]
    pub fn kind(&self) -> ParameterKind {
        self.kind
    }

    /// Whether the parameter may be absent.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.kind == ParameterKind::Optional
    }

    /// Whether the parameter takes the remainder of the path.
    #[must_use]
    pub fn is_catch_all(&self) -> bool {
        self.kind == ParameterKind::CatchAll
    }

    /// `false` only for `{**name}` catch-alls, whose generated value keeps
    /// `/` unencoded.
    #[must_use]
    pub fn encode_slashes(&self) -> bool {
        self.encode_slashes
    }

    /// Inline and out-of-line policies, in declaration order.
    #[must_use]
    pub fn policies(&self) -> &[ParameterPolicyReference] {
        &self.policies
    }
}

/// One piece of a path segment.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    /// Fixed text, matched case-insensitively
    Literal(String),
    /// Literal that precedes a trailing optional parameter and disappears with it
    Separator(String),
    /// Named parameter
    Parameter(ParameterPart),
}

impl Part {
    /// Literal or separator text.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Part::Literal(text) | Part::Separator(text) => Some(text),
            Part::Parameter(_) => None,
        }
    }

    /// The parameter, if this is one.
    #[must_use]
    pub fn as_parameter(&self) -> Option<&ParameterPart> {
        match self {
            Part::Parameter(p) => Some(p),
            _ => None,
        }
    }

    /// Whether this part is a parameter.
    #[must_use]
    pub fn is_parameter(&self) -> bool {
        matches!(self, Part::Parameter(_))
    }
}

/// The parts between two `/` delimiters.
#[derive(Debug, Clone, PartialEq)]
pub struct PathSegment {
    pub(crate) parts: Vec<Part>,
}

impl PathSegment {
    /// Parts in template order.
    #[must_use]
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// A segment with exactly one part.
    #[must_use]
    pub fn is_simple(&self) -> bool {
        self.parts.len() == 1
    }

    /// The only part of a simple segment.
    #[must_use]
    pub fn single(&self) -> Option<&Part> {
        if self.is_simple() {
            self.parts.first()
        } else {
            None
        }
    }

    /// The single parameter of a simple parameter segment.
    #[must_use]
    pub fn single_parameter(&self) -> Option<&ParameterPart> {
        self.single().and_then(Part::as_parameter)
    }

    /// The literal text of a simple literal segment.
    #[must_use]
    pub fn single_literal(&self) -> Option<&str> {
        match self.single() {
            Some(Part::Literal(text)) => Some(text),
            _ => None,
        }
    }
}

/// Inbound route precedence: one digit per segment, compared
/// lexicographically. Lower sorts first and wins ties between matches.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RoutePrecedence(Vec<u8>);

impl RoutePrecedence {
    pub(crate) fn compute(segments: &[PathSegment]) -> Self {
        Self(
            segments
                .iter()
                .map(|segment| match segment.single() {
                    None => 2,
                    Some(Part::Literal(_) | Part::Separator(_)) => 1,
                    Some(Part::Parameter(p)) if p.is_catch_all() => 5,
                    Some(Part::Parameter(p)) if !p.policies.is_empty() => 3,
                    Some(Part::Parameter(_)) => 4,
                })
                .collect(),
        )
    }

    /// Digits per segment.
    #[must_use]
    pub fn digits(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for RoutePrecedence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("0.")?;
        for digit in &self.0 {
            write!(f, "{digit}")?;
        }
        Ok(())
    }
}

/// Parsed, immutable route template.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePattern {
    pub(crate) raw_text: String,
    pub(crate) segments: Vec<PathSegment>,
    pub(crate) parameters: Vec<ParameterPart>,
    pub(crate) defaults: RouteValueDictionary,
    pub(crate) policies: Vec<(String, Vec<ParameterPolicyReference>)>,
    pub(crate) required_values: RouteValueDictionary,
    pub(crate) precedence: RoutePrecedence,
}

impl RoutePattern {
    /// Template text as supplied, leading `/` included.
    #[must_use]
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// Segments in order.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Every parameter in template order.
    #[must_use]
    pub fn parameters(&self) -> &[ParameterPart] {
        &self.parameters
    }

    /// Parameter by name (case-insensitive).
    #[must_use]
    pub fn get_parameter(&self, name: &str) -> Option<&ParameterPart> {
        self.parameters.iter().find(|p| eq_ignore_case(&p.name, name))
    }

    /// Inline and out-of-line defaults. Keys without a matching parameter
    /// act as filters during link generation.
    #[must_use]
    pub fn defaults(&self) -> &RouteValueDictionary {
        &self.defaults
    }

    /// Policies by parameter name, including out-of-line entries for names
    /// that are not parameters.
    #[must_use]
    pub fn policies(&self) -> &[(String, Vec<ParameterPolicyReference>)] {
        &self.policies
    }

    /// Required values used to pick this route during link generation.
    #[must_use]
    pub fn required_values(&self) -> &RouteValueDictionary {
        &self.required_values
    }

    /// Inbound precedence.
    #[must_use]
    pub fn precedence(&self) -> &RoutePrecedence {
        &self.precedence
    }

    /// Index of the catch-all segment, if any.
    #[must_use]
    pub fn catch_all_index(&self) -> Option<usize> {
        self.segments
            .last()
            .and_then(PathSegment::single_parameter)
            .filter(|p| p.is_catch_all())
            .map(|_| self.segments.len() - 1)
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw_text)
    }
}
