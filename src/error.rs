//! Error types for route registration and endpoint selection.
//!
//! Registration errors ([`PatternError`], [`ConstraintResolutionError`],
//! [`RouteTableError`]) are fatal: a route that fails to parse or whose
//! constraints cannot be resolved must never be registered.
//!
//! Per-request outcomes are not errors. A path that does not match, or a
//! link that cannot be generated, is reported through `Option`/`bool`
//! return values. The single exception is [`AmbiguousMatchError`], which
//! signals a route table defect (two endpoints that cannot be told apart).

use std::fmt;

/// Route template could not be parsed or merged with its out-of-line values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// A `{` without a matching `}` (or a lone `}` in literal text)
    MismatchedBrace {
        /// The template text
        template: String,
    },
    /// Parameter name is empty or contains a reserved character
    InvalidParameterName {
        /// The offending name as written
        name: String,
    },
    /// The same parameter name appears twice (names compare case-insensitively)
    DuplicateParameter {
        /// The repeated name
        name: String,
    },
    /// Catch-all parameter is not the only part of the final segment
    CatchAllMisplaced {
        /// The catch-all parameter name
        name: String,
    },
    /// A catch-all parameter was marked optional
    OptionalCatchAll {
        /// The catch-all parameter name
        name: String,
    },
    /// Optional parameter carries a default value (inline or out-of-line)
    OptionalWithDefault {
        /// The parameter name
        name: String,
    },
    /// Both the template and the out-of-line defaults specify a default
    DefaultSpecifiedTwice {
        /// The parameter name
        name: String,
    },
    /// Literal text contains `?`
    InvalidLiteral {
        /// The literal text
        literal: String,
    },
    /// Two consecutive `/` (an empty segment)
    EmptySegment {
        /// The template text
        template: String,
    },
    /// Two parameters in one segment without a literal between them
    ConsecutiveParameters {
        /// The segment text
        segment: String,
    },
    /// Optional parameter in a complex segment is not the last part
    OptionalNotLast {
        /// The parameter name
        name: String,
    },
    /// Optional parameter in a complex segment is preceded by a literal other than `.`
    OptionalNotPrecededByPeriod {
        /// The parameter name
        name: String,
        /// The literal that precedes it
        literal: String,
    },
    /// Template starts with `~` but not `~/`
    InvalidTilde {
        /// The template text
        template: String,
    },
    /// A required value names neither a parameter nor a default with the same value
    InvalidRequiredValue {
        /// The required value key
        key: String,
    },
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternError::MismatchedBrace { template } => write!(
                f,
                "There is an incomplete parameter in the route template '{template}'. \
                 Check that each '{{' has a matching '}}'."
            ),
            PatternError::InvalidParameterName { name } => write!(
                f,
                "The route parameter name '{name}' is invalid. Route parameter names must be \
                 non-empty and cannot contain '{{', '}}', '/' or '?'."
            ),
            PatternError::DuplicateParameter { name } => write!(
                f,
                "The route parameter name '{name}' appears more than one time in the route template."
            ),
            PatternError::CatchAllMisplaced { name } => write!(
                f,
                "The catch-all parameter '{name}' must be the only part of the last segment."
            ),
            PatternError::OptionalCatchAll { name } => {
                write!(f, "The catch-all parameter '{name}' cannot be marked optional.")
            }
            PatternError::OptionalWithDefault { name } => {
                write!(f, "The optional parameter '{name}' cannot have a default value.")
            }
            PatternError::DefaultSpecifiedTwice { name } => write!(
                f,
                "The route parameter '{name}' has both an inline default value and an explicit \
                 default value specified."
            ),
            PatternError::InvalidLiteral { literal } => write!(
                f,
                "The literal section '{literal}' is invalid. Literal sections cannot contain the '?' character."
            ),
            PatternError::EmptySegment { template } => write!(
                f,
                "The route template '{template}' contains an empty segment. \
                 The separator character '/' cannot appear consecutively."
            ),
            PatternError::ConsecutiveParameters { segment } => write!(
                f,
                "The segment '{segment}' contains two consecutive parameters. \
                 They must be separated by a '/' or by a literal string."
            ),
            PatternError::OptionalNotLast { name } => write!(
                f,
                "The optional parameter '{name}' must be the last part of its segment."
            ),
            PatternError::OptionalNotPrecededByPeriod { name, literal } => write!(
                f,
                "The optional parameter '{name}' is preceded by an invalid segment '{literal}'. \
                 Only a period (.) can precede an optional parameter."
            ),
            PatternError::InvalidTilde { template } => write!(
                f,
                "The route template '{template}' cannot start with '~' unless followed by '/'."
            ),
            PatternError::InvalidRequiredValue { key } => write!(
                f,
                "The required value '{key}' must name a route parameter or a default with the same value."
            ),
        }
    }
}

impl std::error::Error for PatternError {}

/// An inline or out-of-line constraint token could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintResolutionError {
    /// No entry in the constraint map for this key
    UnknownConstraint {
        /// The constraint key (text before any `(`)
        key: String,
    },
    /// The factory rejected the argument list
    InvalidArguments {
        /// The constraint key
        key: String,
        /// What the factory expected
        reason: String,
    },
    /// Malformed token, e.g. unbalanced parentheses
    MalformedToken {
        /// The raw token
        token: String,
    },
    /// A `regex(...)` argument did not compile
    InvalidRegex {
        /// The regex source
        pattern: String,
        /// The compiler's message
        message: String,
    },
}

impl fmt::Display for ConstraintResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintResolutionError::UnknownConstraint { key } => write!(
                f,
                "The constraint reference '{key}' could not be resolved. \
                 No constraint is registered under that key."
            ),
            ConstraintResolutionError::InvalidArguments { key, reason } => {
                write!(f, "Invalid arguments for constraint '{key}': {reason}")
            }
            ConstraintResolutionError::MalformedToken { token } => {
                write!(f, "The constraint token '{token}' is malformed.")
            }
            ConstraintResolutionError::InvalidRegex { pattern, message } => {
                write!(f, "The regex constraint '{pattern}' is invalid: {message}")
            }
        }
    }
}

impl std::error::Error for ConstraintResolutionError {}

/// Failure while compiling a set of endpoints into a route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteTableError {
    /// Endpoint template failed to parse
    Pattern {
        /// Display name of the endpoint
        endpoint: String,
        /// Underlying error
        source: PatternError,
    },
    /// Endpoint parameter policy failed to resolve
    Constraint {
        /// Display name of the endpoint
        endpoint: String,
        /// Parameter the policy is attached to
        parameter: String,
        /// Underlying error
        source: ConstraintResolutionError,
    },
}

impl fmt::Display for RouteTableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteTableError::Pattern { endpoint, source } => {
                write!(f, "endpoint '{endpoint}': {source}")
            }
            RouteTableError::Constraint {
                endpoint,
                parameter,
                source,
            } => write!(f, "endpoint '{endpoint}', parameter '{parameter}': {source}"),
        }
    }
}

impl std::error::Error for RouteTableError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RouteTableError::Pattern { source, .. } => Some(source),
            RouteTableError::Constraint { source, .. } => Some(source),
        }
    }
}

/// More than one endpoint survived constraint evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbiguousMatchError {
    /// Display names of the remaining candidates, in encounter order
    pub candidates: Vec<String>,
}

impl fmt::Display for AmbiguousMatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "The request matched multiple endpoints. Matches:\n\n{}",
            self.candidates.join("\n")
        )
    }
}

impl std::error::Error for AmbiguousMatchError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ambiguous_message_lists_candidates_in_order() {
        let err = AmbiguousMatchError {
            candidates: vec!["first".to_string(), "second".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.ends_with("first\nsecond"));
    }

    #[test]
    fn route_table_error_exposes_source() {
        use std::error::Error;
        let err = RouteTableError::Pattern {
            endpoint: "home".to_string(),
            source: PatternError::EmptySegment {
                template: "a//b".to_string(),
            },
        };
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("endpoint 'home'"));
    }
}
