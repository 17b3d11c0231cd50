//! Merges out-of-line defaults, policies and required values into a parsed
//! template and freezes the result into a [`RoutePattern`].

use super::parser::{mark_separators, parse_template};
use super::types::{ParameterPolicyReference, Part, RoutePattern, RoutePrecedence};
use crate::error::PatternError;
use crate::policy::ParameterPolicy;
use crate::text::eq_ignore_case;
use crate::values::{parts_equal, RouteValue, RouteValueDictionary};

/// Accumulates everything that is supplied alongside a template string.
///
/// # Example
///
/// ```rust
/// use pathroute::pattern::RoutePatternBuilder;
///
/// let pattern = RoutePatternBuilder::new("{controller}/{action}/{id?}")
///     .default_value("controller", "Home")
///     .default_value("action", "Index")
///     .constraint("id", "int")
///     .build()
///     .unwrap();
/// assert_eq!(pattern.parameters().len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct RoutePatternBuilder {
    template: String,
    defaults: RouteValueDictionary,
    policies: Vec<(String, ParameterPolicyReference)>,
    required_values: RouteValueDictionary,
}

impl RoutePatternBuilder {
    /// Start from a template string.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            defaults: RouteValueDictionary::new(),
            policies: Vec::new(),
            required_values: RouteValueDictionary::new(),
        }
    }

    /// Add an out-of-line default. Keys that name no parameter become filters.
    #[must_use]
    pub fn default_value(mut self, key: impl Into<String>, value: impl Into<RouteValue>) -> Self {
        self.defaults.insert(key, value);
        self
    }

    /// Add several out-of-line defaults.
    #[must_use]
    pub fn defaults(mut self, values: &RouteValueDictionary) -> Self {
        for (k, v) in values.iter() {
            self.defaults.insert(k, v.clone());
        }
        self
    }

    /// Add an out-of-line constraint token such as `int` or `range(1,20)`.
    #[must_use]
    pub fn constraint(mut self, key: impl Into<String>, token: impl Into<String>) -> Self {
        self.policies
            .push((key.into(), ParameterPolicyReference::deferred(token)));
        self
    }

    /// Add an already-built policy.
    #[must_use]
    pub fn policy(mut self, key: impl Into<String>, policy: impl Into<ParameterPolicy>) -> Self {
        self.policies
            .push((key.into(), ParameterPolicyReference::resolved(policy)));
        self
    }

    /// Add a required value used for link generation.
    #[must_use]
    pub fn required_value(mut self, key: impl Into<String>, value: impl Into<RouteValue>) -> Self {
        self.required_values.insert(key, value);
        self
    }

    /// Parse the template and merge everything.
    ///
    /// # Errors
    ///
    /// Any template syntax error, plus:
    /// - [`PatternError::DefaultSpecifiedTwice`] when a parameter has both an inline and an out-of-line default
    /// - [`PatternError::OptionalWithDefault`] when an optional parameter gets an out-of-line default
    /// - [`PatternError::InvalidRequiredValue`] when a required value names neither a parameter nor an equal default
    pub fn build(self) -> Result<RoutePattern, PatternError> {
        let parsed = parse_template(&self.template)?;
        let mut segments = parsed.segments;
        mark_separators(&mut segments);

        let mut defaults = RouteValueDictionary::new();
        let mut policies: Vec<(String, Vec<ParameterPolicyReference>)> = Vec::new();

        for segment in &mut segments {
            for part in &mut segment.parts {
                let Part::Parameter(parameter) = part else {
                    continue;
                };

                if let Some(value) = self.defaults.get(&parameter.name) {
                    if parameter.default.is_some() {
                        return Err(PatternError::DefaultSpecifiedTwice {
                            name: parameter.name.clone(),
                        });
                    }
                    if parameter.is_optional() {
                        return Err(PatternError::OptionalWithDefault {
                            name: parameter.name.clone(),
                        });
                    }
                    parameter.default = Some(value.clone());
                }

                parameter.policies.extend(
                    self.policies
                        .iter()
                        .filter(|(key, _)| eq_ignore_case(key, &parameter.name))
                        .map(|(_, reference)| reference.clone()),
                );

                if let Some(default) = &parameter.default {
                    defaults.insert(parameter.name.clone(), default.clone());
                }
                if !parameter.policies.is_empty() {
                    policies.push((parameter.name.clone(), parameter.policies.clone()));
                }
            }
        }

        let parameters: Vec<_> = segments
            .iter()
            .flat_map(|s| s.parts.iter())
            .filter_map(Part::as_parameter)
            .cloned()
            .collect();
        let is_parameter = |key: &str| parameters.iter().any(|p| eq_ignore_case(&p.name, key));

        for (key, value) in self.defaults.iter() {
            if !is_parameter(key) {
                defaults.insert(key, value.clone());
            }
        }

        for (key, reference) in &self.policies {
            if is_parameter(key) {
                continue;
            }
            match policies.iter_mut().find(|(k, _)| eq_ignore_case(k, key)) {
                Some((_, list)) => list.push(reference.clone()),
                None => policies.push((key.clone(), vec![reference.clone()])),
            }
        }

        for (key, value) in self.required_values.iter() {
            let ok = is_parameter(key) || (defaults.contains_key(key) && parts_equal(defaults.get(key), Some(value)));
            if !ok {
                return Err(PatternError::InvalidRequiredValue { key: key.to_string() });
            }
        }

        let precedence = RoutePrecedence::compute(&segments);

        Ok(RoutePattern {
            raw_text: parsed.raw_text,
            segments,
            parameters,
            defaults,
            policies,
            required_values: self.required_values,
            precedence,
        })
    }
}

/// Parse a template with no out-of-line values.
///
/// # Errors
///
/// Returns a [`PatternError`] describing the first syntax problem found.
pub fn parse(template: &str) -> Result<RoutePattern, PatternError> {
    RoutePatternBuilder::new(template).build()
}
