//! Policies of one pattern, resolved and bound to their route value keys.

use super::constraint::{ParameterPolicy, ParameterTransformer, RouteConstraint, RouteDirection};
use super::factory::ParameterPolicyFactory;
use crate::error::RouteTableError;
use crate::pattern::RoutePattern;
use crate::values::{RouteValue, RouteValueDictionary};
use std::sync::Arc;

/// A constraint checking one route value.
#[derive(Debug, Clone)]
pub struct BoundConstraint {
    key: String,
    constraint: RouteConstraint,
    optional: bool,
}

impl BoundConstraint {
    /// Bind `constraint` to `key`. An optional binding passes when the value is absent.
    #[must_use]
    pub fn new(key: impl Into<String>, constraint: RouteConstraint, optional: bool) -> Self {
        Self {
            key: key.into(),
            constraint,
            optional,
        }
    }

    /// The route value key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The underlying constraint.
    #[must_use]
    pub fn constraint(&self) -> &RouteConstraint {
        &self.constraint
    }

    /// Evaluate against `values`.
    #[must_use]
    pub fn matches(&self, values: &RouteValueDictionary, direction: RouteDirection) -> bool {
        if self.optional && matches!(values.get(&self.key), None | Some(RouteValue::Null)) {
            return true;
        }
        self.constraint.matches(&self.key, values, direction)
    }
}

/// Every policy of a pattern, split into constraints and transformers.
#[derive(Debug, Clone, Default)]
pub struct ResolvedPolicies {
    constraints: Vec<BoundConstraint>,
    transformers: Vec<(String, Arc<dyn ParameterTransformer>)>,
}

impl ResolvedPolicies {
    /// Resolve every reference on `pattern` through `factory`.
    ///
    /// # Errors
    ///
    /// [`RouteTableError::Constraint`] naming `endpoint` and the parameter whose
    /// token failed to resolve.
    pub fn resolve(
        pattern: &RoutePattern,
        factory: &ParameterPolicyFactory,
        endpoint: &str,
    ) -> Result<Self, RouteTableError> {
        let mut resolved = Self::default();
        for (key, references) in pattern.policies() {
            let optional = pattern.get_parameter(key).is_some_and(|p| p.is_optional());
            for reference in references {
                let policy = reference
                    .resolve(factory)
                    .map_err(|source| RouteTableError::Constraint {
                        endpoint: endpoint.to_string(),
                        parameter: key.clone(),
                        source,
                    })?;
                match policy {
                    ParameterPolicy::Constraint(constraint) => {
                        resolved
                            .constraints
                            .push(BoundConstraint::new(key.clone(), constraint.clone(), optional));
                    }
                    ParameterPolicy::Transformer(transformer) => {
                        resolved.transformers.push((key.clone(), Arc::clone(transformer)));
                    }
                }
            }
        }
        Ok(resolved)
    }

    /// Bound constraints in declaration order.
    #[must_use]
    pub fn constraints(&self) -> &[BoundConstraint] {
        &self.constraints
    }

    /// Outbound transformers by parameter name.
    #[must_use]
    pub fn transformers(&self) -> &[(String, Arc<dyn ParameterTransformer>)] {
        &self.transformers
    }

    /// Key of the first constraint `values` fails, if any.
    #[must_use]
    pub fn first_failure(&self, values: &RouteValueDictionary, direction: RouteDirection) -> Option<&str> {
        self.constraints
            .iter()
            .find(|c| !c.matches(values, direction))
            .map(BoundConstraint::key)
    }

    /// Whether `values` satisfies every constraint.
    #[must_use]
    pub fn accepts(&self, values: &RouteValueDictionary, direction: RouteDirection) -> bool {
        self.first_failure(values, direction).is_none()
    }
}
