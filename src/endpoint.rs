//! # Endpoint Module
//!
//! A routable destination: a compiled [`RoutePattern`] plus the metadata the
//! selector and the link generator read.
//!
//! ## Example
//!
//! ```rust
//! use pathroute::endpoint::Endpoint;
//!
//! let endpoint = Endpoint::builder("products.show", "products/{id:int}")
//!     .methods(["GET", "HEAD"])
//!     .route_name("product")
//!     .build()
//!     .unwrap();
//! assert_eq!(endpoint.metadata().route_name.as_deref(), Some("product"));
//! ```

use crate::error::PatternError;
use crate::pattern::{RoutePattern, RoutePatternBuilder};
use crate::policy::ParameterPolicy;
use crate::selector::CustomEndpointConstraint;
use crate::values::RouteValue;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// HTTP methods an endpoint accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpMethodMetadata {
    /// Accepted methods. Empty means any method.
    pub methods: Vec<String>,
    /// Whether a CORS preflight for one of `methods` is accepted
    pub accept_cors_preflight: bool,
}

impl HttpMethodMetadata {
    /// Methods with CORS preflight acceptance enabled.
    pub fn new<I, S>(methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            methods: methods.into_iter().map(Into::into).collect(),
            accept_cors_preflight: true,
        }
    }
}

/// Metadata attached to an endpoint.
#[derive(Clone, Default)]
pub struct EndpointMetadata {
    /// Method restriction, if any
    pub http_methods: Option<HttpMethodMetadata>,
    /// Name used for link generation by name
    pub route_name: Option<String>,
    /// Extra selection constraints
    pub constraints: Vec<Arc<dyn CustomEndpointConstraint>>,
    /// Exclude from request matching
    pub suppress_matching: bool,
    /// Exclude from link generation
    pub suppress_link_generation: bool,
}

impl fmt::Debug for EndpointMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointMetadata")
            .field("http_methods", &self.http_methods)
            .field("route_name", &self.route_name)
            .field("constraints", &self.constraints.len())
            .field("suppress_matching", &self.suppress_matching)
            .field("suppress_link_generation", &self.suppress_link_generation)
            .finish()
    }
}

/// A routable destination.
#[derive(Debug, Clone)]
pub struct Endpoint {
    id: Uuid,
    display_name: String,
    pattern: Arc<RoutePattern>,
    order: i32,
    metadata: EndpointMetadata,
    handler: Option<String>,
}

impl Endpoint {
    /// Wrap an already-compiled pattern with default metadata.
    pub fn new(display_name: impl Into<String>, pattern: RoutePattern) -> Self {
        Self {
            id: Uuid::new_v4(),
            display_name: display_name.into(),
            pattern: Arc::new(pattern),
            order: 0,
            metadata: EndpointMetadata::default(),
            handler: None,
        }
    }

    /// Start building an endpoint from a template string.
    pub fn builder(display_name: impl Into<String>, template: impl Into<String>) -> EndpointBuilder {
        EndpointBuilder {
            display_name: display_name.into(),
            pattern: RoutePatternBuilder::new(template),
            order: 0,
            metadata: EndpointMetadata::default(),
            handler: None,
        }
    }

    /// Identity used by the constraint cache.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Name shown in diagnostics and ambiguity errors.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Compiled route pattern.
    #[must_use]
    pub fn pattern(&self) -> &Arc<RoutePattern> {
        &self.pattern
    }

    /// Explicit ordering; lower values are preferred.
    #[must_use]
    pub fn order(&self) -> i32 {
        self.order
    }

    #[must_use]
    pub fn metadata(&self) -> &EndpointMetadata {
        &self.metadata
    }

    /// Handler name carried for the host application.
    #[must_use]
    pub fn handler(&self) -> Option<&str> {
        self.handler.as_deref()
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name)
    }
}

/// Builder returned by [`Endpoint::builder`].
#[derive(Debug, Clone)]
pub struct EndpointBuilder {
    display_name: String,
    pattern: RoutePatternBuilder,
    order: i32,
    metadata: EndpointMetadata,
    handler: Option<String>,
}

impl EndpointBuilder {
    #[must_use]
    pub fn order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Restrict to these HTTP methods (CORS preflight accepted).
    #[must_use]
    pub fn methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.metadata.http_methods = Some(HttpMethodMetadata::new(methods));
        self
    }

    /// Set the full method metadata.
    #[must_use]
    pub fn http_methods(mut self, metadata: HttpMethodMetadata) -> Self {
        self.metadata.http_methods = Some(metadata);
        self
    }

    #[must_use]
    pub fn route_name(mut self, name: impl Into<String>) -> Self {
        self.metadata.route_name = Some(name.into());
        self
    }

    /// Out-of-line default for the template.
    #[must_use]
    pub fn default_value(mut self, key: impl Into<String>, value: impl Into<RouteValue>) -> Self {
        self.pattern = self.pattern.default_value(key, value);
        self
    }

    /// Out-of-line constraint token for the template.
    #[must_use]
    pub fn constraint(mut self, key: impl Into<String>, token: impl Into<String>) -> Self {
        self.pattern = self.pattern.constraint(key, token);
        self
    }

    /// Out-of-line policy instance for the template.
    #[must_use]
    pub fn policy(mut self, key: impl Into<String>, policy: impl Into<ParameterPolicy>) -> Self {
        self.pattern = self.pattern.policy(key, policy);
        self
    }

    /// Required value for link generation.
    #[must_use]
    pub fn required_value(mut self, key: impl Into<String>, value: impl Into<RouteValue>) -> Self {
        self.pattern = self.pattern.required_value(key, value);
        self
    }

    /// Add a selection constraint evaluated by the endpoint selector.
    #[must_use]
    pub fn endpoint_constraint(mut self, constraint: Arc<dyn CustomEndpointConstraint>) -> Self {
        self.metadata.constraints.push(constraint);
        self
    }

    #[must_use]
    pub fn suppress_matching(mut self, suppress: bool) -> Self {
        self.metadata.suppress_matching = suppress;
        self
    }

    #[must_use]
    pub fn suppress_link_generation(mut self, suppress: bool) -> Self {
        self.metadata.suppress_link_generation = suppress;
        self
    }

    #[must_use]
    pub fn handler(mut self, handler: impl Into<String>) -> Self {
        self.handler = Some(handler.into());
        self
    }

    /// Parse the template and freeze the endpoint.
    ///
    /// # Errors
    ///
    /// The [`PatternError`] from parsing or merging out-of-line values.
    pub fn build(self) -> Result<Endpoint, PatternError> {
        let pattern = self.pattern.build()?;
        Ok(Endpoint {
            id: Uuid::new_v4(),
            display_name: self.display_name,
            pattern: Arc::new(pattern),
            order: self.order,
            metadata: self.metadata,
            handler: self.handler,
        })
    }
}
