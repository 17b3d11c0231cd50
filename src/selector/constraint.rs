//! Endpoint selection constraints.

use super::context::{CandidateState, RequestContext};
use crate::endpoint::{Endpoint, HttpMethodMetadata};
use crate::text::eq_ignore_case;
use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;

/// Order of the built-in HTTP method constraint.
pub const HTTP_METHOD_CONSTRAINT_ORDER: i32 = 100;

/// Host-supplied selection constraint.
///
/// Constraints are grouped by [`order`](Self::order); lower orders are
/// evaluated first. Evaluation may await (e.g. to consult an external
/// source); the selector awaits each one before evaluating the next.
pub trait CustomEndpointConstraint: Send + Sync + fmt::Debug {
    fn order(&self) -> i32;

    /// Whether `candidate` is acceptable for the request.
    fn accept<'a>(&'a self, ctx: &'a RequestContext<'a>, candidate: &'a CandidateState) -> BoxFuture<'a, bool>;
}

/// Accepts requests whose method is in a fixed list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpMethodConstraint {
    methods: Vec<String>,
    accept_cors_preflight: bool,
}

impl HttpMethodConstraint {
    pub fn new<I, S>(methods: I, accept_cors_preflight: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            methods: methods.into_iter().map(Into::into).collect(),
            accept_cors_preflight,
        }
    }

    /// Declared methods, as written.
    #[must_use]
    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    /// An empty list accepts any method.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.methods.is_empty()
    }

    #[must_use]
    pub fn accepts(&self, ctx: &RequestContext<'_>) -> bool {
        if self.is_wildcard() {
            return true;
        }
        if self.contains(ctx.method) {
            return true;
        }
        if self.accept_cors_preflight && ctx.is_cors_preflight() {
            if let Some(requested) = ctx.access_control_request_method {
                return self.contains(requested);
            }
        }
        false
    }

    fn contains(&self, method: &str) -> bool {
        self.methods.iter().any(|m| eq_ignore_case(m, method))
    }
}

impl From<&HttpMethodMetadata> for HttpMethodConstraint {
    fn from(metadata: &HttpMethodMetadata) -> Self {
        Self::new(metadata.methods.iter().cloned(), metadata.accept_cors_preflight)
    }
}

/// A resolved selection constraint.
#[derive(Debug, Clone)]
pub enum EndpointConstraint {
    HttpMethod(HttpMethodConstraint),
    Custom(Arc<dyn CustomEndpointConstraint>),
}

impl EndpointConstraint {
    /// Constraints of the same order are evaluated as one group.
    #[must_use]
    pub fn order(&self) -> i32 {
        match self {
            EndpointConstraint::HttpMethod(_) => HTTP_METHOD_CONSTRAINT_ORDER,
            EndpointConstraint::Custom(c) => c.order(),
        }
    }

    pub async fn accept(&self, ctx: &RequestContext<'_>, candidate: &CandidateState) -> bool {
        match self {
            EndpointConstraint::HttpMethod(c) => c.accepts(ctx),
            EndpointConstraint::Custom(c) => c.accept(ctx, candidate).await,
        }
    }

    /// Every constraint declared by `endpoint`, sorted by order.
    #[must_use]
    pub fn for_endpoint(endpoint: &Endpoint) -> Vec<EndpointConstraint> {
        let metadata = endpoint.metadata();
        let mut constraints: Vec<EndpointConstraint> = metadata
            .http_methods
            .iter()
            .map(|m| EndpointConstraint::HttpMethod(m.into()))
            .chain(metadata.constraints.iter().cloned().map(EndpointConstraint::Custom))
            .collect();
        constraints.sort_by_key(EndpointConstraint::order);
        constraints
    }
}
