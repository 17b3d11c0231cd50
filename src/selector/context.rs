use crate::endpoint::Endpoint;
use crate::text::eq_ignore_case;
use crate::values::RouteValueDictionary;
use http::header::{ACCESS_CONTROL_REQUEST_METHOD, ORIGIN};
use http::{HeaderMap, Method};
use std::sync::Arc;

/// The parts of a request the selector reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext<'a> {
    /// Request method as sent
    pub method: &'a str,
    /// Absolute request path
    pub path: &'a str,
    /// `Origin` header
    pub origin: Option<&'a str>,
    /// `Access-Control-Request-Method` header
    pub access_control_request_method: Option<&'a str>,
}

impl<'a> RequestContext<'a> {
    /// A request without CORS headers.
    #[must_use]
    pub fn new(method: &'a str, path: &'a str) -> Self {
        Self {
            method,
            path,
            origin: None,
            access_control_request_method: None,
        }
    }

    /// Attach the CORS preflight headers.
    #[must_use]
    pub fn with_cors(mut self, origin: &'a str, request_method: &'a str) -> Self {
        self.origin = Some(origin);
        self.access_control_request_method = Some(request_method);
        self
    }

    /// Read the CORS headers from an `http` header map. Non-UTF-8 values are ignored.
    #[must_use]
    pub fn from_headers(method: &'a Method, path: &'a str, headers: &'a HeaderMap) -> Self {
        Self {
            method: method.as_str(),
            path,
            origin: headers.get(ORIGIN).and_then(|v| v.to_str().ok()),
            access_control_request_method: headers
                .get(ACCESS_CONTROL_REQUEST_METHOD)
                .and_then(|v| v.to_str().ok()),
        }
    }

    /// `OPTIONS` with an `Origin` and a non-empty requested method.
    #[must_use]
    pub fn is_cors_preflight(&self) -> bool {
        eq_ignore_case(self.method, "OPTIONS")
            && self.origin.is_some()
            && self.access_control_request_method.is_some_and(|m| !m.is_empty())
    }
}

/// An endpoint whose pattern matched, with the values it captured.
#[derive(Debug, Clone)]
pub struct CandidateState {
    /// The matched endpoint
    pub endpoint: Arc<Endpoint>,
    /// Route values from matching
    pub values: RouteValueDictionary,
    /// Rank of the endpoint's `(order, precedence)` group; lower wins
    pub score: usize,
}

impl CandidateState {
    #[must_use]
    pub fn new(endpoint: Arc<Endpoint>, values: RouteValueDictionary, score: usize) -> Self {
        Self {
            endpoint,
            values,
            score,
        }
    }
}
