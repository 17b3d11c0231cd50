//! # Selector Module
//!
//! Narrows the candidates whose patterns matched a path down to a single
//! endpoint.
//!
//! ## Overview
//!
//! Each endpoint contributes an ordered list of [`EndpointConstraint`]s: the
//! built-in [`HttpMethodConstraint`] (order 100) derived from its method
//! metadata, plus any [`CustomEndpointConstraint`] the host attached.
//! Constraint lists are resolved once per endpoint and kept in an
//! [`EndpointConstraintCache`].
//!
//! Selection ends in one of three ways:
//!
//! - [`SelectionOutcome::Matched`]: one endpoint remains
//! - [`SelectionOutcome::NoMatch`]: nothing remains (404 or fall through)
//! - [`SelectionOutcome::MethodNotAllowed`]: every candidate restricts methods
//!   and none accepts the request (405 with an `Allow` list)
//!
//! More than one endpoint in the best score group is an
//! [`AmbiguousMatchError`](crate::error::AmbiguousMatchError).
//!
//! ## CORS preflight
//!
//! An `OPTIONS` request carrying `Origin` and a non-empty
//! `Access-Control-Request-Method` is accepted by a method constraint when the
//! *requested* method is in its list and the endpoint allows preflight.

mod cache;
mod constraint;
mod context;
mod core;

pub use cache::EndpointConstraintCache;
pub use constraint::{CustomEndpointConstraint, EndpointConstraint, HttpMethodConstraint, HTTP_METHOD_CONSTRAINT_ORDER};
pub use context::{CandidateState, RequestContext};
pub use core::{EndpointSelector, SelectionOutcome};
