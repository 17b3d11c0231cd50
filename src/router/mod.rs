//! # Router Module
//!
//! Ties the pieces together: a [`RouteTable`] compiles endpoints once and
//! answers requests; a [`RouterHandle`] publishes tables to request threads
//! and swaps them atomically on reload.
//!
//! ## Request flow
//!
//! 1. Tokenize the path into spans
//! 2. Walk the DFA to get candidate endpoints
//! 3. Run each candidate's pattern matcher, then its route constraints
//! 4. Hand the survivors to the endpoint selector
//!
//! Matching and binding never block; the selector is `async` only so that
//! host constraints can await.
//!
//! ## Example
//!
//! ```rust
//! use pathroute::config::RouterOptions;
//! use pathroute::endpoint::Endpoint;
//! use pathroute::policy::ParameterPolicyFactory;
//! use pathroute::router::{RouteTable, RouterHandle};
//! use pathroute::selector::RequestContext;
//!
//! let endpoints = vec![
//!     Endpoint::builder("list", "products").methods(["GET"]).build().unwrap(),
//!     Endpoint::builder("show", "products/{id:int}").methods(["GET"]).build().unwrap(),
//! ];
//! let table = RouteTable::build(endpoints, &RouterOptions::default(), &ParameterPolicyFactory::default()).unwrap();
//! let handle = RouterHandle::new(table);
//!
//! let outcome = handle.load().route_blocking(&RequestContext::new("GET", "/products/42")).unwrap();
//! let matched = outcome.matched().unwrap();
//! assert_eq!(matched.endpoint.display_name(), "show");
//! assert_eq!(matched.values.get_str("id"), Some("42"));
//! ```

mod core;
#[cfg(test)]
mod tests;

pub use core::{CompiledEndpoint, RouteTable, RouterHandle};
