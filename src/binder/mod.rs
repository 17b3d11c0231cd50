//! # Binder Module
//!
//! URL generation: the inverse of matching.
//!
//! ## Overview
//!
//! A [`TemplateBinder`] turns route values back into a path for one pattern:
//!
//! 1. [`TemplateBinder::get_values`] merges explicit values with the ambient
//!    values of the current request, applies defaults and checks filters
//!    (defaults that name no parameter, such as `area = "Admin"`)
//! 2. [`TemplateBinder::try_process_constraints`] runs the route's constraints
//!    in the generation direction
//! 3. [`TemplateBinder::bind_values`] writes the path segment by segment.
//!    Values equal to their default are held back and dropped when nothing
//!    follows them, so `/Home/Index` generates as `/`. Values that are not
//!    parameters become a query string.
//!
//! A [`LinkGenerator`] runs binders over a whole route table, looking
//! endpoints up by route name or by required values.
//!
//! ## Example
//!
//! ```rust
//! use pathroute::binder::{LinkOptions, TemplateBinder};
//! use pathroute::pattern::parse;
//! use pathroute::policy::{ParameterPolicyFactory, ResolvedPolicies};
//! use pathroute::values::RouteValueDictionary;
//! use std::sync::Arc;
//!
//! let pattern = parse("{controller=Home}/{action=Index}/{id?}").unwrap();
//! let policies = ResolvedPolicies::resolve(&pattern, &ParameterPolicyFactory::default(), "default").unwrap();
//! let binder = TemplateBinder::new(Arc::new(pattern), &policies);
//!
//! let values: RouteValueDictionary = [("controller", "Shop"), ("page", "2")].into_iter().collect();
//! let url = binder.bind(None, &values, &LinkOptions::default());
//! assert_eq!(url.as_deref(), Some("/Shop?page=2"));
//! ```

mod core;
mod link;
mod uri;

pub use core::{TemplateBinder, TemplateValuesResult};
pub use link::LinkGenerator;

use serde::Deserialize;

/// Output options for generated links.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LinkOptions {
    /// Lowercase the generated path
    pub lowercase_urls: bool,
    /// Also lowercase the query string (only with `lowercase_urls`)
    pub lowercase_query_strings: bool,
    /// Ensure the path ends with `/`
    pub append_trailing_slash: bool,
}
