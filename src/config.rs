//! # Configuration Module
//!
//! Router options and the TOML route file.
//!
//! ## Environment Variables
//!
//! ### `PATHROUTE_MAX_SEGMENTS`
//!
//! Tokenizer bound: segments past this count are not tokenized. The route
//! table always raises the bound to one more than its longest template, so
//! the setting only matters for catch-all heavy tables. Accepts decimal or
//! `0x` hexadecimal. Default: `32`.
//!
//! ### `PATHROUTE_REGEX_SIZE_LIMIT`
//!
//! Compiled-size limit in bytes for `regex(...)` constraints. The regex
//! engine matches in linear time, so this bound replaces a match timeout.
//! Default: `0x100000` (1 MiB).
//!
//! ## Route File
//!
//! ```toml
//! [options]
//! lowercase_urls = true
//!
//! [[route]]
//! name = "products.show"
//! template = "products/{id:int}"
//! methods = ["GET", "HEAD"]
//! route_name = "product"
//! defaults = { controller = "Products" }
//! constraints = { id = ["min(1)", "max(1000)"] }
//! required_values = { controller = "Products" }
//! handler = "show_product"
//! ```

use crate::binder::LinkOptions;
use crate::endpoint::Endpoint;
use crate::error::RouteTableError;
use crate::matcher::{JumpTableThresholds, DEFAULT_MAX_SEGMENTS};
use crate::policy::{ConstraintMap, DEFAULT_REGEX_SIZE_LIMIT};
use crate::values::RouteValueDictionary;
use anyhow::Context;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::path::Path;

/// Router options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouterOptions {
    /// Tokenizer segment bound (default: 32)
    pub max_segments: usize,
    /// Largest literal count served by a linear jump table (default: 4)
    pub linear_table_max: usize,
    /// Smallest literal count served by the custom hash table (default: 64)
    pub hash_table_min: usize,
    /// Compiled-size limit for regex constraints (default: 1 MiB)
    pub regex_size_limit: usize,
    /// Lowercase generated paths
    pub lowercase_urls: bool,
    /// Lowercase generated query strings (with `lowercase_urls`)
    pub lowercase_query_strings: bool,
    /// Append `/` to generated paths
    pub append_trailing_slash: bool,
}

impl Default for RouterOptions {
    fn default() -> Self {
        let thresholds = JumpTableThresholds::default();
        Self {
            max_segments: DEFAULT_MAX_SEGMENTS,
            linear_table_max: thresholds.linear_max,
            hash_table_min: thresholds.hash_min,
            regex_size_limit: DEFAULT_REGEX_SIZE_LIMIT,
            lowercase_urls: false,
            lowercase_query_strings: false,
            append_trailing_slash: false,
        }
    }
}

impl RouterOptions {
    /// Defaults overridden by the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| env::var(key).ok())
    }

    /// Apply `PATHROUTE_*` overrides read through `lookup`. Unparseable
    /// values keep the current setting.
    #[must_use]
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("PATHROUTE_MAX_SEGMENTS").and_then(|v| parse_size(&v)) {
            self.max_segments = v;
        }
        if let Some(v) = lookup("PATHROUTE_REGEX_SIZE_LIMIT").and_then(|v| parse_size(&v)) {
            self.regex_size_limit = v;
        }
        self
    }

    #[must_use]
    pub fn thresholds(&self) -> JumpTableThresholds {
        JumpTableThresholds {
            linear_max: self.linear_table_max,
            hash_min: self.hash_table_min,
        }
    }

    #[must_use]
    pub fn link_options(&self) -> LinkOptions {
        LinkOptions {
            lowercase_urls: self.lowercase_urls,
            lowercase_query_strings: self.lowercase_query_strings,
            append_trailing_slash: self.append_trailing_slash,
        }
    }

    /// Built-in constraint map honouring `regex_size_limit`.
    #[must_use]
    pub fn constraint_map(&self) -> ConstraintMap {
        ConstraintMap::with_builtins(self.regex_size_limit)
    }
}

fn parse_size(value: &str) -> Option<usize> {
    let value = value.trim();
    match value.strip_prefix("0x") {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => value.parse().ok(),
    }
}

/// One constraint token or several.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ConstraintTokens {
    One(String),
    Many(Vec<String>),
}

impl ConstraintTokens {
    fn tokens(&self) -> &[String] {
        match self {
            ConstraintTokens::One(token) => std::slice::from_ref(token),
            ConstraintTokens::Many(tokens) => tokens,
        }
    }
}

/// A `[[route]]` entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteDefinition {
    /// Display name of the endpoint
    pub name: String,
    pub template: String,
    /// Accepted methods; omitted means no method constraint
    #[serde(default)]
    pub methods: Option<Vec<String>>,
    #[serde(default)]
    pub order: i32,
    /// Name for link generation
    #[serde(default)]
    pub route_name: Option<String>,
    #[serde(default)]
    pub defaults: RouteValueDictionary,
    #[serde(default)]
    pub constraints: BTreeMap<String, ConstraintTokens>,
    #[serde(default)]
    pub required_values: RouteValueDictionary,
    #[serde(default)]
    pub handler: Option<String>,
    #[serde(default)]
    pub suppress_matching: bool,
    #[serde(default)]
    pub suppress_link_generation: bool,
}

impl RouteDefinition {
    /// Compile into an endpoint.
    ///
    /// # Errors
    ///
    /// [`RouteTableError::Pattern`] when the template or its out-of-line
    /// values are invalid.
    pub fn to_endpoint(&self) -> Result<Endpoint, RouteTableError> {
        let mut builder = Endpoint::builder(self.name.as_str(), self.template.as_str())
            .order(self.order)
            .suppress_matching(self.suppress_matching)
            .suppress_link_generation(self.suppress_link_generation);
        if let Some(methods) = &self.methods {
            builder = builder.methods(methods.iter().cloned());
        }
        if let Some(route_name) = &self.route_name {
            builder = builder.route_name(route_name.as_str());
        }
        if let Some(handler) = &self.handler {
            builder = builder.handler(handler.as_str());
        }
        for (key, value) in self.defaults.iter() {
            builder = builder.default_value(key, value.clone());
        }
        for (key, tokens) in &self.constraints {
            for token in tokens.tokens() {
                builder = builder.constraint(key.as_str(), token.as_str());
            }
        }
        for (key, value) in self.required_values.iter() {
            builder = builder.required_value(key, value.clone());
        }
        builder.build().map_err(|source| RouteTableError::Pattern {
            endpoint: self.name.clone(),
            source,
        })
    }
}

/// A TOML route table file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteFile {
    #[serde(default)]
    pub options: RouterOptions,
    #[serde(default, rename = "route")]
    pub routes: Vec<RouteDefinition>,
}

impl RouteFile {
    /// Read and parse a route file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read route file {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("Failed to parse route file {}", path.display()))
    }

    /// Parse route file text.
    ///
    /// # Errors
    ///
    /// The TOML deserialization error.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Compile every route into an endpoint, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// See [`RouteDefinition::to_endpoint`].
    pub fn endpoints(&self) -> Result<Vec<Endpoint>, RouteTableError> {
        self.routes.iter().map(RouteDefinition::to_endpoint).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn overrides_accept_decimal_and_hex() {
        let vars: HashMap<&str, &str> = [
            ("PATHROUTE_MAX_SEGMENTS", "0x40"),
            ("PATHROUTE_REGEX_SIZE_LIMIT", "2048"),
        ]
        .into_iter()
        .collect();
        let options = RouterOptions::default().with_overrides(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(options.max_segments, 64);
        assert_eq!(options.regex_size_limit, 2048);
    }

    #[test]
    fn invalid_override_keeps_default() {
        let options = RouterOptions::default().with_overrides(|_| Some("lots".to_string()));
        assert_eq!(options, RouterOptions::default());
    }

    #[test]
    fn parses_route_file() {
        let file = RouteFile::from_toml_str(
            r#"
            [options]
            lowercase_urls = true

            [[route]]
            name = "products.show"
            template = "products/{id}"
            methods = ["GET"]
            constraints = { id = ["int", "min(1)"] }
            defaults = { controller = "Products", page = 1 }
            "#,
        )
        .unwrap();
        assert!(file.options.lowercase_urls);
        assert_eq!(file.options.max_segments, 32);
        let endpoints = file.endpoints().unwrap();
        assert_eq!(endpoints.len(), 1);
        let pattern = endpoints[0].pattern();
        assert_eq!(pattern.policies()[0].1.len(), 2);
        assert_eq!(pattern.defaults().get("page"), Some(&crate::values::RouteValue::Int(1)));
    }

    #[test]
    fn route_errors_name_the_endpoint() {
        let file = RouteFile::from_toml_str(
            r#"
            [[route]]
            name = "broken"
            template = "{id"
            "#,
        )
        .unwrap();
        match file.endpoints() {
            Err(RouteTableError::Pattern { endpoint, .. }) => assert_eq!(endpoint, "broken"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_fields() {
        assert!(RouteFile::from_toml_str("[[route]]\nname = \"a\"\ntemplate = \"a\"\nverb = \"GET\"\n").is_err());
    }
}
