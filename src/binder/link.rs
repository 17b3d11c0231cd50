use super::core::TemplateBinder;
use super::LinkOptions;
use crate::endpoint::Endpoint;
use crate::text::eq_ignore_case;
use crate::values::{parts_equal, RouteValue, RouteValueDictionary};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone)]
struct LinkEntry {
    endpoint: Arc<Endpoint>,
    binder: Arc<TemplateBinder>,
}

/// Generates paths for the endpoints of a route table.
///
/// Endpoints are tried in route table order; the first one that binds wins.
/// Endpoints that suppress link generation are never considered.
#[derive(Debug, Clone, Default)]
pub struct LinkGenerator {
    entries: Vec<LinkEntry>,
    options: LinkOptions,
}

impl LinkGenerator {
    pub fn new<I>(entries: I, options: LinkOptions) -> Self
    where
        I: IntoIterator<Item = (Arc<Endpoint>, Arc<TemplateBinder>)>,
    {
        Self {
            entries: entries
                .into_iter()
                .filter(|(endpoint, _)| !endpoint.metadata().suppress_link_generation)
                .map(|(endpoint, binder)| LinkEntry { endpoint, binder })
                .collect(),
            options,
        }
    }

    #[must_use]
    pub fn options(&self) -> &LinkOptions {
        &self.options
    }

    /// Path for the endpoint carrying route name `name`.
    #[must_use]
    pub fn get_path_by_name(
        &self,
        name: &str,
        values: &RouteValueDictionary,
        ambient: Option<&RouteValueDictionary>,
    ) -> Option<String> {
        let candidates = self.entries.iter().filter(|entry| {
            entry
                .endpoint
                .metadata()
                .route_name
                .as_deref()
                .is_some_and(|n| eq_ignore_case(n, name))
        });
        let path = self.generate(candidates, values, ambient);
        debug!(route_name = name, generated = ?path, "link by name");
        path
    }

    /// Path for the first endpoint whose required values agree with `values`
    /// (falling back to `ambient` for keys not given explicitly).
    #[must_use]
    pub fn get_path_by_values(
        &self,
        values: &RouteValueDictionary,
        ambient: Option<&RouteValueDictionary>,
    ) -> Option<String> {
        let candidates = self.entries.iter().filter(|entry| {
            entry
                .endpoint
                .pattern()
                .required_values()
                .iter()
                .filter(|(_, required)| !matches!(required, RouteValue::Null))
                .all(|(key, required)| {
                    let supplied = values.get(key).or_else(|| ambient.and_then(|a| a.get(key)));
                    parts_equal(supplied, Some(required))
                })
        });
        let path = self.generate(candidates, values, ambient);
        debug!(generated = ?path, "link by values");
        path
    }

    fn generate<'a>(
        &self,
        mut candidates: impl Iterator<Item = &'a LinkEntry>,
        values: &RouteValueDictionary,
        ambient: Option<&RouteValueDictionary>,
    ) -> Option<String> {
        candidates.find_map(|entry| entry.binder.bind(ambient, values, &self.options))
    }
}
