use super::uri::UriBuildingContext;
use super::LinkOptions;
use crate::pattern::{Part, RoutePattern};
use crate::policy::{BoundConstraint, ParameterTransformer, ResolvedPolicies, RouteDirection};
use crate::text::eq_ignore_case;
use crate::values::{parts_equal, RouteValue, RouteValueDictionary};
use std::sync::Arc;

/// Values chosen for a template from explicit and ambient values.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateValuesResult {
    /// Values that will be written into the URL (path or query)
    pub accepted_values: RouteValueDictionary,
    /// Accepted values plus the ambient values constraints may look at
    pub combined_values: RouteValueDictionary,
}

/// Generates paths from one route pattern.
///
/// Generation runs in three steps: [`get_values`](Self::get_values) picks the
/// values to use, [`try_process_constraints`](Self::try_process_constraints)
/// checks them against the route's constraints, and
/// [`bind_values`](Self::bind_values) writes the path.
#[derive(Debug, Clone)]
pub struct TemplateBinder {
    pattern: Arc<RoutePattern>,
    /// Defaults that name no parameter, in insertion order
    filters: Vec<(String, RouteValue)>,
    constraints: Vec<BoundConstraint>,
    transformers: Vec<(String, Arc<dyn ParameterTransformer>)>,
}

impl TemplateBinder {
    #[must_use]
    pub fn new(pattern: Arc<RoutePattern>, policies: &ResolvedPolicies) -> Self {
        let filters = pattern
            .defaults()
            .iter()
            .filter(|(key, _)| pattern.get_parameter(key).is_none())
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect();
        Self {
            pattern,
            filters,
            constraints: policies.constraints().to_vec(),
            transformers: policies.transformers().to_vec(),
        }
    }

    #[must_use]
    pub fn pattern(&self) -> &Arc<RoutePattern> {
        &self.pattern
    }

    /// Choose the values to generate with.
    ///
    /// Parameters are walked left to right. An explicit value wins over an
    /// ambient one; ambient values stop being copied at the first parameter
    /// whose explicit value differs from the ambient value, or that has no
    /// value and no default. A parameter left without a value takes its
    /// default, is dropped when optional or catch-all, and fails generation
    /// otherwise. Filters must agree with any explicit value.
    #[must_use]
    pub fn get_values(
        &self,
        ambient: Option<&RouteValueDictionary>,
        values: &RouteValueDictionary,
    ) -> Option<TemplateValuesResult> {
        let pattern = &*self.pattern;
        let parameters = pattern.parameters();
        let mut slots: Vec<Option<RouteValue>> = parameters
            .iter()
            .map(|p| values.get(p.name()).cloned())
            .collect();

        let mut copy_ambient = ambient.is_some();
        if let Some(ambient) = ambient {
            for (key, required) in pattern.required_values().iter() {
                if pattern.get_parameter(key).is_some() {
                    continue;
                }
                let ambient_value = ambient.get(key);
                let explicit_differs = values
                    .get(key)
                    .is_some_and(|explicit| !parts_equal(Some(explicit), ambient_value));
                if !parts_equal(ambient_value, Some(required)) || explicit_differs {
                    copy_ambient = false;
                    break;
                }
            }
        }

        for (slot, parameter) in slots.iter_mut().zip(parameters) {
            let key = parameter.name();
            let explicit = slot.is_some();
            let mut ambient_value = None;
            if copy_ambient {
                ambient_value = ambient.and_then(|a| a.get(key));
                if explicit && ambient_value.is_some() && !parts_equal(ambient_value, slot.as_ref()) {
                    copy_ambient = false;
                }
                if !explicit && ambient_value.is_none() && !pattern.defaults().contains_key(key) {
                    copy_ambient = false;
                }
            }

            if explicit {
                continue;
            }
            if copy_ambient {
                *slot = ambient_value.cloned();
            } else if let Some(required) = pattern
                .required_values()
                .get(key)
                .filter(|v| !matches!(v, RouteValue::Null))
            {
                *slot = Some(required.clone());
            }
        }

        let mut accepted = RouteValueDictionary::new();
        for (slot, parameter) in slots.into_iter().zip(parameters) {
            let key = parameter.name();
            match slot {
                Some(value) if value.is_non_empty() => {
                    accepted.insert(key, value);
                }
                _ => {
                    if let Some(default) = pattern.defaults().get(key) {
                        accepted.insert(key, default.clone());
                    } else if !(parameter.is_optional() || parameter.is_catch_all()) {
                        return None;
                    }
                }
            }
        }

        for (key, default) in &self.filters {
            if let Some(value) = values.get(key) {
                if !parts_equal(Some(value), Some(default)) {
                    return None;
                }
                accepted.insert(key.as_str(), value.clone());
            }
        }

        for (key, value) in values.iter() {
            if !self.is_slot(key) {
                accepted.try_add(key, value.clone());
            }
        }

        let mut combined = accepted.clone();
        if let Some(ambient) = ambient {
            for (key, value) in ambient.iter() {
                if value.is_non_empty() && pattern.get_parameter(key).is_none() && !accepted.contains_key(key) {
                    combined.insert(key, value.clone());
                }
            }
        }

        Some(TemplateValuesResult {
            accepted_values: accepted,
            combined_values: combined,
        })
    }

    /// Whether `combined` satisfies every constraint in the generation direction.
    #[must_use]
    pub fn try_process_constraints(&self, combined: &RouteValueDictionary) -> bool {
        self.constraints
            .iter()
            .all(|c| c.matches(combined, RouteDirection::UrlGeneration))
    }

    /// Write the path for `accepted`, with leftover values as a query string.
    #[must_use]
    pub fn bind_values(&self, mut accepted: RouteValueDictionary, options: &LinkOptions) -> Option<String> {
        for (name, transformer) in &self.transformers {
            if let Some(value) = accepted.get(name) {
                let transformed = transformer
                    .transform_outbound(value)
                    .map_or(RouteValue::Null, RouteValue::Str);
                accepted.insert(name.as_str(), transformed);
            }
        }

        let defaults = self.pattern.defaults();
        let mut context = UriBuildingContext::new();
        for segment in self.pattern.segments() {
            let parts = segment.parts();
            for (index, part) in parts.iter().enumerate() {
                match part {
                    Part::Literal(text) | Part::Separator(text) => {
                        if !context.accept(text, true) {
                            return None;
                        }
                    }
                    Part::Parameter(parameter) => {
                        let value = accepted.remove(parameter.name());
                        let same_as_default = defaults
                            .get(parameter.name())
                            .is_some_and(|d| parts_equal(value.as_ref(), Some(d)));
                        let text = value
                            .as_ref()
                            .and_then(RouteValue::to_route_string)
                            .unwrap_or_default();

                        if same_as_default {
                            if !context.buffer(&text) {
                                return None;
                            }
                        } else if !context.accept(&text, parameter.encode_slashes()) {
                            let after_separator = index
                                .checked_sub(1)
                                .is_some_and(|prev| matches!(parts[prev], Part::Separator(_)));
                            if parameter.is_optional() && after_separator {
                                context.remove_last_value();
                            } else {
                                return None;
                            }
                        }
                    }
                }
            }
            context.end_segment();
        }

        let lowercase_query = options.lowercase_urls && options.lowercase_query_strings;
        for (key, value) in accepted.iter() {
            if defaults.contains_key(key) {
                continue;
            }
            match value {
                RouteValue::List(items) => {
                    for item in items {
                        if let Some(text) = item.to_route_string() {
                            context.append_query(key, &text, lowercase_query);
                        }
                    }
                }
                other => {
                    if let Some(text) = other.to_route_string() {
                        context.append_query(key, &text, lowercase_query);
                    }
                }
            }
        }

        Some(context.finish(options))
    }

    /// Run all three generation steps.
    #[must_use]
    pub fn bind(
        &self,
        ambient: Option<&RouteValueDictionary>,
        values: &RouteValueDictionary,
        options: &LinkOptions,
    ) -> Option<String> {
        let result = self.get_values(ambient, values)?;
        if !self.try_process_constraints(&result.combined_values) {
            return None;
        }
        self.bind_values(result.accepted_values, options)
    }

    fn is_slot(&self, key: &str) -> bool {
        self.pattern.get_parameter(key).is_some() || self.filters.iter().any(|(k, _)| eq_ignore_case(k, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{parse, RoutePatternBuilder};
    use crate::policy::ParameterPolicyFactory;

    fn binder(pattern: RoutePattern) -> TemplateBinder {
        let policies = ResolvedPolicies::resolve(&pattern, &ParameterPolicyFactory::default(), "test").unwrap();
        TemplateBinder::new(Arc::new(pattern), &policies)
    }

    fn dict(pairs: &[(&str, &str)]) -> RouteValueDictionary {
        pairs.iter().map(|&(k, v)| (k, v)).collect()
    }

    fn mvc() -> TemplateBinder {
        binder(parse("{controller=Home}/{action=Index}/{id?}").unwrap())
    }

    #[test]
    fn trailing_defaults_are_omitted() {
        let b = mvc();
        let options = LinkOptions::default();
        assert_eq!(b.bind(None, &dict(&[]), &options).as_deref(), Some("/"));
        assert_eq!(
            b.bind(None, &dict(&[("controller", "Shop")]), &options).as_deref(),
            Some("/Shop")
        );
        assert_eq!(
            b.bind(None, &dict(&[("controller", "Home"), ("action", "Index"), ("id", "5")]), &options)
                .as_deref(),
            Some("/Home/Index/5")
        );
    }

    #[test]
    fn ambient_values_fill_left_parameters() {
        let b = mvc();
        let ambient = dict(&[("controller", "Shop"), ("action", "List"), ("id", "3")]);
        let url = b.bind(Some(&ambient), &dict(&[("id", "7")]), &LinkOptions::default());
        assert_eq!(url.as_deref(), Some("/Shop/List/7"));
    }

    #[test]
    fn changed_value_invalidates_later_ambient_values() {
        let b = mvc();
        let ambient = dict(&[("controller", "Shop"), ("action", "List"), ("id", "3")]);
        let url = b.bind(Some(&ambient), &dict(&[("action", "Edit")]), &LinkOptions::default());
        assert_eq!(url.as_deref(), Some("/Shop/Edit"));
    }

    #[test]
    fn missing_required_parameter_fails() {
        let b = binder(parse("{controller}/{action}").unwrap());
        assert!(b.get_values(None, &dict(&[("controller", "Home")])).is_none());
        assert!(b.get_values(None, &dict(&[("controller", "Home"), ("action", "")])).is_none());
    }

    #[test]
    fn filters_must_match() {
        let pattern = RoutePatternBuilder::new("{action}")
            .default_value("area", "Admin")
            .build()
            .unwrap();
        let b = binder(pattern);
        assert!(b.get_values(None, &dict(&[("action", "Index"), ("area", "Blog")])).is_none());
        let url = b.bind(None, &dict(&[("action", "Index"), ("area", "admin")]), &LinkOptions::default());
        assert_eq!(url.as_deref(), Some("/Index"));
    }

    #[test]
    fn extra_values_become_query_string() {
        let b = binder(parse("products/{id}").unwrap());
        let mut values = dict(&[("id", "5"), ("sort", "price desc")]);
        values.insert("tag", RouteValue::from(vec!["a", "b"]));
        values.insert("empty", "");
        let url = b.bind(None, &values, &LinkOptions::default());
        assert_eq!(url.as_deref(), Some("/products/5?sort=price%20desc&tag=a&tag=b"));
    }

    #[test]
    fn separator_retracted_for_missing_optional() {
        let b = binder(parse("files/{name}.{ext?}").unwrap());
        let options = LinkOptions::default();
        assert_eq!(
            b.bind(None, &dict(&[("name", "report")]), &options).as_deref(),
            Some("/files/report")
        );
        assert_eq!(
            b.bind(None, &dict(&[("name", "report"), ("ext", "pdf")]), &options).as_deref(),
            Some("/files/report.pdf")
        );
    }

    #[test]
    fn catch_all_slash_encoding() {
        let single = binder(parse("files/{*path}").unwrap());
        let double = binder(parse("files/{**path}").unwrap());
        let values = dict(&[("path", "a/b c")]);
        let options = LinkOptions::default();
        assert_eq!(single.bind(None, &values, &options).as_deref(), Some("/files/a%2Fb%20c"));
        assert_eq!(double.bind(None, &values, &options).as_deref(), Some("/files/a/b%20c"));
        assert_eq!(double.bind(None, &dict(&[]), &options).as_deref(), Some("/files"));
    }

    #[test]
    fn constraints_checked_during_generation() {
        let b = binder(parse("items/{id:int}").unwrap());
        let result = b.get_values(None, &dict(&[("id", "abc")])).unwrap();
        assert!(!b.try_process_constraints(&result.combined_values));
        assert!(b.bind(None, &dict(&[("id", "12")]), &LinkOptions::default()).is_some());
    }

    #[test]
    fn combined_values_include_non_parameter_ambient_values() {
        let b = binder(parse("{id}").unwrap());
        let ambient = dict(&[("culture", "en"), ("id", "1")]);
        let result = b.get_values(Some(&ambient), &dict(&[("id", "2")])).unwrap();
        assert_eq!(result.combined_values.get_str("culture"), Some("en"));
        assert!(!result.accepted_values.contains_key("culture"));
    }

    #[test]
    fn lowercase_options() {
        let b = binder(parse("Products/{name}").unwrap());
        let values = dict(&[("name", "Widget"), ("Sort", "Asc")]);
        let url_only = LinkOptions {
            lowercase_urls: true,
            ..LinkOptions::default()
        };
        assert_eq!(
            b.bind(None, &values, &url_only).as_deref(),
            Some("/products/widget?Sort=Asc")
        );
        let both = LinkOptions {
            lowercase_urls: true,
            lowercase_query_strings: true,
            ..LinkOptions::default()
        };
        assert_eq!(b.bind(None, &values, &both).as_deref(), Some("/products/widget?sort=asc"));
    }

    #[test]
    fn transformer_rewrites_values() {
        #[derive(Debug)]
        struct Slugify;
        impl ParameterTransformer for Slugify {
            fn transform_outbound(&self, value: &RouteValue) -> Option<String> {
                value.as_str().map(|s| s.to_lowercase().replace(' ', "-"))
            }
        }
        let pattern = RoutePatternBuilder::new("blog/{title}")
            .policy("title", crate::policy::ParameterPolicy::Transformer(Arc::new(Slugify)))
            .build()
            .unwrap();
        let b = binder(pattern);
        let url = b.bind(None, &dict(&[("title", "Hello World")]), &LinkOptions::default());
        assert_eq!(url.as_deref(), Some("/blog/hello-world"));
    }
}
