use super::*;
use crate::config::RouterOptions;
use crate::endpoint::Endpoint;
use crate::policy::ParameterPolicyFactory;
use crate::selector::{RequestContext, SelectionOutcome};
use crate::values::RouteValueDictionary;

fn table(endpoints: Vec<Endpoint>) -> RouteTable {
    RouteTable::build(endpoints, &RouterOptions::default(), &ParameterPolicyFactory::default()).unwrap()
}

fn get(table: &RouteTable, path: &str) -> SelectionOutcome {
    table.route_blocking(&RequestContext::new("GET", path)).unwrap()
}

fn selected(table: &RouteTable, path: &str) -> Option<String> {
    get(table, path)
        .matched()
        .map(|c| c.endpoint.display_name().to_string())
}

#[test]
fn test_literal_beats_parameter() {
    let t = table(vec![
        Endpoint::builder("by-id", "products/{id}").build().unwrap(),
        Endpoint::builder("all", "products/all").build().unwrap(),
    ]);
    assert_eq!(selected(&t, "/products/all").as_deref(), Some("all"));
    assert_eq!(selected(&t, "/products/7").as_deref(), Some("by-id"));
}

#[test]
fn test_order_beats_precedence() {
    let t = table(vec![
        Endpoint::builder("literal", "products/all").order(1).build().unwrap(),
        Endpoint::builder("param", "products/{id}").build().unwrap(),
    ]);
    assert_eq!(selected(&t, "/products/all").as_deref(), Some("param"));
}

#[test]
fn test_route_constraints_filter_candidates() {
    let t = table(vec![
        Endpoint::builder("numeric", "items/{id:int}").build().unwrap(),
        Endpoint::builder("slug", "items/{slug}").build().unwrap(),
    ]);
    assert_eq!(selected(&t, "/items/42").as_deref(), Some("numeric"));
    assert_eq!(selected(&t, "/items/widget").as_deref(), Some("slug"));
}

#[test]
fn test_scores_follow_table_order() {
    let t = table(vec![
        Endpoint::builder("c", "{*rest}").build().unwrap(),
        Endpoint::builder("a", "a/b").build().unwrap(),
        Endpoint::builder("b", "a/{x}").build().unwrap(),
    ]);
    let names: Vec<&str> = t.endpoints().map(|e| e.display_name()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
    let scores: Vec<usize> = t.entries().iter().map(CompiledEndpoint::score).collect();
    assert_eq!(scores, vec![0, 1, 2]);
}

#[test]
fn test_identical_templates_are_ambiguous() {
    let t = table(vec![
        Endpoint::builder("first", "users/{id}").build().unwrap(),
        Endpoint::builder("second", "users/{name}").build().unwrap(),
    ]);
    let err = t.route_blocking(&RequestContext::new("GET", "/users/1")).unwrap_err();
    assert_eq!(err.candidates.len(), 2);
}

#[test]
fn test_method_not_allowed() {
    let t = table(vec![
        Endpoint::builder("read", "users/{id}").methods(["GET"]).build().unwrap(),
        Endpoint::builder("write", "users/{id}").methods(["PUT"]).build().unwrap(),
    ]);
    let outcome = t.route_blocking(&RequestContext::new("DELETE", "/users/1")).unwrap();
    assert_eq!(outcome.allow_header().as_deref(), Some("GET, PUT"));
    let outcome = t.route_blocking(&RequestContext::new("PUT", "/users/1")).unwrap();
    assert_eq!(outcome.matched().unwrap().endpoint.display_name(), "write");
}

#[test]
fn test_suppressed_endpoints_do_not_match() {
    let t = table(vec![Endpoint::builder("hidden", "hidden")
        .suppress_matching(true)
        .build()
        .unwrap()]);
    assert!(matches!(get(&t, "/hidden"), SelectionOutcome::NoMatch));
}

#[test]
fn test_deep_paths_with_catch_all() {
    let t = table(vec![Endpoint::builder("files", "files/{*path}").build().unwrap()]);
    let deep: String = (0..50).map(|i| format!("/d{i}")).collect();
    let path = format!("/files{deep}");
    let outcome = get(&t, &path);
    let values = &outcome.matched().unwrap().values;
    assert_eq!(values.get_str("path"), Some(&deep[1..]));
}

#[test]
fn test_long_path_does_not_match_short_template() {
    let t = table(vec![Endpoint::builder("short", "a/{b}").build().unwrap()]);
    let path: String = (0..40).map(|_| "/a").collect();
    assert!(matches!(get(&t, &path), SelectionOutcome::NoMatch));
}

#[test]
fn test_slashes_past_segment_bound_do_not_hide_text() {
    let t = table(vec![
        Endpoint::builder("short", "a").build().unwrap(),
        Endpoint::builder("rest", "files/{**rest}").build().unwrap(),
    ]);
    let slashes = "/".repeat(40);
    assert!(matches!(get(&t, &format!("/a{slashes}b")), SelectionOutcome::NoMatch));
    assert!(matches!(get(&t, "/a//b"), SelectionOutcome::NoMatch));
    assert_eq!(selected(&t, &format!("/a{slashes}")).as_deref(), Some("short"));

    let path = format!("/files{slashes}b");
    let outcome = get(&t, &path);
    let values = &outcome.matched().unwrap().values;
    assert_eq!(values.get_str("rest"), Some(&path["/files/".len()..]));
}

#[test]
fn test_unknown_constraint_fails_build() {
    let err = RouteTable::build(
        vec![Endpoint::builder("bad", "{id:nope}").build().unwrap()],
        &RouterOptions::default(),
        &ParameterPolicyFactory::default(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("bad"));
}

#[test]
fn test_link_generation_through_table() {
    let t = table(vec![Endpoint::builder("show", "products/{id:int}")
        .route_name("product")
        .build()
        .unwrap()]);
    let values: RouteValueDictionary = [("id", "3")].into_iter().collect();
    assert_eq!(
        t.link_generator().get_path_by_name("product", &values, None).as_deref(),
        Some("/products/3")
    );
}

#[test]
fn test_handle_reload_swaps_atomically() {
    let handle = RouterHandle::new(table(vec![Endpoint::builder("old", "old").build().unwrap()]));
    let snapshot = handle.load();
    handle
        .rebuild(
            vec![Endpoint::builder("new", "new").build().unwrap()],
            &RouterOptions::default(),
            &ParameterPolicyFactory::default(),
        )
        .unwrap();
    assert_eq!(selected(&snapshot, "/old").as_deref(), Some("old"));
    assert_eq!(selected(&handle.load(), "/new").as_deref(), Some("new"));
    assert!(selected(&handle.load(), "/old").is_none());
}

#[test]
fn test_failed_rebuild_keeps_current_table() {
    let handle = RouterHandle::new(table(vec![Endpoint::builder("keep", "keep").build().unwrap()]));
    let result = handle.rebuild(
        vec![Endpoint::builder("bad", "{id:nope}").build().unwrap()],
        &RouterOptions::default(),
        &ParameterPolicyFactory::default(),
    );
    assert!(result.is_err());
    assert_eq!(selected(&handle.load(), "/keep").as_deref(), Some("keep"));
}
