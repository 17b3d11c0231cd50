use pathroute::config::RouterOptions;
use pathroute::endpoint::Endpoint;
use pathroute::policy::ParameterPolicyFactory;
use pathroute::router::{RouteTable, RouterHandle};
use pathroute::selector::{RequestContext, SelectionOutcome};
use std::sync::Arc;
use std::thread;

mod common;
use common::zoo_table;

fn assert_route_match(table: &RouteTable, method: &str, path: &str, expected_handler: &str) {
    let outcome = table
        .route_blocking(&RequestContext::new(method, path))
        .unwrap_or_else(|e| panic!("{method} {path} was ambiguous: {e}"));
    match outcome.matched() {
        Some(candidate) => {
            println!("✅ {} {} → {}", method, path, candidate.endpoint.display_name());
            assert_eq!(
                candidate.endpoint.display_name(),
                expected_handler,
                "Handler mismatch for {method} {path}"
            );
        }
        None => {
            println!("❌ {} {} → {:?}", method, path, outcome);
            assert_eq!(expected_handler, "<none>", "Expected route to match for {method} {path}");
        }
    }
}

#[test]
fn test_router_verbs() {
    let table = zoo_table();
    assert_route_match(&table, "GET", "/", "root_handler");
    assert_route_match(&table, "GET", "/zoo/animals", "get_animals");
    assert_route_match(&table, "POST", "/zoo/animals", "create_animal");
    assert_route_match(&table, "GET", "/zoo/animals/123", "get_animal");
    assert_route_match(&table, "PUT", "/zoo/animals/123", "update_animal");
    assert_route_match(&table, "PATCH", "/zoo/animals/123", "patch_animal");
    assert_route_match(&table, "DELETE", "/zoo/animals/123", "delete_animal");
    assert_route_match(&table, "HEAD", "/zoo/health", "health_check");
    assert_route_match(&table, "OPTIONS", "/zoo/health", "supported_ops");
    assert_route_match(&table, "TRACE", "/zoo/health", "trace_route");
}

#[test]
fn test_router_case_insensitive_literals() {
    let table = zoo_table();
    assert_route_match(&table, "get", "/ZOO/Animals", "get_animals");
    assert_route_match(&table, "GET", "/zoo/animals/", "get_animals");
}

#[test]
fn test_router_constraint_and_precedence() {
    let table = zoo_table();
    assert_route_match(&table, "GET", "/zoo/animals/rex", "animal_by_name");
    assert_route_match(&table, "GET", "/zoo/animals/7/toys/ball", "animal_toy");
    assert_route_match(&table, "GET", "/zoo/animals/rex/toys/ball", "<none>");
}

#[test]
fn test_router_deep_parameters() {
    let table = zoo_table();
    let outcome = table
        .route_blocking(&RequestContext::new("GET", "/zoo/cats/animals/123/habitats/88/sections/5"))
        .unwrap();
    let values = &outcome.matched().unwrap().values;
    assert_eq!(values.get_str("category"), Some("cats"));
    assert_eq!(values.get_str("id"), Some("123"));
    assert_eq!(values.get_str("habitat_id"), Some("88"));
    assert_eq!(values.get_str("section_id"), Some("5"));
}

#[test]
fn test_router_catch_all_and_complex_segments() {
    let table = zoo_table();
    let outcome = table
        .route_blocking(&RequestContext::new("GET", "/static/css/site.css"))
        .unwrap();
    assert_eq!(outcome.matched().unwrap().values.get_str("path"), Some("css/site.css"));

    let outcome = table
        .route_blocking(&RequestContext::new("GET", "/reports/2024/summary.pdf"))
        .unwrap();
    let values = &outcome.matched().unwrap().values;
    assert_eq!(values.get_str("year"), Some("2024"));
    assert_eq!(values.get_str("name"), Some("summary"));
    assert_eq!(values.get_str("format"), Some("pdf"));

    let outcome = table
        .route_blocking(&RequestContext::new("GET", "/reports/2024/summary"))
        .unwrap();
    assert!(!outcome.matched().unwrap().values.contains_key("format"));

    assert_route_match(&table, "GET", "/reports/1999/summary.pdf", "<none>");
    assert_route_match(&table, "GET", "/reports/2024/summary.", "<none>");
}

#[test]
fn test_router_unknown_path() {
    let table = zoo_table();
    assert_route_match(&table, "GET", "/unknown", "<none>");
    assert_route_match(&table, "GET", "/zoo", "<none>");
    assert_route_match(&table, "GET", "/zoo/animals/1/toys", "<none>");
}

#[test]
fn test_router_method_not_allowed() {
    let table = zoo_table();
    let outcome = table
        .route_blocking(&RequestContext::new("DELETE", "/zoo/animals"))
        .unwrap();
    assert_eq!(outcome.allow_header().as_deref(), Some("GET, POST"));

    let outcome = table.route_blocking(&RequestContext::new("GET", "/zoo/health")).unwrap();
    match outcome {
        SelectionOutcome::MethodNotAllowed { allowed } => {
            assert_eq!(allowed, vec!["HEAD", "OPTIONS", "TRACE"]);
        }
        other => panic!("expected 405, got {other:?}"),
    }
}

#[test]
fn test_cors_preflight_is_accepted_for_declared_method() {
    let table = zoo_table();
    let ctx = RequestContext::new("OPTIONS", "/zoo/animals").with_cors("https://example.com", "POST");
    assert!(ctx.is_cors_preflight());
    assert_route_match(&table, "OPTIONS", "/zoo/animals", "<none>");
    let outcome = table.route_blocking(&ctx).unwrap();
    assert_eq!(outcome.matched().unwrap().endpoint.display_name(), "create_animal");
}

#[test]
fn test_wildcard_endpoint_suppresses_method_not_allowed() {
    let endpoints = vec![
        Endpoint::builder("read", "docs/{id}").methods(["GET"]).build().unwrap(),
        Endpoint::builder("fallback", "docs/{id}").order(1).build().unwrap(),
    ];
    let table = RouteTable::build(endpoints, &RouterOptions::default(), &ParameterPolicyFactory::default()).unwrap();
    assert_route_match(&table, "DELETE", "/docs/1", "fallback");
    assert_route_match(&table, "GET", "/docs/1", "read");
}

#[test]
fn test_ambiguous_endpoints_are_reported() {
    let endpoints = vec![
        Endpoint::builder("first", "docs/{id}").methods(["GET"]).build().unwrap(),
        Endpoint::builder("second", "docs/{slug}").methods(["GET"]).build().unwrap(),
    ];
    let table = RouteTable::build(endpoints, &RouterOptions::default(), &ParameterPolicyFactory::default()).unwrap();
    let err = table.route_blocking(&RequestContext::new("GET", "/docs/1")).unwrap_err();
    assert_eq!(err.candidates, vec!["first".to_string(), "second".to_string()]);

    assert!(table.route_blocking(&RequestContext::new("POST", "/docs/1")).unwrap().allow_header().is_some());
}

#[test]
fn test_concurrent_reads_during_reload() {
    let handle = Arc::new(RouterHandle::new(zoo_table()));
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let handle = Arc::clone(&handle);
            thread::spawn(move || {
                for _ in 0..200 {
                    let table = handle.load();
                    let outcome = table.route_blocking(&RequestContext::new("GET", "/zoo/animals")).unwrap();
                    assert_eq!(outcome.matched().unwrap().endpoint.display_name(), "get_animals");
                }
            })
        })
        .collect();

    for _ in 0..20 {
        handle.reload(zoo_table());
    }
    for reader in readers {
        reader.join().unwrap();
    }
}
