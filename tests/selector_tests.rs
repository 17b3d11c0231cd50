use futures::future::BoxFuture;
use pathroute::config::RouterOptions;
use pathroute::endpoint::Endpoint;
use pathroute::policy::ParameterPolicyFactory;
use pathroute::router::RouteTable;
use pathroute::selector::{
    CandidateState, CustomEndpointConstraint, RequestContext, SelectionOutcome, HTTP_METHOD_CONSTRAINT_ORDER,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Accepts requests whose `Origin` is in an allow list.
#[derive(Debug)]
struct OriginConstraint {
    allowed: Vec<&'static str>,
    calls: AtomicUsize,
}

impl OriginConstraint {
    fn new(allowed: Vec<&'static str>) -> Arc<Self> {
        Arc::new(Self {
            allowed,
            calls: AtomicUsize::new(0),
        })
    }
}

impl CustomEndpointConstraint for OriginConstraint {
    fn order(&self) -> i32 {
        HTTP_METHOD_CONSTRAINT_ORDER + 10
    }

    fn accept<'a>(&'a self, ctx: &'a RequestContext<'a>, _candidate: &'a CandidateState) -> BoxFuture<'a, bool> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            ctx.origin.is_some_and(|origin| self.allowed.iter().any(|a| *a == origin))
        })
    }
}

/// Accepts candidates whose `version` route value (`v2`, `3`, ...) is at least the wrapped number.
#[derive(Debug)]
struct MinVersion(u32);

impl CustomEndpointConstraint for MinVersion {
    fn order(&self) -> i32 {
        -10
    }

    fn accept<'a>(&'a self, _ctx: &'a RequestContext<'a>, candidate: &'a CandidateState) -> BoxFuture<'a, bool> {
        let version = candidate
            .values
            .get_str("version")
            .and_then(|v| v.trim_start_matches('v').parse::<u32>().ok());
        Box::pin(futures::future::ready(version.is_some_and(|v| v >= self.0)))
    }
}

fn build(endpoints: Vec<Endpoint>) -> RouteTable {
    RouteTable::build(endpoints, &RouterOptions::default(), &ParameterPolicyFactory::default()).unwrap()
}

fn selected(table: &RouteTable, ctx: &RequestContext<'_>) -> Option<String> {
    table
        .route_blocking(ctx)
        .unwrap()
        .matched()
        .map(|c| c.endpoint.display_name().to_string())
}

#[test]
fn test_custom_constraint_narrows_candidates() {
    let partner = OriginConstraint::new(vec!["https://partner.example"]);
    let table = build(vec![
        Endpoint::builder("partner", "api/data")
            .methods(["GET"])
            .endpoint_constraint(partner.clone())
            .build()
            .unwrap(),
        Endpoint::builder("public", "api/data").methods(["GET"]).order(1).build().unwrap(),
    ]);

    let ctx = RequestContext::new("GET", "/api/data");
    assert_eq!(selected(&table, &ctx).as_deref(), Some("public"));

    let ctx = RequestContext::new("GET", "/api/data").with_cors("https://partner.example", "GET");
    assert_eq!(selected(&table, &ctx).as_deref(), Some("partner"));
    assert!(partner.calls.load(Ordering::SeqCst) >= 2);
}

#[test]
fn test_constraint_runs_only_after_earlier_tiers() {
    let origin = OriginConstraint::new(vec!["https://partner.example"]);
    let table = build(vec![Endpoint::builder("guarded", "api/data")
        .methods(["POST"])
        .endpoint_constraint(origin.clone())
        .build()
        .unwrap()]);

    let outcome = table.route_blocking(&RequestContext::new("GET", "/api/data")).unwrap();
    assert_eq!(outcome.allow_header().as_deref(), Some("POST"));
    assert_eq!(origin.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_endpoint_without_methods_suppresses_method_not_allowed() {
    let origin = OriginConstraint::new(vec!["https://partner.example"]);
    let table = build(vec![
        Endpoint::builder("get_only", "api/data").methods(["GET"]).build().unwrap(),
        Endpoint::builder("any_method", "api/data")
            .endpoint_constraint(origin.clone())
            .build()
            .unwrap(),
    ]);

    let outcome = table.route_blocking(&RequestContext::new("DELETE", "/api/data")).unwrap();
    assert!(matches!(outcome, SelectionOutcome::NoMatch));
    assert_eq!(outcome.allow_header(), None);
    assert_eq!(origin.calls.load(Ordering::SeqCst), 1);

    let ctx = RequestContext::new("DELETE", "/api/data").with_cors("https://partner.example", "DELETE");
    assert_eq!(selected(&table, &ctx).as_deref(), Some("any_method"));
}

#[test]
fn test_constraint_reads_route_values() {
    let table = build(vec![
        Endpoint::builder("modern", "api/{version}/items")
            .endpoint_constraint(Arc::new(MinVersion(2)))
            .build()
            .unwrap(),
        Endpoint::builder("legacy", "api/{version}/items").order(1).build().unwrap(),
    ]);
    assert_eq!(
        selected(&table, &RequestContext::new("GET", "/api/v3/items")).as_deref(),
        Some("modern")
    );
    assert_eq!(
        selected(&table, &RequestContext::new("GET", "/api/v1/items")).as_deref(),
        Some("legacy")
    );
}

#[test]
fn test_constraint_cache_is_filled_once_per_endpoint() {
    let table = build(vec![
        Endpoint::builder("a", "x/{id}").methods(["GET"]).build().unwrap(),
        Endpoint::builder("b", "y/{id}").methods(["GET"]).build().unwrap(),
    ]);
    assert!(table.selector().cache().is_empty());
    for _ in 0..10 {
        selected(&table, &RequestContext::new("GET", "/x/1"));
        selected(&table, &RequestContext::new("GET", "/y/1"));
    }
    assert_eq!(table.selector().cache().len(), 2);
}

#[test]
fn test_async_route_with_executor() {
    let table = build(vec![Endpoint::builder("async", "ping").methods(["GET"]).build().unwrap()]);
    let outcome = futures::executor::block_on(async {
        let ctx = RequestContext::new("GET", "/ping");
        table.route(&ctx).await
    })
    .unwrap();
    assert_eq!(outcome.matched().unwrap().endpoint.display_name(), "async");
}
