//! Route table: compiled endpoints, the DFA over their patterns, the
//! selector and the link generator, plus the swappable handle that
//! publishes a table to request threads.

use crate::binder::{LinkGenerator, TemplateBinder};
use crate::config::RouterOptions;
use crate::endpoint::Endpoint;
use crate::error::{AmbiguousMatchError, RouteTableError};
use crate::matcher::{tokenize, Dfa, RoutePatternMatcher, SegmentBuffer};
use crate::pattern::RoutePattern;
use crate::policy::{ParameterPolicyFactory, ResolvedPolicies, RouteDirection};
use crate::selector::{CandidateState, EndpointSelector, RequestContext, SelectionOutcome};
use crate::values::RouteValueDictionary;
use arc_swap::ArcSwap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Candidate collection slower than this is logged as a warning.
const SLOW_MATCH_THRESHOLD: Duration = Duration::from_millis(1);

/// One endpoint compiled for matching and generation.
#[derive(Debug, Clone)]
pub struct CompiledEndpoint {
    endpoint: Arc<Endpoint>,
    matcher: RoutePatternMatcher,
    policies: ResolvedPolicies,
    binder: Arc<TemplateBinder>,
    score: usize,
}

impl CompiledEndpoint {
    #[must_use]
    pub fn endpoint(&self) -> &Arc<Endpoint> {
        &self.endpoint
    }

    #[must_use]
    pub fn policies(&self) -> &ResolvedPolicies {
        &self.policies
    }

    #[must_use]
    pub fn binder(&self) -> &Arc<TemplateBinder> {
        &self.binder
    }

    /// Rank of the endpoint's `(order, precedence)` group.
    #[must_use]
    pub fn score(&self) -> usize {
        self.score
    }
}

/// Immutable routing structure built from a set of endpoints.
///
/// Endpoints are kept sorted by `(order, precedence, template)`. The sort
/// position drives candidate order, the selector's final tie-break and the
/// order in which link generation tries endpoints.
#[derive(Debug)]
pub struct RouteTable {
    entries: Vec<CompiledEndpoint>,
    dfa: Dfa,
    selector: EndpointSelector,
    links: LinkGenerator,
    max_segments: usize,
}

impl RouteTable {
    /// Compile `endpoints`. Any unresolvable policy aborts the build.
    ///
    /// # Errors
    ///
    /// [`RouteTableError::Constraint`] naming the first endpoint and parameter
    /// whose constraint token fails to resolve.
    pub fn build(
        endpoints: Vec<Endpoint>,
        options: &RouterOptions,
        factory: &ParameterPolicyFactory,
    ) -> Result<Self, RouteTableError> {
        let start = Instant::now();

        let mut endpoints = endpoints;
        endpoints.sort_by(|a, b| {
            a.order()
                .cmp(&b.order())
                .then_with(|| a.pattern().precedence().cmp(b.pattern().precedence()))
                .then_with(|| a.pattern().raw_text().cmp(b.pattern().raw_text()))
        });

        let mut entries: Vec<CompiledEndpoint> = Vec::with_capacity(endpoints.len());
        let mut score = 0;
        for endpoint in endpoints {
            let policies = ResolvedPolicies::resolve(endpoint.pattern(), factory, endpoint.display_name())?;
            if let Some(previous) = entries.last() {
                let prev = &previous.endpoint;
                if prev.order() != endpoint.order() || prev.pattern().precedence() != endpoint.pattern().precedence() {
                    score += 1;
                }
            }
            let pattern = Arc::clone(endpoint.pattern());
            let binder = Arc::new(TemplateBinder::new(Arc::clone(&pattern), &policies));
            entries.push(CompiledEndpoint {
                endpoint: Arc::new(endpoint),
                matcher: RoutePatternMatcher::new(pattern),
                policies,
                binder,
                score,
            });
        }

        let patterns: Vec<Arc<RoutePattern>> = entries.iter().map(|e| Arc::clone(e.endpoint.pattern())).collect();
        let dfa = Dfa::build(&patterns, options.thresholds());
        let longest = patterns.iter().map(|p| p.segments().len()).max().unwrap_or(0);
        let max_segments = options.max_segments.max(longest + 1);
        let links = LinkGenerator::new(
            entries.iter().map(|e| (Arc::clone(&e.endpoint), Arc::clone(&e.binder))),
            options.link_options(),
        );

        info!(
            endpoints_count = entries.len(),
            dfa_states = dfa.states().len(),
            jump_tables = ?dfa.jump_table_counts(),
            max_segments,
            build_us = start.elapsed().as_micros(),
            "Route table built"
        );

        Ok(Self {
            entries,
            dfa,
            selector: EndpointSelector::new(),
            links,
            max_segments,
        })
    }

    /// Compiled endpoints in table order.
    #[must_use]
    pub fn entries(&self) -> &[CompiledEndpoint] {
        &self.entries
    }

    pub fn endpoints(&self) -> impl Iterator<Item = &Arc<Endpoint>> {
        self.entries.iter().map(|e| &e.endpoint)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn dfa(&self) -> &Dfa {
        &self.dfa
    }

    #[must_use]
    pub fn selector(&self) -> &EndpointSelector {
        &self.selector
    }

    #[must_use]
    pub fn link_generator(&self) -> &LinkGenerator {
        &self.links
    }

    /// Effective tokenizer bound.
    #[must_use]
    pub fn max_segments(&self) -> usize {
        self.max_segments
    }

    /// Endpoints whose patterns and route constraints accept `path`, in
    /// table order.
    #[must_use]
    pub fn candidates(&self, path: &str) -> Vec<CandidateState> {
        let start = Instant::now();
        let mut spans = SegmentBuffer::new();
        tokenize(path, self.max_segments, &mut spans);

        let mut candidates = Vec::new();
        for &index in self.dfa.find_candidates(path, &spans) {
            let entry = &self.entries[index];
            if entry.endpoint.metadata().suppress_matching {
                continue;
            }
            let mut values = RouteValueDictionary::new();
            if !entry.matcher.try_match_tokenized(path, &spans, &mut values) {
                continue;
            }
            if let Some(key) = entry.policies.first_failure(&values, RouteDirection::IncomingRequest) {
                debug!(
                    path = %path,
                    endpoint = entry.endpoint.display_name(),
                    parameter = key,
                    "Route constraint rejected candidate"
                );
                continue;
            }
            candidates.push(CandidateState::new(Arc::clone(&entry.endpoint), values, entry.score));
        }

        let elapsed = start.elapsed();
        if elapsed > SLOW_MATCH_THRESHOLD {
            warn!(
                path = %path,
                candidates = candidates.len(),
                duration_us = elapsed.as_micros(),
                "Slow route match"
            );
        }
        candidates
    }

    /// Match `ctx.path` and select an endpoint.
    ///
    /// # Errors
    ///
    /// [`AmbiguousMatchError`] when several endpoints tie.
    pub async fn route(&self, ctx: &RequestContext<'_>) -> Result<SelectionOutcome, AmbiguousMatchError> {
        debug!(method = ctx.method, path = ctx.path, "Route match attempt");
        let candidates = self.candidates(ctx.path);
        let outcome = self.selector.select(ctx, candidates).await;
        if let Err(err) = &outcome {
            warn!(method = ctx.method, path = ctx.path, candidates = ?err.candidates, "Ambiguous route match");
        }
        outcome
    }

    /// [`route`](Self::route) on the current thread.
    ///
    /// # Errors
    ///
    /// See [`route`](Self::route).
    pub fn route_blocking(&self, ctx: &RequestContext<'_>) -> Result<SelectionOutcome, AmbiguousMatchError> {
        futures::executor::block_on(self.route(ctx))
    }
}

/// Publishes the current [`RouteTable`] to request threads.
///
/// Readers take a snapshot with [`load`](Self::load) and keep using it for
/// the whole request; [`reload`](Self::reload) swaps in a complete new table
/// so a reader never sees a partially built one.
#[derive(Debug)]
pub struct RouterHandle {
    current: ArcSwap<RouteTable>,
}

impl RouterHandle {
    #[must_use]
    pub fn new(table: RouteTable) -> Self {
        Self {
            current: ArcSwap::from_pointee(table),
        }
    }

    /// Snapshot of the current table.
    #[must_use]
    pub fn load(&self) -> Arc<RouteTable> {
        self.current.load_full()
    }

    /// Publish `table`, returning the one it replaced.
    pub fn reload(&self, table: RouteTable) -> Arc<RouteTable> {
        let endpoints_count = table.len();
        let previous = self.current.swap(Arc::new(table));
        info!(
            endpoints_count,
            previous_endpoints_count = previous.len(),
            "Route table swapped"
        );
        previous
    }

    /// Compile `endpoints` and publish the result. On error the current
    /// table stays live.
    ///
    /// # Errors
    ///
    /// See [`RouteTable::build`].
    pub fn rebuild(
        &self,
        endpoints: Vec<Endpoint>,
        options: &RouterOptions,
        factory: &ParameterPolicyFactory,
    ) -> Result<(), RouteTableError> {
        let table = RouteTable::build(endpoints, options, factory)?;
        self.reload(table);
        Ok(())
    }
}
