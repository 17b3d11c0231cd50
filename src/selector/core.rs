use super::cache::EndpointConstraintCache;
use super::constraint::EndpointConstraint;
use super::context::{CandidateState, RequestContext};
use crate::error::AmbiguousMatchError;
use std::sync::Arc;
use tracing::debug;

/// Result of selecting among matched candidates.
#[derive(Debug, Clone)]
pub enum SelectionOutcome {
    /// Exactly one endpoint survived
    Matched(CandidateState),
    /// Nothing survived; the caller falls through (404)
    NoMatch,
    /// Every candidate restricts methods and none accepts the request (405)
    MethodNotAllowed {
        /// Union of declared methods, uppercase and sorted
        allowed: Vec<String>,
    },
}

impl SelectionOutcome {
    /// The selected candidate, if any.
    #[must_use]
    pub fn matched(&self) -> Option<&CandidateState> {
        match self {
            SelectionOutcome::Matched(c) => Some(c),
            _ => None,
        }
    }

    /// `Allow` header value for a 405 outcome.
    #[must_use]
    pub fn allow_header(&self) -> Option<String> {
        match self {
            SelectionOutcome::MethodNotAllowed { allowed } => Some(allowed.join(", ")),
            _ => None,
        }
    }
}

/// Chooses one endpoint from the candidates whose patterns matched.
///
/// Constraints are evaluated tier by tier in ascending order. Within a tier,
/// candidates carrying a constraint of that order are evaluated one at a time;
/// those that reject are dropped. When at least one constrained candidate
/// accepts, only the accepting ones continue; otherwise the candidates without
/// a constraint at that order continue. The survivors are then narrowed to the
/// lowest score group, which must hold exactly one endpoint.
#[derive(Debug, Default)]
pub struct EndpointSelector {
    cache: EndpointConstraintCache,
}

impl EndpointSelector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn cache(&self) -> &EndpointConstraintCache {
        &self.cache
    }

    /// Select the best candidate for `ctx`.
    ///
    /// # Errors
    ///
    /// [`AmbiguousMatchError`] when more than one endpoint remains in the
    /// best score group.
    pub async fn select(
        &self,
        ctx: &RequestContext<'_>,
        mut candidates: Vec<CandidateState>,
    ) -> Result<SelectionOutcome, AmbiguousMatchError> {
        if candidates.is_empty() {
            return Ok(SelectionOutcome::NoMatch);
        }

        let constraints: Vec<Arc<[EndpointConstraint]>> = candidates
            .iter()
            .map(|c| self.cache.get_or_create(&c.endpoint))
            .collect();

        let mut survivors: Vec<usize> = (0..candidates.len()).collect();
        let mut method_accepted = false;
        let mut last_order: Option<i32> = None;

        while let Some(order) = next_order(&survivors, &constraints, last_order) {
            let mut accepted = Vec::new();
            let mut unconstrained = Vec::new();
            for &index in &survivors {
                let mut tier = constraints[index].iter().filter(|c| c.order() == order).peekable();
                if tier.peek().is_none() {
                    unconstrained.push(index);
                    continue;
                }
                let mut ok = true;
                for constraint in tier {
                    if !constraint.accept(ctx, &candidates[index]).await {
                        ok = false;
                        break;
                    }
                    if matches!(constraint, EndpointConstraint::HttpMethod(_)) {
                        method_accepted = true;
                    }
                }
                if ok {
                    accepted.push(index);
                }
            }
            survivors = if accepted.is_empty() { unconstrained } else { accepted };
            last_order = Some(order);
        }

        if survivors.is_empty() {
            if !method_accepted {
                if let Some(allowed) = allowed_methods(&candidates) {
                    debug!(path = ctx.path, method = ctx.method, allowed = ?allowed, "method not allowed");
                    return Ok(SelectionOutcome::MethodNotAllowed { allowed });
                }
            }
            debug!(path = ctx.path, method = ctx.method, "no candidate satisfied its constraints");
            return Ok(SelectionOutcome::NoMatch);
        }

        let best = survivors
            .iter()
            .map(|&i| candidates[i].score)
            .min()
            .unwrap_or_default();
        let finalists: Vec<usize> = survivors
            .into_iter()
            .filter(|&i| candidates[i].score == best)
            .collect();

        if finalists.len() > 1 {
            return Err(AmbiguousMatchError {
                candidates: finalists
                    .iter()
                    .map(|&i| candidates[i].endpoint.display_name().to_string())
                    .collect(),
            });
        }

        let Some(&winner) = finalists.first() else {
            return Ok(SelectionOutcome::NoMatch);
        };
        let selected = candidates.swap_remove(winner);
        debug!(
            path = ctx.path,
            method = ctx.method,
            endpoint = selected.endpoint.display_name(),
            "endpoint selected"
        );
        Ok(SelectionOutcome::Matched(selected))
    }

    /// [`select`](Self::select) on the current thread.
    ///
    /// # Errors
    ///
    /// See [`select`](Self::select).
    pub fn select_blocking(
        &self,
        ctx: &RequestContext<'_>,
        candidates: Vec<CandidateState>,
    ) -> Result<SelectionOutcome, AmbiguousMatchError> {
        futures::executor::block_on(self.select(ctx, candidates))
    }
}

fn next_order(survivors: &[usize], constraints: &[Arc<[EndpointConstraint]>], after: Option<i32>) -> Option<i32> {
    survivors
        .iter()
        .flat_map(|&i| constraints[i].iter().map(EndpointConstraint::order))
        .filter(|&order| after.map_or(true, |last| order > last))
        .min()
}

/// Declared methods when every candidate restricts methods, else `None`.
fn allowed_methods(candidates: &[CandidateState]) -> Option<Vec<String>> {
    let mut allowed: Vec<String> = Vec::new();
    for candidate in candidates {
        let methods = candidate.endpoint.metadata().http_methods.as_ref()?;
        if methods.methods.is_empty() {
            return None;
        }
        allowed.extend(methods.methods.iter().map(|m| m.to_ascii_uppercase()));
    }
    allowed.sort();
    allowed.dedup();
    Some(allowed)
}
