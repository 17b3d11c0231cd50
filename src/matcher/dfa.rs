//! DFA over path segments.
//!
//! Each state is a set of `(candidate, depth)` items: candidate `c` has
//! consumed `depth` of its pattern's segments. Transitions are built by
//! subset construction, one [`JumpTable`] per state:
//!
//! - a literal child per distinct literal text, holding the items whose next
//!   segment is that literal *and* every item whose next segment accepts any
//!   text (parameters, complex segments, catch-alls)
//! - a parameter child (the jump table's default) for text matching no literal
//! - an exit child (the jump table's exit) for zero-length segments
//!
//! A catch-all item never advances past its catch-all segment, so it stays in
//! every child. State `0` is the failure state and loops to itself.
//!
//! The set of candidates at the final state is a superset of the patterns
//! that match the path; the full pattern matcher runs on each of them.

use super::jump_table::{JumpTable, JumpTableKind, JumpTableThresholds};
use super::tokenizer::PathSpan;
use crate::pattern::RoutePattern;
use crate::text::eq_ignore_case;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

type Item = (usize, usize);

/// One DFA state.
#[derive(Debug, Clone)]
pub struct DfaState {
    transitions: JumpTable,
    candidates: Vec<usize>,
}

impl DfaState {
    /// Transitions out of this state.
    #[must_use]
    pub fn transitions(&self) -> &JumpTable {
        &self.transitions
    }

    /// Candidate indices that may end here, ascending.
    #[must_use]
    pub fn candidates(&self) -> &[usize] {
        &self.candidates
    }
}

/// Compiled segment automaton.
#[derive(Debug, Clone)]
pub struct Dfa {
    states: Vec<DfaState>,
    root: usize,
}

enum Input<'t> {
    Literal(&'t str),
    Parameter,
    Empty,
}

impl Dfa {
    /// Build over `patterns`. Candidate indices in the result are indices
    /// into `patterns`, so callers pass them pre-sorted by priority.
    #[must_use]
    pub fn build(patterns: &[Arc<RoutePattern>], thresholds: JumpTableThresholds) -> Self {
        let mut builder = Builder {
            patterns,
            index: HashMap::new(),
            item_sets: Vec::new(),
        };
        builder.intern(Vec::new());
        let root = builder.intern((0..patterns.len()).map(|c| (c, 0)).collect());

        let mut states = Vec::new();
        let mut next = 0;
        while next < builder.item_sets.len() {
            let items = builder.item_sets[next].clone();
            states.push(builder.expand(&items, thresholds));
            next += 1;
        }

        Self { states, root }
    }

    /// Candidates for a tokenized path.
    #[must_use]
    pub fn find_candidates(&self, path: &str, spans: &[PathSpan]) -> &[usize] {
        let mut state = self.root;
        for span in spans {
            state = self.states[state].transitions.get_destination(path, *span);
        }
        &self.states[state].candidates
    }

    /// All states, failure state first.
    #[must_use]
    pub fn states(&self) -> &[DfaState] {
        &self.states
    }

    /// Index of the start state.
    #[must_use]
    pub fn root(&self) -> usize {
        self.root
    }

    /// Number of jump tables of each variant.
    #[must_use]
    pub fn jump_table_counts(&self) -> BTreeMap<JumpTableKind, usize> {
        let mut counts = BTreeMap::new();
        for state in &self.states {
            *counts.entry(state.transitions.kind()).or_insert(0) += 1;
        }
        counts
    }
}

struct Builder<'a> {
    patterns: &'a [Arc<RoutePattern>],
    index: HashMap<Vec<Item>, usize>,
    item_sets: Vec<Vec<Item>>,
}

impl Builder<'_> {
    fn intern(&mut self, items: Vec<Item>) -> usize {
        if let Some(&id) = self.index.get(&items) {
            return id;
        }
        let id = self.item_sets.len();
        self.index.insert(items.clone(), id);
        self.item_sets.push(items);
        id
    }

    fn expand(&mut self, items: &[Item], thresholds: JumpTableThresholds) -> DfaState {
        let mut literals: Vec<String> = Vec::new();
        for &(candidate, depth) in items {
            let segments = self.patterns[candidate].segments();
            if let Some(text) = segments.get(depth).and_then(|s| s.single_literal()) {
                if !literals.iter().any(|l| eq_ignore_case(l, text)) {
                    literals.push(text.to_string());
                }
            }
        }

        let mut entries = Vec::with_capacity(literals.len());
        for literal in literals {
            let child = self.advance(items, &Input::Literal(&literal));
            let id = self.intern(child);
            entries.push((literal, id));
        }
        let parameter = self.advance(items, &Input::Parameter);
        let parameter = self.intern(parameter);
        let exit = self.advance(items, &Input::Empty);
        let exit = self.intern(exit);

        let candidates = items
            .iter()
            .filter(|&&(candidate, depth)| self.can_end(candidate, depth))
            .map(|&(candidate, _)| candidate)
            .collect();

        DfaState {
            transitions: JumpTable::build(&entries, parameter, exit, thresholds),
            candidates,
        }
    }

    fn advance(&self, items: &[Item], input: &Input<'_>) -> Vec<Item> {
        let mut out = Vec::new();
        for &(candidate, depth) in items {
            let Some(segment) = self.patterns[candidate].segments().get(depth) else {
                // Past the end only empty segments are tolerated.
                if matches!(input, Input::Empty) {
                    out.push((candidate, depth));
                }
                continue;
            };

            if let Some(parameter) = segment.single_parameter() {
                if parameter.is_catch_all() {
                    out.push((candidate, depth));
                } else {
                    out.push((candidate, depth + 1));
                }
            } else if let Some(text) = segment.single_literal() {
                if matches!(input, Input::Literal(l) if eq_ignore_case(l, text)) {
                    out.push((candidate, depth + 1));
                }
            } else if !matches!(input, Input::Empty) {
                out.push((candidate, depth + 1));
            }
        }
        out
    }

    /// Whether every remaining segment can be satisfied without path text.
    fn can_end(&self, candidate: usize, depth: usize) -> bool {
        let pattern = &self.patterns[candidate];
        pattern
            .segments()
            .iter()
            .skip(depth)
            .all(|segment| match segment.single_parameter() {
                Some(p) => p.is_catch_all() || p.is_optional() || pattern.defaults().contains_key(p.name()),
                None => false,
            })
    }
}
