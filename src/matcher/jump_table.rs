//! Segment-text dispatch tables.
//!
//! A jump table answers one question per path segment: given the segment's
//! text, which DFA state comes next? Every variant follows the same policy:
//!
//! - a zero-length segment goes to the `exit` destination
//! - text equal (ordinal, case-insensitive) to an entry goes to that entry's destination
//! - anything else goes to the `default` destination
//!
//! The variant is picked by entry count and never changes the answer. When
//! two entries differ only by case the first one wins in every variant.

use super::tokenizer::PathSpan;
use crate::text::{eq_ignore_case, hash_ignore_case};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;

/// Prime bucket counts for [`JumpTable::CustomHash`].
const PRIMES: [usize; 36] = [
    3, 7, 11, 17, 23, 29, 37, 47, 59, 71, 89, 107, 131, 163, 197, 239, 293, 353, 431, 521, 631, 761, 919, 1103,
    1327, 1597, 1931, 2333, 2801, 3371, 4049, 4861, 5839, 7013, 8419, 10103,
];

/// Entry-count thresholds for choosing a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JumpTableThresholds {
    /// Up to this many entries use a linear scan
    pub linear_max: usize,
    /// From this many entries on, use the open-addressing table
    pub hash_min: usize,
}

impl Default for JumpTableThresholds {
    fn default() -> Self {
        Self {
            linear_max: 4,
            hash_min: 64,
        }
    }
}

/// Which variant a table was built as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JumpTableKind {
    /// No entries
    Zero,
    /// Linear scan
    Linear,
    /// Hash map keyed by case-insensitive hash
    Dictionary,
    /// Prime-bucketed open-addressing table
    CustomHash,
}

impl fmt::Display for JumpTableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JumpTableKind::Zero => "zero",
            JumpTableKind::Linear => "linear",
            JumpTableKind::Dictionary => "dictionary",
            JumpTableKind::CustomHash => "custom-hash",
        })
    }
}

/// Text-to-destination dispatch for one DFA state.
#[derive(Debug, Clone)]
pub enum JumpTable {
    /// Every non-empty segment goes to `default`
    Zero {
        /// Destination on miss
        default: usize,
        /// Destination for zero-length segments
        exit: usize,
    },
    /// Entries scanned in order
    Linear {
        /// Entries, first occurrence of each text only
        entries: Vec<(Box<str>, usize)>,
        /// Destination on miss
        default: usize,
        /// Destination for zero-length segments
        exit: usize,
    },
    /// Hash lookup with full-text comparison within each hash
    Dictionary {
        /// Entries grouped by case-insensitive hash
        map: HashMap<u64, SmallVec<[(Box<str>, usize); 1]>>,
        /// Destination on miss
        default: usize,
        /// Destination for zero-length segments
        exit: usize,
    },
    /// Open-addressing table over a flat entry array
    CustomHash(CustomHashTable),
}

impl JumpTable {
    /// Build the variant suited to the number of distinct entries.
    #[must_use]
    pub fn build(entries: &[(String, usize)], default: usize, exit: usize, thresholds: JumpTableThresholds) -> Self {
        let distinct = dedup(entries);
        if distinct.is_empty() {
            JumpTable::Zero { default, exit }
        } else if distinct.len() <= thresholds.linear_max {
            JumpTable::Linear {
                entries: distinct,
                default,
                exit,
            }
        } else if distinct.len() < thresholds.hash_min {
            Self::dictionary_from(distinct, default, exit)
        } else {
            JumpTable::CustomHash(CustomHashTable::new(distinct, default, exit))
        }
    }

    /// Build a linear-scan table regardless of size.
    #[must_use]
    pub fn linear(entries: &[(String, usize)], default: usize, exit: usize) -> Self {
        JumpTable::Linear {
            entries: dedup(entries),
            default,
            exit,
        }
    }

    /// Build a hash-map table regardless of size.
    #[must_use]
    pub fn dictionary(entries: &[(String, usize)], default: usize, exit: usize) -> Self {
        Self::dictionary_from(dedup(entries), default, exit)
    }

    fn dictionary_from(distinct: Vec<(Box<str>, usize)>, default: usize, exit: usize) -> Self {
        let mut map: HashMap<u64, SmallVec<[(Box<str>, usize); 1]>> = HashMap::new();
        for (text, destination) in distinct {
            map.entry(hash_ignore_case(&text))
                .or_default()
                .push((text, destination));
        }
        JumpTable::Dictionary { map, default, exit }
    }

    /// Build an open-addressing table regardless of size.
    #[must_use]
    pub fn custom_hash(entries: &[(String, usize)], default: usize, exit: usize) -> Self {
        JumpTable::CustomHash(CustomHashTable::new(dedup(entries), default, exit))
    }

    /// Destination for the segment `span` of `path`.
    #[inline]
    #[must_use]
    pub fn get_destination(&self, path: &str, span: PathSpan) -> usize {
        self.get_destination_for_text(span.text(path))
    }

    /// Destination for a segment's text.
    #[must_use]
    pub fn get_destination_for_text(&self, text: &str) -> usize {
        match self {
            JumpTable::Zero { default, exit } => {
                if text.is_empty() {
                    *exit
                } else {
                    *default
                }
            }
            JumpTable::Linear { entries, default, exit } => {
                if text.is_empty() {
                    return *exit;
                }
                entries
                    .iter()
                    .find(|(t, _)| eq_ignore_case(t, text))
                    .map_or(*default, |(_, d)| *d)
            }
            JumpTable::Dictionary { map, default, exit } => {
                if text.is_empty() {
                    return *exit;
                }
                map.get(&hash_ignore_case(text))
                    .and_then(|bucket| bucket.iter().find(|(t, _)| eq_ignore_case(t, text)))
                    .map_or(*default, |(_, d)| *d)
            }
            JumpTable::CustomHash(table) => table.get_destination(text),
        }
    }

    /// The variant this table was built as.
    #[must_use]
    pub fn kind(&self) -> JumpTableKind {
        match self {
            JumpTable::Zero { .. } => JumpTableKind::Zero,
            JumpTable::Linear { .. } => JumpTableKind::Linear,
            JumpTable::Dictionary { .. } => JumpTableKind::Dictionary,
            JumpTable::CustomHash(_) => JumpTableKind::CustomHash,
        }
    }

    /// Destination on miss.
    #[must_use]
    pub fn default_destination(&self) -> usize {
        match self {
            JumpTable::Zero { default, .. }
            | JumpTable::Linear { default, .. }
            | JumpTable::Dictionary { default, .. } => *default,
            JumpTable::CustomHash(table) => table.default,
        }
    }

    /// Destination for zero-length segments.
    #[must_use]
    pub fn exit_destination(&self) -> usize {
        match self {
            JumpTable::Zero { exit, .. } | JumpTable::Linear { exit, .. } | JumpTable::Dictionary { exit, .. } => {
                *exit
            }
            JumpTable::CustomHash(table) => table.exit,
        }
    }

    /// Literal entries, in build order.
    #[must_use]
    pub fn entries(&self) -> Vec<(&str, usize)> {
        match self {
            JumpTable::Zero { .. } => Vec::new(),
            JumpTable::Linear { entries, .. } => entries.iter().map(|(t, d)| (&**t, *d)).collect(),
            JumpTable::Dictionary { map, .. } => map
                .values()
                .flat_map(|bucket| bucket.iter().map(|(t, d)| (&**t, *d)))
                .collect(),
            JumpTable::CustomHash(table) => table.entries.iter().map(|(t, d)| (&**t, *d)).collect(),
        }
    }
}

/// Keep the first occurrence of each text (case-insensitive), in order.
fn dedup(entries: &[(String, usize)]) -> Vec<(Box<str>, usize)> {
    let mut out: Vec<(Box<str>, usize)> = Vec::with_capacity(entries.len());
    for (text, destination) in entries {
        if !out.iter().any(|(t, _)| eq_ignore_case(t, text)) {
            out.push((text.as_str().into(), *destination));
        }
    }
    out
}

/// Open-addressing table with compacted buckets.
///
/// Entries live in one flat array sorted by bucket; `buckets[b]..buckets[b + 1]`
/// is the slice for bucket `b`. A lookup probes that slice linearly and
/// compares full text, so a hash collision can cost a comparison but never
/// returns another entry's destination.
#[derive(Debug, Clone)]
pub struct CustomHashTable {
    buckets: Vec<usize>,
    entries: Vec<(Box<str>, usize)>,
    prime: usize,
    default: usize,
    exit: usize,
}

impl CustomHashTable {
    fn new(distinct: Vec<(Box<str>, usize)>, default: usize, exit: usize) -> Self {
        let prime = bucket_count(distinct.len() * 2);

        let mut counts = vec![0usize; prime + 1];
        let slots: Vec<usize> = distinct
            .iter()
            .map(|(text, _)| (hash_ignore_case(text) % prime as u64) as usize)
            .collect();
        for &slot in &slots {
            counts[slot + 1] += 1;
        }
        for b in 1..=prime {
            counts[b] += counts[b - 1];
        }

        let mut fill = counts.clone();
        let mut ordered: Vec<Option<(Box<str>, usize)>> = vec![None; distinct.len()];
        for (entry, slot) in distinct.into_iter().zip(slots) {
            ordered[fill[slot]] = Some(entry);
            fill[slot] += 1;
        }

        Self {
            buckets: counts,
            entries: ordered.into_iter().flatten().collect(),
            prime,
            default,
            exit,
        }
    }

    fn get_destination(&self, text: &str) -> usize {
        if text.is_empty() {
            return self.exit;
        }
        let slot = (hash_ignore_case(text) % self.prime as u64) as usize;
        self.entries[self.buckets[slot]..self.buckets[slot + 1]]
            .iter()
            .find(|(t, _)| eq_ignore_case(t, text))
            .map_or(self.default, |(_, d)| *d)
    }

    /// Number of buckets.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.prime
    }
}

/// Smallest listed prime at least `min`, or the next prime past the list.
fn bucket_count(min: usize) -> usize {
    if let Some(&p) = PRIMES.iter().find(|&&p| p >= min) {
        return p;
    }
    let mut candidate = min | 1;
    while !is_prime(candidate) {
        candidate += 2;
    }
    candidate
}

fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    let mut d = 2;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 1;
    }
    true
}
