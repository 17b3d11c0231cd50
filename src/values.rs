//! Route values: the case-insensitive, ordered map produced by matching and
//! consumed by link generation.
//!
//! [`RouteValueDictionary`] keeps up to [`INLINE_VALUES`] entries in a
//! `SmallVec` and scans them linearly. Past that size it adds a hash index
//! (keyed by [`hash_ignore_case`]) so lookups stay O(1) on large maps.

use crate::text::{eq_ignore_case, hash_ignore_case};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

/// Entries stored inline before the hash index is built.
pub const INLINE_VALUES: usize = 8;

/// A single route value.
///
/// Matching only ever produces [`RouteValue::Str`]. Link generation accepts
/// any variant; lists expand into repeated query-string pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RouteValue {
    /// Explicit null (distinct from an absent key)
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// String value
    Str(String),
    /// Multi-valued entry
    List(Vec<RouteValue>),
}

impl RouteValue {
    /// Borrow the value as a string if it is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            RouteValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Invariant string conversion used when a value is written into a URL
    /// or checked by a constraint. `Null` and lists have no single rendering.
    #[must_use]
    pub fn to_route_string(&self) -> Option<Cow<'_, str>> {
        match self {
            RouteValue::Null | RouteValue::List(_) => None,
            RouteValue::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
            RouteValue::Int(i) => Some(Cow::Owned(i.to_string())),
            RouteValue::Float(v) => Some(Cow::Owned(v.to_string())),
            RouteValue::Str(s) => Some(Cow::Borrowed(s)),
        }
    }

    /// `false` for `Null` and the empty string.
    #[must_use]
    pub fn is_non_empty(&self) -> bool {
        match self {
            RouteValue::Null => false,
            RouteValue::Str(s) => !s.is_empty(),
            _ => true,
        }
    }
}

/// Route-part equality.
///
/// Strings compare ordinally ignoring case, and a missing or null value is
/// treated as the empty string when the other side is a string. Other
/// values use structural equality.
#[must_use]
pub fn parts_equal(a: Option<&RouteValue>, b: Option<&RouteValue>) -> bool {
    let a = a.filter(|v| !matches!(v, RouteValue::Null));
    let b = b.filter(|v| !matches!(v, RouteValue::Null));
    match (a, b) {
        (None, None) => true,
        (Some(RouteValue::Str(sa)), Some(RouteValue::Str(sb))) => eq_ignore_case(sa, sb),
        (Some(RouteValue::Str(s)), None) | (None, Some(RouteValue::Str(s))) => s.is_empty(),
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

impl fmt::Display for RouteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteValue::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            other => f.write_str(other.to_route_string().as_deref().unwrap_or("")),
        }
    }
}

impl From<&str> for RouteValue {
    fn from(s: &str) -> Self {
        RouteValue::Str(s.to_string())
    }
}

impl From<String> for RouteValue {
    fn from(s: String) -> Self {
        RouteValue::Str(s)
    }
}

impl From<i64> for RouteValue {
    fn from(v: i64) -> Self {
        RouteValue::Int(v)
    }
}

impl From<i32> for RouteValue {
    fn from(v: i32) -> Self {
        RouteValue::Int(i64::from(v))
    }
}

impl From<f64> for RouteValue {
    fn from(v: f64) -> Self {
        RouteValue::Float(v)
    }
}

impl From<bool> for RouteValue {
    fn from(v: bool) -> Self {
        RouteValue::Bool(v)
    }
}

impl<T: Into<RouteValue>> From<Vec<T>> for RouteValue {
    fn from(items: Vec<T>) -> Self {
        RouteValue::List(items.into_iter().map(Into::into).collect())
    }
}

type Entry = (String, RouteValue);

/// Ordered, case-insensitive map from parameter name to value.
#[derive(Clone, Default)]
pub struct RouteValueDictionary {
    entries: SmallVec<[Entry; INLINE_VALUES]>,
    /// Built once the map outgrows the inline capacity.
    index: Option<HashMap<u64, SmallVec<[usize; 2]>>>,
}

impl RouteValueDictionary {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, key: &str) -> Option<usize> {
        match &self.index {
            Some(index) => index
                .get(&hash_ignore_case(key))?
                .iter()
                .copied()
                .find(|&i| eq_ignore_case(&self.entries[i].0, key)),
            None => self.entries.iter().position(|(k, _)| eq_ignore_case(k, key)),
        }
    }

    /// Look up a value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&RouteValue> {
        self.position(key).map(|i| &self.entries[i].1)
    }

    /// Look up a string value by key.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(RouteValue::as_str)
    }

    /// `true` if the key is present (with any value, including `Null`).
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Insert or replace. A replaced entry keeps its original key spelling
    /// and position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<RouteValue>) -> Option<RouteValue> {
        let key = key.into();
        let value = value.into();
        if let Some(i) = self.position(&key) {
            return Some(std::mem::replace(&mut self.entries[i].1, value));
        }
        self.push(key, value);
        None
    }

    /// Insert only if the key is absent. Returns `true` when inserted.
    pub fn try_add(&mut self, key: impl Into<String>, value: impl Into<RouteValue>) -> bool {
        let key = key.into();
        if self.position(&key).is_some() {
            return false;
        }
        self.push(key, value.into());
        true
    }

    fn push(&mut self, key: String, value: RouteValue) {
        let slot = self.entries.len();
        if let Some(index) = &mut self.index {
            index.entry(hash_ignore_case(&key)).or_default().push(slot);
        }
        self.entries.push((key, value));
        if self.index.is_none() && self.entries.len() > INLINE_VALUES {
            self.rebuild_index();
        }
    }

    fn rebuild_index(&mut self) {
        let mut index: HashMap<u64, SmallVec<[usize; 2]>> = HashMap::with_capacity(self.entries.len());
        for (i, (k, _)) in self.entries.iter().enumerate() {
            index.entry(hash_ignore_case(k)).or_default().push(i);
        }
        self.index = Some(index);
    }

    /// Remove a key, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<RouteValue> {
        let i = self.position(key)?;
        let (_, value) = self.entries.remove(i);
        if self.entries.len() > INLINE_VALUES {
            self.rebuild_index();
        } else {
            self.index = None;
        }
        Some(value)
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RouteValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index = None;
    }
}

impl PartialEq for RouteValueDictionary {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|o| o == v))
    }
}

impl fmt::Debug for RouteValueDictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Into<String>, V: Into<RouteValue>> FromIterator<(K, V)> for RouteValueDictionary {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = RouteValueDictionary::new();
        values.extend(iter);
        values
    }
}

impl<K: Into<String>, V: Into<RouteValue>> Extend<(K, V)> for RouteValueDictionary {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl Serialize for RouteValueDictionary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RouteValueDictionary {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ValuesVisitor;

        impl<'de> Visitor<'de> for ValuesVisitor {
            type Value = RouteValueDictionary;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of route values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut values = RouteValueDictionary::new();
                while let Some((k, v)) = access.next_entry::<String, RouteValue>()? {
                    values.insert(k, v);
                }
                Ok(values)
            }
        }

        deserializer.deserialize_map(ValuesVisitor)
    }
}
