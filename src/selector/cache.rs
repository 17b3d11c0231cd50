use super::constraint::EndpointConstraint;
use crate::endpoint::Endpoint;
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Resolved constraints per endpoint, populated lazily.
///
/// Two threads racing to populate the same endpoint both compute the same
/// list; the last insert wins and readers only ever see complete lists.
#[derive(Debug, Default)]
pub struct EndpointConstraintCache {
    entries: DashMap<Uuid, Arc<[EndpointConstraint]>>,
}

impl EndpointConstraintCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Constraints for `endpoint`, sorted by order.
    pub fn get_or_create(&self, endpoint: &Endpoint) -> Arc<[EndpointConstraint]> {
        if let Some(found) = self.entries.get(&endpoint.id()) {
            return Arc::clone(found.value());
        }
        let created: Arc<[EndpointConstraint]> = EndpointConstraint::for_endpoint(endpoint).into();
        self.entries.insert(endpoint.id(), Arc::clone(&created));
        created
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn populates_once_per_endpoint() {
        let cache = EndpointConstraintCache::new();
        let endpoint = Endpoint::builder("e", "a").methods(["GET"]).build().unwrap();
        let first = cache.get_or_create(&endpoint);
        let second = cache.get_or_create(&endpoint);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn concurrent_population_is_consistent() {
        let cache = Arc::new(EndpointConstraintCache::new());
        let endpoint = Arc::new(Endpoint::builder("e", "a").methods(["GET", "PUT"]).build().unwrap());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let endpoint = Arc::clone(&endpoint);
                thread::spawn(move || cache.get_or_create(&endpoint).len())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), 1);
        }
        assert_eq!(cache.len(), 1);
    }
}
