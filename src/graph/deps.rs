//! Reverse lookup from a producing endpoint to the units that consume it.

use std::collections::HashMap;

use crate::store::{Endpoint, UnitId};

/// Maps each producing endpoint to the ordered, deduplicated list of units
/// that declared it as an input. Consulted on every value assignment and on
/// every unit-output fan-out.
#[derive(Debug, Clone, Default)]
pub struct DependencyIndex {
    consumers: HashMap<Endpoint, Vec<UnitId>>,
}

impl DependencyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `consumer` reads from `from`. Registering the same pair
    /// twice is a no-op.
    pub fn register(&mut self, from: Endpoint, consumer: UnitId) {
        let entry = self.consumers.entry(from).or_default();
        if !entry.contains(&consumer) {
            entry.push(consumer);
        }
    }

    pub fn consumers_of(&self, endpoint: &Endpoint) -> &[UnitId] {
        self.consumers.get(endpoint).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.consumers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.consumers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_is_idempotent() {
        let mut index = DependencyIndex::new();
        let key = Endpoint::external("0");
        index.register(key.clone(), UnitId(1));
        index.register(key.clone(), UnitId(2));
        index.register(key.clone(), UnitId(1));

        assert_eq!(index.consumers_of(&key), &[UnitId(1), UnitId(2)]);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn unknown_endpoint_has_no_consumers() {
        let index = DependencyIndex::new();
        assert!(index.consumers_of(&Endpoint::external("9")).is_empty());
    }
}
