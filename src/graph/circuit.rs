//! The assembled circuit: node arena plus dependency index.

use crate::store::{Endpoint, NodeRole, Registry, UnitId};

use super::deps::DependencyIndex;

/// The forest of unit nodes rooted at the synthetic root, together with the
/// reverse endpoint-to-consumers index. Built once from the connection list;
/// afterwards only per-slot readiness state mutates.
#[derive(Debug, Clone)]
pub struct CircuitGraph {
    pub(crate) registry: Registry,
    pub(crate) deps: DependencyIndex,
}

impl CircuitGraph {
    pub(crate) fn empty() -> Self {
        Self {
            registry: Registry::with_root(),
            deps: DependencyIndex::new(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.registry.count()
    }

    pub fn lookup(&self, name: &str) -> Option<UnitId> {
        self.registry.lookup(name)
    }

    pub fn role(&self, id: UnitId) -> &NodeRole {
        &self.registry.roles[id.index()]
    }

    pub fn name(&self, id: UnitId) -> &str {
        &self.registry.names[id.index()]
    }

    pub fn inputs(&self, id: UnitId) -> &[Endpoint] {
        &self.registry.inputs[id.index()]
    }

    pub fn children(&self, id: UnitId) -> &[UnitId] {
        &self.registry.children[id.index()]
    }

    pub fn consumers_of(&self, endpoint: &Endpoint) -> &[UnitId] {
        self.deps.consumers_of(endpoint)
    }
}
