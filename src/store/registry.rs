//! Arena storage for the circuit's unit nodes.
//!
//! Nodes live in parallel columns indexed by `UnitId`; slot 0 is the
//! synthetic root. Name lookup goes through a side map instead of walking
//! the tree, and construction-tree children are kept as ordered id lists so
//! traversal follows discovery order.

use std::collections::HashMap;
use smallvec::SmallVec;

use super::types::{Endpoint, NodeRole, UnitId, ROOT};

const ROOT_NAME: &str = "root";

#[derive(Debug, Clone)]
pub struct Registry {
    // Columnar node data.
    pub roles: Vec<NodeRole>,
    pub names: Vec<String>,

    // Per-node input slots; the three columns stay in lockstep.
    pub inputs: Vec<SmallVec<[Endpoint; 2]>>,
    pub ready: Vec<SmallVec<[bool; 4]>>,
    pub values: Vec<SmallVec<[i64; 4]>>,

    // Construction-tree children, in the order they were attached.
    pub children: Vec<SmallVec<[UnitId; 2]>>,

    name_index: HashMap<String, UnitId>,
}

impl Registry {
    /// A registry holding only the synthetic root.
    pub fn with_root() -> Self {
        let mut reg = Self {
            roles: Vec::new(),
            names: Vec::new(),
            inputs: Vec::new(),
            ready: Vec::new(),
            values: Vec::new(),
            children: Vec::new(),
            name_index: HashMap::new(),
        };
        let root = reg.add_node(ROOT_NAME.to_string(), NodeRole::Root);
        debug_assert_eq!(root, ROOT);
        reg
    }

    pub fn count(&self) -> usize {
        self.roles.len()
    }

    pub fn lookup(&self, name: &str) -> Option<UnitId> {
        self.name_index.get(name).copied()
    }

    pub fn add_node(&mut self, name: String, role: NodeRole) -> UnitId {
        debug_assert!(!self.name_index.contains_key(&name), "duplicate node name {name}");
        let id = UnitId::new(self.count());
        self.name_index.insert(name.clone(), id);
        self.roles.push(role);
        self.names.push(name);
        self.inputs.push(SmallVec::new());
        self.ready.push(SmallVec::new());
        self.values.push(SmallVec::new());
        self.children.push(SmallVec::new());
        id
    }

    pub fn attach_child(&mut self, parent: UnitId, child: UnitId) {
        self.children[parent.index()].push(child);
    }

    /// Appends an input slot fed by `from`, initially unready.
    pub fn push_input_slot(&mut self, id: UnitId, from: Endpoint) {
        let idx = id.index();
        self.inputs[idx].push(from);
        self.ready[idx].push(false);
        self.values[idx].push(0);
        debug_assert!(
            self.inputs[idx].len() == self.ready[idx].len()
                && self.ready[idx].len() == self.values[idx].len()
        );
    }

    pub fn has_input(&self, id: UnitId, from: &Endpoint) -> bool {
        self.inputs[id.index()].iter().any(|stored| stored == from)
    }

    /// Delivers `value` to every slot of `id` fed by `endpoint`; a producer
    /// wired to the same unit more than once fills all matching slots.
    /// Returns the number of slots hit.
    pub fn mark_slots(&mut self, id: UnitId, endpoint: &Endpoint, value: i64) -> usize {
        let idx = id.index();
        let mut hits = 0;
        for (slot, stored) in self.inputs[idx].iter().enumerate() {
            if stored == endpoint {
                self.ready[idx][slot] = true;
                self.values[idx][slot] = value;
                hits += 1;
            }
        }
        hits
    }

    pub fn all_ready(&self, id: UnitId) -> bool {
        self.ready[id.index()].iter().all(|r| *r)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_root()
    }
}
