//! One-shot graph construction from the declared units and connection list.
//!
//! Connections are consumed strictly in input order; the first connection
//! naming a unit as its destination creates that unit's node and fixes its
//! place in the construction tree. Order is the only tree-placement signal,
//! so producer-before-consumer input is a precondition (enforced, not
//! silently tolerated; `analysis::order` can restore it).

use std::collections::HashMap;
use tracing::debug;

use crate::store::{Connection, NodeRole, UnitDecl, UnitKind, ROOT};

use super::circuit::CircuitGraph;
use super::error::BuildError;

/// Builds the circuit graph. Never evaluates anything; only structure is
/// established here.
pub fn build(units: &[UnitDecl], connections: &[Connection]) -> Result<CircuitGraph, BuildError> {
    // Declared type per unit name; undeclared units evaluate as unsupported.
    let declared: HashMap<&str, UnitKind> = units
        .iter()
        .map(|u| (u.name.as_str(), UnitKind::parse(&u.kind)))
        .collect();

    let mut graph = CircuitGraph::empty();

    for conn in connections {
        if conn.from.is_result() {
            return Err(BuildError::ResultAsSource { to: conn.to.clone() });
        }

        let to_name = conn.to.owner.as_str();
        let consumer = match graph.registry.lookup(to_name) {
            None => {
                let role = if conn.to.is_result() {
                    NodeRole::Sink
                } else {
                    let kind = declared
                        .get(to_name)
                        .cloned()
                        .unwrap_or(UnitKind::Unsupported(String::new()));
                    NodeRole::Operator(kind)
                };

                // The tree parent is whoever produces this node's first
                // input: the root for external ports, otherwise the unit
                // named by the source endpoint, which must already exist.
                let parent = if conn.from.is_external() {
                    ROOT
                } else {
                    graph.registry.lookup(&conn.from.owner).ok_or_else(|| {
                        BuildError::OutOfOrderConnection {
                            producer: conn.from.owner.clone(),
                            consumer: to_name.to_string(),
                        }
                    })?
                };

                let id = graph.registry.add_node(to_name.to_string(), role);
                graph.registry.push_input_slot(id, conn.from.clone());
                graph.registry.attach_child(parent, id);
                debug!(node = to_name, from = %conn.from, "created circuit node");
                id
            }
            Some(id) => {
                // Existing destination: a new producer appends a slot; a
                // repeated one is ignored. Tree placement never changes.
                if !graph.registry.has_input(id, &conn.from) {
                    graph.registry.push_input_slot(id, conn.from.clone());
                }
                id
            }
        };

        graph.deps.register(conn.from.clone(), consumer);
    }

    debug!(
        nodes = graph.node_count(),
        endpoints = graph.deps.len(),
        "circuit graph built"
    );
    Ok(graph)
}
