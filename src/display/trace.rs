//! Human-readable dump of the circuit tree and its readiness state.

use std::fmt::Write;

use crate::graph::CircuitGraph;
use crate::store::{NodeRole, UnitId, ROOT};

/// Renders the construction tree from the root, one line per node with its
/// operator and per-slot readiness. Diagnostics only.
pub fn format_trace(graph: &CircuitGraph) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "CIRCUIT TREE ({} nodes)", graph.node_count());
    let _ = writeln!(out, "--------------------------------------------------");
    render(graph, ROOT, 0, &mut out);
    out
}

fn render(graph: &CircuitGraph, id: UnitId, level: usize, out: &mut String) {
    let indent = "  ".repeat(level);
    let label = match graph.role(id) {
        NodeRole::Root => "root".to_string(),
        NodeRole::Sink => "sink".to_string(),
        NodeRole::Operator(kind) => kind.to_string(),
    };

    let idx = id.index();
    let mut slots = String::new();
    for (slot, endpoint) in graph.inputs(id).iter().enumerate() {
        if graph.registry.ready[idx][slot] {
            let _ = write!(slots, "  [{} <- {} = {}]", slot, endpoint, graph.registry.values[idx][slot]);
        } else {
            let _ = write!(slots, "  [{} <- {} = ?]", slot, endpoint);
        }
    }

    let _ = writeln!(out, "{}{} ({}){}", indent, graph.name(id), label, slots);
    for &child in graph.children(id) {
        render(graph, child, level + 1, out);
    }
}
