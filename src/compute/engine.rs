//! Incremental propagation over the built circuit.
//!
//! One tick = one external `assign` followed by one `final_result`
//! traversal. The traversal mixes evaluation and fan-out: the moment a
//! unit's inputs are complete it is evaluated and its output is broadcast to
//! every consumer through the dependency index, before the walk descends
//! into its children. The first not-ready node short-circuits its remaining
//! siblings, so only a prefix of the tree may be visited on any given tick.

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::graph::CircuitGraph;
use crate::store::{Endpoint, NodeRole, UnitId, UnitKind, ROOT};

use super::kernel::{self, EvalMode};

/// Owns the circuit graph for the process lifetime and drives all state
/// mutation. Readiness is monotonic: a slot that received a value never
/// becomes unready again.
#[derive(Debug)]
pub struct PropagationEngine {
    graph: CircuitGraph,
    mode: EvalMode,
}

impl PropagationEngine {
    pub fn new(graph: CircuitGraph) -> Self {
        Self::with_mode(graph, EvalMode::default())
    }

    pub fn with_mode(graph: CircuitGraph, mode: EvalMode) -> Self {
        Self { graph, mode }
    }

    pub fn mode(&self) -> EvalMode {
        self.mode
    }

    pub fn graph(&self) -> &CircuitGraph {
        &self.graph
    }

    /// Broadcasts a newly known value at `endpoint` to every consumer,
    /// filling each input slot that endpoint feeds.
    pub fn assign(&mut self, endpoint: &Endpoint, value: i64) {
        let consumers: SmallVec<[UnitId; 8]> =
            SmallVec::from_slice(self.graph.consumers_of(endpoint));
        for id in consumers {
            let hits = self.graph.registry.mark_slots(id, endpoint, value);
            trace!(unit = self.graph.name(id), %endpoint, value, hits, "value delivered");
        }
    }

    /// Re-derives everything derivable and reports the value reaching the
    /// result sink, or `None` while some visited node still lacks an input.
    pub fn final_result(&mut self) -> Option<i64> {
        let mut value = 0;
        let ready = self.visit(ROOT, &mut value);
        ready.then_some(value)
    }

    /// One full tick: deliver an external value, then re-evaluate.
    pub fn tick(&mut self, endpoint: &Endpoint, value: i64) -> Option<i64> {
        self.assign(endpoint, value);
        self.final_result()
    }

    fn visit(&mut self, id: UnitId, out: &mut i64) -> bool {
        let role = self.graph.registry.roles[id.index()].clone();
        match role {
            // A childless root has nothing to derive a result from.
            NodeRole::Root => self.visit_children(id, out, false),

            NodeRole::Sink => {
                let idx = id.index();
                match (
                    self.graph.registry.ready[idx].first(),
                    self.graph.registry.values[idx].first(),
                ) {
                    (Some(true), Some(v)) => {
                        *out = *v;
                        true
                    }
                    _ => false,
                }
            }

            NodeRole::Operator(kind) => {
                if let UnitKind::Unsupported(raw) = &kind {
                    debug!(
                        unit = self.graph.name(id),
                        declared = raw.as_str(),
                        "unit has no usable operator; it will never become ready"
                    );
                    return false;
                }
                if !self.graph.registry.all_ready(id) {
                    trace!(unit = self.graph.name(id), "inputs incomplete");
                    return false;
                }

                let operands = self.graph.registry.values[id.index()].clone();
                match kernel::evaluate(&kind, &operands, self.mode) {
                    Ok(result) => {
                        let output = Endpoint::unit_output(self.graph.name(id).to_string());
                        trace!(unit = self.graph.name(id), result, "evaluated, fanning out");
                        self.assign(&output, result);
                        self.visit_children(id, out, true)
                    }
                    Err(err) => {
                        debug!(unit = self.graph.name(id), error = %err, "evaluation failed");
                        false
                    }
                }
            }
        }
    }

    /// Visits children in construction order, stopping at the first
    /// not-ready one; later siblings are left untouched this tick.
    fn visit_children(&mut self, id: UnitId, out: &mut i64, initial: bool) -> bool {
        let children = self.graph.registry.children[id.index()].clone();
        let mut ready = initial;
        for child in children {
            ready = self.visit(child, out);
            if !ready {
                break;
            }
        }
        ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build;
    use crate::store::{Connection, UnitDecl};

    fn decl(name: &str, kind: &str) -> UnitDecl {
        UnitDecl { name: name.into(), kind: kind.into() }
    }

    fn conn(from: Endpoint, to: Endpoint) -> Connection {
        Connection { from, to }
    }

    fn sum_circuit() -> (Vec<UnitDecl>, Vec<Connection>) {
        (
            vec![decl("a", "sum")],
            vec![
                conn(Endpoint::external("0"), Endpoint::unit_input("a", "0")),
                conn(Endpoint::external("1"), Endpoint::unit_input("a", "1")),
                conn(Endpoint::unit_output("a"), Endpoint::result()),
            ],
        )
    }

    #[test]
    fn result_appears_once_all_inputs_arrive() {
        let (units, connections) = sum_circuit();
        let mut engine = PropagationEngine::new(build(&units, &connections).unwrap());

        assert_eq!(engine.tick(&Endpoint::external("0"), 3), None);
        assert_eq!(engine.tick(&Endpoint::external("1"), 4), Some(7));
    }

    #[test]
    fn negate_unit_flips_its_single_operand() {
        let units = [decl("a", "negate")];
        let connections = [
            conn(Endpoint::external("0"), Endpoint::unit_input("a", "0")),
            conn(Endpoint::unit_output("a"), Endpoint::result()),
        ];
        let mut engine = PropagationEngine::new(build(&units, &connections).unwrap());
        assert_eq!(engine.tick(&Endpoint::external("0"), 9), Some(-9));
    }

    #[test]
    fn unsupported_unit_never_becomes_ready() {
        let units = [decl("a", "frobnicate")];
        let connections = [
            conn(Endpoint::external("0"), Endpoint::unit_input("a", "0")),
            conn(Endpoint::unit_output("a"), Endpoint::result()),
        ];
        let mut engine = PropagationEngine::new(build(&units, &connections).unwrap());
        assert_eq!(engine.tick(&Endpoint::external("0"), 1), None);
        assert_eq!(engine.tick(&Endpoint::external("0"), 2), None);
    }

    #[test]
    fn readiness_is_monotonic_and_values_overwrite() {
        let (units, connections) = sum_circuit();
        let mut engine = PropagationEngine::new(build(&units, &connections).unwrap());

        assert_eq!(engine.tick(&Endpoint::external("0"), 3), None);
        assert_eq!(engine.tick(&Endpoint::external("1"), 4), Some(7));
        // A fresh value on an already-ready port replaces the value but
        // never retracts readiness.
        assert_eq!(engine.tick(&Endpoint::external("0"), 10), Some(14));
    }

    #[test]
    fn cascaded_units_propagate_through_the_chain() {
        // input/0 -> a(sum) -> b(negate) -> result
        let units = [decl("a", "sum"), decl("b", "negate")];
        let connections = [
            conn(Endpoint::external("0"), Endpoint::unit_input("a", "0")),
            conn(Endpoint::unit_output("a"), Endpoint::unit_input("b", "0")),
            conn(Endpoint::unit_output("b"), Endpoint::result()),
        ];
        let mut engine = PropagationEngine::new(build(&units, &connections).unwrap());
        assert_eq!(engine.tick(&Endpoint::external("0"), 5), Some(-5));
    }

    #[test]
    fn diamond_shaped_fanout_reconverges() {
        // input/0 feeds both b(negate) and c(negate); a(sum) adds them back
        // together, so the result is -2x. a is discovered under c, the later
        // sibling, so by the time the walk reaches it b's output has already
        // fanned out.
        let units = [decl("b", "negate"), decl("c", "negate"), decl("a", "sum")];
        let connections = [
            conn(Endpoint::external("0"), Endpoint::unit_input("b", "0")),
            conn(Endpoint::external("0"), Endpoint::unit_input("c", "0")),
            conn(Endpoint::unit_output("c"), Endpoint::unit_input("a", "0")),
            conn(Endpoint::unit_output("b"), Endpoint::unit_input("a", "1")),
            conn(Endpoint::unit_output("a"), Endpoint::result()),
        ];
        let mut engine = PropagationEngine::new(build(&units, &connections).unwrap());
        assert_eq!(engine.tick(&Endpoint::external("0"), 21), Some(-42));
    }

    #[test]
    fn early_sibling_failure_short_circuits_later_branches() {
        // Same diamond, but a is discovered under b, the FIRST root child.
        // b's subtree fails at a (c has not run yet), the root stops before
        // ever visiting c, and no tick can break the stalemate: only a
        // prefix of the tree is walked each time.
        let units = [decl("b", "negate"), decl("c", "negate"), decl("a", "sum")];
        let connections = [
            conn(Endpoint::external("0"), Endpoint::unit_input("b", "0")),
            conn(Endpoint::external("0"), Endpoint::unit_input("c", "0")),
            conn(Endpoint::unit_output("b"), Endpoint::unit_input("a", "0")),
            conn(Endpoint::unit_output("c"), Endpoint::unit_input("a", "1")),
            conn(Endpoint::unit_output("a"), Endpoint::result()),
        ];
        let mut engine = PropagationEngine::new(build(&units, &connections).unwrap());
        assert_eq!(engine.tick(&Endpoint::external("0"), 21), None);
        assert_eq!(engine.tick(&Endpoint::external("0"), 21), None);
    }

    #[test]
    fn legacy_mul_is_always_zero_and_corrected_mul_is_not() {
        let units = [decl("a", "mul")];
        let connections = [
            conn(Endpoint::external("0"), Endpoint::unit_input("a", "0")),
            conn(Endpoint::external("1"), Endpoint::unit_input("a", "1")),
            conn(Endpoint::unit_output("a"), Endpoint::result()),
        ];

        let mut legacy = PropagationEngine::new(build(&units, &connections).unwrap());
        legacy.assign(&Endpoint::external("0"), 3);
        assert_eq!(legacy.tick(&Endpoint::external("1"), 4), Some(0));

        let mut corrected = PropagationEngine::with_mode(
            build(&units, &connections).unwrap(),
            EvalMode::Corrected,
        );
        corrected.assign(&Endpoint::external("0"), 3);
        assert_eq!(corrected.tick(&Endpoint::external("1"), 4), Some(12));
    }

    #[test]
    fn replayed_assignment_stream_is_deterministic() {
        let (units, connections) = sum_circuit();
        let stream = [
            (Endpoint::external("1"), -8),
            (Endpoint::external("0"), 2),
            (Endpoint::external("1"), 5),
        ];

        let run = || {
            let mut engine = PropagationEngine::new(build(&units, &connections).unwrap());
            stream
                .iter()
                .map(|(ep, v)| engine.tick(ep, *v))
                .collect::<Vec<_>>()
        };

        let first = run();
        assert_eq!(first, run());
        assert_eq!(first, vec![None, Some(-6), Some(7)]);
    }

    #[test]
    fn empty_circuit_reports_not_ready() {
        let mut engine = PropagationEngine::new(build(&[], &[]).unwrap());
        assert_eq!(engine.final_result(), None);
    }

    #[test]
    fn operand_slot_order_does_not_change_aggregates() {
        // Same value set, opposite wiring order for the two input ports.
        let units = [decl("a", "max")];
        let forward = [
            conn(Endpoint::external("0"), Endpoint::unit_input("a", "0")),
            conn(Endpoint::external("1"), Endpoint::unit_input("a", "1")),
            conn(Endpoint::unit_output("a"), Endpoint::result()),
        ];
        let swapped = [
            conn(Endpoint::external("1"), Endpoint::unit_input("a", "0")),
            conn(Endpoint::external("0"), Endpoint::unit_input("a", "1")),
            conn(Endpoint::unit_output("a"), Endpoint::result()),
        ];

        let run = |connections: &[Connection]| {
            let mut engine = PropagationEngine::new(build(&units, connections).unwrap());
            engine.assign(&Endpoint::external("0"), 3);
            engine.tick(&Endpoint::external("1"), 11)
        };

        assert_eq!(run(&forward), run(&swapped));
        assert_eq!(run(&forward), Some(11));
    }
}
