//! Connection ordering pre-pass.
//!
//! The builder consumes connections single-pass and requires
//! producer-before-consumer order. [`sort_connections`] restores that order
//! for inputs that do not guarantee it: a DFS topological sort over producer
//! unit names, then a stable reorder of the connections by the rank of their
//! destination. Cycles among unit names are fatal.

use std::collections::HashMap;

use crate::graph::BuildError;
use crate::store::Connection;

#[derive(Clone, Copy, PartialEq, Eq)]
enum VisitState {
    None,
    Visiting, // Used for cycle detection
    Visited,
}

/// Returns the connections reordered so that every connection creating a
/// unit precedes every connection consuming that unit's output. Ties keep
/// their original relative order, so per-unit input slot order is preserved.
pub fn sort_connections(connections: &[Connection]) -> Result<Vec<Connection>, BuildError> {
    let mut table: HashMap<&str, usize> = HashMap::new();
    let mut names: Vec<&str> = Vec::new();

    // Intern every unit name appearing as a destination or as a unit-owned
    // source. External ports and the result sink are not graph nodes.
    for conn in connections {
        if !conn.to.is_result() {
            intern(&mut table, &mut names, &conn.to.owner);
        }
        if !conn.from.is_external() && !conn.from.is_result() {
            intern(&mut table, &mut names, &conn.from.owner);
        }
    }

    // producers[i] = units whose output feeds unit i.
    let mut producers: Vec<Vec<usize>> = vec![Vec::new(); names.len()];
    for conn in connections {
        if conn.to.is_result() || conn.from.is_external() || conn.from.is_result() {
            continue;
        }
        let consumer = table[conn.to.owner.as_str()];
        let producer = table[conn.from.owner.as_str()];
        if !producers[consumer].contains(&producer) {
            producers[consumer].push(producer);
        }
    }

    let mut state = vec![VisitState::None; names.len()];
    let mut rank = vec![0usize; names.len()];
    let mut next = 0usize;
    for i in 0..names.len() {
        if state[i] == VisitState::None {
            visit(i, &producers, &names, &mut state, &mut rank, &mut next)?;
        }
    }

    let mut sorted = connections.to_vec();
    sorted.sort_by_key(|conn| {
        if conn.to.is_result() {
            usize::MAX // sinks after everything that could feed them
        } else {
            rank[table[conn.to.owner.as_str()]]
        }
    });
    Ok(sorted)
}

fn intern<'a>(table: &mut HashMap<&'a str, usize>, names: &mut Vec<&'a str>, name: &'a str) -> usize {
    *table.entry(name).or_insert_with(|| {
        names.push(name);
        names.len() - 1
    })
}

fn visit(
    node: usize,
    producers: &[Vec<usize>],
    names: &[&str],
    state: &mut [VisitState],
    rank: &mut [usize],
    next: &mut usize,
) -> Result<(), BuildError> {
    match state[node] {
        VisitState::Visited => return Ok(()),
        VisitState::Visiting => {
            return Err(BuildError::CyclicCircuit { unit: names[node].to_string() })
        }
        VisitState::None => state[node] = VisitState::Visiting,
    }

    // Producers first; post-order ranks put every producer below its
    // consumers.
    for &p in &producers[node] {
        visit(p, producers, names, state, rank, next)?;
    }

    state[node] = VisitState::Visited;
    rank[node] = *next;
    *next += 1;
    Ok(())
}
