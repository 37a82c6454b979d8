//! Incremental evaluation of declarative arithmetic circuits.
//!
//! A circuit is declared as a flat list: named operator units, numbered
//! external input ports, and connections wiring unit outputs, unit inputs,
//! external ports and the result sink together. Values arrive at external
//! ports one at a time; after each one the engine rebroadcasts everything
//! newly derivable and reports the value reaching the result sink, or
//! nothing while some unit still lacks an input.
//!
//! Typical use:
//!
//! ```
//! use circuit_core::{build, parse_circuit, PropagationEngine};
//!
//! let desc = parse_circuit("\
//! UNITS: 1
//! a := sum
//! INPUTS: 2
//! CONNECTIONS: 3
//! input/0 -- a/in/0
//! input/1 -- a/in/1
//! a/out/0 -- result
//! VALUES: 2
//! input/0 := 3
//! input/1 := 4
//! ").unwrap();
//!
//! let mut engine = PropagationEngine::new(build(&desc.units, &desc.connections).unwrap());
//! let results: Vec<_> = desc
//!     .values
//!     .iter()
//!     .map(|v| engine.tick(&v.target, v.value))
//!     .collect();
//! assert_eq!(results, vec![None, Some(7)]);
//! ```

pub mod analysis;
pub mod compute;
pub mod display;
pub mod graph;
pub mod parser;
pub mod store;

pub use analysis::sort_connections;
pub use compute::{EvalError, EvalMode, PropagationEngine};
pub use display::format_trace;
pub use graph::{build, BuildError, CircuitGraph};
pub use parser::{parse_circuit, CircuitDescription, ParseError};
pub use store::{Connection, Direction, Endpoint, UnitDecl, UnitId, UnitKind, ValueAssignment};
