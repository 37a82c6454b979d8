//! Operator evaluation and the tick-driven propagation engine.
pub mod engine;
pub mod kernel;

pub use engine::PropagationEngine;
pub use kernel::{evaluate, EvalError, EvalMode};
