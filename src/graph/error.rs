//! Error types raised while turning a connection list into a graph.
use thiserror::Error;

use crate::store::Endpoint;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// The result sink can only terminate a connection, never feed one.
    #[error("'result' cannot be a connection source (feeding '{to}')")]
    ResultAsSource { to: Endpoint },

    /// A connection consumes a unit's output before any connection created
    /// that unit. Connections must arrive producer-before-consumer; see
    /// `analysis::order` for the reordering pre-pass.
    #[error("connection into '{consumer}' references producer unit '{producer}' before it was wired")]
    OutOfOrderConnection { producer: String, consumer: String },

    /// The wiring contains a dependency cycle among unit names.
    #[error("circuit wiring contains a dependency cycle through unit '{unit}'")]
    CyclicCircuit { unit: String },
}
