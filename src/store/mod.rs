//! Core data types and arena storage for circuit nodes.
pub mod registry;
pub mod types;

pub use registry::Registry;
pub use types::{
    Connection, Direction, Endpoint, NodeRole, UnitDecl, UnitId, UnitKind, ValueAssignment,
    EXTERNAL_OWNER, RESULT_OWNER, ROOT,
};
