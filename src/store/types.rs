use serde::{Serialize, Deserialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct UnitId(pub u32);

impl UnitId {
    #[inline(always)]
    pub fn index(&self) -> usize { self.0 as usize }
    pub fn new(idx: usize) -> Self { Self(idx as u32) }
}

/// Arena slot of the synthetic root node. Always present, never evaluated.
pub const ROOT: UnitId = UnitId(0);

/// Owner name of the circuit's external input side.
pub const EXTERNAL_OWNER: &str = "input";

/// Owner name of the result sink.
pub const RESULT_OWNER: &str = "result";

/// Which side of a unit an endpoint refers to.
///
/// `Unported` covers the two owners that carry no port direction at all:
/// the external input side and the result sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    In,
    Out,
    Unported,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::In => write!(f, "in"),
            Direction::Out => write!(f, "out"),
            Direction::Unported => Ok(()),
        }
    }
}

/// A single data-producing or data-consuming point in the circuit: an
/// external input port, a unit's input/output port, or the result sink.
///
/// Equality, hashing and ordering are structural over all three fields; two
/// endpoints name the same graph location iff every field matches. Used both
/// as dependency-index keys and as per-unit input identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Endpoint {
    pub owner: String,
    pub direction: Direction,
    pub port: String,
}

impl Endpoint {
    /// External input port, e.g. `input/3`.
    pub fn external(port: impl Into<String>) -> Self {
        Self {
            owner: EXTERNAL_OWNER.to_string(),
            direction: Direction::Unported,
            port: port.into(),
        }
    }

    /// A unit's input port, e.g. `a/in/1`.
    pub fn unit_input(owner: impl Into<String>, port: impl Into<String>) -> Self {
        Self { owner: owner.into(), direction: Direction::In, port: port.into() }
    }

    /// A unit's output. Only port 0 exists; units have a single output.
    pub fn unit_output(owner: impl Into<String>) -> Self {
        Self { owner: owner.into(), direction: Direction::Out, port: "0".to_string() }
    }

    /// The result sink.
    pub fn result() -> Self {
        Self {
            owner: RESULT_OWNER.to_string(),
            direction: Direction::Unported,
            port: String::new(),
        }
    }

    pub fn is_external(&self) -> bool {
        self.owner == EXTERNAL_OWNER
    }

    pub fn is_result(&self) -> bool {
        self.owner == RESULT_OWNER
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            Direction::Unported if self.port.is_empty() => write!(f, "{}", self.owner),
            Direction::Unported => write!(f, "{}/{}", self.owner, self.port),
            dir => write!(f, "{}/{}/{}", self.owner, dir, self.port),
        }
    }
}

/// The operator a unit computes.
///
/// `Unsupported` keeps whatever type text was declared (empty when the unit
/// never appeared in the declarations) so diagnostics can echo it back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    Sum,
    Negate,
    Max,
    Min,
    Mul,
    Unsupported(String),
}

impl UnitKind {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "sum" => UnitKind::Sum,
            "negate" => UnitKind::Negate,
            "max" => UnitKind::Max,
            "min" => UnitKind::Min,
            "mul" => UnitKind::Mul,
            other => UnitKind::Unsupported(other.to_string()),
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, UnitKind::Unsupported(_))
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitKind::Sum => write!(f, "sum"),
            UnitKind::Negate => write!(f, "negate"),
            UnitKind::Max => write!(f, "max"),
            UnitKind::Min => write!(f, "min"),
            UnitKind::Mul => write!(f, "mul"),
            UnitKind::Unsupported(raw) if raw.is_empty() => write!(f, "<undeclared>"),
            UnitKind::Unsupported(raw) => write!(f, "{}", raw),
        }
    }
}

/// What a node in the arena is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeRole {
    /// The synthetic root; externally delivered values enter below it.
    Root,
    /// The result sink; an untyped node with a single meaningful input slot.
    Sink,
    /// An instantiated operator unit.
    Operator(UnitKind),
}

/// One `name := type` declaration, with the type kept as raw text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitDecl {
    pub name: String,
    pub kind: String,
}

/// One `from -- to` wiring line; read once at build time, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub from: Endpoint,
    pub to: Endpoint,
}

/// One `input/<port> := <value>` line of the value stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueAssignment {
    pub target: Endpoint,
    pub value: i64,
}
