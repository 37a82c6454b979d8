//! Line parser for the circuit description format.
//!
//! The format is four counted sections, each introduced by a
//! `<SECTION>: <count>` header line:
//!
//! ```text
//! UNITS: 2
//! a := sum
//! b := negate
//! INPUTS: 2
//! CONNECTIONS: 3
//! input/0 -- a/in/0
//! a/out/0 -- b/in/0
//! b/out/0 -- result
//! VALUES: 1
//! input/0 := 3
//! ```
//!
//! Endpoint text forms: `input/<port>`, `<unit>/<in|out>/<port>`, `result`.
//! Parsing is intolerant: any malformed line fails the whole run.

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::store::{
    Connection, Direction, Endpoint, UnitDecl, ValueAssignment, EXTERNAL_OWNER, RESULT_OWNER,
};

/// Everything a circuit description declares, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitDescription {
    pub units: Vec<UnitDecl>,
    /// Declared number of external input ports. Carried through for
    /// interface completeness; the engine does not constrain port numbers
    /// against it.
    pub input_count: u32,
    pub connections: Vec<Connection>,
    pub values: Vec<ValueAssignment>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected end of input while reading {expected}")]
    UnexpectedEnd { expected: &'static str },

    #[error("malformed header line '{line}', expected '<SECTION>: <count>'")]
    MalformedHeader { line: String },

    #[error("malformed line '{line}', expected three whitespace-separated tokens")]
    MalformedLine { line: String },

    #[error("malformed endpoint '{text}'")]
    MalformedEndpoint { text: String },

    #[error("invalid number '{text}'")]
    InvalidNumber { text: String },
}

/// Parses a full circuit description.
pub fn parse_circuit(text: &str) -> Result<CircuitDescription, ParseError> {
    let mut lines = text.lines().map(|l| l.trim_end_matches('\r'));

    let unit_count = section_count(&mut lines, "the UNITS header")?;
    let mut units = Vec::with_capacity(unit_count);
    for _ in 0..unit_count {
        let (name, kind) = inner_pair(&mut lines, "a unit declaration")?;
        units.push(UnitDecl { name: name.to_string(), kind: kind.to_string() });
    }

    let input_count = section_count(&mut lines, "the INPUTS header")? as u32;

    let connection_count = section_count(&mut lines, "the CONNECTIONS header")?;
    let mut connections = Vec::with_capacity(connection_count);
    for _ in 0..connection_count {
        let (from, to) = inner_pair(&mut lines, "a connection")?;
        connections.push(Connection {
            from: source_endpoint(from)?,
            to: destination_endpoint(to)?,
        });
    }

    let value_count = section_count(&mut lines, "the VALUES header")?;
    let mut values = Vec::with_capacity(value_count);
    for _ in 0..value_count {
        let (target, value) = inner_pair(&mut lines, "a value assignment")?;
        values.push(ValueAssignment {
            target: value_endpoint(target)?,
            value: value
                .parse()
                .map_err(|_| ParseError::InvalidNumber { text: value.to_string() })?,
        });
    }

    Ok(CircuitDescription { units, input_count, connections, values })
}

/// Reads a `<SECTION>: <count>` header and returns the count.
fn section_count<'a>(
    lines: &mut impl Iterator<Item = &'a str>,
    expected: &'static str,
) -> Result<usize, ParseError> {
    let line = lines.next().ok_or(ParseError::UnexpectedEnd { expected })?;
    let words: Vec<&str> = line.split_whitespace().collect();
    if words.len() != 2 {
        return Err(ParseError::MalformedHeader { line: line.to_string() });
    }
    words[1]
        .parse()
        .map_err(|_| ParseError::MalformedHeader { line: line.to_string() })
}

/// Reads a `<first> <sep> <third>` line and returns the outer tokens. The
/// separator token is not inspected.
fn inner_pair<'a>(
    lines: &mut impl Iterator<Item = &'a str>,
    expected: &'static str,
) -> Result<(&'a str, &'a str), ParseError> {
    let line = lines.next().ok_or(ParseError::UnexpectedEnd { expected })?;
    let words: Vec<&str> = line.split_whitespace().collect();
    if words.len() != 3 {
        return Err(ParseError::MalformedLine { line: line.to_string() });
    }
    Ok((words[0], words[2]))
}

/// Parses the `from` side of a connection: `input/<port>` or
/// `<unit>/<in|out>/<port>`.
fn source_endpoint(text: &str) -> Result<Endpoint, ParseError> {
    let parts: Vec<&str> = text.split('/').collect();
    if parts[0] == EXTERNAL_OWNER && parts.len() >= 2 {
        Ok(Endpoint::external(parts[1]))
    } else if parts[0] != RESULT_OWNER && parts.len() >= 3 {
        Ok(Endpoint {
            owner: parts[0].to_string(),
            direction: direction(parts[1], text)?,
            port: parts[2].to_string(),
        })
    } else {
        Err(ParseError::MalformedEndpoint { text: text.to_string() })
    }
}

/// Parses the `to` side of a connection: `result`, `input/<port>` or
/// `<unit>/<in|out>/<port>`.
fn destination_endpoint(text: &str) -> Result<Endpoint, ParseError> {
    let parts: Vec<&str> = text.split('/').collect();
    if parts[0] == RESULT_OWNER {
        Ok(Endpoint::result())
    } else if parts[0] == EXTERNAL_OWNER && parts.len() >= 2 {
        Ok(Endpoint::external(parts[1]))
    } else if parts.len() >= 3 {
        Ok(Endpoint {
            owner: parts[0].to_string(),
            direction: direction(parts[1], text)?,
            port: parts[2].to_string(),
        })
    } else {
        Err(ParseError::MalformedEndpoint { text: text.to_string() })
    }
}

/// Parses a value-assignment target: `input/<port>`.
fn value_endpoint(text: &str) -> Result<Endpoint, ParseError> {
    let parts: Vec<&str> = text.split('/').collect();
    if parts.len() != 2 {
        return Err(ParseError::MalformedEndpoint { text: text.to_string() });
    }
    Ok(Endpoint {
        owner: parts[0].to_string(),
        direction: Direction::Unported,
        port: parts[1].to_string(),
    })
}

fn direction(text: &str, endpoint: &str) -> Result<Direction, ParseError> {
    match text {
        "in" => Ok(Direction::In),
        "out" => Ok(Direction::Out),
        "" => Ok(Direction::Unported),
        _ => Err(ParseError::MalformedEndpoint { text: endpoint.to_string() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const SAMPLE: &str = "\
UNITS: 2
a := sum
b := negate
INPUTS: 2
CONNECTIONS: 4
input/0 -- a/in/0
input/1 -- a/in/1
a/out/0 -- b/in/0
b/out/0 -- result
VALUES: 2
input/0 := 3
input/1 := -4
";

    #[test]
    fn parses_a_complete_description() {
        let desc = parse_circuit(SAMPLE).unwrap();

        assert_eq!(desc.units.len(), 2);
        assert_eq!(desc.units[0], UnitDecl { name: "a".into(), kind: "sum".into() });
        assert_eq!(desc.input_count, 2);

        assert_eq!(desc.connections.len(), 4);
        assert_eq!(desc.connections[0].from, Endpoint::external("0"));
        assert_eq!(desc.connections[0].to, Endpoint::unit_input("a", "0"));
        assert_eq!(desc.connections[2].from, Endpoint::unit_output("a"));
        assert_eq!(desc.connections[3].to, Endpoint::result());

        assert_eq!(desc.values.len(), 2);
        assert_eq!(desc.values[1].target, Endpoint::external("1"));
        assert_eq!(desc.values[1].value, -4);
    }

    #[rstest]
    #[case("input/0", Endpoint::external("0"))]
    #[case("a/in/1", Endpoint::unit_input("a", "1"))]
    #[case("long_name/out/3", Endpoint { owner: "long_name".into(), direction: Direction::Out, port: "3".into() })]
    fn source_endpoint_forms(#[case] text: &str, #[case] expected: Endpoint) {
        assert_eq!(source_endpoint(text).unwrap(), expected);
    }

    #[rstest]
    #[case("result", Endpoint::result())]
    #[case("b/in/1", Endpoint::unit_input("b", "1"))]
    #[case("input/2", Endpoint::external("2"))]
    fn destination_endpoint_forms(#[case] text: &str, #[case] expected: Endpoint) {
        assert_eq!(destination_endpoint(text).unwrap(), expected);
    }

    #[rstest]
    #[case("result")] // result cannot produce
    #[case("a")] // too few fields for a unit endpoint
    #[case("a/sideways/0")] // unknown direction
    #[case("input")] // external port number missing
    fn bad_source_endpoints_are_rejected(#[case] text: &str) {
        assert!(matches!(
            source_endpoint(text),
            Err(ParseError::MalformedEndpoint { .. })
        ));
    }

    #[test]
    fn truncated_input_reports_what_was_expected() {
        let truncated = "UNITS: 2\na := sum\n";
        let err = parse_circuit(truncated).unwrap_err();
        assert_eq!(err, ParseError::UnexpectedEnd { expected: "a unit declaration" });
    }

    #[test]
    fn malformed_header_is_fatal() {
        let err = parse_circuit("UNITS\n").unwrap_err();
        assert_eq!(err, ParseError::MalformedHeader { line: "UNITS".into() });
    }

    #[test]
    fn non_numeric_value_is_fatal() {
        let text = "\
UNITS: 0
INPUTS: 1
CONNECTIONS: 0
VALUES: 1
input/0 := ten
";
        let err = parse_circuit(text).unwrap_err();
        assert_eq!(err, ParseError::InvalidNumber { text: "ten".into() });
    }

    #[test]
    fn connection_line_with_missing_tokens_is_fatal() {
        let text = "\
UNITS: 0
INPUTS: 1
CONNECTIONS: 1
input/0 a/in/0
";
        let err = parse_circuit(text).unwrap_err();
        assert!(matches!(err, ParseError::MalformedLine { .. }));
    }
}
