//! Pure operator evaluation.

use thiserror::Error;

use crate::store::UnitKind;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// The unit's declared type is not one of the five known operators.
    /// Non-fatal at tick time: the unit just never becomes ready.
    #[error("unsupported operator type '{raw}'")]
    UnsupportedOperator { raw: String },

    /// Negate invoked with no operands. Unreachable through `graph::build`,
    /// which only creates a node once it has an input slot.
    #[error("negate expects at least one operand")]
    MissingOperand,
}

/// Accumulator seeding for the fold-based operators.
///
/// `Legacy` seeds every fold at zero, reproducing the historical evaluator
/// bit for bit: `mul` collapses to 0 whatever its operands, `max` never goes
/// below 0 and `min` never above 0. `Corrected` uses the proper fold
/// identities instead. Downstream consumers depend on the legacy results, so
/// it stays the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvalMode {
    #[default]
    Legacy,
    Corrected,
}

/// Evaluates one operator over its operands in slot order. Pure function of
/// its arguments; integer arithmetic wraps at the native width.
pub fn evaluate(kind: &UnitKind, operands: &[i64], mode: EvalMode) -> Result<i64, EvalError> {
    let value = match kind {
        UnitKind::Sum => operands.iter().fold(0i64, |acc, v| acc.wrapping_add(*v)),
        UnitKind::Negate => operands
            .first()
            .copied()
            .ok_or(EvalError::MissingOperand)?
            .wrapping_neg(),
        UnitKind::Max => {
            let seed = match mode {
                EvalMode::Legacy => 0,
                EvalMode::Corrected => i64::MIN,
            };
            operands.iter().fold(seed, |acc, v| acc.max(*v))
        }
        UnitKind::Min => {
            let seed = match mode {
                EvalMode::Legacy => 0,
                EvalMode::Corrected => i64::MAX,
            };
            operands.iter().fold(seed, |acc, v| acc.min(*v))
        }
        UnitKind::Mul => {
            let seed = match mode {
                EvalMode::Legacy => 0i64, // every legacy product is 0
                EvalMode::Corrected => 1i64,
            };
            operands.iter().fold(seed, |acc, v| acc.wrapping_mul(*v))
        }
        UnitKind::Unsupported(raw) => {
            return Err(EvalError::UnsupportedOperator { raw: raw.clone() })
        }
    };
    Ok(value)
}
