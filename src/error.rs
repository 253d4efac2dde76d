// gridcell-engine/src/error.rs
use thiserror::Error;

/// Errors raised synchronously at the call that triggered them; the sheet
/// is left unchanged (`spec.md` §7).
///
/// Evaluation failures are not part of this type — see [`FormulaError`],
/// which is data stored in a cell's value, never thrown.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("position out of range: {0}")]
    InvalidPosition(String),

    #[error("formula parse error: {0}")]
    ParseError(String),

    #[error("circular dependency detected through {0}")]
    CircularDependency(String),
}

/// A formula evaluated to an undefined result. Stored as a cell's value,
/// never thrown (`spec.md` §7's rendering column).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormulaError {
    #[error("#REF!")]
    Ref,

    #[error("#VALUE!")]
    Value,

    #[error("#DIV/0!")]
    Div0,
}
