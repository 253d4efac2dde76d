//! gridcell-engine: an in-memory spreadsheet evaluation engine.
//!
//! A [`Sheet`] holds a sparse grid of [`Cell`]s addressed by [`Position`].
//! A cell is empty, plain text, or a formula; formulas reference other
//! cells by position, and the sheet keeps a dependency graph so that
//! editing one cell lazily and correctly invalidates every cell whose
//! cached value depended on it, while rejecting edits that would introduce
//! a circular dependency before they take effect.
//!
//! No persistence, no undo, no multi-sheet workbooks, no concurrent
//! mutation — one sheet, one mutator, evaluated synchronously on demand.

pub mod cell;
pub mod error;
pub mod formula;
pub mod position;
pub mod sheet;

pub use cell::{Cell, CellKind, Value, ESCAPE_SIGN, FORMULA_SIGN};
pub use error::{EngineError, FormulaError};
pub use position::{Position, Size, COLS_MAX, ROWS_MAX};
pub use sheet::Sheet;
