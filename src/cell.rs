// gridcell-engine/src/cell.rs
// `Cell`: the tagged kind, its memoized value, and the dependency edges a
// `Sheet` maintains on its behalf. See `sheet.rs` for why the edges and the
// graph-walking logic live there instead of here — a literal port of the
// C++ original's `Cell` holding a back-reference to its `Sheet` doesn't
// translate to safe Rust once `Cell` lives inside the very map it would
// need to borrow.

use std::fmt;

use crate::error::FormulaError;
use crate::formula::ParsedFormula;
use crate::position::Position;

/// Marks a cell's raw text as a formula (`spec.md` §6.4).
pub const FORMULA_SIGN: char = '=';
/// Escapes a leading `FORMULA_SIGN` so the rest is kept as literal text.
pub const ESCAPE_SIGN: char = '\'';

/// A cell's computed value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Error(FormulaError),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Error(e) => write!(f, "{e}"),
        }
    }
}

/// The tagged representation a cell holds (`spec.md` §3).
#[derive(Debug, Clone, PartialEq)]
pub enum CellKind {
    Empty,
    Text(String),
    Formula(ParsedFormula),
}

impl CellKind {
    /// Resolve raw input text into a kind (`spec.md` §4.3's kind-resolution
    /// rules): empty text is `Empty`; text starting with `FORMULA_SIGN` and
    /// at least one more character is a formula; anything else is `Text`
    /// verbatim (including a leading `ESCAPE_SIGN`, stripped only when the
    /// value is read, not when it's stored).
    pub(crate) fn resolve(text: &str) -> Result<CellKind, crate::error::EngineError> {
        if text.is_empty() {
            return Ok(CellKind::Empty);
        }
        if text.len() > FORMULA_SIGN.len_utf8() && text.starts_with(FORMULA_SIGN) {
            let parsed = ParsedFormula::parse(&text[FORMULA_SIGN.len_utf8()..])?;
            return Ok(CellKind::Formula(parsed));
        }
        Ok(CellKind::Text(text.to_string()))
    }

    pub(crate) fn text(&self) -> String {
        match self {
            CellKind::Empty => String::new(),
            CellKind::Text(s) => s.clone(),
            CellKind::Formula(f) => format!("{FORMULA_SIGN}{}", f.expression()),
        }
    }

    pub(crate) fn referenced(&self) -> &[Position] {
        match self {
            CellKind::Formula(f) => f.referenced_positions(),
            CellKind::Empty | CellKind::Text(_) => &[],
        }
    }
}

/// One addressable cell: its kind and its memoized value. Edge bookkeeping
/// (who it references, who references it) and the algorithms that walk
/// those edges belong to the owning `Sheet`.
#[derive(Debug, Clone, Default)]
pub struct Cell {
    kind: CellKind,
    cached: Option<Value>,
}

impl Default for CellKind {
    fn default() -> Self {
        CellKind::Empty
    }
}

impl Cell {
    pub(crate) fn new_empty() -> Self {
        Cell::default()
    }

    pub fn kind(&self) -> &CellKind {
        &self.kind
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.kind, CellKind::Empty)
    }

    pub fn text(&self) -> String {
        self.kind.text()
    }

    pub fn referenced_cells(&self) -> &[Position] {
        self.kind.referenced()
    }

    pub fn cached_value(&self) -> Option<&Value> {
        self.cached.as_ref()
    }

    pub(crate) fn set_kind(&mut self, kind: CellKind) {
        self.kind = kind;
    }

    pub(crate) fn set_cached(&mut self, value: Value) {
        self.cached = Some(value);
    }

    /// Clears the cache; returns whether it held a value. An already-absent
    /// cache is the fixpoint of cache invalidation (`spec.md` §4.5) — the
    /// caller stops walking dependents when this returns `false`.
    pub(crate) fn invalidate(&mut self) -> bool {
        self.cached.take().is_some()
    }
}
