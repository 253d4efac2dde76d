// gridcell-engine/src/sheet.rs
// `Sheet`: owns every cell and the referenced/dependent edges between them,
// and hosts every algorithm that needs to see more than one cell at a time
// (cycle detection, cache invalidation, memoized evaluation) — the shape
// `Workbook::set_cell_value`/`recalculate` already used in the teacher,
// generalized to a single sheet and a real dependency graph.

use std::collections::HashSet;
use std::io::{self, Write};

use hashbrown::HashMap;
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;

use crate::cell::{Cell, CellKind, Value, ESCAPE_SIGN};
use crate::error::EngineError;
use crate::formula::LookupValue;
use crate::position::{Position, Size};

/// A single addressable grid of cells (`spec.md` §3/§4.4).
///
/// Edges are keyed by `Position`, not by a handle to a `Cell`, and live in
/// `graph` rather than inside the cells they connect. That's what lets a
/// `ClearCell` remove a cell's storage entry without leaving some other
/// cell's dependency edge dangling on a freed object the way the C++
/// original's raw `Cell*` sets would: the position stays a valid graph node
/// (with whatever edges still point at it) even while the `Cell` itself is
/// briefly or permanently absent from `cells`.
#[derive(Debug, Default)]
pub struct Sheet {
    cells: HashMap<Position, Cell>,
    /// Edge `a -> b`: the cell at `a`'s formula references `b`.
    graph: DiGraphMap<Position, ()>,
    size: Size,
}

impl Sheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The bounding box `spec.md` §4.4 calls `GetPrintableSize`.
    pub fn printable_size(&self) -> Size {
        self.size
    }

    /// `None` if the position has never been populated, or was cleared.
    pub fn get_cell(&self, pos: Position) -> Result<Option<&Cell>, EngineError> {
        if !pos.is_valid() {
            return Err(EngineError::InvalidPosition(pos.to_label()));
        }
        Ok(self.cells.get(&pos))
    }

    /// Set a cell's raw text, re-resolving its kind, re-checking for
    /// cycles, and re-linking its edges — `spec.md` §4.3's atomic update,
    /// steps 1–7.
    pub fn set_cell(&mut self, pos: Position, text: &str) -> Result<(), EngineError> {
        if !pos.is_valid() {
            return Err(EngineError::InvalidPosition(pos.to_label()));
        }

        // 1. Short-circuit if nothing changed.
        let current_text = self.cells.get(&pos).map(Cell::text).unwrap_or_default();
        if text == current_text {
            return Ok(());
        }

        // 2. Resolve the prospective kind before touching anything.
        let new_kind = CellKind::resolve(text)?;
        let new_referenced: Vec<Position> = new_kind.referenced().to_vec();

        // 3. Reject before mutating if this would create a cycle.
        self.reject_if_circular(pos, &new_referenced)?;

        log::debug!("set_cell {pos}: {current_text:?} -> {text:?}");

        // 4. Invalidate the cache this cell and its dependents held.
        self.invalidate_cascade(pos);
        // 5. Detach from the cells the old kind referenced.
        self.detach(pos);
        // 6. Attach to the cells the new kind references, materializing
        //    absent ones as Empty.
        self.attach(pos, &new_referenced);

        // 7. Commit.
        self.cells.entry(pos).or_insert_with(Cell::new_empty).set_kind(new_kind);
        self.graph.add_node(pos);
        self.size.rows = self.size.rows.max(pos.row + 1);
        self.size.cols = self.size.cols.max(pos.col + 1);

        Ok(())
    }

    /// Equivalent to `set_cell(pos, "")`, then drops the storage entry
    /// entirely (`spec.md` §4.4). A no-op if the position was never
    /// populated.
    pub fn clear_cell(&mut self, pos: Position) -> Result<(), EngineError> {
        if !pos.is_valid() {
            return Err(EngineError::InvalidPosition(pos.to_label()));
        }
        if !self.cells.contains_key(&pos) {
            return Ok(());
        }
        self.set_cell(pos, "")?;
        self.cells.remove(&pos);
        log::debug!("clear_cell {pos}");
        self.shrink_after_removal(pos);
        Ok(())
    }

    /// The memoized evaluated value, computing (and caching) it on demand.
    pub fn get_value(&mut self, pos: Position) -> Result<Value, EngineError> {
        if !pos.is_valid() {
            return Err(EngineError::InvalidPosition(pos.to_label()));
        }
        Ok(self.value_at(pos))
    }

    /// Tab-separated values, one row per line, bounded by `printable_size`.
    pub fn print_values(&mut self, out: &mut impl Write) -> io::Result<()> {
        for row in 0..self.size.rows {
            for col in 0..self.size.cols {
                if col > 0 {
                    write!(out, "\t")?;
                }
                let pos = Position::new(row, col);
                if self.cells.contains_key(&pos) {
                    write!(out, "{}", self.value_at(pos))?;
                }
            }
            writeln!(out)?;
        }
        Ok(())
    }

    /// Tab-separated raw texts, one row per line, bounded by `printable_size`.
    pub fn print_texts(&self, out: &mut impl Write) -> io::Result<()> {
        for row in 0..self.size.rows {
            for col in 0..self.size.cols {
                if col > 0 {
                    write!(out, "\t")?;
                }
                if let Some(cell) = self.cells.get(&Position::new(row, col)) {
                    write!(out, "{}", cell.text())?;
                }
            }
            writeln!(out)?;
        }
        Ok(())
    }

    fn value_at(&mut self, pos: Position) -> Value {
        match self.cells.get(&pos) {
            None => return Value::Text(String::new()),
            Some(cell) => {
                if let Some(v) = cell.cached_value() {
                    return v.clone();
                }
            }
        }

        let kind = self.cells.get(&pos).expect("checked above").kind().clone();
        let value = match kind {
            CellKind::Empty => Value::Text(String::new()),
            CellKind::Text(s) => match s.strip_prefix(ESCAPE_SIGN) {
                Some(stripped) => Value::Text(stripped.to_string()),
                None => Value::Text(s),
            },
            CellKind::Formula(formula) => match formula.evaluate(|p| self.lookup_for_formula(p)) {
                Ok(n) => Value::Number(n),
                Err(e) => Value::Error(e),
            },
        };

        if let Some(cell) = self.cells.get_mut(&pos) {
            cell.set_cached(value.clone());
        }
        value
    }

    fn lookup_for_formula(&mut self, pos: Position) -> LookupValue {
        match self.value_at(pos) {
            Value::Number(n) => LookupValue::Number(n),
            Value::Text(s) => LookupValue::Text(s),
            Value::Error(e) => LookupValue::Error(e),
        }
    }

    /// DFS over the prospective referenced set plus the existing graph,
    /// per-call memoized, same as the original's `ThrowIfCircularDependency`
    /// / `spec.md` §4.5.
    fn reject_if_circular(&self, target: Position, candidates: &[Position]) -> Result<(), EngineError> {
        let mut visited = HashSet::new();
        let mut stack: Vec<Position> = candidates.iter().copied().filter(Position::is_valid).collect();
        while let Some(p) = stack.pop() {
            if p == target {
                return Err(EngineError::CircularDependency(target.to_label()));
            }
            if !visited.insert(p) {
                continue;
            }
            stack.extend(self.graph.neighbors_directed(p, Direction::Outgoing));
        }
        Ok(())
    }

    fn invalidate_cascade(&mut self, pos: Position) {
        let mut stack = vec![pos];
        while let Some(p) = stack.pop() {
            let had_cache = self.cells.get_mut(&p).map(Cell::invalidate).unwrap_or(false);
            if had_cache {
                log::trace!("invalidated {p}");
                stack.extend(self.graph.neighbors_directed(p, Direction::Incoming));
            }
        }
    }

    fn detach(&mut self, pos: Position) {
        let old: Vec<Position> = self.graph.neighbors_directed(pos, Direction::Outgoing).collect();
        for r in old {
            self.graph.remove_edge(pos, r);
        }
    }

    fn attach(&mut self, pos: Position, referenced: &[Position]) {
        self.graph.add_node(pos);
        for &r in referenced {
            if !r.is_valid() {
                // `ParsedFormula::evaluate` surfaces `FormulaError::Ref` for
                // these directly; there's no cell to materialize or link.
                continue;
            }
            if !self.cells.contains_key(&r) {
                log::trace!("materializing {r} (referenced by {pos})");
                self.cells.insert(r, Cell::new_empty());
            }
            self.graph.add_edge(pos, r, ());
        }
    }

    fn shrink_after_removal(&mut self, removed: Position) {
        // Materialized-but-never-set cells (e.g. an empty `Z9` pulled into
        // existence by some other cell's formula) sit in `cells` without
        // ever having expanded `size`; they must not expand it on shrink
        // either — the bounding box tracks non-empty cells only (`spec.md` §3).
        if removed.row + 1 == self.size.rows {
            self.size.rows = self
                .cells
                .iter()
                .filter(|(_, c)| !c.is_empty())
                .map(|(p, _)| p.row + 1)
                .max()
                .unwrap_or(0);
        }
        if removed.col + 1 == self.size.cols {
            self.size.cols = self
                .cells
                .iter()
                .filter(|(_, c)| !c.is_empty())
                .map(|(p, _)| p.col + 1)
                .max()
                .unwrap_or(0);
        }
    }
}
