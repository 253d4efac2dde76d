// Integration tests exercising gridcell-engine the way an embedding
// program would: through its public API only.

use gridcell_engine::error::EngineError;
use gridcell_engine::{FormulaError, Position, Sheet, Size, Value};

fn pos(label: &str) -> Position {
    Position::from_label(label).unwrap()
}

#[test]
fn simple_arithmetic() {
    let mut sheet = Sheet::new();
    sheet.set_cell(pos("A1"), "=2+3*4").unwrap();
    assert_eq!(sheet.get_value(pos("A1")).unwrap(), Value::Number(14.0));
}

#[test]
fn chained_reference_and_invalidation() {
    let mut sheet = Sheet::new();
    sheet.set_cell(pos("A1"), "1").unwrap();
    sheet.set_cell(pos("A2"), "=A1*2").unwrap();
    sheet.set_cell(pos("A3"), "=A2+1").unwrap();
    assert_eq!(sheet.get_value(pos("A3")).unwrap(), Value::Number(3.0));

    sheet.set_cell(pos("A1"), "10").unwrap();
    assert_eq!(sheet.get_value(pos("A2")).unwrap(), Value::Number(20.0));
    assert_eq!(sheet.get_value(pos("A3")).unwrap(), Value::Number(21.0));
}

#[test]
fn implicit_materialization_of_referenced_cells() {
    let mut sheet = Sheet::new();
    sheet.set_cell(pos("A1"), "=Z9+1").unwrap();
    let z9 = sheet.get_cell(pos("Z9")).unwrap().expect("materialized by the reference");
    assert!(z9.is_empty());
    assert_eq!(z9.text(), "");
    assert_eq!(sheet.get_value(pos("A1")).unwrap(), Value::Number(1.0));
}

#[test]
fn cycles_are_rejected_and_leave_the_sheet_unchanged() {
    let mut sheet = Sheet::new();
    sheet.set_cell(pos("A1"), "=B1").unwrap();
    sheet.set_cell(pos("B1"), "=C1").unwrap();

    let err = sheet.set_cell(pos("C1"), "=A1").unwrap_err();
    assert!(matches!(err, EngineError::CircularDependency(_)));

    // The would-be third link of the cycle was never written.
    assert_eq!(sheet.get_cell(pos("C1")).unwrap().unwrap().text(), "");
    // The existing, valid links still evaluate fine once C1 gets a value.
    sheet.set_cell(pos("C1"), "5").unwrap();
    assert_eq!(sheet.get_value(pos("A1")).unwrap(), Value::Number(5.0));
}

#[test]
fn formula_errors_propagate_through_the_chain() {
    let mut sheet = Sheet::new();
    sheet.set_cell(pos("A1"), "=1/0").unwrap();
    sheet.set_cell(pos("A2"), "=A1+1").unwrap();
    assert_eq!(sheet.get_value(pos("A1")).unwrap(), Value::Error(FormulaError::Div0));
    assert_eq!(sheet.get_value(pos("A2")).unwrap(), Value::Error(FormulaError::Div0));
}

#[test]
fn printable_bounds_shrink_after_clearing_the_last_cell_in_a_row_or_column() {
    let mut sheet = Sheet::new();
    sheet.set_cell(pos("A1"), "x").unwrap();
    sheet.set_cell(pos("C3"), "y").unwrap();
    assert_eq!(sheet.printable_size(), Size { rows: 3, cols: 3 });

    sheet.clear_cell(pos("C3")).unwrap();
    assert_eq!(sheet.printable_size(), Size { rows: 1, cols: 1 });

    sheet.clear_cell(pos("A1")).unwrap();
    assert_eq!(sheet.printable_size(), Size { rows: 0, cols: 0 });
}

#[test]
fn position_label_round_trips() {
    for label in ["A1", "Z1", "AA1", "AZ17", "ZZ16384"] {
        let p = pos(label);
        assert_eq!(p.to_label(), label);
    }
}

#[test]
fn escaped_leading_equals_sign_is_kept_as_text() {
    let mut sheet = Sheet::new();
    sheet.set_cell(pos("A1"), "'=not a formula").unwrap();
    assert_eq!(sheet.get_cell(pos("A1")).unwrap().unwrap().text(), "'=not a formula");
    assert_eq!(sheet.get_value(pos("A1")).unwrap(), Value::Text("=not a formula".to_string()));
}

#[test]
fn reference_to_an_out_of_range_position_is_a_ref_error() {
    let mut sheet = Sheet::new();
    sheet.set_cell(pos("A1"), "=A99999").unwrap();
    assert_eq!(sheet.get_value(pos("A1")).unwrap(), Value::Error(FormulaError::Ref));
}

#[test]
fn invalid_position_is_rejected_at_every_entry_point() {
    let mut sheet = Sheet::new();
    let out_of_range = Position::new(gridcell_engine::ROWS_MAX, 0);
    assert!(matches!(sheet.set_cell(out_of_range, "1"), Err(EngineError::InvalidPosition(_))));
    assert!(matches!(sheet.get_cell(out_of_range), Err(EngineError::InvalidPosition(_))));
    assert!(matches!(sheet.get_value(out_of_range), Err(EngineError::InvalidPosition(_))));
    assert!(matches!(sheet.clear_cell(out_of_range), Err(EngineError::InvalidPosition(_))));
}
