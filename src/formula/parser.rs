// gridcell-engine/src/formula/parser.rs
// Where the teacher's `parser.rs` stopped (grammar declared, never written):
// this is the pest grammar wired up to actually build an AST.

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use super::ast::{BinaryOp, Expr, UnaryOp};
use crate::error::EngineError;
use crate::position::Position;

#[derive(Parser)]
#[grammar = "formula/grammar.pest"]
struct FormulaGrammar;

pub fn parse(text: &str) -> Result<Expr, EngineError> {
    let mut pairs = FormulaGrammar::parse(Rule::formula, text)
        .map_err(|e| EngineError::ParseError(e.to_string()))?;
    let formula_pair = pairs.next().expect("formula rule always produces a pair");
    let expr_pair = formula_pair
        .into_inner()
        .next()
        .expect("formula := expr ~ EOI");
    build_expr(expr_pair)
}

fn build_expr(pair: Pair<Rule>) -> Result<Expr, EngineError> {
    let mut inner = pair.into_inner();
    let mut node = build_term(inner.next().expect("expr := term (add_op term)*"))?;
    while let Some(op_pair) = inner.next() {
        let op = match op_pair.as_str() {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            other => unreachable!("unexpected add_op: {other}"),
        };
        let rhs = build_term(inner.next().expect("add_op always followed by a term"))?;
        node = Expr::Binary { op, left: Box::new(node), right: Box::new(rhs) };
    }
    Ok(node)
}

fn build_term(pair: Pair<Rule>) -> Result<Expr, EngineError> {
    let mut inner = pair.into_inner();
    let mut node = build_factor(inner.next().expect("term := factor (mul_op factor)*"))?;
    while let Some(op_pair) = inner.next() {
        let op = match op_pair.as_str() {
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            other => unreachable!("unexpected mul_op: {other}"),
        };
        let rhs = build_factor(inner.next().expect("mul_op always followed by a factor"))?;
        node = Expr::Binary { op, left: Box::new(node), right: Box::new(rhs) };
    }
    Ok(node)
}

fn build_factor(pair: Pair<Rule>) -> Result<Expr, EngineError> {
    let mut inner = pair.into_inner();
    let first = inner.next().expect("factor := unary_op? primary");
    match first.as_rule() {
        Rule::unary_op => {
            let op = match first.as_str() {
                "+" => UnaryOp::Pos,
                "-" => UnaryOp::Neg,
                other => unreachable!("unexpected unary_op: {other}"),
            };
            let primary = inner.next().expect("unary_op always followed by a primary");
            Ok(Expr::Unary { op, operand: Box::new(build_primary(primary)?) })
        }
        Rule::primary => build_primary(first),
        other => unreachable!("unexpected factor child: {other:?}"),
    }
}

fn build_primary(pair: Pair<Rule>) -> Result<Expr, EngineError> {
    let inner = pair.into_inner().next().expect("primary always wraps exactly one child");
    match inner.as_rule() {
        Rule::number => {
            let n: f64 = inner
                .as_str()
                .parse()
                .map_err(|_| EngineError::ParseError(format!("invalid number literal: {}", inner.as_str())))?;
            Ok(Expr::Number(n))
        }
        Rule::reference => Ok(Expr::Reference(Position::from_label(inner.as_str())?)),
        Rule::expr => build_expr(inner),
        other => unreachable!("unexpected primary child: {other:?}"),
    }
}
