//! Expression evaluation (§4.2's `Expression` sum type, §4.8, §4.9).
//!
//! Two entry points: [`eval_value`] for anything that produces a `Value`
//! (projection, function arguments, CASE results) and [`eval_bool`] for the
//! boolean tree WHERE/HAVING/ON conditions parse into. Comparisons flatten
//! three-valued logic to two-valued (O2): a `NULL` operand makes every
//! comparison `false`, never "unknown".

use std::cmp::Ordering;

use crate::ast::{BoolOp, ColumnRef, ComparisonOp, Expression, Literal, Query};
use crate::context::ExecutionContext;
use crate::error::{EngineError, EvalError};
use crate::value::{Row, Value};

fn literal_to_value(lit: &Literal) -> Value {
    match lit {
        Literal::Null => Value::Null,
        Literal::Int(i) => Value::Int(*i),
        Literal::Float(f) => Value::Float(*f),
        Literal::Str(s) => Value::Str(s.clone()),
        Literal::Bool(b) => Value::Bool(*b),
    }
}

pub fn column_value(row: &Row, column: &ColumnRef) -> Value {
    row.get(&column.0).cloned().unwrap_or(Value::Null)
}

/// Evaluate a value-producing expression against one row. `AggregateExpr`
/// and `WindowExpr` are resolved by their own phases before projection
/// reaches here (I3); encountering one directly is a defect upstream.
pub fn eval_value(
    ctx: &mut ExecutionContext,
    row: &Row,
    expr: &Expression,
) -> Result<Value, EngineError> {
    match expr {
        Expression::Literal(lit) => Ok(literal_to_value(lit)),
        Expression::Column(col) => Ok(column_value(row, col)),
        Expression::FunctionCall(name, args) => {
            let values = args
                .iter()
                .map(|a| eval_value(ctx, row, a))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ctx.registry.call(name, &values)?)
        }
        Expression::CaseExpr(whens, else_clause) => {
            for (cond, result) in whens {
                if eval_bool(ctx, row, cond)? {
                    return eval_value(ctx, row, result);
                }
            }
            match else_clause {
                Some(e) => eval_value(ctx, row, e),
                None => Ok(Value::Null),
            }
        }
        Expression::ScalarSubqueryExpr(node_id, query) => {
            eval_scalar_subquery(ctx, *node_id, query)
        }
        Expression::AggregateExpr(..) | Expression::WindowExpr(..) => {
            Err(EvalError::TypeMismatch(
                "aggregate/window expression evaluated outside its phase".into(),
            )
            .into())
        }
        other => Err(EvalError::TypeMismatch(format!(
            "{other:?} is not a value expression"
        ))
        .into()),
    }
}

/// Evaluate the boolean tree used by WHERE / HAVING / JOIN ON.
pub fn eval_bool(
    ctx: &mut ExecutionContext,
    row: &Row,
    expr: &Expression,
) -> Result<bool, EngineError> {
    match expr {
        Expression::BinaryExpr(BoolOp::And, l, r) => {
            Ok(eval_bool(ctx, row, l)? && eval_bool(ctx, row, r)?)
        }
        Expression::BinaryExpr(BoolOp::Or, l, r) => {
            Ok(eval_bool(ctx, row, l)? || eval_bool(ctx, row, r)?)
        }
        Expression::ComparisonExpr(col, op, lit) => {
            let left = column_value(row, col);
            let right = literal_to_value(lit);
            Ok(compare(&left, *op, &right))
        }
        Expression::ColumnComparisonExpr(left_col, op, right_col) => {
            let left = column_value(row, left_col);
            let right = column_value(row, right_col);
            Ok(compare(&left, *op, &right))
        }
        Expression::InExpr(col, values, negate) => {
            let left = column_value(row, col);
            let found = values.iter().any(|v| left.sql_eq(&literal_to_value(v)));
            Ok(found != *negate)
        }
        Expression::InSubqueryExpr(col, query, negate) => {
            let left = column_value(row, col);
            let rows = super::execute_subquery(ctx, query)?;
            for r in &rows {
                if r.len() != 1 {
                    return Err(EvalError::InSubqueryNotSingleColumn.into());
                }
            }
            let found = rows
                .iter()
                .any(|r| left.sql_eq(r.values().next().unwrap_or(&Value::Null)));
            Ok(found != *negate)
        }
        Expression::LikeExpr(col, pattern, negate) => {
            let left = column_value(row, col);
            let matched = match &left {
                Value::Str(s) => like_match(s, pattern),
                _ => false,
            };
            Ok(matched != *negate)
        }
        Expression::BetweenExpr(col, low, high, negate) => {
            let left = column_value(row, col);
            let low = literal_to_value(low);
            let high = literal_to_value(high);
            let in_range = compare(&left, ComparisonOp::Ge, &low) && compare(&left, ComparisonOp::Le, &high);
            Ok(in_range != *negate)
        }
        Expression::IsNullExpr(col, negate) => {
            let is_null = column_value(row, col).is_null();
            Ok(is_null != *negate)
        }
        Expression::ExistsExpr(query, negate) => {
            let rows = super::execute_subquery(ctx, query)?;
            Ok(!rows.is_empty() != *negate)
        }
        other => Err(EvalError::TypeMismatch(format!("{other:?} is not a boolean expression")).into()),
    }
}

/// Three-valued comparisons flatten to `false` on either side being null
/// (O2): this is a deliberate, test-visible choice, not standard SQL.
fn compare(left: &Value, op: ComparisonOp, right: &Value) -> bool {
    match left.partial_cmp_sql(right) {
        None => false,
        Some(ord) => match op {
            ComparisonOp::Eq => ord == Ordering::Equal,
            ComparisonOp::NotEq => ord != Ordering::Equal,
            ComparisonOp::Lt => ord == Ordering::Less,
            ComparisonOp::Gt => ord == Ordering::Greater,
            ComparisonOp::Le => ord != Ordering::Greater,
            ComparisonOp::Ge => ord != Ordering::Less,
        },
    }
}

/// `%` matches any run of bytes, `_` matches exactly one; anchored at both
/// ends; no escape character (§4.9).
fn like_match(text: &str, pattern: &str) -> bool {
    let t = text.as_bytes();
    let p = pattern.as_bytes();
    like_match_bytes(t, p)
}

fn like_match_bytes(t: &[u8], p: &[u8]) -> bool {
    match p.first() {
        None => t.is_empty(),
        Some(b'%') => {
            like_match_bytes(t, &p[1..]) || (!t.is_empty() && like_match_bytes(&t[1..], p))
        }
        Some(b'_') => !t.is_empty() && like_match_bytes(&t[1..], &p[1..]),
        Some(c) => !t.is_empty() && t[0] == *c && like_match_bytes(&t[1..], &p[1..]),
    }
}

/// Scalar subqueries (§4.8): must yield 0 or 1 row and exactly one column;
/// cached per node id so repeated references within the same context don't
/// re-execute (S3, P7).
fn eval_scalar_subquery(
    ctx: &mut ExecutionContext,
    node_id: crate::ast::NodeId,
    query: &Query,
) -> Result<Value, EngineError> {
    if let Some(cached) = ctx.cached_scalar_subquery(node_id) {
        return Ok(cached.unwrap_or(Value::Null));
    }

    let rows = super::execute_subquery(ctx, query)?;
    let value = match rows.len() {
        0 => None,
        1 => {
            let row = &rows[0];
            if row.len() != 1 {
                return Err(EvalError::ScalarSubqueryMultipleColumns.into());
            }
            Some(row.values().next().unwrap().clone())
        }
        _ => return Err(EvalError::ScalarSubqueryMultipleRows.into()),
    };

    ctx.cache_scalar_subquery(node_id, value.clone());
    Ok(value.unwrap_or(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_percent_matches_any_run() {
        assert!(like_match("hello world", "hello%"));
        assert!(like_match("hello world", "%world"));
        assert!(!like_match("hello world", "%xyz%"));
    }

    #[test]
    fn like_underscore_matches_one_byte() {
        assert!(like_match("cat", "c_t"));
        assert!(!like_match("ct", "c_t"));
    }

    #[test]
    fn null_comparison_is_false_both_directions() {
        assert!(!compare(&Value::Null, ComparisonOp::Eq, &Value::Int(1)));
        assert!(!compare(&Value::Null, ComparisonOp::NotEq, &Value::Int(1)));
    }
}
