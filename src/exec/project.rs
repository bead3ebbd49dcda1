//! Phase 6(c), 7, 8, 9 of §4.4: plain projection, DISTINCT, ORDER BY, and
//! LIMIT/OFFSET.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::ast::{Expression, Literal, OrderItem, SelectItem};
use crate::context::ExecutionContext;
use crate::error::EngineError;
use crate::value::{sql_order_cmp, Row, Value};

use super::eval::eval_value;

/// Phase 6(c): evaluate every select item against every row, independent of
/// window/aggregate handling.
pub fn apply_projection(
    ctx: &mut ExecutionContext,
    rows: &[Row],
    select_list: &[SelectItem],
) -> Result<Vec<Row>, EngineError> {
    rows.iter()
        .map(|row| project_one(ctx, row, select_list))
        .collect()
}

pub fn project_one(
    ctx: &mut ExecutionContext,
    row: &Row,
    select_list: &[SelectItem],
) -> Result<Row, EngineError> {
    let mut out = Row::new();
    for item in select_list {
        if is_wildcard(&item.expr) {
            for (key, value) in row {
                out.insert(key.clone(), value.clone());
            }
            continue;
        }
        let value = eval_value(ctx, row, &item.expr)?;
        let name = item
            .alias
            .clone()
            .unwrap_or_else(|| default_projection_name(&item.expr));
        out.insert(name, value);
    }
    Ok(out)
}

/// `*` as a bare select item means "every column of the row", not a column
/// literally named `*`; `COUNT(*)`/`OVER (...)`'s own `*` sentinel is a
/// separate case handled in aggregate.rs/window.rs, not here.
fn is_wildcard(expr: &Expression) -> bool {
    matches!(expr, Expression::Column(col) if col.0 == "*")
}

/// A stable, deterministic default column name for an unaliased select item.
/// Not part of the engine's documented contract — callers that care about
/// exact default names should alias explicitly.
pub fn default_projection_name(expr: &Expression) -> String {
    match expr {
        Expression::Column(col) => col.0.clone(),
        Expression::Literal(Literal::Int(i)) => i.to_string(),
        Expression::Literal(Literal::Float(f)) => f.to_string(),
        Expression::Literal(Literal::Str(s)) => s.clone(),
        Expression::Literal(Literal::Bool(b)) => b.to_string(),
        Expression::Literal(Literal::Null) => "null".to_string(),
        Expression::FunctionCall(name, _) => format!("{}(...)", name.to_lowercase()),
        Expression::AggregateExpr(name, Some(col)) => {
            format!("{}({})", name.to_lowercase(), col.0)
        }
        Expression::AggregateExpr(name, None) => format!("{}(*)", name.to_lowercase()),
        Expression::WindowExpr(name, _, _) => format!("{}()", name.to_lowercase()),
        Expression::CaseExpr(..) => "case".to_string(),
        Expression::ScalarSubqueryExpr(..) => "subquery".to_string(),
        _ => "expr".to_string(),
    }
}

/// Phase 7: dedup by full structural equality over the projected row.
pub fn apply_distinct(rows: Vec<Row>) -> Vec<Row> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        if seen.insert(row_repr(&row)) {
            out.push(row);
        }
    }
    out
}

fn row_repr(row: &Row) -> String {
    row.iter()
        .map(|(k, v)| format!("{k}\u{0}{v:?}"))
        .collect::<Vec<_>>()
        .join("\u{1}")
}

/// Phase 8: stable multi-key sort; NULLS FIRST in ASC, NULLS LAST in DESC
/// (§4.4 step 8).
pub fn apply_order_by(mut rows: Vec<Row>, order_by: &[OrderItem]) -> Vec<Row> {
    rows.sort_by(|a, b| {
        for item in order_by {
            let va = a.get(&item.column).unwrap_or(&Value::Null);
            let vb = b.get(&item.column).unwrap_or(&Value::Null);
            let ord = sql_order_cmp(va, vb, item.descending);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
    rows
}

/// Phase 9: offset then limit, both clamped to non-negative bounds (the
/// parser already rejects negative literals, §4.2).
pub fn apply_limit_offset(rows: Vec<Row>, limit: Option<i64>, offset: Option<i64>) -> Vec<Row> {
    let start = offset.unwrap_or(0).max(0) as usize;
    let start = start.min(rows.len());
    let mut rows = rows[start..].to_vec();
    if let Some(limit) = limit {
        let limit = limit.max(0) as usize;
        rows.truncate(limit);
    }
    rows
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::ast::ColumnRef;
    use crate::reader::InMemoryReader;
    use crate::registry::FunctionRegistry;

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    fn test_ctx() -> ExecutionContext {
        ExecutionContext::new(Arc::new(InMemoryReader::new()), Arc::new(FunctionRegistry::with_builtins()))
    }

    #[test]
    fn wildcard_select_item_expands_to_every_column() {
        let mut ctx = test_ctx();
        let input = row(&[("id", Value::Int(1)), ("name", Value::Str("alice".into()))]);
        let select_list = vec![SelectItem { expr: Expression::Column(ColumnRef("*".into())), alias: None }];
        let out = project_one(&mut ctx, &input, &select_list).unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn wildcard_alongside_explicit_column_keeps_both() {
        let mut ctx = test_ctx();
        let input = row(&[("id", Value::Int(1)), ("name", Value::Str("alice".into()))]);
        let select_list = vec![
            SelectItem { expr: Expression::Column(ColumnRef("*".into())), alias: None },
            SelectItem {
                expr: Expression::Column(ColumnRef("name".into())),
                alias: Some("n".into()),
            },
        ];
        let out = project_one(&mut ctx, &input, &select_list).unwrap();
        assert_eq!(out.get("id"), Some(&Value::Int(1)));
        assert_eq!(out.get("n"), Some(&Value::Str("alice".into())));
    }

    #[test]
    fn distinct_keeps_first_occurrence_only() {
        let rows = vec![
            row(&[("a", Value::Int(1))]),
            row(&[("a", Value::Int(1))]),
            row(&[("a", Value::Int(2))]),
        ];
        assert_eq!(apply_distinct(rows).len(), 2);
    }

    #[test]
    fn order_by_puts_nulls_first_ascending() {
        let rows = vec![
            row(&[("a", Value::Int(1))]),
            row(&[("a", Value::Null)]),
            row(&[("a", Value::Int(0))]),
        ];
        let sorted = apply_order_by(
            rows,
            &[OrderItem { column: "a".into(), descending: false }],
        );
        assert_eq!(sorted[0].get("a"), Some(&Value::Null));
    }

    #[test]
    fn limit_offset_clamp_to_available_rows() {
        let rows: Vec<Row> = (0..3).map(|i| row(&[("a", Value::Int(i))])).collect();
        let out = apply_limit_offset(rows, Some(10), Some(1));
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn default_name_for_aggregate_with_column() {
        let expr = Expression::AggregateExpr("COUNT".into(), Some(ColumnRef("id".into())));
        assert_eq!(default_projection_name(&expr), "count(id)");
    }
}
