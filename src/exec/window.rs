//! Phase 6(a) of §4.4: window functions (§4.6).
//!
//! Window expressions are computed over the whole input first; the final
//! output then projects the select list in the input's original row order
//! (window `ORDER BY`/`PARTITION BY` only affect the computation, never the
//! output order — that's §4.4 phase 8's job, applied later if present).

use indexmap::IndexMap;

use crate::ast::{Expression, FrameBound, FrameType, OrderItem, SelectItem, WindowSpec};
use crate::context::ExecutionContext;
use crate::error::{EngineError, EvalError};
use crate::value::{sql_order_cmp, Row, Value};

use super::aggregate::aggregate_window_value;
use super::eval::eval_value;
use super::project::default_projection_name;

pub fn apply_window_projection(
    ctx: &mut ExecutionContext,
    rows: Vec<Row>,
    select_list: &[SelectItem],
) -> Result<Vec<Row>, EngineError> {
    let mut window_columns: Vec<Option<Vec<Value>>> = vec![None; select_list.len()];
    for (i, item) in select_list.iter().enumerate() {
        if let Expression::WindowExpr(name, args, spec) = &item.expr {
            window_columns[i] = Some(compute_window_function(ctx, &rows, name, args, spec)?);
        }
    }

    let mut out = Vec::with_capacity(rows.len());
    for (row_idx, row) in rows.iter().enumerate() {
        let mut projected = Row::new();
        for (i, item) in select_list.iter().enumerate() {
            if matches!(&item.expr, Expression::Column(col) if col.0 == "*") {
                for (key, value) in row {
                    projected.insert(key.clone(), value.clone());
                }
                continue;
            }
            let value = match &window_columns[i] {
                Some(values) => values[row_idx].clone(),
                None => eval_value(ctx, row, &item.expr)?,
            };
            let name = item
                .alias
                .clone()
                .unwrap_or_else(|| default_projection_name(&item.expr));
            projected.insert(name, value);
        }
        out.push(projected);
    }
    Ok(out)
}

fn partition_key(row: &Row, partition_by: &[String]) -> Vec<String> {
    partition_by
        .iter()
        .map(|col| match row.get(col) {
            Some(v) => format!("{v:?}"),
            None => "null:".to_string(),
        })
        .collect()
}

fn order_partition(rows: &[Row], indices: &mut [usize], order_by: &[OrderItem]) {
    indices.sort_by(|&a, &b| {
        for item in order_by {
            let va = rows[a].get(&item.column).unwrap_or(&Value::Null);
            let vb = rows[b].get(&item.column).unwrap_or(&Value::Null);
            let ord = sql_order_cmp(va, vb, item.descending);
            if ord != std::cmp::Ordering::Equal {
                return ord;
            }
        }
        std::cmp::Ordering::Equal
    });
}

fn compute_window_function(
    ctx: &mut ExecutionContext,
    rows: &[Row],
    name: &str,
    args: &[Expression],
    spec: &WindowSpec,
) -> Result<Vec<Value>, EngineError> {
    let mut results = vec![Value::Null; rows.len()];

    let mut partitions: IndexMap<Vec<String>, Vec<usize>> = IndexMap::new();
    for (idx, row) in rows.iter().enumerate() {
        partitions
            .entry(partition_key(row, &spec.partition_by))
            .or_default()
            .push(idx);
    }

    let upper_name = name.to_ascii_uppercase();
    for (_, mut ordered) in partitions {
        order_partition(rows, &mut ordered, &spec.order_by);
        compute_over_partition(ctx, rows, &upper_name, args, spec, &ordered, &mut results)?;
    }

    Ok(results)
}

fn compute_over_partition(
    ctx: &mut ExecutionContext,
    rows: &[Row],
    name: &str,
    args: &[Expression],
    spec: &WindowSpec,
    ordered: &[usize],
    results: &mut [Value],
) -> Result<(), EngineError> {
    match name {
        "ROW_NUMBER" => {
            for (pos, &idx) in ordered.iter().enumerate() {
                results[idx] = Value::Int(pos as i64 + 1);
            }
        }
        "RANK" => {
            let mut last_key: Option<Vec<String>> = None;
            let mut rank = 1usize;
            for (pos, &idx) in ordered.iter().enumerate() {
                let key = order_key_tuple(rows, idx, &spec.order_by);
                if last_key.as_ref() != Some(&key) {
                    rank = pos + 1;
                }
                results[idx] = Value::Int(rank as i64);
                last_key = Some(key);
            }
        }
        "DENSE_RANK" => {
            let mut last_key: Option<Vec<String>> = None;
            let mut rank = 0usize;
            for &idx in ordered {
                let key = order_key_tuple(rows, idx, &spec.order_by);
                if last_key.as_ref() != Some(&key) {
                    rank += 1;
                }
                results[idx] = Value::Int(rank as i64);
                last_key = Some(key);
            }
        }
        "NTILE" => {
            let k = args
                .first()
                .map(|e| eval_value(ctx, &rows[ordered.first().copied().unwrap_or(0)], e))
                .transpose()?
                .and_then(|v| match v {
                    Value::Int(i) => Some(i.max(1) as usize),
                    _ => None,
                })
                .unwrap_or(1);
            let len = ordered.len();
            let base = len / k;
            let remainder = len % k;
            let mut pos = 0usize;
            for bucket in 1..=k {
                let size = base + if bucket <= remainder { 1 } else { 0 };
                for _ in 0..size {
                    if pos >= len {
                        break;
                    }
                    results[ordered[pos]] = Value::Int(bucket as i64);
                    pos += 1;
                }
            }
        }
        "LAG" | "LEAD" => {
            let e = args.first().ok_or_else(|| {
                EvalError::TypeMismatch(format!("{name} requires at least one argument"))
            })?;
            let n = match args.get(1) {
                Some(n_expr) => match eval_value(ctx, &rows[ordered[0]], n_expr)? {
                    Value::Int(i) => i,
                    _ => 1,
                },
                None => 1,
            };
            let signed_n = if name == "LAG" { n } else { -n };
            for (pos, &idx) in ordered.iter().enumerate() {
                let target = pos as i64 - signed_n;
                let value = if target >= 0 && (target as usize) < ordered.len() {
                    eval_value(ctx, &rows[ordered[target as usize]], e)?
                } else {
                    match args.get(2) {
                        Some(default_expr) => eval_value(ctx, &rows[idx], default_expr)?,
                        None => Value::Null,
                    }
                };
                results[idx] = value;
            }
        }
        "FIRST_VALUE" | "LAST_VALUE" | "NTH_VALUE" => {
            let e = args.first().ok_or_else(|| {
                EvalError::TypeMismatch(format!("{name} requires at least one argument"))
            })?;
            for (pos, &idx) in ordered.iter().enumerate() {
                let frame = resolve_frame(rows, ordered, pos, &spec.frame, &spec.order_by);
                let value = match frame {
                    None => Value::Null,
                    Some((s, end)) => match name {
                        "FIRST_VALUE" => eval_value(ctx, &rows[ordered[s]], e)?,
                        "LAST_VALUE" => eval_value(ctx, &rows[ordered[end]], e)?,
                        "NTH_VALUE" => {
                            let n = match args.get(1) {
                                Some(n_expr) => match eval_value(ctx, &rows[idx], n_expr)? {
                                    Value::Int(i) => i.max(1) as usize,
                                    _ => 1,
                                },
                                None => 1,
                            };
                            let target = s + n - 1;
                            if target <= end {
                                eval_value(ctx, &rows[ordered[target]], e)?
                            } else {
                                Value::Null
                            }
                        }
                        _ => unreachable!(),
                    },
                };
                results[idx] = value;
            }
        }
        other => {
            for (pos, &idx) in ordered.iter().enumerate() {
                let frame = resolve_frame(rows, ordered, pos, &spec.frame, &spec.order_by);
                let frame_rows: Vec<Row> = match frame {
                    None => Vec::new(),
                    Some((s, end)) => ordered[s..=end].iter().map(|&i| rows[i].clone()).collect(),
                };
                results[idx] = aggregate_window_value(other, args, &frame_rows)?;
            }
        }
    }
    Ok(())
}

fn order_key_tuple(rows: &[Row], idx: usize, order_by: &[OrderItem]) -> Vec<String> {
    order_by
        .iter()
        .map(|item| format!("{:?}", rows[idx].get(&item.column).unwrap_or(&Value::Null)))
        .collect()
}

fn numeric_key(rows: &[Row], idx: usize, column: &str) -> Option<f64> {
    rows[idx].get(column).and_then(|v| v.as_f64())
}

/// Resolves a window frame to an inclusive `[start, end]` position range
/// within `ordered`. `None` means the frame is empty.
fn resolve_frame(
    rows: &[Row],
    ordered: &[usize],
    current: usize,
    frame: &Option<crate::ast::WindowFrame>,
    order_by: &[OrderItem],
) -> Option<(usize, usize)> {
    if ordered.is_empty() {
        return None;
    }
    let frame = match frame {
        None => return Some((0, current)),
        Some(f) => f,
    };

    let use_numeric_range = frame.frame_type == FrameType::Range
        && order_by.len() == 1
        && !order_by[0].descending
        && ordered.iter().all(|&idx| numeric_key(rows, idx, &order_by[0].column).is_some());

    if use_numeric_range {
        let current_key = numeric_key(rows, ordered[current], &order_by[0].column).unwrap();
        let lower = range_bound(frame.start, current_key);
        let upper = range_bound(frame.end, current_key);
        let mut s = None;
        let mut e = None;
        for (pos, &idx) in ordered.iter().enumerate() {
            let key = numeric_key(rows, idx, &order_by[0].column).unwrap();
            if (key >= lower && key <= upper) || key == current_key {
                if s.is_none() {
                    s = Some(pos);
                }
                e = Some(pos);
            }
        }
        return match (s, e) {
            (Some(s), Some(e)) => Some((s, e)),
            _ => None,
        };
    }

    let len = ordered.len();
    let s = resolve_row_bound(frame.start, current, len);
    let e = resolve_row_bound(frame.end, current, len);
    if s > e {
        None
    } else {
        Some((s, e))
    }
}

fn range_bound(bound: FrameBound, current_key: f64) -> f64 {
    match bound {
        FrameBound::UnboundedPreceding => f64::NEG_INFINITY,
        FrameBound::OffsetPreceding(k) => current_key - k as f64,
        FrameBound::CurrentRow => current_key,
        FrameBound::OffsetFollowing(k) => current_key + k as f64,
        FrameBound::UnboundedFollowing => f64::INFINITY,
    }
}

fn resolve_row_bound(bound: FrameBound, current: usize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let raw: i64 = match bound {
        FrameBound::UnboundedPreceding => 0,
        FrameBound::OffsetPreceding(k) => current as i64 - k as i64,
        FrameBound::CurrentRow => current as i64,
        FrameBound::OffsetFollowing(k) => current as i64 + k as i64,
        FrameBound::UnboundedFollowing => len as i64 - 1,
    };
    raw.clamp(0, len as i64 - 1) as usize
}
