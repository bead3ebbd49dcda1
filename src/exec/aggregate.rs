//! Phase 6(b) of §4.4: grouping and aggregation (§4.7).

use indexmap::IndexMap;

use crate::ast::{ColumnRef, Expression, Query};
use crate::context::ExecutionContext;
use crate::error::{EngineError, EvalError};
use crate::value::{Row, Value};

use super::eval::{column_value, eval_bool};
use super::project::default_projection_name;

pub fn apply_group_by_aggregate(
    ctx: &mut ExecutionContext,
    rows: Vec<Row>,
    query: &Query,
) -> Result<Vec<Row>, EngineError> {
    let mut groups: IndexMap<Vec<String>, Vec<Row>> = IndexMap::new();
    for row in rows {
        let key: Vec<String> = query
            .group_by
            .iter()
            .map(|col| group_key_repr(row.get(col).unwrap_or(&Value::Null)))
            .collect();
        groups.entry(key).or_default().push(row);
    }

    let mut out = Vec::with_capacity(groups.len());
    for (_key, group_rows) in groups {
        let first = group_rows.first().cloned().unwrap_or_default();

        let mut env = Row::new();
        for col in &query.group_by {
            env.insert(col.clone(), first.get(col).cloned().unwrap_or(Value::Null));
        }

        let mut projected = Row::new();
        for item in &query.select_list {
            let value = eval_group_item(&item.expr, &query.group_by, &first, &group_rows)?;
            let name = item
                .alias
                .clone()
                .unwrap_or_else(|| default_projection_name(&item.expr));
            env.insert(name.clone(), value.clone());
            projected.insert(name, value);
        }

        if let Some(having) = &query.having {
            if !eval_bool(ctx, &env, having)? {
                continue;
            }
        }

        out.push(projected);
    }

    Ok(out)
}

fn eval_group_item(
    expr: &Expression,
    group_by: &[String],
    first_row: &Row,
    group_rows: &[Row],
) -> Result<Value, EngineError> {
    match expr {
        Expression::AggregateExpr(name, arg) => compute_aggregate(name, arg.as_ref(), group_rows),
        Expression::Column(col) if group_by.iter().any(|g| g == &col.0) => {
            Ok(first_row.get(&col.0).cloned().unwrap_or(Value::Null))
        }
        _ => Err(EvalError::TypeMismatch(
            "non-aggregate select item is not a GROUP BY key".into(),
        )
        .into()),
    }
}

/// Shared with window.rs: an aggregate function used as `OVER (...)`
/// restricts its argument to a bare column (no nested expressions).
pub(crate) fn aggregate_window_value(
    name: &str,
    args: &[Expression],
    rows: &[Row],
) -> Result<Value, EngineError> {
    let arg = match args.first() {
        Some(Expression::Column(c)) if c.0 == "*" => None,
        Some(Expression::Column(c)) => Some(c.clone()),
        None => None,
        Some(_) => {
            return Err(EvalError::TypeMismatch(format!(
                "{name} OVER (...) expects a bare column argument"
            ))
            .into())
        }
    };
    compute_aggregate(name, arg.as_ref(), rows)
}

fn compute_aggregate(
    name: &str,
    arg: Option<&ColumnRef>,
    rows: &[Row],
) -> Result<Value, EngineError> {
    match name.to_ascii_uppercase().as_str() {
        "COUNT" => match arg {
            None => Ok(Value::Int(rows.len() as i64)),
            Some(col) => Ok(Value::Int(
                rows.iter().filter(|r| !column_value(r, col).is_null()).count() as i64,
            )),
        },
        "SUM" => {
            let col = arg.ok_or_else(|| EvalError::TypeMismatch("SUM requires a column".into()))?;
            let values: Vec<Value> = rows.iter().map(|r| column_value(r, col)).collect();
            sum_value(&values)
        }
        "AVG" => {
            let col = arg.ok_or_else(|| EvalError::TypeMismatch("AVG requires a column".into()))?;
            let values: Vec<Value> = rows.iter().map(|r| column_value(r, col)).collect();
            avg_value(&values)
        }
        "MIN" => {
            let col = arg.ok_or_else(|| EvalError::TypeMismatch("MIN requires a column".into()))?;
            let values: Vec<Value> = rows.iter().map(|r| column_value(r, col)).collect();
            Ok(extreme_value(&values, true))
        }
        "MAX" => {
            let col = arg.ok_or_else(|| EvalError::TypeMismatch("MAX requires a column".into()))?;
            let values: Vec<Value> = rows.iter().map(|r| column_value(r, col)).collect();
            Ok(extreme_value(&values, false))
        }
        other => Err(EvalError::UnknownFunction(other.to_string()).into()),
    }
}

fn sum_value(values: &[Value]) -> Result<Value, EngineError> {
    let mut any = false;
    let mut all_int = true;
    let mut int_sum: i64 = 0;
    let mut float_sum: f64 = 0.0;
    for v in values {
        match v {
            Value::Null => continue,
            Value::Int(i) => {
                any = true;
                int_sum += i;
                float_sum += *i as f64;
            }
            Value::Float(f) => {
                any = true;
                all_int = false;
                float_sum += f;
            }
            other => {
                return Err(EvalError::TypeMismatch(format!(
                    "SUM expects a number, got {}",
                    other.type_name()
                ))
                .into())
            }
        }
    }
    if !any {
        return Ok(Value::Null);
    }
    Ok(if all_int { Value::Int(int_sum) } else { Value::Float(float_sum) })
}

fn avg_value(values: &[Value]) -> Result<Value, EngineError> {
    let mut count = 0u64;
    let mut sum = 0.0f64;
    for v in values {
        match v {
            Value::Null => continue,
            Value::Int(i) => {
                count += 1;
                sum += *i as f64;
            }
            Value::Float(f) => {
                count += 1;
                sum += f;
            }
            other => {
                return Err(EvalError::TypeMismatch(format!(
                    "AVG expects a number, got {}",
                    other.type_name()
                ))
                .into())
            }
        }
    }
    if count == 0 {
        return Ok(Value::Null);
    }
    Ok(Value::Float(sum / count as f64))
}

fn extreme_value(values: &[Value], want_min: bool) -> Value {
    let mut best: Option<&Value> = None;
    for v in values {
        if v.is_null() {
            continue;
        }
        best = match best {
            None => Some(v),
            Some(current) => match v.partial_cmp_sql(current) {
                Some(ord) => {
                    let take = if want_min {
                        ord == std::cmp::Ordering::Less
                    } else {
                        ord == std::cmp::Ordering::Greater
                    };
                    if take {
                        Some(v)
                    } else {
                        Some(current)
                    }
                }
                None => Some(current),
            },
        };
    }
    best.cloned().unwrap_or(Value::Null)
}

/// Hashable, order-insensitive-to-type representation of a group key value;
/// a pragmatic stand-in since `Value` carries `f64` and doesn't derive `Eq`.
fn group_key_repr(value: &Value) -> String {
    match value {
        Value::Null => "null:".to_string(),
        Value::Int(i) => format!("int:{i}"),
        Value::Float(f) => format!("float:{f}"),
        Value::Str(s) => format!("str:{s}"),
        Value::Bool(b) => format!("bool:{b}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn sum_ignores_nulls_and_stays_int() {
        let values = vec![Value::Int(1), Value::Null, Value::Int(2)];
        assert_eq!(sum_value(&values).unwrap(), Value::Int(3));
    }

    #[test]
    fn sum_of_all_nulls_is_null() {
        let values = vec![Value::Null, Value::Null];
        assert_eq!(sum_value(&values).unwrap(), Value::Null);
    }

    #[test]
    fn avg_divides_sum_by_non_null_count() {
        let values = vec![Value::Int(2), Value::Int(4), Value::Null];
        assert_eq!(avg_value(&values).unwrap(), Value::Float(3.0));
    }

    #[test]
    fn min_max_ignore_nulls() {
        let values = vec![Value::Int(3), Value::Null, Value::Int(1)];
        assert_eq!(extreme_value(&values, true), Value::Int(1));
        assert_eq!(extreme_value(&values, false), Value::Int(3));
    }

    #[test]
    fn count_star_counts_rows_not_nulls() {
        let rows = vec![row(&[("x", Value::Null)]), row(&[("x", Value::Int(1))])];
        assert_eq!(compute_aggregate("COUNT", None, &rows).unwrap(), Value::Int(2));
    }

    #[test]
    fn count_column_skips_nulls() {
        let rows = vec![row(&[("x", Value::Null)]), row(&[("x", Value::Int(1))])];
        let col = ColumnRef("x".into());
        assert_eq!(compute_aggregate("COUNT", Some(&col), &rows).unwrap(), Value::Int(1));
    }
}
