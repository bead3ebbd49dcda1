//! Phase 4 of §4.4: nested-loop join execution (§4.5).

use crate::ast::{Join, JoinType};
use crate::context::ExecutionContext;
use crate::error::{EngineError, EvalError};
use crate::value::Row;

use super::eval::eval_bool;
use super::source::{apply_table_alias, null_padded_like, resolve_source};

pub fn apply_joins(
    ctx: &mut ExecutionContext,
    mut left: Vec<Row>,
    joins: &[Join],
) -> Result<Vec<Row>, EngineError> {
    for join in joins {
        let right = resolve_source(ctx, &join.source)?;
        let right = apply_table_alias(right, &join.alias);
        left = apply_one_join(ctx, left, right, join)?;
    }
    Ok(left)
}

fn apply_one_join(
    ctx: &mut ExecutionContext,
    left: Vec<Row>,
    right: Vec<Row>,
    join: &Join,
) -> Result<Vec<Row>, EngineError> {
    match join.join_type {
        JoinType::Cross => cross_join(&left, &right),
        JoinType::Inner => inner_join(ctx, &left, &right, join),
        JoinType::Left => left_join(ctx, &left, &right, join),
        JoinType::Right => right_join(ctx, &left, &right, join),
        JoinType::Full => full_join(ctx, &left, &right, join),
    }
}

/// Row-merging rule shared by every join variant (§4.5).
pub fn merge_rows(left: &Row, right: &Row) -> Result<Row, EngineError> {
    let left_has_file = left.contains_key("_file");
    let right_has_file = right.contains_key("_file");

    for key in left.keys() {
        if key != "_file" && right.contains_key(key) {
            return Err(EvalError::ColumnCollision(key.clone()).into());
        }
    }

    let mut out = Row::new();
    for (key, value) in left {
        if key == "_file" && left_has_file && right_has_file {
            out.insert("_file_left".to_string(), value.clone());
        } else {
            out.insert(key.clone(), value.clone());
        }
    }
    for (key, value) in right {
        if key == "_file" {
            if left_has_file && right_has_file {
                out.insert("_file_right".to_string(), value.clone());
            } else if !left_has_file {
                out.insert(key.clone(), value.clone());
            }
        } else {
            out.insert(key.clone(), value.clone());
        }
    }
    Ok(out)
}

fn condition_holds(
    ctx: &mut ExecutionContext,
    left: &Row,
    right: &Row,
    join: &Join,
) -> Result<(bool, Row), EngineError> {
    let merged = merge_rows(left, right)?;
    let holds = match &join.condition {
        Some(cond) => eval_bool(ctx, &merged, cond)?,
        None => true,
    };
    Ok((holds, merged))
}

fn cross_join(left: &[Row], right: &[Row]) -> Result<Vec<Row>, EngineError> {
    let mut out = Vec::with_capacity(left.len() * right.len());
    for l in left {
        for r in right {
            out.push(merge_rows(l, r)?);
        }
    }
    Ok(out)
}

fn inner_join(
    ctx: &mut ExecutionContext,
    left: &[Row],
    right: &[Row],
    join: &Join,
) -> Result<Vec<Row>, EngineError> {
    let mut out = Vec::new();
    for l in left {
        for r in right {
            let (holds, merged) = condition_holds(ctx, l, r, join)?;
            if holds {
                out.push(merged);
            }
        }
    }
    Ok(out)
}

fn left_join(
    ctx: &mut ExecutionContext,
    left: &[Row],
    right: &[Row],
    join: &Join,
) -> Result<Vec<Row>, EngineError> {
    let mut out = Vec::new();
    for l in left {
        let mut matched = false;
        for r in right {
            let (holds, merged) = condition_holds(ctx, l, r, join)?;
            if holds {
                matched = true;
                out.push(merged);
            }
        }
        if !matched {
            if let Some(template) = right.first() {
                out.push(merge_rows(l, &null_padded_like(template))?);
            } else {
                out.push(l.clone());
            }
        }
    }
    Ok(out)
}

fn right_join(
    ctx: &mut ExecutionContext,
    left: &[Row],
    right: &[Row],
    join: &Join,
) -> Result<Vec<Row>, EngineError> {
    let mut out = Vec::new();
    for r in right {
        let mut matched = false;
        for l in left {
            let (holds, merged) = condition_holds(ctx, l, r, join)?;
            if holds {
                matched = true;
                out.push(merged);
            }
        }
        if !matched {
            if let Some(template) = left.first() {
                out.push(merge_rows(&null_padded_like(template), r)?);
            } else {
                out.push(r.clone());
            }
        }
    }
    Ok(out)
}

fn full_join(
    ctx: &mut ExecutionContext,
    left: &[Row],
    right: &[Row],
    join: &Join,
) -> Result<Vec<Row>, EngineError> {
    let mut out = Vec::new();
    let mut right_matched = vec![false; right.len()];

    for l in left {
        let mut matched = false;
        for (i, r) in right.iter().enumerate() {
            let (holds, merged) = condition_holds(ctx, l, r, join)?;
            if holds {
                matched = true;
                right_matched[i] = true;
                out.push(merged);
            }
        }
        if !matched {
            if let Some(template) = right.first() {
                out.push(merge_rows(l, &null_padded_like(template))?);
            } else {
                out.push(l.clone());
            }
        }
    }

    if let Some(template) = left.first() {
        for (r, was_matched) in right.iter().zip(right_matched.iter()) {
            if !was_matched {
                out.push(merge_rows(&null_padded_like(template), r)?);
            }
        }
    } else {
        out.extend(right.iter().cloned());
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn merge_rejects_overlapping_non_file_keys() {
        let left = row(&[("id", Value::Int(1))]);
        let right = row(&[("id", Value::Int(2))]);
        assert!(merge_rows(&left, &right).is_err());
    }

    #[test]
    fn merge_renames_file_when_both_sides_carry_it() {
        let left = row(&[("_file", Value::Str("a".into()))]);
        let right = row(&[("_file", Value::Str("b".into()))]);
        let merged = merge_rows(&left, &right).unwrap();
        assert_eq!(merged.get("_file_left"), Some(&Value::Str("a".into())));
        assert_eq!(merged.get("_file_right"), Some(&Value::Str("b".into())));
        assert!(merged.get("_file").is_none());
    }

    #[test]
    fn merge_unions_disjoint_keys() {
        let left = row(&[("id", Value::Int(1))]);
        let right = row(&[("name", Value::Str("a".into()))]);
        let merged = merge_rows(&left, &right).unwrap();
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn cross_join_is_cartesian_product() {
        let left = vec![row(&[("a", Value::Int(1))]), row(&[("a", Value::Int(2))])];
        let right = vec![row(&[("b", Value::Int(10))])];
        let out = cross_join(&left, &right).unwrap();
        assert_eq!(out.len(), 2);
    }
}
