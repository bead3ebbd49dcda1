//! The executor (§4.4): materializes a `Query` into a row vector by running
//! the nine phases in strict order. Every submodule here owns one phase (or
//! a closely related pair); this file is the orchestration.

mod aggregate;
mod eval;
mod join;
mod project;
mod source;
mod window;

use std::collections::HashSet;
use std::sync::Arc;

use crate::ast::{Expression, Query};
use crate::context::ExecutionContext;
use crate::error::{EngineError, ResolveError};
use crate::reader::Reader;
use crate::registry::FunctionRegistry;
use crate::value::Row;

use aggregate::apply_group_by_aggregate;
use eval::eval_bool;
use join::apply_joins;
use project::{apply_distinct, apply_limit_offset, apply_order_by, apply_projection};
use source::{apply_table_alias, resolve_source};
use window::apply_window_projection;

/// `new_execution_context(reader)` from §6, with the default builtin
/// registry; embedders wanting a custom registry construct
/// `ExecutionContext::new` directly.
pub fn new_execution_context(reader: Arc<dyn Reader>) -> ExecutionContext {
    ExecutionContext::new(reader, Arc::new(FunctionRegistry::with_builtins()))
}

/// `execute(query, reader)` from §6: the one-shot entry point that spins up
/// a fresh context and runs the query to completion.
pub fn execute(query: &Query, reader: Arc<dyn Reader>) -> Result<Vec<Row>, EngineError> {
    let mut ctx = new_execution_context(reader);
    execute_select(&mut ctx, query)
}

/// `execute_select(ctx, query)` from §6: runs one query's full phase order
/// against a caller-supplied context. Used recursively for CTEs and
/// subqueries, which is why it's the function other exec submodules import.
pub fn execute_select(ctx: &mut ExecutionContext, query: &Query) -> Result<Vec<Row>, EngineError> {
    materialize_ctes(ctx, query)?;

    let rows = resolve_source(ctx, &query.source)?;
    let rows = apply_table_alias(rows, &query.table_alias);
    let rows = apply_joins(ctx, rows, &query.joins)?;
    let rows = apply_where(ctx, rows, &query.filter)?;

    let has_window = query
        .select_list
        .iter()
        .any(|item| matches!(item.expr, Expression::WindowExpr(..)));
    let has_aggregate = !query.group_by.is_empty()
        || query
            .select_list
            .iter()
            .any(|item| matches!(item.expr, Expression::AggregateExpr(..)));

    let mut rows = if has_window {
        apply_window_projection(ctx, rows, &query.select_list)?
    } else if has_aggregate {
        apply_group_by_aggregate(ctx, rows, query)?
    } else {
        apply_projection(ctx, &rows, &query.select_list)?
    };

    if query.distinct {
        rows = apply_distinct(rows);
    }
    rows = apply_order_by(rows, &query.order_by);
    rows = apply_limit_offset(rows, query.limit, query.offset);

    Ok(rows)
}

/// Runs `query` as a subquery (FROM-subquery, scalar subquery, or
/// EXISTS/IN subquery body): spawns a child context only when it carries its
/// own `WITH` (§4.3's child-context rule), otherwise runs in place and
/// writes any context mutations (newly bound CTEs, cached scalar subqueries)
/// back to the caller.
fn execute_subquery(
    ctx: &mut ExecutionContext,
    query: &Query,
) -> Result<Vec<Row>, EngineError> {
    let mut child = if query.ctes.is_empty() { ctx.clone() } else { ctx.child() };
    let rows = execute_select(&mut child, query)?;
    if query.ctes.is_empty() {
        *ctx = child;
    }
    Ok(rows)
}

/// Phase 1 of §4.4: materialize each CTE in list order, shadowing any
/// inherited binding of the same name.
fn materialize_ctes(ctx: &mut ExecutionContext, query: &Query) -> Result<(), EngineError> {
    let mut seen_this_with = HashSet::new();
    for cte in &query.ctes {
        if !seen_this_with.insert(cte.name.clone()) {
            return Err(ResolveError::DuplicateCte(cte.name.clone()).into());
        }
        ctx.declare_cte_name(&cte.name);
    }
    for cte in &query.ctes {
        ctx.begin_materializing(&cte.name);
        let rows = execute_select(ctx, &cte.query)?;
        ctx.finish_materializing(&cte.name);
        ctx.bind_cte(&cte.name, rows);
    }
    Ok(())
}

/// Phase 5 of §4.4.
fn apply_where(
    ctx: &mut ExecutionContext,
    rows: Vec<Row>,
    filter: &Option<Expression>,
) -> Result<Vec<Row>, EngineError> {
    let Some(filter) = filter else { return Ok(rows) };
    let mut kept = Vec::with_capacity(rows.len());
    for row in rows {
        if eval_bool(ctx, &row, filter)? {
            kept.push(row);
        }
    }
    Ok(kept)
}
