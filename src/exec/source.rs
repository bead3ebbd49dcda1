//! Phase 2-3 of §4.4: resolving a `Source` to rows and applying the table
//! alias.

use crate::ast::Source;
use crate::context::ExecutionContext;
use crate::error::{EngineError, ResolveError};
use crate::value::{Row, Value};

use super::execute_subquery;

pub fn resolve_source(
    ctx: &mut ExecutionContext,
    source: &Source,
) -> Result<Vec<Row>, EngineError> {
    match source {
        Source::Subquery(query) => execute_subquery(ctx, query),
        Source::TableName(name) => {
            if let Some(rows) = ctx.lookup_cte(name) {
                return Ok((*rows).clone());
            }
            if ctx.is_known_cte_name(name) {
                return Err(ResolveError::ForwardCteReference(name.clone()).into());
            }
            ctx.reader
                .read_source(name)
                .map_err(|e| EngineError::Reader(anyhow::anyhow!("unknown table: {name}: {e}")))
        }
        Source::Unset => Err(ResolveError::UnknownTable("<unset>".into()).into()),
    }
}

/// Phase 3: prefixes every non-`_file` key with `alias.`, replacing the
/// bare name (§4.4 step 3) rather than adding a second, aliased copy.
pub fn apply_table_alias(rows: Vec<Row>, alias: &Option<String>) -> Vec<Row> {
    let Some(alias) = alias else { return rows };
    rows.into_iter()
        .map(|row| {
            let mut out = Row::new();
            for (key, value) in row {
                if key == "_file" {
                    out.insert(key, value);
                } else {
                    out.insert(format!("{alias}.{key}"), value);
                }
            }
            out
        })
        .collect()
}

/// Builds a null-padded row with the same key set as `template`, used when
/// an outer join's other side has no match (§4.5).
pub fn null_padded_like(template: &Row) -> Row {
    template.keys().map(|k| (k.clone(), Value::Null)).collect()
}
