//! The row and value model (§3 of the data model).
//!
//! A row is an ordered name → value mapping; [`IndexMap`] keeps projection
//! order stable without a second sort pass. Missing keys and explicit
//! `Value::Null` are equivalent for evaluation — only projection cares about
//! which keys exist.

use std::cmp::Ordering;
use std::fmt;

use indexmap::IndexMap;

/// A single cell's value. Mirrors the tagged union in the CellValue pattern,
/// trimmed to the closed set the engine contract defines.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Bool(_) => "bool",
        }
    }

    /// Three-valued comparisons are deliberately flattened to two-valued
    /// (§4.9, O2): `Null` compared to anything is `None` here, and callers
    /// treat `None` as `false`, never as `unknown`.
    pub fn partial_cmp_sql(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Null, _) | (_, Value::Null) => None,
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Str(a), Value::Str(b)) => Some(a.as_bytes().cmp(b.as_bytes())),
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            _ => None,
        }
    }

    pub fn sql_eq(&self, other: &Value) -> bool {
        self.partial_cmp_sql(other) == Some(Ordering::Equal)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// An ordered name → value mapping. The reader populates `_file`; the
/// executor adds/rewrites keys as rows pass through joins and projection.
pub type Row = IndexMap<String, Value>;

pub fn get_column<'a>(row: &'a Row, name: &str) -> Option<&'a Value> {
    row.get(name)
}

/// Ordering used by `ORDER BY` and window `ORDER BY` (§4.4 phase 8, §4.6):
/// nulls sort first in ascending order, last in descending order, regardless
/// of how non-null values compare.
pub fn sql_order_cmp(a: &Value, b: &Value, descending: bool) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => {
            if descending {
                Ordering::Greater
            } else {
                Ordering::Less
            }
        }
        (false, true) => {
            if descending {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        }
        (false, false) => {
            let ord = a.partial_cmp_sql(b).unwrap_or(Ordering::Equal);
            if descending {
                ord.reverse()
            } else {
                ord
            }
        }
    }
}

/// Structural equality over the full projected row, used by DISTINCT (§4.4
/// phase 7). Two rows are equal iff they have the same keys, in the same
/// order, with equal values.
pub fn rows_structurally_equal(a: &Row, b: &Row) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).all(|((ka, va), (kb, vb))| ka == kb && va == vb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_compares_false_both_ways() {
        assert_eq!(Value::Null.partial_cmp_sql(&Value::Int(1)), None);
        assert_eq!(Value::Int(1).partial_cmp_sql(&Value::Null), None);
    }

    #[test]
    fn int_float_promotion() {
        assert_eq!(
            Value::Int(2).partial_cmp_sql(&Value::Float(2.0)),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn bool_orders_false_before_true() {
        assert_eq!(
            Value::Bool(false).partial_cmp_sql(&Value::Bool(true)),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn string_comparison_is_byte_wise() {
        assert_eq!(
            Value::Str("a".into()).partial_cmp_sql(&Value::Str("b".into())),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn order_cmp_puts_nulls_first_ascending_last_descending() {
        assert_eq!(sql_order_cmp(&Value::Null, &Value::Int(1), false), Ordering::Less);
        assert_eq!(sql_order_cmp(&Value::Null, &Value::Int(1), true), Ordering::Greater);
    }
}
