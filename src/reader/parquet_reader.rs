//! A `Reader` backed by actual parquet files on disk.
//!
//! Out of the engine's core contract (§1): this module only has to produce
//! `sequence<row>` for a path or glob. Column typing collapses onto the
//! engine's five-value union (§3); any parquet type outside that union is
//! rendered to its textual form rather than rejected outright.

use std::fs::File;
use std::path::Path;

use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::record::Field;
use tracing::{debug, warn};

use super::Reader;
use crate::value::{Row, Value};

pub struct ParquetReader;

impl ParquetReader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ParquetReader {
    fn default() -> Self {
        Self::new()
    }
}

impl Reader for ParquetReader {
    fn read_source(&self, path_or_glob: &str) -> anyhow::Result<Vec<Row>> {
        let paths = resolve_glob(path_or_glob)?;
        if paths.is_empty() {
            anyhow::bail!("no files matched: {path_or_glob}");
        }

        let mut rows = Vec::new();
        for path in paths {
            debug!(file = %path.display(), "reading parquet file");
            rows.extend(read_file(&path)?);
        }
        Ok(rows)
    }
}

fn resolve_glob(path_or_glob: &str) -> anyhow::Result<Vec<std::path::PathBuf>> {
    if !path_or_glob.contains('*') && !path_or_glob.contains('?') {
        return Ok(vec![std::path::PathBuf::from(path_or_glob)]);
    }
    let mut paths = Vec::new();
    for entry in glob::glob(path_or_glob)? {
        paths.push(entry?);
    }
    paths.sort();
    Ok(paths)
}

fn read_file(path: &Path) -> anyhow::Result<Vec<Row>> {
    let file = File::open(path)?;
    let reader = SerializedFileReader::new(file)?;
    let file_name = path.to_string_lossy().into_owned();

    let mut rows = Vec::new();
    for record in reader.get_row_iter(None)? {
        let record = record?;
        let mut row = Row::new();
        for (name, field) in record.get_column_iter() {
            row.insert(name.clone(), convert_field(field));
        }
        row.insert("_file".to_string(), Value::Str(file_name.clone()));
        rows.push(row);
    }
    Ok(rows)
}

fn convert_field(field: &Field) -> Value {
    match field {
        Field::Null => Value::Null,
        Field::Bool(b) => Value::Bool(*b),
        Field::Byte(n) => Value::Int(*n as i64),
        Field::Short(n) => Value::Int(*n as i64),
        Field::Int(n) => Value::Int(*n as i64),
        Field::Long(n) => Value::Int(*n),
        Field::UByte(n) => Value::Int(*n as i64),
        Field::UShort(n) => Value::Int(*n as i64),
        Field::UInt(n) => Value::Int(*n as i64),
        Field::ULong(n) => Value::Int(*n as i64),
        Field::Float(f) => Value::Float(*f as f64),
        Field::Double(f) => Value::Float(*f),
        Field::Str(s) => Value::Str(s.clone()),
        other => {
            warn!(field = %other, "parquet field type has no direct engine value; rendering as string");
            Value::Str(other.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_errors_clearly() {
        let reader = ParquetReader::new();
        let err = reader.read_source("/nonexistent/path/does-not-exist.parquet").unwrap_err();
        assert!(err.to_string().len() > 0);
    }

    #[test]
    fn non_glob_path_is_passed_through_unchanged() {
        let paths = resolve_glob("data/single.parquet").unwrap();
        assert_eq!(paths, vec![std::path::PathBuf::from("data/single.parquet")]);
    }
}
