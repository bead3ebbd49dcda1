//! An in-memory `Reader` used by tests and the scenarios in §8. Each
//! registered "table" is just a `Vec<Row>` with `_file` stamped on read so
//! tests can exercise the counting-reader scenario in S3 without touching
//! the filesystem.

use std::collections::HashMap;
use std::sync::Mutex;

use super::Reader;
use crate::value::Row;

#[derive(Default)]
pub struct InMemoryReader {
    tables: Mutex<HashMap<String, Vec<Row>>>,
    read_counts: Mutex<HashMap<String, usize>>,
}

impl InMemoryReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers rows under `name`, stamping `_file` as `"{name}.parquet"`
    /// the way the real reader stamps each file's own path.
    pub fn with_table(self, name: &str, mut rows: Vec<Row>) -> Self {
        let file_name = format!("{name}.parquet");
        for row in &mut rows {
            row.insert("_file".to_string(), crate::value::Value::Str(file_name.clone()));
        }
        self.tables.lock().unwrap().insert(name.to_string(), rows);
        self
    }

    /// Number of times `read_source` has been called for `name` — used to
    /// verify scalar-subquery caching (S3) actually skips re-execution.
    pub fn read_count(&self, name: &str) -> usize {
        *self.read_counts.lock().unwrap().get(name).unwrap_or(&0)
    }
}

impl Reader for InMemoryReader {
    fn read_source(&self, path_or_glob: &str) -> anyhow::Result<Vec<Row>> {
        let mut counts = self.read_counts.lock().unwrap();
        *counts.entry(path_or_glob.to_string()).or_insert(0) += 1;
        drop(counts);

        self.tables
            .lock()
            .unwrap()
            .get(path_or_glob)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("unknown table: {path_or_glob}"))
    }
}
