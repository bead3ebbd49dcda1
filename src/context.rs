//! Per-query execution context (§4.3): materialized CTEs, the in-progress
//! set used for cycle detection, and the scalar-subquery cache.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::ast::NodeId;
use crate::reader::Reader;
use crate::registry::FunctionRegistry;
use crate::value::{Row, Value};

#[derive(Clone)]
pub struct ExecutionContext {
    ctes: HashMap<String, Arc<Vec<Row>>>,
    in_progress: HashSet<String>,
    all_cte_names: HashSet<String>,
    scalar_subquery_cache: HashMap<NodeId, Option<Value>>,
    pub reader: Arc<dyn Reader>,
    pub registry: Arc<FunctionRegistry>,
}

impl ExecutionContext {
    pub fn new(reader: Arc<dyn Reader>, registry: Arc<FunctionRegistry>) -> Self {
        Self {
            ctes: HashMap::new(),
            in_progress: HashSet::new(),
            all_cte_names: HashSet::new(),
            scalar_subquery_cache: HashMap::new(),
            reader,
            registry,
        }
    }

    /// Spawn a child context for a subquery that carries its own `WITH`
    /// (§4.3): CTE bindings and known names are copied (shadow-on-write),
    /// the scalar-subquery cache starts fresh — caches never cross scopes.
    pub fn child(&self) -> Self {
        Self {
            ctes: self.ctes.clone(),
            in_progress: HashSet::new(),
            all_cte_names: self.all_cte_names.clone(),
            scalar_subquery_cache: HashMap::new(),
            reader: self.reader.clone(),
            registry: self.registry.clone(),
        }
    }

    pub fn declare_cte_name(&mut self, name: &str) {
        self.all_cte_names.insert(name.to_string());
    }

    pub fn is_known_cte_name(&self, name: &str) -> bool {
        self.all_cte_names.contains(name)
    }

    pub fn begin_materializing(&mut self, name: &str) {
        self.in_progress.insert(name.to_string());
    }

    pub fn finish_materializing(&mut self, name: &str) {
        self.in_progress.remove(name);
    }

    pub fn is_in_progress(&self, name: &str) -> bool {
        self.in_progress.contains(name)
    }

    /// Binds (or shadows) a CTE's materialized rows in this scope.
    pub fn bind_cte(&mut self, name: &str, rows: Vec<Row>) {
        self.ctes.insert(name.to_string(), Arc::new(rows));
    }

    pub fn lookup_cte(&self, name: &str) -> Option<Arc<Vec<Row>>> {
        self.ctes.get(name).cloned()
    }

    pub fn cached_scalar_subquery(&self, node_id: NodeId) -> Option<Option<Value>> {
        self.scalar_subquery_cache.get(&node_id).cloned()
    }

    pub fn cache_scalar_subquery(&mut self, node_id: NodeId, value: Option<Value>) {
        self.scalar_subquery_cache.insert(node_id, value);
    }
}
