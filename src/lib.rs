//! `parqsql`: a standalone SQL query engine that reads parquet files.
//!
//! The pipeline is lexer → parser → AST → executor (§2). This crate exposes
//! the four functions named in §6 plus the pieces needed to embed it:
//! [`parse`] and [`execute`] for one-shot use, [`new_execution_context`] and
//! [`execute_select`] for callers that want to reuse a context (shared CTEs,
//! a custom [`FunctionRegistry`], a custom [`Reader`]) across queries.

pub mod ast;
pub mod context;
pub mod error;
mod exec;
mod lexer;
pub mod reader;
pub mod registry;
pub mod value;

pub use ast::{parse, Query};
pub use context::ExecutionContext;
pub use error::{EngineError, EvalError, LexError, ParseError, ResolveError};
pub use exec::{execute, new_execution_context, execute_select};
pub use reader::{InMemoryReader, ParquetReader, Reader};
pub use registry::FunctionRegistry;
pub use value::{Row, Value};
