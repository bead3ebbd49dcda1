//! The scalar function registry (§6).
//!
//! The parser never consults this — it always produces `FunctionCall` for a
//! bare `name(args)` that isn't a closed-set aggregate or window name.
//! Classification against the registry happens at evaluation time, which
//! keeps `parse()` pure and lets callers swap registries per execution
//! without reparsing.

use crate::error::EvalError;
use crate::value::Value;

/// A single scalar function's arity bounds and implementation.
pub struct ScalarFunction {
    pub min_arity: usize,
    pub max_arity: usize,
    pub evaluate: Box<dyn Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync>,
}

impl ScalarFunction {
    pub fn new(
        min_arity: usize,
        max_arity: usize,
        evaluate: impl Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync + 'static,
    ) -> Self {
        Self { min_arity, max_arity, evaluate: Box::new(evaluate) }
    }

    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, EvalError> {
        if args.len() < self.min_arity || args.len() > self.max_arity {
            return Err(EvalError::ArityMismatch {
                name: name.to_string(),
                min: self.min_arity,
                max: self.max_arity,
                got: args.len(),
            });
        }
        (self.evaluate)(args)
    }
}

/// Immutable, read-only-after-construction registry (§5): built once,
/// shared by reference across concurrent executions.
#[derive(Default)]
pub struct FunctionRegistry {
    functions: std::collections::HashMap<String, ScalarFunction>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str, function: ScalarFunction) {
        self.functions.insert(name.to_ascii_uppercase(), function);
    }

    pub fn lookup(&self, name: &str) -> Option<&ScalarFunction> {
        self.functions.get(&name.to_ascii_uppercase())
    }

    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, EvalError> {
        match self.lookup(name) {
            Some(f) => f.call(name, args),
            None => Err(EvalError::UnknownFunction(name.to_string())),
        }
    }

    /// A handful of functions useful enough to ship by default; individual
    /// scalar-function semantics are not part of the core contract (§1), so
    /// embedders are free to build their own registry from scratch.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(
            "UPPER",
            ScalarFunction::new(1, 1, |args| match &args[0] {
                Value::Str(s) => Ok(Value::Str(s.to_uppercase())),
                Value::Null => Ok(Value::Null),
                other => Err(EvalError::TypeMismatch(format!(
                    "UPPER expects a string, got {}",
                    other.type_name()
                ))),
            }),
        );
        registry.register(
            "LOWER",
            ScalarFunction::new(1, 1, |args| match &args[0] {
                Value::Str(s) => Ok(Value::Str(s.to_lowercase())),
                Value::Null => Ok(Value::Null),
                other => Err(EvalError::TypeMismatch(format!(
                    "LOWER expects a string, got {}",
                    other.type_name()
                ))),
            }),
        );
        registry.register(
            "ABS",
            ScalarFunction::new(1, 1, |args| match &args[0] {
                Value::Int(i) => Ok(Value::Int(i.abs())),
                Value::Float(f) => Ok(Value::Float(f.abs())),
                Value::Null => Ok(Value::Null),
                other => Err(EvalError::TypeMismatch(format!(
                    "ABS expects a number, got {}",
                    other.type_name()
                ))),
            }),
        );
        registry.register(
            "COALESCE",
            ScalarFunction::new(1, usize::MAX, |args| {
                Ok(args.iter().find(|v| !v.is_null()).cloned().unwrap_or(Value::Null))
            }),
        );
        registry
    }
}
