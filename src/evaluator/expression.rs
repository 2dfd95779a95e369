//! Sandboxed expression evaluation.
//!
//! Expressions use the minijinja expression grammar: arithmetic, comparisons,
//! `and` / `or` / `not`, `in`, attribute and index access, list and map
//! literals. Evaluation runs in an empty environment with strict undefined
//! handling, so the provided variable mapping is the only namespace: no filters,
//! tests or global functions are reachable.

use minijinja::{Environment, Expression, UndefinedBehavior};
use serde::Serialize;
use serde_json::Value;

use crate::core::variable_scope::ScopeMap;
use crate::error::{EvalError, EvalResult};

/// `(value, error)` result handed back to operators.
///
/// A successful expression sets `value`; a failure sets `error`. A successful
/// REPL statement leaves both empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EvalOutcome {
    pub value: Option<Value>,
    pub error: Option<String>,
}

impl EvalOutcome {
    pub fn value(value: Value) -> Self {
        Self {
            value: Some(value),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            value: None,
            error: Some(message.into()),
        }
    }

    pub fn statement() -> Self {
        Self::default()
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_pair(self) -> (Option<Value>, Option<String>) {
        (self.value, self.error)
    }
}

impl From<EvalResult<Value>> for EvalOutcome {
    fn from(result: EvalResult<Value>) -> Self {
        match result {
            Ok(value) => EvalOutcome::value(value),
            Err(err) => EvalOutcome::error(err.to_string()),
        }
    }
}

fn sandbox_environment<'source>() -> Environment<'source> {
    let mut env = Environment::empty();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env
}

fn compile<'env, 'source>(
    env: &'env Environment<'source>,
    source: &'source str,
    namespace: &ScopeMap,
) -> EvalResult<Expression<'env, 'source>> {
    if source.is_empty() {
        return Err(EvalError::Syntax {
            expression: String::new(),
            message: "empty expression".into(),
        });
    }
    let compiled = env
        .compile_expression(source)
        .map_err(|e| EvalError::Syntax {
            expression: source.to_string(),
            message: e.to_string(),
        })?;

    let mut undefined: Vec<String> = compiled
        .undeclared_variables(false)
        .into_iter()
        .filter(|name| !namespace.contains_key(name))
        .collect();
    undefined.sort();
    match undefined.into_iter().next() {
        Some(name) => Err(EvalError::UndefinedName(name)),
        None => Ok(compiled),
    }
}

fn eval_raw(expression: &str, namespace: &ScopeMap) -> EvalResult<minijinja::Value> {
    let source = expression.trim();
    let env = sandbox_environment();
    let compiled = compile(&env, source, namespace)?;
    compiled.eval(namespace).map_err(|e| EvalError::Runtime {
        expression: source.to_string(),
        message: e.to_string(),
    })
}

/// Check that `expression` parses, without evaluating it.
pub fn validate_expression(expression: &str) -> EvalResult<()> {
    let source = expression.trim();
    let env = sandbox_environment();
    if source.is_empty() {
        return Err(EvalError::Syntax {
            expression: String::new(),
            message: "empty expression".into(),
        });
    }
    env.compile_expression(source)
        .map(|_| ())
        .map_err(|e| EvalError::Syntax {
            expression: source.to_string(),
            message: e.to_string(),
        })
}

/// Evaluate `expression` against `namespace` and convert the result to JSON.
pub fn evaluate(expression: &str, namespace: &ScopeMap) -> EvalResult<Value> {
    let result = eval_raw(expression, namespace)?;
    Ok(serde_json::to_value(&result)?)
}

/// Evaluate `expression` for its truthiness.
pub fn evaluate_condition(expression: &str, namespace: &ScopeMap) -> EvalResult<bool> {
    eval_raw(expression, namespace).map(|v| v.is_true())
}
