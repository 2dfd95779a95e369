//! Debugger-level error types.

use super::EvalError;
use thiserror::Error;

/// Debugger-level errors
#[derive(Debug, Error)]
pub enum DebugError {
    #[error("Invalid breakpoint: {0}")]
    InvalidBreakpoint(String),
    #[error("Breakpoint not found: {0}")]
    BreakpointNotFound(String),
    #[error("Config error: {0}")]
    Config(String),
    #[error("Expression error: {0}")]
    Eval(#[from] EvalError),
}

impl From<serde_json::Error> for DebugError {
    fn from(value: serde_json::Error) -> Self {
        DebugError::Config(value.to_string())
    }
}
