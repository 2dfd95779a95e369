//! Error types for the debugger core.
//!
//! - [`EvalError`]: Failures while compiling or evaluating a user expression
//!   (breakpoint conditions, watches, REPL input).
//! - [`DebugError`]: Errors returned by authoring commands and config loading.
//!
//! Nothing here is ever propagated to the workflow executor: expression errors are
//! folded into [`crate::evaluator::EvalOutcome`] and operational no-ops return
//! plain booleans.

pub mod debug_error;
pub mod eval_error;

pub use debug_error::DebugError;
pub use eval_error::EvalError;

/// Convenience alias for debugger-level results.
pub type DebugResult<T> = Result<T, DebugError>;
/// Convenience alias for expression evaluation results.
pub type EvalResult<T> = Result<T, EvalError>;
