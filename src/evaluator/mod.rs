//! Expression evaluation for breakpoint conditions, watches and the REPL.

pub mod expression;
pub mod interpolate;
pub mod repl;

pub use expression::{evaluate, evaluate_condition, validate_expression, EvalOutcome};
pub use interpolate::{display_value, extract_placeholders, render_log_message};
pub use repl::{parse_assignment, ReplSession};
