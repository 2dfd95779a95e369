use thiserror::Error;

/// Expression-level errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("Syntax error in `{expression}`: {message}")]
    Syntax { expression: String, message: String },
    #[error("name '{0}' is not defined")]
    UndefinedName(String),
    #[error("Evaluation of `{expression}` failed: {message}")]
    Runtime { expression: String, message: String },
    #[error("Conversion error: {0}")]
    Conversion(String),
}

impl From<serde_json::Error> for EvalError {
    fn from(e: serde_json::Error) -> Self {
        EvalError::Conversion(e.to_string())
    }
}
