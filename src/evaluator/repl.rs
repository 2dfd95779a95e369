use std::collections::VecDeque;
use std::sync::OnceLock;

use regex::Regex;

use super::expression::{evaluate, EvalOutcome};
use crate::core::variable_scope::ScopeMap;
use crate::error::EvalError;

fn assignment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(.+?)\s*$")
            .expect("assignment pattern is valid")
    })
}

/// Split `name = expr` into its parts. `==` comparisons are not assignments.
pub fn parse_assignment(input: &str) -> Option<(&str, &str)> {
    let caps = assignment_regex().captures(input)?;
    let name = caps.get(1)?.as_str();
    let rhs = caps.get(2)?.as_str();
    if rhs.starts_with('=') {
        return None;
    }
    Some((name, rhs))
}

/// Interactive evaluation session: scratch bindings plus input history.
///
/// Locals live only in the session and are never written back into the
/// workflow scope. They shadow scope variables of the same name.
#[derive(Debug, Clone)]
pub struct ReplSession {
    locals: ScopeMap,
    history: VecDeque<String>,
    history_limit: usize,
}

impl ReplSession {
    pub fn new(history_limit: usize) -> Self {
        Self {
            locals: ScopeMap::new(),
            history: VecDeque::new(),
            history_limit,
        }
    }

    /// Evaluate `input` against `scope` overlaid with the session locals.
    ///
    /// Input that does not parse as an expression is retried as an assignment.
    pub fn evaluate(&mut self, input: &str, scope: &ScopeMap) -> EvalOutcome {
        self.record(input);

        let mut namespace = scope.clone();
        namespace.extend(self.locals.iter().map(|(k, v)| (k.clone(), v.clone())));

        match evaluate(input, &namespace) {
            Ok(value) => EvalOutcome::value(value),
            Err(err @ EvalError::Syntax { .. }) => match parse_assignment(input) {
                Some((name, rhs)) => match evaluate(rhs, &namespace) {
                    Ok(value) => {
                        tracing::debug!(name = %name, "repl binding updated");
                        self.locals.insert(name.to_string(), value);
                        EvalOutcome::statement()
                    }
                    Err(rhs_err) => EvalOutcome::error(rhs_err.to_string()),
                },
                None => EvalOutcome::error(err.to_string()),
            },
            Err(err) => EvalOutcome::error(err.to_string()),
        }
    }

    fn record(&mut self, input: &str) {
        let entry = input.trim();
        if entry.is_empty() || self.history_limit == 0 {
            return;
        }
        if self.history.len() >= self.history_limit {
            self.history.pop_front();
        }
        self.history.push_back(entry.to_string());
    }

    /// Oldest first
    pub fn history(&self) -> Vec<String> {
        self.history.iter().cloned().collect()
    }

    pub fn locals(&self) -> &ScopeMap {
        &self.locals
    }

    pub fn clear(&mut self) {
        self.locals.clear();
        self.history.clear();
    }
}

impl Default for ReplSession {
    fn default() -> Self {
        Self::new(100)
    }
}
