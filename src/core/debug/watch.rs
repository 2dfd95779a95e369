use serde::Serialize;
use serde_json::Value;

use crate::core::variable_scope::ScopeMap;
use crate::evaluator::evaluate;

/// An expression re-evaluated against the scope on every suspend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WatchExpression {
    pub expression: String,
    pub last_value: Option<Value>,
    pub last_error: Option<String>,
    pub enabled: bool,
}

impl WatchExpression {
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            last_value: None,
            last_error: None,
            enabled: true,
        }
    }

    /// Re-evaluate against `scope`. Disabled watches keep their last result.
    pub fn refresh(&mut self, scope: &ScopeMap) {
        if !self.enabled {
            return;
        }
        match evaluate(&self.expression, scope) {
            Ok(value) => {
                self.last_value = Some(value);
                self.last_error = None;
            }
            Err(err) => {
                self.last_value = None;
                self.last_error = Some(err.to_string());
            }
        }
    }
}

/// Watches in insertion order, which is also display order.
#[derive(Debug, Clone, Default)]
pub struct WatchList {
    watches: Vec<WatchExpression>,
}

impl WatchList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false for blank or already-watched expressions.
    pub fn add(&mut self, expression: &str) -> bool {
        let expression = expression.trim();
        if expression.is_empty() || self.contains(expression) {
            return false;
        }
        self.watches.push(WatchExpression::new(expression));
        true
    }

    pub fn remove(&mut self, expression: &str) -> bool {
        let expression = expression.trim();
        let before = self.watches.len();
        self.watches.retain(|w| w.expression != expression);
        self.watches.len() != before
    }

    /// Flip `enabled`, returning the new value.
    pub fn toggle(&mut self, expression: &str) -> Option<bool> {
        let expression = expression.trim();
        let watch = self.watches.iter_mut().find(|w| w.expression == expression)?;
        watch.enabled = !watch.enabled;
        Some(watch.enabled)
    }

    pub fn contains(&self, expression: &str) -> bool {
        self.watches.iter().any(|w| w.expression == expression.trim())
    }

    pub fn get(&self, expression: &str) -> Option<&WatchExpression> {
        self.watches.iter().find(|w| w.expression == expression.trim())
    }

    /// Copy results evaluated elsewhere onto the watches still present and enabled.
    pub fn store(&mut self, refreshed: &[WatchExpression]) {
        for result in refreshed {
            if let Some(watch) = self
                .watches
                .iter_mut()
                .find(|w| w.enabled && w.expression == result.expression)
            {
                watch.last_value = result.last_value.clone();
                watch.last_error = result.last_error.clone();
            }
        }
    }

    pub fn to_vec(&self) -> Vec<WatchExpression> {
        self.watches.clone()
    }

    pub fn len(&self) -> usize {
        self.watches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watches.is_empty()
    }
}
