use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::variable_scope::ScopeMap;
use crate::error::{DebugError, DebugResult};
use crate::evaluator::{evaluate_condition, render_log_message, validate_expression};

/// Which rule a breakpoint applies when its node is reached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakpointKind {
    #[default]
    Regular,
    Conditional,
    HitCount,
    LogPoint,
}

/// Optional fields supplied with `add_breakpoint` / `edit_breakpoint`.
///
/// `None` leaves the breakpoint's current value untouched on edit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakpointOptions {
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub hit_count_target: Option<u32>,
    #[serde(default)]
    pub log_message: Option<String>,
}

impl BreakpointOptions {
    pub fn condition(expr: impl Into<String>) -> Self {
        Self {
            condition: Some(expr.into()),
            ..Self::default()
        }
    }

    pub fn hit_count(target: u32) -> Self {
        Self {
            hit_count_target: Some(target),
            ..Self::default()
        }
    }

    pub fn log_message(template: impl Into<String>) -> Self {
        Self {
            log_message: Some(template.into()),
            ..Self::default()
        }
    }
}

/// A per-node rule deciding whether execution suspends there.
///
/// All kind-specific fields are kept regardless of the active kind so that an
/// edit can switch kinds without losing them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breakpoint {
    pub node_id: String,
    pub enabled: bool,
    pub kind: BreakpointKind,
    pub condition: Option<String>,
    pub hit_count_target: u32,
    pub log_message: Option<String>,
    pub hit_count: u32,
    pub created_at: DateTime<Utc>,
}

impl Breakpoint {
    pub fn new(
        node_id: impl Into<String>,
        kind: BreakpointKind,
        options: BreakpointOptions,
        created_at: DateTime<Utc>,
    ) -> DebugResult<Self> {
        let mut breakpoint = Breakpoint {
            node_id: node_id.into(),
            enabled: true,
            kind,
            condition: None,
            hit_count_target: 1,
            log_message: None,
            hit_count: 0,
            created_at,
        };
        breakpoint.apply(kind, options)?;
        Ok(breakpoint)
    }

    /// Switch kind and overwrite the supplied fields. The hit counter is kept.
    pub fn apply(&mut self, kind: BreakpointKind, options: BreakpointOptions) -> DebugResult<()> {
        if options.hit_count_target == Some(0) {
            return Err(DebugError::InvalidBreakpoint(format!(
                "hit_count_target for node '{}' must be at least 1",
                self.node_id
            )));
        }
        self.kind = kind;
        if let Some(condition) = options.condition {
            self.condition = Some(condition);
        }
        if let Some(target) = options.hit_count_target {
            self.hit_count_target = target;
        }
        if let Some(message) = options.log_message {
            self.log_message = Some(message);
        }
        Ok(())
    }

    /// Decide whether to suspend at this node.
    ///
    /// Disabled breakpoints are inert and do not count hits. Enabled ones count
    /// every evaluation, whatever the outcome.
    pub fn should_break(&mut self, scope: &ScopeMap) -> bool {
        self.record_hit() && self.decide(scope)
    }

    /// Count a visit. Returns false, without counting, when disabled.
    pub fn record_hit(&mut self) -> bool {
        if !self.enabled {
            return false;
        }
        self.hit_count = self.hit_count.saturating_add(1);
        true
    }

    /// Apply the kind's rule to an already counted visit.
    pub fn decide(&self, scope: &ScopeMap) -> bool {
        match self.kind {
            BreakpointKind::Regular => true,
            BreakpointKind::Conditional => self.condition_holds(scope),
            BreakpointKind::HitCount => self.hit_count >= self.hit_count_target,
            BreakpointKind::LogPoint => {
                let message = self.format_log_message(scope);
                tracing::info!(
                    target: "xworkflow_debugger::logpoint",
                    node_id = %self.node_id,
                    "{}",
                    message
                );
                false
            }
        }
    }

    /// Parse-check the condition of a Conditional breakpoint.
    pub fn check_condition(&self) -> DebugResult<()> {
        if self.kind != BreakpointKind::Conditional {
            return Ok(());
        }
        match self.condition.as_deref().map(str::trim) {
            Some(condition) if !condition.is_empty() => Ok(validate_expression(condition)?),
            _ => Ok(()),
        }
    }

    fn condition_holds(&self, scope: &ScopeMap) -> bool {
        let condition = match self.condition.as_deref().map(str::trim) {
            Some(c) if !c.is_empty() => c,
            _ => return true,
        };
        match evaluate_condition(condition, scope) {
            Ok(result) => result,
            Err(err) => {
                // Fail open: a broken condition still stops here.
                tracing::warn!(
                    node_id = %self.node_id,
                    condition = %condition,
                    error = %err,
                    "breakpoint condition failed to evaluate; breaking"
                );
                true
            }
        }
    }

    /// Log-point text with `{name}` placeholders filled from `scope`.
    pub fn format_log_message(&self, scope: &ScopeMap) -> String {
        match &self.log_message {
            Some(template) => render_log_message(template, scope),
            None => format!("log point reached at node '{}'", self.node_id),
        }
    }

    pub fn reset_hit_count(&mut self) {
        self.hit_count = 0;
    }
}
