use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::variable_scope::ScopeMap;

/// One nested execution region (sub-workflow, loop body, branch body).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallStackFrame {
    pub node_id: String,
    pub node_name: String,
    pub node_type: String,
    pub local_variables: ScopeMap,
    pub entry_time: DateTime<Utc>,
}

impl CallStackFrame {
    pub fn new(
        node_id: impl Into<String>,
        node_name: impl Into<String>,
        node_type: impl Into<String>,
        entry_time: DateTime<Utc>,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            node_name: node_name.into(),
            node_type: node_type.into(),
            local_variables: ScopeMap::new(),
            entry_time,
        }
    }

    pub fn with_locals(mut self, locals: ScopeMap) -> Self {
        self.local_variables = locals;
        self
    }
}

/// LIFO stack of frames. Its depth drives step-over / step-out decisions.
#[derive(Debug, Clone, Default)]
pub struct CallStack {
    frames: Vec<CallStackFrame>,
}

impl CallStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: CallStackFrame) {
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Option<CallStackFrame> {
        self.frames.pop()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn top(&self) -> Option<&CallStackFrame> {
        self.frames.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut CallStackFrame> {
        self.frames.last_mut()
    }

    /// Outermost first, innermost last.
    pub fn frames(&self) -> Vec<CallStackFrame> {
        self.frames.clone()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn frame(id: &str) -> CallStackFrame {
        CallStackFrame::new(id, format!("{} name", id), "iteration", Utc::now())
    }

    #[test]
    fn test_push_pop_depth() {
        let mut stack = CallStack::new();
        assert_eq!(stack.depth(), 0);
        assert!(stack.pop().is_none());

        stack.push(frame("outer"));
        stack.push(frame("inner"));
        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.top().unwrap().node_id, "inner");

        let popped = stack.pop().unwrap();
        assert_eq!(popped.node_id, "inner");
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn test_frames_order_and_clear() {
        let mut stack = CallStack::new();
        stack.push(frame("a"));
        stack.push(frame("b"));
        let ids: Vec<String> = stack.frames().into_iter().map(|f| f.node_id).collect();
        assert_eq!(ids, vec!["a", "b"]);
        stack.clear();
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn test_frame_locals() {
        let mut locals = ScopeMap::new();
        locals.insert("index".into(), json!(3));
        let mut stack = CallStack::new();
        stack.push(frame("loop").with_locals(locals));
        stack
            .top_mut()
            .unwrap()
            .local_variables
            .insert("item".into(), json!("x"));
        let top = stack.top().unwrap();
        assert_eq!(top.local_variables.get("index"), Some(&json!(3)));
        assert_eq!(top.local_variables.get("item"), Some(&json!("x")));
    }
}
