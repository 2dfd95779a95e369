use async_trait::async_trait;

use super::controller::DebugController;
use crate::core::variable_scope::VariableScope;

/// Callbacks the workflow executor invokes around every node and nested region.
///
/// `before_node` and `after_node` return true when the executor was suspended
/// and has since been resumed.
#[async_trait]
pub trait ExecutionHook: Send + Sync {
    async fn before_node(&self, node_id: &str, scope: &VariableScope) -> bool;

    async fn after_node(&self, node_id: &str, scope: &VariableScope) -> bool;

    fn enter_scope(&self, node_id: &str, node_name: &str, node_type: &str);

    fn exit_scope(&self);
}

/// Hook used when no debugger is attached.
pub struct NoopHook;

#[async_trait]
impl ExecutionHook for NoopHook {
    #[inline(always)]
    async fn before_node(&self, _node_id: &str, _scope: &VariableScope) -> bool {
        false
    }

    #[inline(always)]
    async fn after_node(&self, _node_id: &str, _scope: &VariableScope) -> bool {
        false
    }

    fn enter_scope(&self, _node_id: &str, _node_name: &str, _node_type: &str) {}

    fn exit_scope(&self) {}
}

#[async_trait]
impl ExecutionHook for DebugController {
    async fn before_node(&self, node_id: &str, scope: &VariableScope) -> bool {
        self.check_breakpoint(node_id, scope).await
    }

    async fn after_node(&self, node_id: &str, scope: &VariableScope) -> bool {
        self.should_pause_for_step(node_id, scope).await
    }

    fn enter_scope(&self, node_id: &str, node_name: &str, node_type: &str) {
        self.push_call_stack(node_id, node_name, node_type);
    }

    fn exit_scope(&self) {
        self.pop_call_stack();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::debug::{BreakpointKind, BreakpointOptions};
    use std::sync::Arc;

    async fn run_nodes(hook: &dyn ExecutionHook, scope: &VariableScope) -> usize {
        let mut pauses = 0;
        hook.enter_scope("sub", "Sub", "subgraph");
        for node in ["a", "b"] {
            if hook.before_node(node, scope).await {
                pauses += 1;
            }
            if hook.after_node(node, scope).await {
                pauses += 1;
            }
        }
        hook.exit_scope();
        pauses
    }

    #[tokio::test]
    async fn test_noop_hook_never_pauses() {
        assert_eq!(run_nodes(&NoopHook, &VariableScope::new()).await, 0);
    }

    #[tokio::test]
    async fn test_controller_as_hook() {
        let ctl = Arc::new(DebugController::default());
        ctl.enable_debug_mode(true);
        ctl.add_breakpoint("b", BreakpointKind::Regular, BreakpointOptions::default())
            .unwrap();

        let runner = {
            let ctl = ctl.clone();
            tokio::spawn(async move { run_nodes(ctl.as_ref(), &VariableScope::new()).await })
        };

        tokio::time::timeout(std::time::Duration::from_secs(2), async {
            while !ctl.is_suspended() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
        assert_eq!(ctl.current_node().as_deref(), Some("b"));
        assert_eq!(ctl.call_stack_depth(), 1);

        ctl.continue_execution();
        assert_eq!(runner.await.unwrap(), 1);
        assert_eq!(ctl.call_stack_depth(), 0);
        assert_eq!(ctl.execution_path(), vec!["a", "b"]);
    }
}
