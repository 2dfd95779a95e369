use std::sync::Arc;

use serde_json::json;

use xworkflow_debugger::{
    BreakpointKind, BreakpointOptions, DebugConfig, DebugController, DebugEvent, DebugState,
    ExecutionHook, VariableScope,
};

/// A tiny scripted executor: a start node, a loop over `items` and an answer.
async fn run_workflow(hook: &dyn ExecutionHook, scope: &VariableScope) {
    hook.before_node("start", scope).await;
    scope.set("items", json!(["alpha", "beta", "gamma"]));
    scope.set("count", json!(0));
    hook.after_node("start", scope).await;

    hook.before_node("loop", scope).await;
    hook.enter_scope("loop", "For each item", "iteration");
    let items = scope.get("items").unwrap_or_else(|| json!([]));
    for item in items.as_array().cloned().unwrap_or_default() {
        hook.before_node("body", scope).await;
        let count = scope.get("count").and_then(|v| v.as_i64()).unwrap_or(0);
        scope.set("item", item);
        scope.set("count", json!(count + 1));
        hook.after_node("body", scope).await;
    }
    hook.exit_scope();
    hook.after_node("loop", scope).await;

    hook.before_node("answer", scope).await;
    let count = scope.get("count").unwrap_or(json!(0));
    scope.set("answer", json!(format!("processed {} items", count)));
    hook.after_node("answer", scope).await;
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    println!("=== XWorkflow Debugger demo ===\n");

    let debugger = Arc::new(DebugController::new(DebugConfig::default()));
    debugger.enable_debug_mode(true);

    let breakpoints = [
        ("start", BreakpointKind::Regular, BreakpointOptions::default()),
        ("body", BreakpointKind::Conditional, BreakpointOptions::condition("count >= 2")),
        (
            "answer",
            BreakpointKind::LogPoint,
            BreakpointOptions::log_message("answering after {count} items"),
        ),
    ];
    for (node_id, kind, options) in breakpoints {
        if let Err(e) = debugger.add_breakpoint(node_id, kind, options) {
            eprintln!("[ERR] breakpoint on {}: {}", node_id, e);
            return;
        }
    }
    debugger.add_watch("count * 10");
    debugger.add_watch("item");

    let mut events = debugger.subscribe();
    let scope = VariableScope::new();
    debugger.attach_scope(scope.clone());

    let executor = {
        let debugger = debugger.clone();
        let scope = scope.clone();
        tokio::spawn(async move { run_workflow(debugger.as_ref(), &scope).await })
    };

    let mut pauses = 0;
    let mut snapshot_id = None;
    while !executor.is_finished() {
        let event = tokio::select! {
            event = events.recv() => event,
            _ = tokio::time::sleep(std::time::Duration::from_millis(50)) => continue,
        };
        let Some(event) = event else { break };
        if !matches!(event, DebugEvent::Suspended) {
            continue;
        }

        pauses += 1;
        if let DebugState::Suspended { node_id, reason } = debugger.state() {
            println!("[PAUSE] {} ({})", node_id, reason.as_str());
        }
        for watch in debugger.watches() {
            match (&watch.last_value, &watch.last_error) {
                (Some(value), _) => println!("  watch {} = {}", watch.expression, value),
                (None, Some(error)) => println!("  watch {} ! {}", watch.expression, error),
                (None, None) => {}
            }
        }

        match pauses {
            1 => {
                debugger.step_over();
            }
            2 => {
                let (value, _) = debugger.evaluate_expression("items[1]").into_pair();
                println!("  repl items[1] => {:?}", value);
                snapshot_id = debugger.create_snapshot("before loop");
                debugger.continue_execution();
            }
            3 => {
                println!("  call stack depth = {}", debugger.call_stack_depth());
                debugger.set_variable_value("count", json!(100));
                debugger.step_out();
            }
            _ => {
                debugger.continue_execution();
            }
        }
    }

    if let Err(e) = executor.await {
        eprintln!("[ERR] executor task failed: {}", e);
        return;
    }

    println!("\n[OK] answer = {}", scope.get("answer").unwrap_or(json!(null)));
    println!("[OK] path = {:?}", debugger.execution_path());
    if let Some(id) = snapshot_id {
        debugger.restore_snapshot(&id);
        println!("[OK] restored snapshot {}: count = {}", id, scope.get("count").unwrap_or(json!(null)));
    }
    debugger.enable_debug_mode(false);
}
