use std::collections::HashMap;

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;

use super::breakpoint::{Breakpoint, BreakpointKind, BreakpointOptions};
use super::call_stack::{CallStack, CallStackFrame};
use super::config::DebugConfig;
use super::gate::ResumeGate;
use super::snapshot::{ExecutionSnapshot, SnapshotStore};
use super::watch::{WatchExpression, WatchList};
use crate::core::event_bus::{DebugEvent, EventBus, EventReceiver, PauseReason};
use crate::core::runtime_context::{RealIdGenerator, RuntimeContext};
use crate::core::variable_scope::{ScopeMap, VariableScope};
use crate::error::{DebugError, DebugResult};
use crate::evaluator::{EvalOutcome, ReplSession};

/// How far to run before suspending again, chosen by the last resume command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepMode {
    Over,
    Into,
    Out,
}

/// Current state of the debugger.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DebugState {
    Disabled,
    Running,
    Suspended { node_id: String, reason: PauseReason },
}

#[derive(Debug, Clone)]
struct Suspension {
    node_id: String,
    reason: PauseReason,
}

struct ControllerState {
    enabled: bool,
    gate: Option<ResumeGate>,
    breakpoints: HashMap<String, Breakpoint>,
    watches: WatchList,
    call_stack: CallStack,
    step_mode: Option<StepMode>,
    step_target_depth: usize,
    suspended: Option<Suspension>,
    pause_requested: bool,
    initial_pending: bool,
    live_scope: Option<VariableScope>,
    current_node: Option<String>,
    execution_path: Vec<String>,
    snapshots: SnapshotStore,
}

impl ControllerState {
    fn new(config: &DebugConfig) -> Self {
        Self {
            enabled: false,
            gate: None,
            breakpoints: HashMap::new(),
            watches: WatchList::new(),
            call_stack: CallStack::new(),
            step_mode: None,
            step_target_depth: 0,
            suspended: None,
            pause_requested: false,
            initial_pending: false,
            live_scope: None,
            current_node: None,
            execution_path: Vec::new(),
            snapshots: SnapshotStore::new(config.max_snapshots),
        }
    }

    fn live_variables(&self) -> ScopeMap {
        self.live_scope
            .as_ref()
            .map(VariableScope::snapshot)
            .unwrap_or_default()
    }

    fn step_pause_due(&self) -> bool {
        let depth = self.call_stack.depth();
        match self.step_mode {
            Some(StepMode::Into) => true,
            Some(StepMode::Over) => depth <= self.step_target_depth,
            Some(StepMode::Out) => depth < self.step_target_depth,
            None => false,
        }
    }
}

/// Coordinates breakpoints, stepping, watches, snapshots and the REPL for one
/// workflow run.
///
/// The executor calls [`check_breakpoint`](Self::check_breakpoint) before and
/// [`should_pause_for_step`](Self::should_pause_for_step) after every node; both
/// may suspend the calling task until a resume command arrives. Every other
/// method is synchronous and may be called at any time, including while
/// execution is suspended. Share the controller between the executor and the
/// operator side with an `Arc`.
///
/// Expressions (conditions, watches, REPL input) are never evaluated while the
/// state lock is held.
pub struct DebugController {
    state: Mutex<ControllerState>,
    repl: Mutex<ReplSession>,
    events: EventBus,
    config: DebugConfig,
    runtime: RuntimeContext,
}

impl DebugController {
    pub fn new(config: DebugConfig) -> Self {
        let runtime = RuntimeContext::default().with_id_generator(std::sync::Arc::new(
            RealIdGenerator::new(config.snapshot_id_length),
        ));
        Self::with_runtime(config, runtime)
    }

    pub fn with_runtime(config: DebugConfig, runtime: RuntimeContext) -> Self {
        Self {
            state: Mutex::new(ControllerState::new(&config)),
            repl: Mutex::new(ReplSession::new(config.repl_history_limit)),
            events: EventBus::new(),
            config,
            runtime,
        }
    }

    pub fn config(&self) -> &DebugConfig {
        &self.config
    }

    /// Receive every notification published from now on.
    pub fn subscribe(&self) -> EventReceiver {
        self.events.subscribe()
    }

    // ================================
    // Lifecycle
    // ================================

    /// Turn debug mode on or off.
    ///
    /// Turning it on installs a fresh, open gate and clears the call stack, step
    /// mode and execution path. Turning it off releases any suspended task and
    /// detaches the live scope. Breakpoints, watches and snapshots survive both.
    pub fn enable_debug_mode(&self, enabled: bool) {
        let released = {
            let mut state = self.state.lock();
            let released = state.suspended.take().is_some();
            if let Some(gate) = state.gate.take() {
                gate.open();
            }
            state.enabled = enabled;
            state.call_stack.clear();
            state.step_mode = None;
            state.step_target_depth = 0;
            state.pause_requested = false;
            if enabled {
                state.gate = Some(ResumeGate::new());
                state.initial_pending = self.config.break_on_start;
                state.execution_path.clear();
            } else {
                state.initial_pending = false;
                state.live_scope = None;
                state.current_node = None;
            }
            released
        };

        tracing::debug!(enabled, released, "debug mode changed");
        if released {
            self.events.publish(DebugEvent::Resumed);
        }
        self.events.publish(DebugEvent::DebugModeChanged { enabled });
    }

    pub fn is_enabled(&self) -> bool {
        self.state.lock().enabled
    }

    /// Bind the live scope of the run before the first node executes.
    pub fn attach_scope(&self, scope: VariableScope) {
        self.state.lock().live_scope = Some(scope);
    }

    pub fn detach_scope(&self) {
        self.state.lock().live_scope = None;
    }

    pub fn state(&self) -> DebugState {
        let state = self.state.lock();
        match (&state.suspended, state.enabled) {
            (_, false) => DebugState::Disabled,
            (Some(s), true) => DebugState::Suspended {
                node_id: s.node_id.clone(),
                reason: s.reason,
            },
            (None, true) => DebugState::Running,
        }
    }

    pub fn is_suspended(&self) -> bool {
        self.state.lock().suspended.is_some()
    }

    pub fn current_node(&self) -> Option<String> {
        self.state.lock().current_node.clone()
    }

    pub fn step_mode(&self) -> Option<StepMode> {
        self.state.lock().step_mode
    }

    /// Node ids whose execution has completed, in order.
    pub fn execution_path(&self) -> Vec<String> {
        self.state.lock().execution_path.clone()
    }

    // ================================
    // Executor hooks
    // ================================

    /// Called before a node runs. Returns true if execution was suspended here.
    pub async fn check_breakpoint(&self, node_id: &str, scope: &VariableScope) -> bool {
        let candidate = {
            let mut state = self.state.lock();
            if !state.enabled {
                return false;
            }
            state.live_scope = Some(scope.clone());
            state.current_node = Some(node_id.to_string());

            match state.breakpoints.get_mut(node_id) {
                Some(breakpoint) => {
                    if breakpoint.record_hit() {
                        Some(breakpoint.clone())
                    } else {
                        None
                    }
                }
                None => None,
            }
        };
        let hit = match candidate {
            Some(breakpoint) => breakpoint.decide(&scope.snapshot()),
            None => false,
        };

        let reason = {
            let mut state = self.state.lock();
            if !state.enabled {
                return false;
            }
            let reason = if hit {
                Some(PauseReason::Breakpoint)
            } else if state.initial_pending {
                Some(PauseReason::Initial)
            } else if state.pause_requested {
                Some(PauseReason::UserRequested)
            } else {
                None
            };
            if reason.is_some() {
                state.initial_pending = false;
                state.pause_requested = false;
            }
            reason
        };

        let Some(reason) = reason else {
            return false;
        };
        if reason == PauseReason::Breakpoint {
            self.events.publish(DebugEvent::BreakpointHit {
                node_id: node_id.to_string(),
            });
        }
        self.suspend(node_id, reason).await;
        true
    }

    /// Called after a node ran. Returns true if execution was suspended here.
    pub async fn should_pause_for_step(&self, node_id: &str, scope: &VariableScope) -> bool {
        let pause = {
            let mut state = self.state.lock();
            if !state.enabled {
                return false;
            }
            state.live_scope = Some(scope.clone());
            state.current_node = Some(node_id.to_string());
            state.execution_path.push(node_id.to_string());
            state.step_pause_due()
        };
        if !pause {
            return false;
        }

        self.events.publish(DebugEvent::StepCompleted {
            node_id: node_id.to_string(),
        });
        self.suspend(node_id, PauseReason::Step).await;
        true
    }

    /// Whether the current step mode would pause after a node at the current
    /// call-stack depth. Does not suspend.
    pub fn step_pause_due(&self) -> bool {
        let state = self.state.lock();
        state.enabled && state.step_pause_due()
    }

    async fn suspend(&self, node_id: &str, reason: PauseReason) {
        let (variables, watches) = self.evaluate_watches();
        let waiter = {
            let mut state = self.state.lock();
            let Some(gate) = state.gate.as_ref() else {
                return;
            };
            let waiter = gate.close_and_wait();
            state.suspended = Some(Suspension {
                node_id: node_id.to_string(),
                reason,
            });
            // Published before the lock is released so that a resume cannot
            // overtake the suspension notifications.
            self.publish_refresh(&mut state, variables, &watches);
            self.events.publish(DebugEvent::Suspended);
            waiter
        };

        tracing::info!(node_id, reason = reason.as_str(), "execution suspended");
        waiter.wait().await;
        tracing::debug!(node_id, "execution resumed");
    }

    /// Re-evaluate watches and publish variables, watches and call stack.
    pub fn refresh_debug_state(&self) {
        let (variables, watches) = self.evaluate_watches();
        let mut state = self.state.lock();
        self.publish_refresh(&mut state, variables, &watches);
    }

    fn evaluate_watches(&self) -> (ScopeMap, Vec<WatchExpression>) {
        let (variables, mut watches) = {
            let state = self.state.lock();
            (state.live_variables(), state.watches.to_vec())
        };
        for watch in &mut watches {
            watch.refresh(&variables);
        }
        (variables, watches)
    }

    fn publish_refresh(
        &self,
        state: &mut ControllerState,
        variables: ScopeMap,
        watches: &[WatchExpression],
    ) {
        state.watches.store(watches);
        self.events.publish(DebugEvent::VariablesUpdated { variables });
        self.events.publish(DebugEvent::WatchesUpdated {
            watches: state.watches.to_vec(),
        });
        self.events.publish(DebugEvent::CallStackUpdated {
            frames: state.call_stack.frames(),
        });
    }

    // ================================
    // Resume commands
    // ================================

    pub fn step_over(&self) -> bool {
        self.resume(Some(StepMode::Over))
    }

    pub fn step_into(&self) -> bool {
        self.resume(Some(StepMode::Into))
    }

    pub fn step_out(&self) -> bool {
        self.resume(Some(StepMode::Out))
    }

    pub fn continue_execution(&self) -> bool {
        self.resume(None)
    }

    /// Suspend at the next node reached, whatever its breakpoints say.
    pub fn request_pause(&self) -> bool {
        let mut state = self.state.lock();
        if !state.enabled {
            return false;
        }
        state.pause_requested = true;
        true
    }

    fn resume(&self, mode: Option<StepMode>) -> bool {
        {
            let mut state = self.state.lock();
            if state.suspended.take().is_none() {
                tracing::debug!(?mode, "resume ignored: execution is not suspended");
                return false;
            }
            state.step_mode = mode;
            state.step_target_depth = state.call_stack.depth();
            if let Some(gate) = &state.gate {
                gate.open();
            }
        }
        self.events.publish(DebugEvent::Resumed);
        true
    }

    // ================================
    // Call stack
    // ================================

    pub fn push_call_stack(&self, node_id: &str, name: &str, node_type: &str) {
        let frame = CallStackFrame::new(node_id, name, node_type, self.runtime.time_provider.now());
        self.push_call_stack_frame(frame);
    }

    pub fn push_call_stack_frame(&self, frame: CallStackFrame) {
        let mut state = self.state.lock();
        if !state.enabled {
            return;
        }
        state.call_stack.push(frame);
    }

    pub fn pop_call_stack(&self) -> Option<CallStackFrame> {
        let mut state = self.state.lock();
        if !state.enabled {
            return None;
        }
        state.call_stack.pop()
    }

    pub fn call_stack(&self) -> Vec<CallStackFrame> {
        self.state.lock().call_stack.frames()
    }

    pub fn call_stack_depth(&self) -> usize {
        self.state.lock().call_stack.depth()
    }

    // ================================
    // Breakpoints
    // ================================

    /// Add a breakpoint, replacing any existing one on the same node.
    pub fn add_breakpoint(
        &self,
        node_id: &str,
        kind: BreakpointKind,
        options: BreakpointOptions,
    ) -> DebugResult<Breakpoint> {
        let breakpoint = Breakpoint::new(node_id, kind, options, self.runtime.time_provider.now())?;
        warn_on_bad_condition(&breakpoint);
        self.state
            .lock()
            .breakpoints
            .insert(node_id.to_string(), breakpoint.clone());
        tracing::debug!(node_id, ?kind, "breakpoint added");
        self.events.publish(DebugEvent::BreakpointAdded {
            node_id: node_id.to_string(),
        });
        Ok(breakpoint)
    }

    /// Change kind and fields of an existing breakpoint; its hit count is kept.
    pub fn edit_breakpoint(
        &self,
        node_id: &str,
        kind: BreakpointKind,
        options: BreakpointOptions,
    ) -> DebugResult<Breakpoint> {
        let mut state = self.state.lock();
        let breakpoint = state
            .breakpoints
            .get_mut(node_id)
            .ok_or_else(|| DebugError::BreakpointNotFound(node_id.to_string()))?;
        breakpoint.apply(kind, options)?;
        warn_on_bad_condition(breakpoint);
        Ok(breakpoint.clone())
    }

    pub fn remove_breakpoint(&self, node_id: &str) -> bool {
        let removed = self.state.lock().breakpoints.remove(node_id).is_some();
        if removed {
            tracing::debug!(node_id, "breakpoint removed");
            self.events.publish(DebugEvent::BreakpointRemoved {
                node_id: node_id.to_string(),
            });
        }
        removed
    }

    /// Returns the number of breakpoints removed.
    pub fn clear_all_breakpoints(&self) -> usize {
        let mut removed: Vec<String> = {
            let mut state = self.state.lock();
            state.breakpoints.drain().map(|(node_id, _)| node_id).collect()
        };
        removed.sort();
        for node_id in &removed {
            self.events.publish(DebugEvent::BreakpointRemoved {
                node_id: node_id.clone(),
            });
        }
        removed.len()
    }

    /// Flip `enabled`, returning the new value.
    pub fn toggle_breakpoint_enabled(&self, node_id: &str) -> Option<bool> {
        let enabled = {
            let mut state = self.state.lock();
            let breakpoint = state.breakpoints.get_mut(node_id)?;
            breakpoint.enabled = !breakpoint.enabled;
            breakpoint.enabled
        };
        self.events.publish(DebugEvent::BreakpointToggled {
            node_id: node_id.to_string(),
            enabled,
        });
        Some(enabled)
    }

    pub fn reset_hit_count(&self, node_id: &str) -> bool {
        match self.state.lock().breakpoints.get_mut(node_id) {
            Some(breakpoint) => {
                breakpoint.reset_hit_count();
                true
            }
            None => false,
        }
    }

    pub fn get_breakpoint(&self, node_id: &str) -> Option<Breakpoint> {
        self.state.lock().breakpoints.get(node_id).cloned()
    }

    pub fn has_breakpoint(&self, node_id: &str) -> bool {
        self.state.lock().breakpoints.contains_key(node_id)
    }

    /// Sorted by node id.
    pub fn breakpoints(&self) -> Vec<Breakpoint> {
        let mut all: Vec<Breakpoint> = self.state.lock().breakpoints.values().cloned().collect();
        all.sort_by(|a, b| a.node_id.cmp(&b.node_id));
        all
    }

    // ================================
    // Watches
    // ================================

    /// Returns false for blank or duplicate expressions.
    pub fn add_watch(&self, expression: &str) -> bool {
        let variables = {
            let mut state = self.state.lock();
            if !state.watches.add(expression) {
                return false;
            }
            state.live_scope.as_ref().map(VariableScope::snapshot)
        };
        let watches = match variables {
            Some(variables) => {
                let mut watch = WatchExpression::new(expression.trim());
                watch.refresh(&variables);
                let mut state = self.state.lock();
                state.watches.store(std::slice::from_ref(&watch));
                state.watches.to_vec()
            }
            None => self.state.lock().watches.to_vec(),
        };
        self.events.publish(DebugEvent::WatchesUpdated { watches });
        true
    }

    pub fn remove_watch(&self, expression: &str) -> bool {
        let watches = {
            let mut state = self.state.lock();
            if !state.watches.remove(expression) {
                return false;
            }
            state.watches.to_vec()
        };
        self.events.publish(DebugEvent::WatchesUpdated { watches });
        true
    }

    pub fn toggle_watch_enabled(&self, expression: &str) -> Option<bool> {
        self.state.lock().watches.toggle(expression)
    }

    pub fn watches(&self) -> Vec<WatchExpression> {
        self.state.lock().watches.to_vec()
    }

    // ================================
    // Expressions and variables
    // ================================

    /// Evaluate REPL input against a copy of the live scope plus session locals.
    pub fn evaluate_expression(&self, expression: &str) -> EvalOutcome {
        let variables = self.variables();
        self.repl.lock().evaluate(expression, &variables)
    }

    pub fn get_repl_history(&self) -> Vec<String> {
        self.repl.lock().history()
    }

    pub fn repl_locals(&self) -> ScopeMap {
        self.repl.lock().locals().clone()
    }

    pub fn clear_repl_session(&self) {
        self.repl.lock().clear();
    }

    /// Copy of the live scope; empty when no scope is attached.
    pub fn variables(&self) -> ScopeMap {
        self.state.lock().live_variables()
    }

    pub fn get_variable_value(&self, name: &str) -> Option<Value> {
        self.state.lock().live_scope.as_ref()?.get(name)
    }

    /// The only path through which the debugger writes to the live scope.
    pub fn set_variable_value(&self, name: &str, value: Value) -> bool {
        let variables = {
            let state = self.state.lock();
            let Some(scope) = state.live_scope.as_ref() else {
                return false;
            };
            scope.set(name, value);
            scope.snapshot()
        };
        tracing::debug!(name, "variable updated from debugger");
        self.events.publish(DebugEvent::VariablesUpdated { variables });
        true
    }

    // ================================
    // Snapshots
    // ================================

    /// Deep-copy the live scope and execution path. Returns the new id, or
    /// `None` when no scope is attached.
    pub fn create_snapshot(&self, description: &str) -> Option<String> {
        let (snapshot_id, evicted) = {
            let mut state = self.state.lock();
            let variables = state.live_scope.as_ref()?.snapshot();
            let mut snapshot_id = self.runtime.id_generator.next_id();
            while state.snapshots.contains(&snapshot_id) {
                snapshot_id = self.runtime.id_generator.next_id();
            }
            let snapshot = ExecutionSnapshot {
                snapshot_id: snapshot_id.clone(),
                node_id: state.current_node.clone(),
                variables,
                execution_path: state.execution_path.clone(),
                timestamp: self.runtime.time_provider.now(),
                description: description.to_string(),
            };
            let evicted = state.snapshots.insert(snapshot);
            (snapshot_id, evicted)
        };
        if !evicted.is_empty() {
            tracing::debug!(?evicted, "snapshots evicted");
        }
        tracing::info!(snapshot_id = %snapshot_id, "snapshot created");
        self.events.publish(DebugEvent::SnapshotCreated {
            snapshot_id: snapshot_id.clone(),
        });
        Some(snapshot_id)
    }

    /// Overwrite the live scope in place with a copy of the snapshot's variables.
    pub fn restore_snapshot(&self, snapshot_id: &str) -> bool {
        {
            let state = self.state.lock();
            let (Some(scope), Some(snapshot)) =
                (state.live_scope.as_ref(), state.snapshots.get(snapshot_id))
            else {
                return false;
            };
            scope.replace_all(&snapshot.variables);
        }
        tracing::info!(snapshot_id, "snapshot restored");
        self.events.publish(DebugEvent::SnapshotRestored {
            snapshot_id: snapshot_id.to_string(),
        });
        self.refresh_debug_state();
        true
    }

    /// Idempotent; returns whether a snapshot was removed.
    pub fn delete_snapshot(&self, snapshot_id: &str) -> bool {
        self.state.lock().snapshots.remove(snapshot_id)
    }

    pub fn get_snapshot(&self, snapshot_id: &str) -> Option<ExecutionSnapshot> {
        self.state.lock().snapshots.get(snapshot_id).cloned()
    }

    /// Creation order, oldest first.
    pub fn list_snapshots(&self) -> Vec<ExecutionSnapshot> {
        self.state.lock().snapshots.list()
    }
}

fn warn_on_bad_condition(breakpoint: &Breakpoint) {
    if let Err(err) = breakpoint.check_condition() {
        tracing::warn!(
            node_id = %breakpoint.node_id,
            error = %err,
            "breakpoint condition does not parse; it will always break"
        );
    }
}

impl Default for DebugController {
    fn default() -> Self {
        Self::new(DebugConfig::default())
    }
}
