//! # XWorkflow Debugger: interactive debugging for workflow runs
//!
//! `xworkflow_debugger` is the debugger core that sits between a workflow
//! executor and an operator (a UI, a CLI, a test). It provides:
//!
//! - **Breakpoints**: Regular, Conditional, HitCount and LogPoint breakpoints
//!   keyed by node id, with hit counting and enable/disable.
//! - **Stepping**: step over, step into, step out and continue, driven by the
//!   depth of a call stack of nested execution regions.
//! - **Inspection**: watch expressions, variable get/set and a sandboxed REPL
//!   with its own session locals.
//! - **Snapshots**: deep copies of the variable scope that can be restored in
//!   place at any later point.
//! - **Suspend/resume**: the executor's task awaits a gate while suspended; the
//!   operator keeps full access to the debugger in the meantime.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use xworkflow_debugger::{
//!     BreakpointKind, BreakpointOptions, DebugController, DebugEvent, VariableScope,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let debugger = Arc::new(DebugController::default());
//!     debugger.enable_debug_mode(true);
//!     debugger
//!         .add_breakpoint("llm", BreakpointKind::Regular, BreakpointOptions::default())
//!         .unwrap();
//!
//!     let mut events = debugger.subscribe();
//!     let scope = VariableScope::new();
//!     let executor = {
//!         let debugger = debugger.clone();
//!         tokio::spawn(async move { debugger.check_breakpoint("llm", &scope).await })
//!     };
//!
//!     while let Some(event) = events.recv().await {
//!         if matches!(event, DebugEvent::Suspended) {
//!             debugger.continue_execution();
//!             break;
//!         }
//!     }
//!     executor.await.unwrap();
//! }
//! ```

pub mod core;
pub mod error;
pub mod evaluator;

pub use crate::core::{
    Breakpoint, BreakpointKind, BreakpointOptions, CallStackFrame, DebugConfig, DebugController,
    DebugEvent, DebugState, EventBus, EventReceiver, ExecutionHook, ExecutionSnapshot,
    FakeIdGenerator, FakeTimeProvider, IdGenerator, NoopHook, PauseReason, RealIdGenerator,
    RealTimeProvider, RuntimeContext, ScopeMap, StepMode, TimeProvider, VariableScope,
    WatchExpression,
};
pub use crate::error::{DebugError, DebugResult, EvalError, EvalResult};
pub use crate::evaluator::{evaluate, evaluate_condition, EvalOutcome, ReplSession};
