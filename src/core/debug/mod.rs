//! Interactive debugger: breakpoints, stepping, watches, snapshots and the
//! suspend/resume protocol between a workflow executor and an operator.

pub mod breakpoint;
pub mod call_stack;
pub mod config;
pub mod controller;
pub mod gate;
pub mod hook;
pub mod snapshot;
pub mod watch;

pub use breakpoint::{Breakpoint, BreakpointKind, BreakpointOptions};
pub use call_stack::{CallStack, CallStackFrame};
pub use config::DebugConfig;
pub use controller::{DebugController, DebugState, StepMode};
pub use gate::{GateWaiter, ResumeGate};
pub use hook::{ExecutionHook, NoopHook};
pub use snapshot::{ExecutionSnapshot, SnapshotStore};
pub use watch::{WatchExpression, WatchList};
