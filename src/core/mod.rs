pub mod debug;
pub mod event_bus;
pub mod runtime_context;
pub mod variable_scope;

pub use debug::{
	Breakpoint,
	BreakpointKind,
	BreakpointOptions,
	CallStackFrame,
	DebugConfig,
	DebugController,
	DebugState,
	ExecutionHook,
	ExecutionSnapshot,
	NoopHook,
	StepMode,
	WatchExpression,
};
pub use event_bus::{DebugEvent, EventBus, EventReceiver, PauseReason};
pub use runtime_context::{RuntimeContext, TimeProvider, IdGenerator, RealTimeProvider, RealIdGenerator, FakeTimeProvider, FakeIdGenerator};
pub use variable_scope::{ScopeMap, VariableScope};
