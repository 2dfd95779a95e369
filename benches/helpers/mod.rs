use std::sync::Arc;

use tokio::runtime::Runtime;

use xworkflow_debugger::{
    DebugConfig, DebugController, FakeIdGenerator, FakeTimeProvider, RuntimeContext,
};

pub fn bench_context() -> RuntimeContext {
    RuntimeContext::default()
        .with_time_provider(Arc::new(FakeTimeProvider::new(1_700_000_000)))
        .with_id_generator(Arc::new(FakeIdGenerator::new("bench")))
}

pub fn bench_debugger() -> DebugController {
    DebugController::with_runtime(DebugConfig::default(), bench_context())
}

pub fn bench_runtime() -> Runtime {
    Runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to build runtime")
}
