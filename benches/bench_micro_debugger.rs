use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;

use xworkflow_debugger::evaluator::{evaluate, render_log_message};
use xworkflow_debugger::{BreakpointKind, BreakpointOptions, ScopeMap, VariableScope};

mod helpers;
use helpers::{bench_debugger, bench_runtime};

fn make_scope(size: usize) -> VariableScope {
    let scope = VariableScope::new();
    for i in 0..size {
        scope.set(format!("var{}", i), json!(i));
    }
    scope.set("count", json!(2));
    scope
}

fn bench_hooks(c: &mut Criterion) {
    let rt = bench_runtime();

    c.bench_function("check_breakpoint_disabled", |b| {
        let debugger = bench_debugger();
        let scope = make_scope(10);
        b.to_async(&rt).iter(|| async {
            black_box(debugger.check_breakpoint("node", &scope).await);
        });
    });

    c.bench_function("check_breakpoint_no_match", |b| {
        let debugger = bench_debugger();
        debugger.enable_debug_mode(true);
        let _ = debugger.add_breakpoint("other", BreakpointKind::Regular, BreakpointOptions::default());
        let scope = make_scope(10);
        b.to_async(&rt).iter(|| async {
            black_box(debugger.check_breakpoint("node", &scope).await);
        });
    });

    for size in [10usize, 100] {
        c.bench_with_input(BenchmarkId::new("check_breakpoint_condition_false", size), &size, |b, size| {
            let debugger = bench_debugger();
            debugger.enable_debug_mode(true);
            let _ = debugger.add_breakpoint(
                "node",
                BreakpointKind::Conditional,
                BreakpointOptions::condition("count > 3"),
            );
            let scope = make_scope(*size);
            b.to_async(&rt).iter(|| async {
                black_box(debugger.check_breakpoint("node", &scope).await);
            });
        });
    }
}

fn bench_evaluation(c: &mut Criterion) {
    let mut namespace = ScopeMap::new();
    namespace.insert("count".into(), json!(7));
    namespace.insert("items".into(), json!([1, 2, 3]));
    namespace.insert("name".into(), json!("alpha"));

    c.bench_function("evaluate_arithmetic", |b| {
        b.iter(|| black_box(evaluate("count * 2 + 1", &namespace)));
    });

    c.bench_function("evaluate_index", |b| {
        b.iter(|| black_box(evaluate("items[1] == 2", &namespace)));
    });

    c.bench_function("render_log_message", |b| {
        b.iter(|| black_box(render_log_message("{name} has {count} items, {missing}", &namespace)));
    });
}

fn bench_snapshots(c: &mut Criterion) {
    for size in [10usize, 1000] {
        c.bench_with_input(BenchmarkId::new("create_snapshot", size), &size, |b, size| {
            let debugger = bench_debugger();
            debugger.attach_scope(make_scope(*size));
            b.iter(|| black_box(debugger.create_snapshot("bench")));
        });
    }
}

criterion_group!(benches, bench_hooks, bench_evaluation, bench_snapshots);
criterion_main!(benches);
