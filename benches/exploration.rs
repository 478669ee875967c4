//! Benchmarks for exploded-graph exploration.
//!
//! Measures end-to-end walks over synthetic methods:
//! - A chain of independent null checks (path count doubles per check)
//! - A loop bounded by the program-point visit cap
//! - Batch exploration of many small methods on the rayon pool

extern crate symscope;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use symscope::prelude::*;

/// Builds `if (p0 == null) {} if (p1 == null) {} ...` over `count` parameters.
fn null_check_chain(count: usize) -> (ControlFlowGraph<Op>, Declaration) {
    let mut symbols = SymbolTable::new();
    let mut builder = CfgBuilder::new();
    let mut declaration = Declaration::new(format!("Chain{count}"));

    let mut tests = Vec::with_capacity(count);
    for index in 0..count {
        let parameter = symbols.parameter(&format!("p{index}"));
        declaration = declaration.with_parameter(Parameter::new(parameter, TypeFlags::empty()));
        let test = builder.add_block(vec![
            Op::Load(parameter),
            Op::LoadNull,
            Op::Compare(ComparisonOp::Eq),
        ]);
        let then = builder.add_block(vec![Op::Load(parameter), Op::Pop]);
        tests.push((test, then));
    }
    let exit = builder.add_exit();

    for (index, (test, then)) in tests.iter().enumerate() {
        let next = tests.get(index + 1).map_or(exit, |(next, _)| *next);
        builder
            .terminate(*test, Terminator::branch(*then, next))
            .unwrap();
        builder.terminate(*then, Terminator::goto(next)).unwrap();
    }

    (builder.build().unwrap(), declaration)
}

/// Builds `while (x != null) { x = x.Next; }`.
fn linked_list_walk() -> (ControlFlowGraph<Op>, Declaration) {
    let mut symbols = SymbolTable::new();
    let x = symbols.parameter("x");

    let mut builder = CfgBuilder::new();
    let head = builder.add_block(vec![Op::Load(x), Op::LoadNull, Op::Compare(ComparisonOp::Ne)]);
    let body = builder.add_block(vec![Op::Load(x), Op::MemberAccess, Op::Store(x)]);
    let exit = builder.add_exit();
    builder.terminate(head, Terminator::branch(body, exit)).unwrap();
    builder.terminate(body, Terminator::goto(head)).unwrap();

    let declaration =
        Declaration::new("Walk").with_parameter(Parameter::new(x, TypeFlags::empty()));
    (builder.build().unwrap(), declaration)
}

/// Benchmark exploring chains of independent null checks.
fn bench_null_check_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("null_check_chain");
    for count in [2, 4, 8] {
        let (cfg, declaration) = null_check_chain(count);
        let liveness = LiveVariables::compute(&cfg);

        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| {
                let mut graph =
                    ExplodedGraph::new(&cfg, &declaration, &liveness, StackMachineVisitor::new());
                let outcome = graph.walk().unwrap();
                black_box((outcome, graph.stats().exit_paths))
            });
        });
    }
    group.finish();
}

/// Benchmark a loop until the visit cap stops it.
fn bench_loop_visit_cap(c: &mut Criterion) {
    let (cfg, declaration) = linked_list_walk();
    let liveness = LiveVariables::compute(&cfg);

    let mut group = c.benchmark_group("loop_visit_cap");
    for visits in [2, 8, 32] {
        let config = ExplorationConfig::default().with_max_program_point_visits(visits);
        group.bench_with_input(BenchmarkId::from_parameter(visits), &config, |b, config| {
            b.iter(|| {
                let mut graph =
                    ExplodedGraph::new(&cfg, &declaration, &liveness, StackMachineVisitor::new())
                        .with_config(config.clone());
                black_box(graph.walk().unwrap())
            });
        });
    }
    group.finish();
}

/// Benchmark parallel exploration of many methods.
fn bench_explore_methods(c: &mut Criterion) {
    let methods: Vec<MethodBody<Op>> = (0..64)
        .map(|index| {
            let (cfg, declaration) = null_check_chain(1 + index % 6);
            MethodBody::new(declaration, cfg)
        })
        .collect();
    let config = ExplorationConfig::quick();

    c.bench_function("explore_methods_64", |b| {
        b.iter(|| {
            let results = explore_methods(black_box(&methods), &config, |_| {
                StackMachineVisitor::new()
            });
            black_box(results)
        });
    });
}

criterion_group!(
    benches,
    bench_null_check_chain,
    bench_loop_visit_cap,
    bench_explore_methods
);
criterion_main!(benches);
