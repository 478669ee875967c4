//! Integration tests exploring small methods end to end.
//!
//! Each test builds the control-flow graph a front-end would produce for a short
//! snippet, explores it with the stack-machine visitor and checks the outcome, the
//! counters and the events of the walk.

use std::time::Duration;

use symscope::prelude::*;
use test_log::test;

/// `if (x == null) { return; } x.Foo();`
///
/// Returns the graph, the declaration and the block holding the call.
fn null_guard(
    symbols: &mut SymbolTable,
) -> Result<(ControlFlowGraph<Op>, Declaration, BlockId)> {
    let x = symbols.parameter("x");

    let mut builder = CfgBuilder::new();
    let test = builder.add_block(vec![Op::Load(x), Op::LoadNull, Op::Compare(ComparisonOp::Eq)]);
    let early = builder.add_block(vec![]);
    let call = builder.add_block(vec![
        Op::Load(x),
        Op::Invoke {
            arguments: 0,
            has_receiver: true,
            returns_value: false,
        },
    ]);
    let exit = builder.add_exit();
    builder.terminate(test, Terminator::branch(early, call))?;
    builder.terminate(
        early,
        Terminator::Jump {
            target: exit,
            kind: JumpKind::Return,
            consumes_value: false,
        },
    )?;
    builder.terminate(call, Terminator::goto(exit))?;

    let declaration =
        Declaration::new("NullGuard").with_parameter(Parameter::new(x, TypeFlags::empty()));
    Ok((builder.build()?, declaration, call))
}

/// `while (true) { x = x.Next; }`
fn endless_loop(symbols: &mut SymbolTable) -> Result<ControlFlowGraph<Op>> {
    let x = symbols.local("x");

    let mut builder = CfgBuilder::new();
    let head = builder.add_block(vec![Op::LoadTrue]);
    let body = builder.add_block(vec![Op::Load(x), Op::MemberAccess, Op::Store(x)]);
    let exit = builder.add_exit();
    builder.terminate(head, Terminator::branch(body, exit))?;
    builder.terminate(
        body,
        Terminator::Jump {
            target: head,
            kind: JumpKind::Continue,
            consumes_value: false,
        },
    )?;
    builder.build()
}

#[test]
fn test_null_guard_explores_both_paths() -> Result<()> {
    let mut symbols = SymbolTable::new();
    let (cfg, declaration, call) = null_guard(&mut symbols)?;
    let x = symbols.lookup("x");
    let liveness = LiveVariables::compute(&cfg);

    // Whether `x` is known non-null once loaded for the call
    let mut not_null_at_call = Vec::new();
    let mut graph = ExplodedGraph::new(&cfg, &declaration, &liveness, StackMachineVisitor::new());
    graph.on_event(|event| {
        if let ExplorationEvent::InstructionProcessed { point, state, .. } = event {
            if *point == ProgramPoint::start_of(call) {
                let receiver = state.peek_value().ok();
                not_null_at_call.push(
                    receiver.is_some_and(|v| state.has_constraint(v, SymbolicConstraint::NOT_NULL))
                        && receiver == x.and_then(|x| state.get_symbol_value(x)),
                );
            }
        }
    });
    let outcome = graph.walk()?;

    assert_eq!(outcome, ExplorationOutcome::Completed);
    assert_eq!(graph.stats().exit_paths, 2);
    assert_eq!(graph.stats().infeasible_branches, 0);

    let events = graph.events();
    assert_eq!(events.count_kind(EventKind::ConditionEvaluated), 2);
    assert_eq!(events.count_kind(EventKind::ExitBlockReached), 2);
    assert_eq!(events.last().map(|e| e.kind), Some(EventKind::ExplorationEnded));
    drop(graph);

    assert_eq!(not_null_at_call, vec![true]);
    Ok(())
}

#[test]
fn test_value_type_parameter_prunes_null_branch() -> Result<()> {
    let mut symbols = SymbolTable::new();
    let x = symbols.parameter("x");

    // if (x == null) { x = null; }
    let mut builder = CfgBuilder::new();
    let test = builder.add_block(vec![Op::Load(x), Op::LoadNull, Op::Compare(ComparisonOp::Eq)]);
    let then = builder.add_block(vec![Op::LoadNull, Op::Store(x)]);
    let exit = builder.add_exit();
    builder.terminate(test, Terminator::branch(then, exit))?;
    builder.terminate(then, Terminator::goto(exit))?;
    let cfg = builder.build()?;
    let liveness = LiveVariables::compute(&cfg);

    let value_type =
        Declaration::new("Struct").with_parameter(Parameter::new(x, TypeFlags::VALUE_TYPE));
    let mut graph = ExplodedGraph::new(&cfg, &value_type, &liveness, StackMachineVisitor::new());
    assert!(graph.walk()?.is_complete());
    assert_eq!(graph.stats().exit_paths, 1);
    assert_eq!(graph.stats().infeasible_branches, 1);

    let nullable = Declaration::new("Nullable").with_parameter(Parameter::new(
        x,
        TypeFlags::VALUE_TYPE | TypeFlags::NULLABLE_WRAPPER,
    ));
    let mut graph = ExplodedGraph::new(&cfg, &nullable, &liveness, StackMachineVisitor::new());
    assert!(graph.walk()?.is_complete());
    assert_eq!(graph.stats().exit_paths, 2);
    Ok(())
}

#[test]
fn test_endless_loop_terminates_on_visit_cap() -> Result<()> {
    let mut symbols = SymbolTable::new();
    let cfg = endless_loop(&mut symbols)?;
    let liveness = LiveVariables::compute(&cfg);
    let declaration = Declaration::new("Spin");

    let mut graph = ExplodedGraph::new(&cfg, &declaration, &liveness, StackMachineVisitor::new());
    let outcome = graph.walk()?;

    assert_eq!(outcome, ExplorationOutcome::Completed);
    assert_eq!(graph.stats().exit_paths, 0);
    assert!(graph.stats().visit_limit_drops >= 1);
    assert!(graph.stats().infeasible_branches >= 1);
    assert!(graph
        .events()
        .has(EventKind::ProgramPointVisitCountExceedLimit));
    assert!(!graph.events().has(EventKind::ExitBlockReached));
    Ok(())
}

#[test]
fn test_endless_loop_hits_step_limit() -> Result<()> {
    let mut symbols = SymbolTable::new();
    let cfg = endless_loop(&mut symbols)?;
    let liveness = LiveVariables::compute(&cfg);
    let declaration = Declaration::new("Spin");

    let config = ExplorationConfig::default()
        .with_max_program_point_visits(u32::MAX)
        .with_max_steps(50);
    let mut graph = ExplodedGraph::new(&cfg, &declaration, &liveness, StackMachineVisitor::new())
        .with_config(config);

    assert_eq!(graph.walk()?, ExplorationOutcome::MaxStepCountReached);
    assert_eq!(graph.stats().steps, 50);
    assert_eq!(
        graph.events().last().map(|e| e.kind),
        Some(EventKind::MaxStepCountReached)
    );
    assert!(!graph.events().has(EventKind::ExplorationEnded));
    Ok(())
}

#[test]
fn test_endless_loop_hits_state_limit() -> Result<()> {
    let mut symbols = SymbolTable::new();
    let cfg = endless_loop(&mut symbols)?;
    let liveness = LiveVariables::compute(&cfg);
    let declaration = Declaration::new("Spin");

    let config = ExplorationConfig::default()
        .with_max_program_point_visits(u32::MAX)
        .with_max_internal_states(20);
    let mut graph = ExplodedGraph::new(&cfg, &declaration, &liveness, StackMachineVisitor::new())
        .with_config(config);

    assert_eq!(graph.walk()?, ExplorationOutcome::MaxInternalStateCountReached);
    assert_eq!(graph.stats().nodes_enqueued, 20);
    assert!(graph.events().has(EventKind::MaxInternalStateCountReached));
    Ok(())
}

#[test]
fn test_zero_timeout_stops_immediately() -> Result<()> {
    let mut symbols = SymbolTable::new();
    let cfg = endless_loop(&mut symbols)?;
    let liveness = LiveVariables::compute(&cfg);
    let declaration = Declaration::new("Spin");

    let config = ExplorationConfig::default().with_timeout(Duration::ZERO);
    let mut graph = ExplodedGraph::new(&cfg, &declaration, &liveness, StackMachineVisitor::new())
        .with_config(config);

    assert_eq!(graph.walk()?, ExplorationOutcome::TimedOut);
    assert_eq!(graph.stats().steps, 0);
    Ok(())
}

#[test]
fn test_short_circuit_and() -> Result<()> {
    let mut symbols = SymbolTable::new();
    let a = symbols.parameter("a");

    // if (a != null && a.Ok) { a.Use(); }
    let mut builder = CfgBuilder::new();
    let left = builder.add_block(vec![Op::Load(a), Op::LoadNull, Op::Compare(ComparisonOp::Ne)]);
    let right = builder.add_block(vec![Op::Load(a), Op::MemberAccess]);
    let condition = builder.add_block(vec![]);
    let then = builder.add_block(vec![
        Op::Load(a),
        Op::Invoke {
            arguments: 0,
            has_receiver: true,
            returns_value: false,
        },
    ]);
    let exit = builder.add_exit();
    builder.terminate(
        left,
        Terminator::BinaryBranch {
            on_true: right,
            on_false: condition,
            short_circuit: ShortCircuit::And,
        },
    )?;
    builder.terminate(right, Terminator::goto(condition))?;
    builder.terminate(condition, Terminator::branch(then, exit))?;
    builder.terminate(then, Terminator::goto(exit))?;
    let cfg = builder.build()?;
    let liveness = LiveVariables::compute(&cfg);
    let declaration =
        Declaration::new("Guarded").with_parameter(Parameter::new(a, TypeFlags::empty()));

    let mut graph = ExplodedGraph::new(&cfg, &declaration, &liveness, StackMachineVisitor::new());
    assert_eq!(graph.walk()?, ExplorationOutcome::Completed);

    // The skipped right operand leaves `false` behind, so `then` is unreachable from it
    assert_eq!(graph.stats().exit_paths, 3);
    assert_eq!(graph.stats().infeasible_branches, 1);

    let skipped: Vec<_> = graph
        .events()
        .filter_kind(EventKind::ConditionEvaluated)
        .filter(|e| e.point == Some(ProgramPoint::start_of(condition)))
        .filter_map(|e| e.value)
        .collect();
    assert_eq!(skipped.iter().filter(|v| **v).count(), 1);
    assert_eq!(skipped.iter().filter(|v| !**v).count(), 2);
    Ok(())
}

#[test]
fn test_conditional_expression_merges_equivalent_states() -> Result<()> {
    let mut symbols = SymbolTable::new();
    let flag = symbols.parameter("flag");
    let copy = symbols.local("copy");

    // bool copy = flag ? true : false;
    let mut builder = CfgBuilder::new();
    let test = builder.add_block(vec![Op::Load(flag)]);
    let store = builder.add_block(vec![Op::Store(copy)]);
    let exit = builder.add_exit();
    builder.terminate(test, Terminator::BinaryBranchingSimple { successor: store })?;
    builder.terminate(store, Terminator::goto(exit))?;
    let cfg = builder.build()?;
    let liveness = LiveVariables::compute(&cfg);
    let declaration = Declaration::new("Copy")
        .with_parameter(Parameter::new(flag, TypeFlags::VALUE_TYPE));

    let mut graph = ExplodedGraph::new(&cfg, &declaration, &liveness, StackMachineVisitor::new());
    assert!(graph.walk()?.is_complete());
    assert_eq!(graph.events().count_kind(EventKind::ConditionEvaluated), 2);

    // `copy` is dead at the exit, so both sides reach it in the same state
    assert_eq!(graph.stats().exit_paths, 1);
    assert_eq!(graph.stats().duplicates_dropped, 1);
    Ok(())
}

#[test]
fn test_switch_follows_every_section() -> Result<()> {
    let mut symbols = SymbolTable::new();
    let x = symbols.parameter("x");
    let y = symbols.local("y");

    // switch (x) { case 1: y = 1; break; case 2: y = 2; break; default: y = 3; break; }
    let mut builder = CfgBuilder::new();
    let dispatch = builder.add_block(vec![Op::Load(x)]);
    let sections: Vec<_> = (0..3)
        .map(|_| builder.add_block(vec![Op::LoadConstant, Op::Store(y)]))
        .collect();
    let exit = builder.add_exit();
    builder.terminate(
        dispatch,
        Terminator::Branch {
            successors: sections.clone(),
            consumes_value: true,
        },
    )?;
    for section in &sections {
        builder.terminate(
            *section,
            Terminator::Jump {
                target: exit,
                kind: JumpKind::Break,
                consumes_value: false,
            },
        )?;
    }
    let cfg = builder.build()?;
    let liveness = LiveVariables::compute(&cfg);
    let declaration =
        Declaration::new("Switch").with_parameter(Parameter::new(x, TypeFlags::VALUE_TYPE));

    let mut graph = ExplodedGraph::new(&cfg, &declaration, &liveness, StackMachineVisitor::new());
    assert_eq!(graph.walk()?, ExplorationOutcome::Completed);
    assert_eq!(graph.stats().exit_paths, 3);
    assert_eq!(graph.events().count_kind(EventKind::InstructionProcessed), 1 + 3 * 2);
    Ok(())
}

#[test]
fn test_return_value_is_consumed() -> Result<()> {
    let mut symbols = SymbolTable::new();
    let x = symbols.parameter("x");

    // return x;
    let mut builder = CfgBuilder::new();
    let entry = builder.add_block(vec![Op::Load(x)]);
    let exit = builder.add_exit();
    builder.terminate(
        entry,
        Terminator::Jump {
            target: exit,
            kind: JumpKind::Return,
            consumes_value: true,
        },
    )?;
    let cfg = builder.build()?;
    let liveness = LiveVariables::compute(&cfg);
    let declaration =
        Declaration::new("Identity").with_parameter(Parameter::new(x, TypeFlags::empty()));

    let mut exit_depths = Vec::new();
    let mut graph = ExplodedGraph::new(&cfg, &declaration, &liveness, StackMachineVisitor::new());
    graph.on_event(|event| {
        if let ExplorationEvent::ExitBlockReached { state, .. } = event {
            exit_depths.push(state.stack_depth());
        }
    });
    assert!(graph.walk()?.is_complete());
    drop(graph);

    assert_eq!(exit_depths, vec![0]);
    Ok(())
}

#[test]
fn test_walk_restarts_from_scratch() -> Result<()> {
    let mut symbols = SymbolTable::new();
    let (cfg, declaration, _) = null_guard(&mut symbols)?;
    let liveness = LiveVariables::compute(&cfg);

    let mut graph = ExplodedGraph::new(&cfg, &declaration, &liveness, StackMachineVisitor::new());
    graph.walk()?;
    let first = graph.stats().clone();
    let first_events = graph.events().len();

    graph.walk()?;
    assert_eq!(graph.stats(), &first);
    assert_eq!(graph.events().len(), first_events);
    Ok(())
}

#[test]
fn test_keep_all_live_keeps_dead_bindings() -> Result<()> {
    let mut symbols = SymbolTable::new();
    let x = symbols.local("x");

    let mut builder = CfgBuilder::new();
    let entry = builder.add_block(vec![Op::LoadConstant, Op::Store(x)]);
    let exit = builder.add_exit();
    builder.terminate(entry, Terminator::goto(exit))?;
    let cfg = builder.build()?;
    let declaration = Declaration::new("Store");

    let mut bound_at_exit = Vec::new();
    let oracle = KeepAllLive;
    let mut graph = ExplodedGraph::new(&cfg, &declaration, &oracle, StackMachineVisitor::new());
    graph.on_event(|event| {
        if let ExplorationEvent::ExitBlockReached { state, .. } = event {
            bound_at_exit.push(state.get_symbol_value(x).is_some());
        }
    });
    graph.walk()?;
    drop(graph);
    assert_eq!(bound_at_exit, vec![true]);

    let mut bound_at_exit = Vec::new();
    let liveness = LiveVariables::compute(&cfg);
    let mut graph = ExplodedGraph::new(&cfg, &declaration, &liveness, StackMachineVisitor::new());
    graph.on_event(|event| {
        if let ExplorationEvent::ExitBlockReached { state, .. } = event {
            bound_at_exit.push(state.get_symbol_value(x).is_some());
        }
    });
    graph.walk()?;
    drop(graph);
    assert_eq!(bound_at_exit, vec![false]);
    Ok(())
}

#[test]
fn test_explore_methods_in_parallel() -> Result<()> {
    let mut symbols = SymbolTable::new();
    let (guard, guard_decl, _) = null_guard(&mut symbols)?;
    let spin = endless_loop(&mut symbols)?;

    let methods = vec![
        MethodBody::new(guard_decl, guard),
        MethodBody::new(Declaration::new("Spin"), spin),
    ];
    let config = ExplorationConfig::default()
        .with_max_program_point_visits(u32::MAX)
        .with_max_steps(30);
    let results = explore_methods(&methods, &config, |_| StackMachineVisitor::new());

    assert_eq!(results.len(), 2);
    let guard = results[0].as_ref().map_err(Clone::clone)?;
    assert_eq!(guard.name, "NullGuard");
    assert_eq!(guard.outcome, ExplorationOutcome::Completed);
    assert_eq!(guard.stats.exit_paths, 2);

    let spin = results[1].as_ref().map_err(Clone::clone)?;
    assert_eq!(spin.name, "Spin");
    assert_eq!(spin.outcome, ExplorationOutcome::MaxStepCountReached);
    assert!(spin.events.has(EventKind::MaxStepCountReached));
    Ok(())
}
