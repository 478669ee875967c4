//! The exploded-graph walker.
//!
//! [`ExplodedGraph`] explores every feasible path through a method's control-flow
//! graph. Each worklist entry is a node: a [`ProgramPoint`] together with the
//! [`ProgramState`] reached there. Processing a node evaluates one instruction, or
//! dispatches on the block's [`Terminator`] once the block's instructions are done,
//! and enqueues the successor nodes.
//!
//! # Termination
//!
//! - every state counts its visits per point; a successor whose point was already
//!   visited `max_program_point_visits` times on its path is dropped
//! - nodes equal to one already seen are dropped
//! - the walk stops after `max_steps` dequeues, once `max_internal_states` distinct
//!   nodes exist, or when the optional deadline passes
//!
//! # Example
//!
//! ```rust
//! use symscope::prelude::*;
//!
//! # fn main() -> symscope::Result<()> {
//! let mut symbols = SymbolTable::new();
//! let x = symbols.parameter("x");
//!
//! // if (x == null) { return; } x.Foo();
//! let mut builder = CfgBuilder::new();
//! let test = builder.add_block(vec![Op::Load(x), Op::LoadNull, Op::Compare(ComparisonOp::Eq)]);
//! let early = builder.add_block(vec![]);
//! let call = builder.add_block(vec![Op::Load(x), Op::MemberAccess, Op::Pop]);
//! let exit = builder.add_exit();
//! builder.terminate(test, Terminator::branch(early, call))?;
//! builder.terminate(early, Terminator::goto(exit))?;
//! builder.terminate(call, Terminator::goto(exit))?;
//! let cfg = builder.build()?;
//!
//! let declaration = Declaration::new("M").with_parameter(Parameter::new(x, TypeFlags::empty()));
//! let liveness = LiveVariables::compute(&cfg);
//! let mut graph = ExplodedGraph::new(&cfg, &declaration, &liveness, StackMachineVisitor::new());
//!
//! assert_eq!(graph.walk()?, ExplorationOutcome::Completed);
//! assert_eq!(graph.stats().exit_paths, 2);
//! # Ok(())
//! # }
//! ```

use std::{collections::VecDeque, time::Instant};

use log::{debug, trace};
use rustc_hash::FxHashSet;

use crate::{
    cfg::{BasicBlock, BlockId, ControlFlowGraph, LivenessOracle, ShortCircuit, Terminator},
    engine::{
        events::FnListener, CheckRegistry, Event, EventLog, ExplorationConfig, ExplorationEvent,
        ExplorationListener, ExplorationOutcome, ExplorationStats, InstructionContext,
        InstructionVisitor, SymbolicCheck,
    },
    semantic::{Declaration, ParameterPolicy, ValueTypePolicy},
    state::{ExplodedGraphNode, ProgramPoint, ProgramState},
    symbolic::{SymbolicConstraint, SymbolicValue, SymbolicValueFactory},
    Error, Result,
};

/// Path-sensitive explorer of one method body.
///
/// Each analysed method gets its own `ExplodedGraph`: the worklist, the node table
/// and the value factory are never shared. The graph borrows the control-flow graph,
/// the declaration and the liveness oracle, and owns its visitor, checks and
/// listeners.
pub struct ExplodedGraph<'a, I, V> {
    cfg: &'a ControlFlowGraph<I>,
    declaration: &'a Declaration,
    liveness: &'a dyn LivenessOracle,
    visitor: V,
    policy: Box<dyn ParameterPolicy + 'a>,
    config: ExplorationConfig,
    checks: CheckRegistry<I>,
    listeners: Vec<Box<dyn ExplorationListener<I> + 'a>>,
    factory: SymbolicValueFactory,
    worklist: VecDeque<ExplodedGraphNode>,
    nodes: FxHashSet<ExplodedGraphNode>,
    stats: ExplorationStats,
    events: EventLog,
}

impl<'a, I, V> ExplodedGraph<'a, I, V>
where
    I: 'static,
    V: InstructionVisitor<I>,
{
    /// Creates a walker with default bounds and the [`ValueTypePolicy`] for
    /// parameters.
    ///
    /// # Arguments
    ///
    /// * `cfg` - The method's control-flow graph
    /// * `declaration` - The method's parameters
    /// * `liveness` - Decides which bindings survive a block boundary
    /// * `visitor` - Evaluates instructions
    pub fn new(
        cfg: &'a ControlFlowGraph<I>,
        declaration: &'a Declaration,
        liveness: &'a dyn LivenessOracle,
        visitor: V,
    ) -> Self {
        ExplodedGraph {
            cfg,
            declaration,
            liveness,
            visitor,
            policy: Box::new(ValueTypePolicy),
            config: ExplorationConfig::default(),
            checks: CheckRegistry::new(),
            listeners: Vec::new(),
            factory: SymbolicValueFactory::new(),
            worklist: VecDeque::new(),
            nodes: FxHashSet::default(),
            stats: ExplorationStats::default(),
            events: EventLog::new(),
        }
    }

    /// Replaces the exploration bounds.
    #[must_use]
    pub fn with_config(mut self, config: ExplorationConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the rule deciding which parameters are non-null on entry.
    #[must_use]
    pub fn with_policy(mut self, policy: impl ParameterPolicy + 'a) -> Self {
        self.policy = Box::new(policy);
        self
    }

    /// Registers a check, replacing a registered check of the same type.
    #[must_use]
    pub fn with_check<C: SymbolicCheck<I>>(mut self, check: C) -> Self {
        self.checks.add(check);
        self
    }

    /// Registers a check, replacing a registered check of the same type.
    pub fn add_check<C: SymbolicCheck<I>>(&mut self, check: C) {
        self.checks.add(check);
    }

    /// Adds an event listener.
    pub fn add_listener(&mut self, listener: impl ExplorationListener<I> + 'a) {
        self.listeners.push(Box::new(listener));
    }

    /// Adds a closure as event listener.
    pub fn on_event(&mut self, listener: impl FnMut(&ExplorationEvent<'_, I>) + 'a) {
        self.listeners.push(Box::new(FnListener(listener)));
    }

    /// Returns the active bounds.
    #[must_use]
    pub const fn config(&self) -> &ExplorationConfig {
        &self.config
    }

    /// Returns the registered checks, for reading their findings after a walk.
    #[must_use]
    pub const fn checks(&self) -> &CheckRegistry<I> {
        &self.checks
    }

    /// Returns the counters of the last walk.
    #[must_use]
    pub const fn stats(&self) -> &ExplorationStats {
        &self.stats
    }

    /// Returns the events of the last walk.
    #[must_use]
    pub const fn events(&self) -> &EventLog {
        &self.events
    }

    /// Consumes the walker and returns its event log.
    #[must_use]
    pub fn into_events(self) -> EventLog {
        self.events
    }

    /// Explores the method.
    ///
    /// Walking again starts over with fresh counters; registered checks keep whatever
    /// they recorded.
    ///
    /// # Returns
    ///
    /// How the exploration ended. Exhausted bounds are outcomes, not errors.
    ///
    /// # Errors
    ///
    /// - [`Error::StackUnderflow`] if the visitor pops more than the stack holds
    /// - [`Error::InvalidBlock`] if a node refers to a block missing from the graph
    /// - [`Error::Check`] if a check fails
    pub fn walk(&mut self) -> Result<ExplorationOutcome> {
        self.reset();
        debug!(
            "exploring {} ({} blocks, {} parameters)",
            self.declaration.name,
            self.cfg.block_count(),
            self.declaration.parameters.len()
        );

        let outcome = match self.explore() {
            Ok(outcome) => outcome,
            Err(Error::TooManyInternalStates { count, limit }) => {
                debug!(
                    "{}: internal state limit reached ({count} > {limit})",
                    self.declaration.name
                );
                self.emit(&ExplorationEvent::MaxInternalStateCountReached);
                ExplorationOutcome::MaxInternalStateCountReached
            }
            Err(error) => return Err(error),
        };

        debug!(
            "{}: {outcome} after {} steps, {} nodes, {} exit paths",
            self.declaration.name, self.stats.steps, self.stats.nodes_enqueued, self.stats.exit_paths
        );
        Ok(outcome)
    }

    fn reset(&mut self) {
        self.factory = SymbolicValueFactory::new();
        self.worklist.clear();
        self.nodes.clear();
        self.stats = ExplorationStats::default();
        self.events = EventLog::new();
    }

    fn explore(&mut self) -> Result<ExplorationOutcome> {
        let started = Instant::now();
        let initial = self.initial_state();
        self.enqueue(ProgramPoint::start_of(self.cfg.entry()), initial)?;

        while let Some(node) = self.worklist.pop_front() {
            if self.stats.steps >= self.config.max_steps {
                debug!(
                    "{}: step limit {} reached",
                    self.declaration.name, self.config.max_steps
                );
                self.emit(&ExplorationEvent::MaxStepCountReached);
                return Ok(ExplorationOutcome::MaxStepCountReached);
            }
            if self
                .config
                .timeout
                .is_some_and(|timeout| started.elapsed() >= timeout)
            {
                debug!("{}: deadline passed", self.declaration.name);
                return Ok(ExplorationOutcome::TimedOut);
            }

            self.stats.steps += 1;
            self.visit(node)?;
        }

        self.emit(&ExplorationEvent::ExplorationEnded);
        Ok(ExplorationOutcome::Completed)
    }

    /// Binds every parameter to a fresh value, non-null where the policy says so.
    fn initial_state(&mut self) -> ProgramState {
        let declaration = self.declaration;
        let mut state = ProgramState::new();
        for parameter in &declaration.parameters {
            let value = self.factory.create();
            state = state.store_symbolic_value(parameter.symbol, value.clone());
            if self.policy.is_not_null(parameter) {
                state = state.set_constraint(&value, SymbolicConstraint::NOT_NULL);
            }
        }
        state
    }

    fn visit(&mut self, node: ExplodedGraphNode) -> Result<()> {
        let cfg = self.cfg;
        let (point, state) = node.into_parts();
        let block = cfg
            .block(point.block())
            .ok_or(Error::InvalidBlock(point.block()))?;
        trace!("step {} at {point}", self.stats.steps);

        if let Some(instruction) = block.instruction(point.offset()) {
            return self.visit_instruction(point, instruction, state);
        }

        match block.terminator() {
            Terminator::Exit => {
                self.stats.exit_paths += 1;
                self.emit(&ExplorationEvent::ExitBlockReached {
                    block: block.id(),
                    state: &state,
                });
                Ok(())
            }
            Terminator::Jump {
                target,
                consumes_value,
                ..
            } => {
                // Popping before cleaning lets the consumed value's facts be collected
                let state = Self::consume(state, *consumes_value)?;
                let state = self.clean(block.id(), &state);
                self.enqueue(ProgramPoint::start_of(*target), state)
            }
            Terminator::BinaryBranch {
                on_true,
                on_false,
                short_circuit,
            } => self.visit_binary_branch(block, state, *on_true, *on_false, *short_circuit),
            Terminator::BinaryBranchingSimple { successor } => {
                self.visit_simple_branch(block, state, *successor)
            }
            Terminator::Branch {
                successors,
                consumes_value,
            } => {
                // Same order as a jump: pop, then clean
                let state = Self::consume(state, *consumes_value)?;
                let state = self.clean(block.id(), &state);
                for successor in successors {
                    self.enqueue(ProgramPoint::start_of(*successor), state.clone())?;
                }
                Ok(())
            }
        }
    }

    /// Runs the checks and the visitor on `instruction`. Each stage may fork the path;
    /// every surviving state continues at the next point.
    fn visit_instruction(
        &mut self,
        point: ProgramPoint,
        instruction: &I,
        state: ProgramState,
    ) -> Result<()> {
        let before = self.checks.pre_process(point, instruction, state)?;
        if before.is_empty() {
            return self.drop_infeasible(point, "pre_process");
        }

        for state in before {
            let mut ctx = InstructionContext::new(point, &mut self.factory, &mut self.checks);
            let evaluated = self.visitor.visit(instruction, &state, &mut ctx)?;
            if evaluated.is_empty() {
                self.drop_infeasible(point, "instruction")?;
                continue;
            }

            for state in evaluated {
                let after = self.checks.post_process(point, instruction, state)?;
                if after.is_empty() {
                    self.drop_infeasible(point, "post_process")?;
                    continue;
                }

                for state in after {
                    self.emit(&ExplorationEvent::InstructionProcessed {
                        instruction,
                        point,
                        state: &state,
                    });
                    self.enqueue(point.next(), state)?;
                }
            }
        }
        Ok(())
    }

    /// Splits on the condition on top of the stack and follows each feasible side.
    fn visit_binary_branch(
        &mut self,
        block: &BasicBlock<I>,
        state: ProgramState,
        on_true: BlockId,
        on_false: BlockId,
        short_circuit: ShortCircuit,
    ) -> Result<()> {
        let (state, condition) = state.pop_value()?;
        let (positive, negative) = state.try_split(&condition, SymbolicConstraint::TRUE)?;

        for (value, side, target) in [(true, positive, on_true), (false, negative, on_false)] {
            let Some(side) = side else {
                self.stats.infeasible_branches += 1;
                trace!("{}: {value} side infeasible", block.id());
                continue;
            };
            self.emit(&ExplorationEvent::ConditionEvaluated {
                block: block.id(),
                condition: block.instructions().last(),
                value,
                state: &side,
            });

            // The skipped operand of `&&` / `||` leaves the operator's result behind
            let produces_result = matches!(
                (short_circuit, value),
                (ShortCircuit::And, false) | (ShortCircuit::Or, true)
            );
            let side = if produces_result {
                side.push_value(SymbolicValue::from_bool(value))
            } else {
                side
            };

            let side = self.clean(block.id(), &side);
            self.enqueue(ProgramPoint::start_of(target), side)?;
        }
        Ok(())
    }

    /// Like a binary branch, but both sides push their truth value and continue in
    /// the same block.
    fn visit_simple_branch(
        &mut self,
        block: &BasicBlock<I>,
        state: ProgramState,
        successor: BlockId,
    ) -> Result<()> {
        let (state, condition) = state.pop_value()?;
        let (positive, negative) = state.try_split(&condition, SymbolicConstraint::TRUE)?;

        for (value, side) in [(true, positive), (false, negative)] {
            let Some(side) = side else {
                self.stats.infeasible_branches += 1;
                trace!("{}: {value} side infeasible", block.id());
                continue;
            };
            self.emit(&ExplorationEvent::ConditionEvaluated {
                block: block.id(),
                condition: block.instructions().last(),
                value,
                state: &side,
            });
            let side = side.push_value(SymbolicValue::from_bool(value));
            let side = self.clean(block.id(), &side);
            self.enqueue(ProgramPoint::start_of(successor), side)?;
        }
        Ok(())
    }

    fn consume(state: ProgramState, consumes_value: bool) -> Result<ProgramState> {
        if consumes_value {
            Ok(state.pop_value()?.0)
        } else {
            Ok(state)
        }
    }

    /// Drops the bindings of symbols that are dead after `block`. Fields survive.
    fn clean(&self, block: BlockId, state: &ProgramState) -> ProgramState {
        let liveness = self.liveness;
        state.remove_symbols(|symbol| !symbol.is_field() && !liveness.is_live_out(block, symbol))
    }

    fn drop_infeasible(&mut self, point: ProgramPoint, stage: &str) -> Result<()> {
        self.stats.infeasible_branches += 1;
        trace!("{point}: path dropped by {stage}");
        Ok(())
    }

    /// Adds `(point, state)` to the worklist unless the point's visit cap is hit or an
    /// equal node was already seen.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TooManyInternalStates`] once the node table outgrows
    /// `max_internal_states`.
    fn enqueue(&mut self, point: ProgramPoint, state: ProgramState) -> Result<()> {
        let limit = self.config.max_program_point_visits;
        if state.visited_count(point) >= limit {
            self.stats.visit_limit_drops += 1;
            trace!("{point}: visit limit {limit} reached");
            self.emit(&ExplorationEvent::ProgramPointVisitCountExceedLimit {
                point,
                state: &state,
                limit,
            });
            return Ok(());
        }

        let node = ExplodedGraphNode::new(point, state.add_visit(point));
        if self.nodes.contains(&node) {
            self.stats.duplicates_dropped += 1;
            trace!("{point}: duplicate node dropped");
            return Ok(());
        }
        if self.nodes.len() >= self.config.max_internal_states {
            return Err(Error::TooManyInternalStates {
                count: self.nodes.len() + 1,
                limit: self.config.max_internal_states,
            });
        }

        self.nodes.insert(node.clone());
        self.worklist.push_back(node);
        self.stats.nodes_enqueued += 1;
        Ok(())
    }

    fn emit(&mut self, event: &ExplorationEvent<'_, I>) {
        self.events.record(Event::from(event));
        for listener in &mut self.listeners {
            listener.on_event(event);
        }
    }
}
