//! Exploring many methods at once.
//!
//! Explorations of different methods share nothing but the immutable singleton
//! values, so they parallelise at method granularity. [`explore_methods`] runs one
//! isolated [`ExplodedGraph`] per method on the rayon thread pool.

use rayon::prelude::*;

use crate::{
    cfg::{ControlFlowGraph, LiveVariables, SymbolAccess},
    engine::{
        EventLog, ExplodedGraph, ExplorationConfig, ExplorationOutcome, ExplorationStats,
        InstructionVisitor,
    },
    semantic::Declaration,
    Result,
};

/// A method ready for exploration.
#[derive(Debug, Clone)]
pub struct MethodBody<I> {
    /// The method's parameters
    pub declaration: Declaration,
    /// The method's control-flow graph
    pub cfg: ControlFlowGraph<I>,
}

impl<I> MethodBody<I> {
    /// Pairs a declaration with its graph.
    #[must_use]
    pub fn new(declaration: Declaration, cfg: ControlFlowGraph<I>) -> Self {
        MethodBody { declaration, cfg }
    }
}

/// Result of exploring one method.
#[derive(Debug, Clone)]
pub struct ExplorationSummary {
    /// Name of the explored declaration
    pub name: String,
    /// How the exploration ended
    pub outcome: ExplorationOutcome,
    /// Counters of the walk
    pub stats: ExplorationStats,
    /// Every event the walk fired
    pub events: EventLog,
}

/// Explores `methods` in parallel.
///
/// Liveness is computed per method with [`LiveVariables`]; `make_visitor` creates a
/// fresh visitor for each method.
///
/// # Arguments
///
/// * `methods` - The methods to explore
/// * `config` - Bounds applied to every exploration
/// * `make_visitor` - Visitor factory, called once per method
///
/// # Returns
///
/// One result per method, in input order. A failing method does not affect the
/// others.
pub fn explore_methods<I, V, F>(
    methods: &[MethodBody<I>],
    config: &ExplorationConfig,
    make_visitor: F,
) -> Vec<Result<ExplorationSummary>>
where
    I: SymbolAccess + Sync + 'static,
    V: InstructionVisitor<I>,
    F: Fn(&MethodBody<I>) -> V + Sync,
{
    methods
        .par_iter()
        .map(|method| {
            let liveness = LiveVariables::compute(&method.cfg);
            let mut graph = ExplodedGraph::new(
                &method.cfg,
                &method.declaration,
                &liveness,
                make_visitor(method),
            )
            .with_config(config.clone());
            let outcome = graph.walk()?;
            let stats = graph.stats().clone();
            Ok(ExplorationSummary {
                name: method.declaration.name.clone(),
                outcome,
                stats,
                events: graph.into_events(),
            })
        })
        .collect()
}
