//! Live variable analysis and the liveness oracle consumed by the walker.
//!
//! A symbol is *live* at a program point if some path from that point reads it
//! before writing it. The walker asks the [`LivenessOracle`] which symbols are live
//! at the end of each block and drops the bindings of everything else, which keeps
//! program states small and lets converging paths merge.
//!
//! # Algorithm
//!
//! This is a backward data flow analysis:
//!
//! - `USE[B]` = symbols read in B before any write
//! - `DEF[B]` = symbols written in B
//! - `OUT[B]` = ∪{IN[S] | S is a successor of B}
//! - `IN[B]` = USE[B] ∪ (OUT[B] - DEF[B])

use std::collections::BTreeSet;

use crate::{
    cfg::{
        dataflow::{
            framework::{AnalysisResults, DataFlowAnalysis, Direction},
            lattice::MeetSemiLattice,
            solver::DataFlowSolver,
        },
        BasicBlock, BlockId, ControlFlowGraph,
    },
    semantic::Symbol,
};

/// Instructions that read and write tracked symbols.
///
/// Within one instruction, reads happen before writes.
pub trait SymbolAccess {
    /// Symbols the instruction reads.
    fn reads(&self) -> impl Iterator<Item = Symbol> + '_;

    /// Symbols the instruction writes.
    fn writes(&self) -> impl Iterator<Item = Symbol> + '_;
}

/// Answers which symbols are live when control leaves a block.
pub trait LivenessOracle {
    /// Returns `true` if `symbol` may be read after `block` completes.
    fn is_live_out(&self, block: BlockId, symbol: Symbol) -> bool;
}

/// An oracle that keeps every binding alive; disables pruning.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepAllLive;

impl LivenessOracle for KeepAllLive {
    fn is_live_out(&self, _block: BlockId, _symbol: Symbol) -> bool {
        true
    }
}

/// Set of live symbols at a block boundary.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LiveSet {
    live: BTreeSet<Symbol>,
}

impl LiveSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `symbol` is live.
    #[must_use]
    pub fn is_live(&self, symbol: Symbol) -> bool {
        self.live.contains(&symbol)
    }

    /// Iterates over live symbols in ascending order.
    pub fn symbols(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.live.iter().copied()
    }

    /// Returns the number of live symbols.
    #[must_use]
    pub fn count(&self) -> usize {
        self.live.len()
    }

    /// Returns `true` if nothing is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Marks a symbol as live.
    pub fn add(&mut self, symbol: Symbol) {
        self.live.insert(symbol);
    }

    /// Marks a symbol as not live.
    pub fn remove(&mut self, symbol: Symbol) {
        self.live.remove(&symbol);
    }
}

impl MeetSemiLattice for LiveSet {
    /// Meet is union: a symbol is live if it is live on any successor path.
    fn meet(&self, other: &Self) -> Self {
        Self {
            live: self.live.union(&other.live).copied().collect(),
        }
    }

    fn is_bottom(&self) -> bool {
        // No finite universe of symbols, so union never saturates
        false
    }
}

/// Live variable analysis over a control-flow graph.
///
/// # Example
///
/// ```rust,ignore
/// let liveness = LiveVariables::compute(&cfg);
/// if liveness.is_live_out(block, x) { /* keep x */ }
/// ```
#[derive(Debug, Clone)]
pub struct LiveVariables {
    /// USE sets for each block (symbols read before written).
    use_sets: Vec<BTreeSet<Symbol>>,
    /// DEF sets for each block.
    def_sets: Vec<BTreeSet<Symbol>>,
    /// Solved block boundary sets, once computed.
    results: Option<AnalysisResults<LiveSet>>,
}

impl LiveVariables {
    /// Computes USE/DEF sets for every block of `cfg`, without solving.
    #[must_use]
    pub fn new<I: SymbolAccess>(cfg: &ControlFlowGraph<I>) -> Self {
        let mut use_sets = Vec::with_capacity(cfg.block_count());
        let mut def_sets = Vec::with_capacity(cfg.block_count());

        for block in cfg.blocks() {
            let mut uses = BTreeSet::new();
            let mut defs = BTreeSet::new();

            for instr in block.instructions() {
                for read in instr.reads() {
                    if !defs.contains(&read) {
                        uses.insert(read);
                    }
                }
                defs.extend(instr.writes());
            }

            use_sets.push(uses);
            def_sets.push(defs);
        }

        LiveVariables {
            use_sets,
            def_sets,
            results: None,
        }
    }

    /// Computes USE/DEF sets and solves the analysis to a fixpoint.
    #[must_use]
    pub fn compute<I: SymbolAccess>(cfg: &ControlFlowGraph<I>) -> Self {
        let (mut analysis, results) = DataFlowSolver::new(Self::new(cfg)).solve(cfg);
        analysis.results = Some(results);
        analysis
    }

    /// Returns the USE set for a block.
    #[must_use]
    pub fn use_set(&self, block: BlockId) -> Option<&BTreeSet<Symbol>> {
        self.use_sets.get(block.index())
    }

    /// Returns the DEF set for a block.
    #[must_use]
    pub fn def_set(&self, block: BlockId) -> Option<&BTreeSet<Symbol>> {
        self.def_sets.get(block.index())
    }

    /// Returns the symbols live on entry to `block`.
    #[must_use]
    pub fn live_in(&self, block: BlockId) -> Option<&LiveSet> {
        self.results.as_ref()?.in_state(block)
    }

    /// Returns the symbols live on exit from `block`.
    #[must_use]
    pub fn live_out(&self, block: BlockId) -> Option<&LiveSet> {
        self.results.as_ref()?.out_state(block)
    }
}

impl<I: SymbolAccess> DataFlowAnalysis<I> for LiveVariables {
    type Lattice = LiveSet;
    const DIRECTION: Direction = Direction::Backward;

    fn boundary(&self, _cfg: &ControlFlowGraph<I>) -> Self::Lattice {
        LiveSet::new()
    }

    fn initial(&self, _cfg: &ControlFlowGraph<I>) -> Self::Lattice {
        LiveSet::new()
    }

    fn transfer(&self, block: &BasicBlock<I>, output: &Self::Lattice) -> Self::Lattice {
        let index = block.id().index();
        let mut live = output.live.clone();
        if let Some(defs) = self.def_sets.get(index) {
            live.retain(|symbol| !defs.contains(symbol));
        }
        if let Some(uses) = self.use_sets.get(index) {
            live.extend(uses.iter().copied());
        }
        LiveSet { live }
    }
}

impl LivenessOracle for LiveVariables {
    /// Unknown blocks, and every block of an unsolved analysis, report every symbol
    /// as live.
    fn is_live_out(&self, block: BlockId, symbol: Symbol) -> bool {
        self.live_out(block).is_none_or(|live| live.is_live(symbol))
    }
}
