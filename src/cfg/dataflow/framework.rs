//! Data flow analysis framework trait and direction.
//!
//! Any block-level analysis over a [`ControlFlowGraph`] implements
//! [`DataFlowAnalysis`] and is driven to a fixpoint by
//! [`DataFlowSolver`](super::DataFlowSolver).

use crate::cfg::{dataflow::lattice::MeetSemiLattice, BasicBlock, BlockId, ControlFlowGraph};

/// Direction of data flow analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Information flows forward, from entry to exit.
    ///
    /// At join points, values from all predecessors are combined using the meet operation.
    Forward,

    /// Information flows backward, from exit to entry.
    ///
    /// At split points, values from all successors are combined.
    Backward,
}

/// A data flow analysis over the blocks of a control-flow graph.
///
/// For forward analyses: `out[B] = transfer(B, in[B])`
/// For backward analyses: `in[B] = transfer(B, out[B])`
///
/// # Type Parameters
///
/// * `I` - The instruction type of the analysed graph
pub trait DataFlowAnalysis<I> {
    /// The lattice type for this analysis.
    type Lattice: MeetSemiLattice;

    /// The direction of this analysis.
    const DIRECTION: Direction;

    /// Returns the value at the boundary: the entry block for forward analyses,
    /// the exit block for backward ones.
    fn boundary(&self, cfg: &ControlFlowGraph<I>) -> Self::Lattice;

    /// Returns the initial value for interior blocks.
    fn initial(&self, cfg: &ControlFlowGraph<I>) -> Self::Lattice;

    /// Computes the transfer function for a basic block.
    ///
    /// # Arguments
    ///
    /// * `block` - The block being processed
    /// * `input` - The state flowing into (forward) or out of (backward) the block
    ///
    /// # Returns
    ///
    /// The abstract state after flowing through the block.
    fn transfer(&self, block: &BasicBlock<I>, input: &Self::Lattice) -> Self::Lattice;

    /// Called when analysis is complete. The default implementation does nothing.
    fn finalize(
        &mut self,
        _in_states: &[Self::Lattice],
        _out_states: &[Self::Lattice],
        _cfg: &ControlFlowGraph<I>,
    ) {
    }
}

/// Results of a data flow analysis, indexed by block.
#[derive(Debug, Clone)]
pub struct AnalysisResults<L> {
    /// Input state for each block (before transfer function).
    pub in_states: Vec<L>,
    /// Output state for each block (after transfer function).
    pub out_states: Vec<L>,
}

impl<L: Clone> AnalysisResults<L> {
    /// Creates new analysis results with the given states.
    #[must_use]
    pub fn new(in_states: Vec<L>, out_states: Vec<L>) -> Self {
        Self {
            in_states,
            out_states,
        }
    }

    /// Returns the input state for a block, or `None` if the block is out of range.
    #[must_use]
    pub fn in_state(&self, block: BlockId) -> Option<&L> {
        self.in_states.get(block.index())
    }

    /// Returns the output state for a block, or `None` if the block is out of range.
    #[must_use]
    pub fn out_state(&self, block: BlockId) -> Option<&L> {
        self.out_states.get(block.index())
    }

    /// Returns the number of blocks.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.in_states.len()
    }
}
