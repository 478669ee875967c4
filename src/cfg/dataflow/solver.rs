//! Worklist-based data flow solver.
//!
//! # Algorithm
//!
//! 1. Initialize all blocks with the initial value
//! 2. Set the boundary value at the entry (forward) or exit (backward)
//! 3. Add all reachable blocks to the worklist in reverse postorder (forward) or
//!    postorder (backward)
//! 4. While the worklist is non-empty, recompute a block from its neighbours and,
//!    if its result changed, re-queue the blocks that depend on it
//! 5. Call the finalize hook for post-processing
//!
//! For most analyses on reducible graphs the solver converges in a small number of
//! passes; the total work is bounded by the lattice height times the block count.

use std::collections::VecDeque;

use crate::cfg::{
    dataflow::{
        framework::{AnalysisResults, DataFlowAnalysis, Direction},
        lattice::MeetSemiLattice,
    },
    BlockId, ControlFlowGraph,
};

/// Worklist-based data flow solver.
///
/// # Usage
///
/// ```rust,ignore
/// let analysis = LiveVariables::new(&cfg);
/// let results = DataFlowSolver::new(analysis).solve(&cfg);
/// let live_out = results.out_state(block_id);
/// ```
pub struct DataFlowSolver<A, I>
where
    A: DataFlowAnalysis<I>,
{
    /// The analysis being solved.
    analysis: A,
    /// Input state for each block.
    in_states: Vec<A::Lattice>,
    /// Output state for each block.
    out_states: Vec<A::Lattice>,
    /// Worklist of blocks to process.
    worklist: VecDeque<usize>,
    /// Whether each block is currently in the worklist.
    in_worklist: Vec<bool>,
    /// Number of iterations performed.
    iterations: usize,
    _instruction: std::marker::PhantomData<fn(&I)>,
}

impl<A, I> DataFlowSolver<A, I>
where
    A: DataFlowAnalysis<I>,
{
    /// Creates a new solver for the given analysis.
    #[must_use]
    pub fn new(analysis: A) -> Self {
        Self {
            analysis,
            in_states: Vec::new(),
            out_states: Vec::new(),
            worklist: VecDeque::new(),
            in_worklist: Vec::new(),
            iterations: 0,
            _instruction: std::marker::PhantomData,
        }
    }

    /// Solves the data flow analysis to a fixpoint.
    ///
    /// Returns the analysis together with its per-block results, so analyses that
    /// precompute per-block facts can be queried afterwards.
    pub fn solve(mut self, cfg: &ControlFlowGraph<I>) -> (A, AnalysisResults<A::Lattice>) {
        if cfg.block_count() == 0 {
            return (self.analysis, AnalysisResults::new(Vec::new(), Vec::new()));
        }

        self.initialize(cfg);
        self.iterate(cfg);

        self.analysis
            .finalize(&self.in_states, &self.out_states, cfg);

        log::trace!("data flow converged after {} iterations", self.iterations);
        (
            self.analysis,
            AnalysisResults::new(self.in_states, self.out_states),
        )
    }

    /// Returns the number of iterations performed.
    #[must_use]
    pub const fn iterations(&self) -> usize {
        self.iterations
    }

    fn initialize(&mut self, cfg: &ControlFlowGraph<I>) {
        let num_blocks = cfg.block_count();
        let initial = self.analysis.initial(cfg);
        let boundary = self.analysis.boundary(cfg);

        self.in_states = vec![initial.clone(); num_blocks];
        self.out_states = vec![initial; num_blocks];
        self.in_worklist = vec![false; num_blocks];

        match A::DIRECTION {
            Direction::Forward => self.in_states[cfg.entry().index()] = boundary,
            Direction::Backward => self.out_states[cfg.exit().index()] = boundary,
        }

        let order = match A::DIRECTION {
            Direction::Forward => cfg.reverse_postorder(),
            Direction::Backward => cfg.postorder(),
        };

        for node in order {
            self.worklist.push_back(node.index());
            self.in_worklist[node.index()] = true;
        }
    }

    fn iterate(&mut self, cfg: &ControlFlowGraph<I>) {
        while let Some(block_idx) = self.worklist.pop_front() {
            self.in_worklist[block_idx] = false;
            self.iterations += 1;

            let changed = match A::DIRECTION {
                Direction::Forward => self.process_forward(block_idx, cfg),
                Direction::Backward => self.process_backward(block_idx, cfg),
            };

            if changed {
                self.add_affected_to_worklist(block_idx, cfg);
            }
        }
    }

    /// Returns `true` if the output state changed.
    fn process_forward(&mut self, block_idx: usize, cfg: &ControlFlowGraph<I>) -> bool {
        let node = BlockId::new(block_idx);

        // The entry block keeps its boundary value
        if node != cfg.entry() {
            let mut result: Option<A::Lattice> = None;
            for pred in cfg.predecessors(node) {
                let pred_out = &self.out_states[pred.index()];
                result = Some(match result {
                    None => pred_out.clone(),
                    Some(acc) => acc.meet(pred_out),
                });
            }
            if let Some(input) = result {
                self.in_states[block_idx] = input;
            }
        }

        let Some(block) = cfg.block(node) else {
            return false;
        };
        let output = self.analysis.transfer(block, &self.in_states[block_idx]);

        let changed = output != self.out_states[block_idx];
        self.out_states[block_idx] = output;
        changed
    }

    /// Returns `true` if the input state changed.
    fn process_backward(&mut self, block_idx: usize, cfg: &ControlFlowGraph<I>) -> bool {
        let node = BlockId::new(block_idx);

        // The exit block keeps its boundary value
        if node != cfg.exit() {
            let mut result: Option<A::Lattice> = None;
            for succ in cfg.successors(node) {
                let succ_in = &self.in_states[succ.index()];
                result = Some(match result {
                    None => succ_in.clone(),
                    Some(acc) => acc.meet(succ_in),
                });
            }
            if let Some(output) = result {
                self.out_states[block_idx] = output;
            }
        }

        let Some(block) = cfg.block(node) else {
            return false;
        };
        let input = self.analysis.transfer(block, &self.out_states[block_idx]);

        let changed = input != self.in_states[block_idx];
        self.in_states[block_idx] = input;
        changed
    }

    fn add_affected_to_worklist(&mut self, block_idx: usize, cfg: &ControlFlowGraph<I>) {
        let node = BlockId::new(block_idx);
        let affected: Vec<BlockId> = match A::DIRECTION {
            Direction::Forward => cfg.successors(node).collect(),
            Direction::Backward => cfg.predecessors(node).collect(),
        };

        for block in affected {
            let idx = block.index();
            if idx < self.in_worklist.len() && !self.in_worklist[idx] {
                self.worklist.push_back(idx);
                self.in_worklist[idx] = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfg::{BasicBlock, CfgBuilder, Terminator};

    /// A simple constant lattice for testing.
    #[derive(Debug, Clone, PartialEq)]
    enum TestLattice {
        Top,
        Value(i32),
        Bottom,
    }

    impl MeetSemiLattice for TestLattice {
        fn meet(&self, other: &Self) -> Self {
            match (self, other) {
                (Self::Top, x) | (x, Self::Top) => x.clone(),
                (Self::Value(a), Self::Value(b)) if a == b => Self::Value(*a),
                _ => Self::Bottom,
            }
        }

        fn is_bottom(&self) -> bool {
            matches!(self, Self::Bottom)
        }
    }

    /// Each block overwrites the value with its single instruction, if any.
    struct AssignAnalysis;

    impl DataFlowAnalysis<i32> for AssignAnalysis {
        type Lattice = TestLattice;
        const DIRECTION: Direction = Direction::Forward;

        fn boundary(&self, _cfg: &ControlFlowGraph<i32>) -> Self::Lattice {
            TestLattice::Value(0)
        }

        fn initial(&self, _cfg: &ControlFlowGraph<i32>) -> Self::Lattice {
            TestLattice::Top
        }

        fn transfer(&self, block: &BasicBlock<i32>, input: &Self::Lattice) -> Self::Lattice {
            block
                .instructions()
                .last()
                .map_or_else(|| input.clone(), |value| TestLattice::Value(*value))
        }
    }

    #[test]
    fn test_forward_meet_at_join() {
        // entry -> {left(1), right(2)} -> join -> exit
        let mut builder = CfgBuilder::new();
        let entry = builder.add_block(vec![]);
        let left = builder.add_block(vec![1]);
        let right = builder.add_block(vec![2]);
        let join = builder.add_block(vec![]);
        let exit = builder.add_exit();
        builder
            .terminate(entry, Terminator::branch(left, right))
            .unwrap();
        builder.terminate(left, Terminator::goto(join)).unwrap();
        builder.terminate(right, Terminator::goto(join)).unwrap();
        builder.terminate(join, Terminator::goto(exit)).unwrap();
        let cfg = builder.build().unwrap();

        let (_, results) = DataFlowSolver::new(AssignAnalysis).solve(&cfg);

        assert_eq!(results.out_state(entry), Some(&TestLattice::Value(0)));
        assert_eq!(results.out_state(left), Some(&TestLattice::Value(1)));
        assert_eq!(results.in_state(join), Some(&TestLattice::Bottom));
        assert!(results.out_state(exit).is_some_and(MeetSemiLattice::is_bottom));
        assert_eq!(results.block_count(), 5);
    }

    #[test]
    fn test_solver_iterations_start_at_zero() {
        let solver: DataFlowSolver<AssignAnalysis, i32> = DataFlowSolver::new(AssignAnalysis);
        assert_eq!(solver.iterations(), 0);
    }
}
