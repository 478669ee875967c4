//! Incremental, validating construction of control-flow graphs.

use crate::{
    cfg::{BasicBlock, BlockId, ControlFlowGraph, Terminator},
    utils::graph::DirectedGraph,
    Error, Result,
};

/// Builds a [`ControlFlowGraph`] block by block.
///
/// Blocks are created first and terminated later, so forward jumps can name blocks
/// that have not been filled yet. [`build`](Self::build) checks the structural
/// invariants the walker relies on.
///
/// # Examples
///
/// ```rust
/// use symscope::cfg::{CfgBuilder, Terminator};
///
/// let mut builder: CfgBuilder<&str> = CfgBuilder::new();
/// let entry = builder.add_block(vec!["x = 1"]);
/// let exit = builder.add_exit();
/// builder.terminate(entry, Terminator::goto(exit))?;
///
/// let cfg = builder.build()?;
/// assert_eq!(cfg.entry(), entry);
/// assert_eq!(cfg.exit(), exit);
/// # Ok::<(), symscope::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct CfgBuilder<I> {
    blocks: Vec<(Vec<I>, Option<Terminator>)>,
    entry: Option<BlockId>,
}

impl<I> Default for CfgBuilder<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I> CfgBuilder<I> {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        CfgBuilder {
            blocks: Vec::new(),
            entry: None,
        }
    }

    /// Adds an unterminated block. The first block added is the entry unless
    /// [`set_entry`](Self::set_entry) says otherwise.
    pub fn add_block(&mut self, instructions: Vec<I>) -> BlockId {
        let id = BlockId::new(self.blocks.len());
        self.blocks.push((instructions, None));
        id
    }

    /// Adds the exit block.
    pub fn add_exit(&mut self) -> BlockId {
        let id = BlockId::new(self.blocks.len());
        self.blocks.push((Vec::new(), Some(Terminator::Exit)));
        id
    }

    /// Overrides the entry block.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBlock`] if `block` was not added to this builder.
    pub fn set_entry(&mut self, block: BlockId) -> Result<()> {
        self.check_block(block)?;
        self.entry = Some(block);
        Ok(())
    }

    /// Appends an instruction to `block`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBlock`] if `block` was not added to this builder.
    pub fn push_instruction(&mut self, block: BlockId, instruction: I) -> Result<()> {
        self.check_block(block)?;
        self.blocks[block.index()].0.push(instruction);
        Ok(())
    }

    /// Sets the terminator of `block`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBlock`] if `block` was not added to this builder.
    pub fn terminate(&mut self, block: BlockId, terminator: Terminator) -> Result<()> {
        self.check_block(block)?;
        self.blocks[block.index()].1 = Some(terminator);
        Ok(())
    }

    /// Validates the graph and freezes it.
    ///
    /// # Errors
    ///
    /// - [`Error::Malformed`] if the builder is empty, a block has no terminator, the
    ///   graph does not have exactly one exit block, the exit block carries
    ///   instructions, or a `Branch` has no successors.
    /// - [`Error::InvalidBlock`] if a terminator targets a block that does not exist.
    pub fn build(self) -> Result<ControlFlowGraph<I>> {
        if self.blocks.is_empty() {
            return Err(malformed_error!("control-flow graph has no blocks"));
        }

        let block_count = self.blocks.len();
        let mut exit = None;
        let mut blocks = Vec::with_capacity(block_count);

        for (index, (instructions, terminator)) in self.blocks.into_iter().enumerate() {
            let id = BlockId::new(index);
            let Some(terminator) = terminator else {
                return Err(malformed_error!("block {} has no terminator", id));
            };

            match &terminator {
                Terminator::Exit => {
                    if let Some(previous) = exit {
                        return Err(malformed_error!(
                            "blocks {} and {} are both exit blocks",
                            previous,
                            id
                        ));
                    }
                    if !instructions.is_empty() {
                        return Err(malformed_error!("exit block {} has instructions", id));
                    }
                    exit = Some(id);
                }
                Terminator::Branch { successors, .. } if successors.is_empty() => {
                    return Err(malformed_error!("branch block {} has no successors", id));
                }
                _ => {}
            }

            for target in terminator.successors() {
                if target.index() >= block_count {
                    return Err(Error::InvalidBlock(target));
                }
            }

            blocks.push(BasicBlock::new(id, instructions, terminator));
        }

        let Some(exit) = exit else {
            return Err(malformed_error!("control-flow graph has no exit block"));
        };
        let entry = self.entry.unwrap_or(BlockId::new(0));

        let mut graph = DirectedGraph::with_capacity(block_count);
        let edges: Vec<(BlockId, Vec<BlockId>)> = blocks
            .iter()
            .map(|block| (block.id(), block.terminator().successors()))
            .collect();
        for block in blocks {
            graph.add_node(block);
        }
        for (source, targets) in edges {
            for target in targets {
                graph.add_edge(source, target)?;
            }
        }

        Ok(ControlFlowGraph::from_parts(graph, entry, exit))
    }

    fn check_block(&self, block: BlockId) -> Result<()> {
        if block.index() < self.blocks.len() {
            Ok(())
        } else {
            Err(Error::InvalidBlock(block))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfg::ShortCircuit;

    #[test]
    fn test_build_diamond() {
        let mut builder: CfgBuilder<u32> = CfgBuilder::new();
        let cond = builder.add_block(vec![1]);
        let then = builder.add_block(vec![2]);
        let other = builder.add_block(vec![3]);
        let exit = builder.add_exit();
        builder
            .terminate(
                cond,
                Terminator::BinaryBranch {
                    on_true: then,
                    on_false: other,
                    short_circuit: ShortCircuit::None,
                },
            )
            .unwrap();
        builder.terminate(then, Terminator::goto(exit)).unwrap();
        builder.terminate(other, Terminator::goto(exit)).unwrap();

        let cfg = builder.build().unwrap();
        assert_eq!(cfg.block_count(), 4);
        assert_eq!(cfg.edge_count(), 4);
        assert_eq!(cfg.successors(cond).collect::<Vec<_>>(), vec![then, other]);
        assert_eq!(cfg.predecessors(exit).count(), 2);
        assert_eq!(cfg.reverse_postorder().first(), Some(&cond));
        assert_eq!(cfg.postorder().first(), Some(&exit));
    }

    #[test]
    fn test_build_rejects_missing_terminator() {
        let mut builder: CfgBuilder<u32> = CfgBuilder::new();
        builder.add_block(vec![]);
        builder.add_exit();

        assert!(matches!(builder.build(), Err(Error::Malformed { .. })));
    }

    #[test]
    fn test_build_rejects_missing_or_duplicate_exit() {
        let mut builder: CfgBuilder<u32> = CfgBuilder::new();
        let a = builder.add_block(vec![]);
        builder.terminate(a, Terminator::goto(a)).unwrap();
        assert!(matches!(builder.build(), Err(Error::Malformed { .. })));

        let mut builder: CfgBuilder<u32> = CfgBuilder::new();
        builder.add_exit();
        builder.add_exit();
        assert!(matches!(builder.build(), Err(Error::Malformed { .. })));
    }

    #[test]
    fn test_build_rejects_dangling_target() {
        let mut builder: CfgBuilder<u32> = CfgBuilder::new();
        let a = builder.add_block(vec![]);
        builder.add_exit();
        builder
            .terminate(a, Terminator::goto(BlockId::new(9)))
            .unwrap();

        assert_eq!(builder.build().unwrap_err(), Error::InvalidBlock(BlockId::new(9)));
    }

    #[test]
    fn test_unknown_block_is_rejected() {
        let mut builder: CfgBuilder<u32> = CfgBuilder::new();
        assert!(builder.set_entry(BlockId::new(0)).is_err());
        assert!(builder.push_instruction(BlockId::new(0), 1).is_err());
    }

    #[test]
    fn test_set_entry() {
        let mut builder: CfgBuilder<u32> = CfgBuilder::new();
        let exit = builder.add_exit();
        let start = builder.add_block(vec![7]);
        builder.terminate(start, Terminator::goto(exit)).unwrap();
        builder.set_entry(start).unwrap();

        let cfg = builder.build().unwrap();
        assert_eq!(cfg.entry(), start);
        assert_eq!(cfg.block(start).unwrap().instructions(), &[7]);
    }
}
