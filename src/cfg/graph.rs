//! The control-flow graph handed to the engine.

use crate::{
    cfg::{BasicBlock, BlockId},
    utils::graph::{
        postorder, reverse_postorder, DirectedGraph, GraphBase, NodeId, Predecessors,
        RootedGraph, Successors,
    },
};

/// A control-flow graph of [`BasicBlock`]s with one entry and one exit block.
///
/// Built and validated by [`CfgBuilder`](crate::cfg::CfgBuilder). Block identifiers
/// are dense indices, so per-block side tables can be plain vectors.
#[derive(Debug, Clone)]
pub struct ControlFlowGraph<I> {
    graph: DirectedGraph<BasicBlock<I>>,
    entry: BlockId,
    exit: BlockId,
}

impl<I> ControlFlowGraph<I> {
    pub(crate) fn from_parts(
        graph: DirectedGraph<BasicBlock<I>>,
        entry: BlockId,
        exit: BlockId,
    ) -> Self {
        ControlFlowGraph { graph, entry, exit }
    }

    /// Returns the entry block.
    #[must_use]
    pub const fn entry(&self) -> BlockId {
        self.entry
    }

    /// Returns the exit block.
    #[must_use]
    pub const fn exit(&self) -> BlockId {
        self.exit
    }

    /// Returns the block with the given id.
    #[must_use]
    pub fn block(&self, id: BlockId) -> Option<&BasicBlock<I>> {
        self.graph.node(id)
    }

    /// Iterates over all blocks in id order.
    pub fn blocks(&self) -> impl Iterator<Item = &BasicBlock<I>> + '_ {
        self.graph.nodes().map(|(_, block)| block)
    }

    /// Returns the number of blocks.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns the successors of `block` in terminator order.
    pub fn successors(&self, block: BlockId) -> impl Iterator<Item = BlockId> + '_ {
        self.graph.successors(block)
    }

    /// Returns the predecessors of `block`.
    pub fn predecessors(&self, block: BlockId) -> impl Iterator<Item = BlockId> + '_ {
        self.graph.predecessors(block)
    }

    /// Blocks reachable from the entry, in postorder.
    #[must_use]
    pub fn postorder(&self) -> Vec<BlockId> {
        postorder(&self.graph, self.entry)
    }

    /// Blocks reachable from the entry, in reverse postorder.
    #[must_use]
    pub fn reverse_postorder(&self) -> Vec<BlockId> {
        reverse_postorder(&self.graph, self.entry)
    }
}

impl<I> GraphBase for ControlFlowGraph<I> {
    fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        self.graph.node_ids()
    }
}

impl<I> Successors for ControlFlowGraph<I> {
    fn successors(&self, node: NodeId) -> impl Iterator<Item = NodeId> {
        self.graph.successors(node)
    }
}

impl<I> Predecessors for ControlFlowGraph<I> {
    fn predecessors(&self, node: NodeId) -> impl Iterator<Item = NodeId> {
        self.graph.predecessors(node)
    }
}

impl<I> RootedGraph for ControlFlowGraph<I> {
    fn entry(&self) -> NodeId {
        self.entry
    }
}
