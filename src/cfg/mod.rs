//! Control-flow graphs consumed by the engine.
//!
//! A front-end lowers a method body into [`BasicBlock`]s of its own instruction type
//! `I`, each ending in a [`Terminator`] that names the block's structural kind and
//! successors. [`CfgBuilder`] assembles and validates them into a
//! [`ControlFlowGraph`]. The [`dataflow`] module computes block-level liveness, the
//! default oracle used to prune dead bindings between blocks.

mod block;
mod builder;
pub mod dataflow;
mod graph;

pub use block::{BasicBlock, BlockKind, JumpKind, ShortCircuit, Terminator};
pub use builder::CfgBuilder;
pub use dataflow::{KeepAllLive, LiveVariables, LivenessOracle, SymbolAccess};
pub use graph::ControlFlowGraph;

/// Identifier of a basic block; the block's index in its graph.
pub type BlockId = crate::utils::graph::NodeId;
