//! Program points: a block plus an offset into it.

use std::fmt;

use crate::cfg::BlockId;

/// A location in the control-flow graph.
///
/// `offset` indexes the block's instruction list; an offset equal to the instruction
/// count addresses the block's terminator (the branching point). Points compare by
/// value, so every path reaching the same location shares one visit counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProgramPoint {
    block: BlockId,
    offset: usize,
}

impl ProgramPoint {
    /// Creates a point.
    #[must_use]
    pub const fn new(block: BlockId, offset: usize) -> Self {
        ProgramPoint { block, offset }
    }

    /// The first point of `block`.
    #[must_use]
    pub const fn start_of(block: BlockId) -> Self {
        ProgramPoint { block, offset: 0 }
    }

    /// Returns the block.
    #[must_use]
    pub const fn block(&self) -> BlockId {
        self.block
    }

    /// Returns the offset within the block.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// The point after this one in the same block.
    #[must_use]
    pub const fn next(&self) -> Self {
        ProgramPoint {
            block: self.block,
            offset: self.offset + 1,
        }
    }
}

impl fmt::Display for ProgramPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b{}:{}", self.block.index(), self.offset)
    }
}
