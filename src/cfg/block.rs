//! Basic blocks and their terminators.
//!
//! A [`BasicBlock`] is a straight-line instruction sequence followed by a single
//! [`Terminator`]. The terminator is a closed sum type over every structural block
//! kind the walker understands, so dispatch is an exhaustive `match`.

use strum::Display;

use crate::cfg::BlockId;

/// How control leaves a block that ends in an unconditional jump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum JumpKind {
    /// Falls into the next block
    Fallthrough,
    /// Explicit `goto`
    Goto,
    /// `return`, targeting the exit block
    Return,
    /// `throw`, targeting the exit block
    Throw,
    /// `break` out of a loop or switch
    Break,
    /// `continue` to a loop header
    Continue,
}

/// Short-circuit operator whose left operand a binary branch evaluates.
///
/// For `a && b` the false edge skips `b` and the expression's value is the literal
/// `false`; for `a || b` the true edge skips `b` and the value is the literal `true`.
/// Plain conditions (`if`, `while`, ...) produce no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
pub enum ShortCircuit {
    /// The condition's value is consumed by the branch
    #[default]
    None,
    /// Left operand of `&&`
    And,
    /// Left operand of `||`
    Or,
}

/// Structural kind of a block, without its targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum BlockKind {
    /// The exit block
    Exit,
    /// Unconditional jump
    Jump,
    /// Two-way conditional branch
    BinaryBranch,
    /// Conditional whose outcomes share one successor
    BinaryBranchingSimple,
    /// Multi-way branch
    Branch,
}

/// How control leaves a basic block.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Terminator {
    /// The method's single exit block. Paths reaching it are complete.
    Exit,
    /// Unconditional transfer to `target`.
    Jump {
        /// Successor block
        target: BlockId,
        /// Source construct the jump came from
        kind: JumpKind,
        /// `true` if the jump consumes the top of the expression stack (`return x`, `throw e`)
        consumes_value: bool,
    },
    /// Two-way branch on the boolean on top of the expression stack.
    BinaryBranch {
        /// Successor when the condition holds
        on_true: BlockId,
        /// Successor when the condition does not hold
        on_false: BlockId,
        /// Short-circuit operator this condition belongs to
        short_circuit: ShortCircuit,
    },
    /// Branch on the top of stack where both outcomes continue in `successor`, pushing
    /// the literal truth value of the outcome (`b = x && y` lowered without jumps).
    BinaryBranchingSimple {
        /// The single successor block
        successor: BlockId,
    },
    /// Multi-way branch such as a `switch`.
    Branch {
        /// Successor blocks, one per section
        successors: Vec<BlockId>,
        /// `true` if the switch consumes the governing expression
        consumes_value: bool,
    },
}

impl Terminator {
    /// Returns the successor blocks in edge order.
    #[must_use]
    pub fn successors(&self) -> Vec<BlockId> {
        match self {
            Terminator::Exit => Vec::new(),
            Terminator::Jump { target, .. } => vec![*target],
            Terminator::BinaryBranch {
                on_true, on_false, ..
            } => vec![*on_true, *on_false],
            Terminator::BinaryBranchingSimple { successor } => vec![*successor],
            Terminator::Branch { successors, .. } => successors.clone(),
        }
    }

    /// Returns the structural kind of this terminator.
    #[must_use]
    pub const fn kind(&self) -> BlockKind {
        match self {
            Terminator::Exit => BlockKind::Exit,
            Terminator::Jump { .. } => BlockKind::Jump,
            Terminator::BinaryBranch { .. } => BlockKind::BinaryBranch,
            Terminator::BinaryBranchingSimple { .. } => BlockKind::BinaryBranchingSimple,
            Terminator::Branch { .. } => BlockKind::Branch,
        }
    }

    /// Shorthand for a fallthrough jump that consumes nothing.
    #[must_use]
    pub const fn goto(target: BlockId) -> Self {
        Terminator::Jump {
            target,
            kind: JumpKind::Goto,
            consumes_value: false,
        }
    }

    /// Shorthand for a plain `if` / `while` condition.
    #[must_use]
    pub const fn branch(on_true: BlockId, on_false: BlockId) -> Self {
        Terminator::BinaryBranch {
            on_true,
            on_false,
            short_circuit: ShortCircuit::None,
        }
    }
}

/// A basic block: instructions executed in order, then a terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicBlock<I> {
    id: BlockId,
    instructions: Vec<I>,
    terminator: Terminator,
}

impl<I> BasicBlock<I> {
    /// Creates a block.
    #[must_use]
    pub fn new(id: BlockId, instructions: Vec<I>, terminator: Terminator) -> Self {
        BasicBlock {
            id,
            instructions,
            terminator,
        }
    }

    /// Returns the block's identifier.
    #[must_use]
    pub const fn id(&self) -> BlockId {
        self.id
    }

    /// Returns the instructions in execution order.
    #[must_use]
    pub fn instructions(&self) -> &[I] {
        &self.instructions
    }

    /// Returns the instruction at `offset`, or `None` at and past the terminator.
    #[must_use]
    pub fn instruction(&self, offset: usize) -> Option<&I> {
        self.instructions.get(offset)
    }

    /// Returns the number of instructions; also the offset of the terminator point.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns `true` if the block has no instructions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Returns the terminator.
    #[must_use]
    pub const fn terminator(&self) -> &Terminator {
        &self.terminator
    }

    /// Returns `true` for the exit block.
    #[must_use]
    pub const fn is_exit(&self) -> bool {
        matches!(self.terminator, Terminator::Exit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminator_successors() {
        let a = BlockId::new(1);
        let b = BlockId::new(2);

        assert!(Terminator::Exit.successors().is_empty());
        assert_eq!(Terminator::goto(a).successors(), vec![a]);
        assert_eq!(Terminator::branch(a, b).successors(), vec![a, b]);
        assert_eq!(
            Terminator::BinaryBranchingSimple { successor: b }.successors(),
            vec![b]
        );
        assert_eq!(
            Terminator::Branch {
                successors: vec![b, a, b],
                consumes_value: true
            }
            .successors(),
            vec![b, a, b]
        );
    }

    #[test]
    fn test_terminator_kind() {
        assert_eq!(Terminator::Exit.kind(), BlockKind::Exit);
        assert_eq!(
            Terminator::branch(BlockId::new(0), BlockId::new(1)).kind(),
            BlockKind::BinaryBranch
        );
        assert_eq!(BlockKind::BinaryBranchingSimple.to_string(), "BinaryBranchingSimple");
    }

    #[test]
    fn test_block_accessors() {
        let block = BasicBlock::new(BlockId::new(3), vec!["a", "b"], Terminator::Exit);

        assert_eq!(block.id(), BlockId::new(3));
        assert_eq!(block.len(), 2);
        assert_eq!(block.instruction(1), Some(&"b"));
        assert_eq!(block.instruction(2), None);
        assert!(block.is_exit());
    }
}
