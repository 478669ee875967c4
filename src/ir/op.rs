//! The reference instruction set.

use strum::Display;

use crate::{cfg::SymbolAccess, semantic::Symbol};

/// Comparison operator of [`Op::Compare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ComparisonOp {
    /// `==`
    #[strum(serialize = "==")]
    Eq,
    /// `!=`
    #[strum(serialize = "!=")]
    Ne,
    /// `<`
    #[strum(serialize = "<")]
    Lt,
    /// `<=`
    #[strum(serialize = "<=")]
    Le,
    /// `>`
    #[strum(serialize = ">")]
    Gt,
    /// `>=`
    #[strum(serialize = ">=")]
    Ge,
}

/// A stack-machine instruction.
///
/// Operands are taken from the expression stack, the rightmost operand on top.
/// An instance call pushes its receiver first, then its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// Push the value of a symbol.
    Load(Symbol),
    /// Pop a value into a symbol.
    Store(Symbol),
    /// Push `null`.
    LoadNull,
    /// Push `true`.
    LoadTrue,
    /// Push `false`.
    LoadFalse,
    /// Push `this`.
    LoadThis,
    /// Push `base`.
    LoadBase,
    /// Push a non-null literal (number, string, ...).
    LoadConstant,
    /// Pop two operands, push the comparison's result.
    Compare(ComparisonOp),
    /// Pop a boolean, push its negation.
    Not,
    /// Pop a receiver, push the member's value. Dereferences the receiver.
    MemberAccess,
    /// Call a method.
    Invoke {
        /// Number of arguments on the stack
        arguments: usize,
        /// `true` for instance calls; the receiver is below the arguments
        has_receiver: bool,
        /// `true` if the call pushes a result
        returns_value: bool,
    },
    /// Create an object.
    New {
        /// Number of constructor arguments on the stack
        arguments: usize,
    },
    /// Discard the top of the stack.
    Pop,
    /// Duplicate the top of the stack.
    Dup,
    /// Do nothing.
    Nop,
}

impl SymbolAccess for Op {
    fn reads(&self) -> impl Iterator<Item = Symbol> + '_ {
        match self {
            Op::Load(symbol) => Some(*symbol),
            _ => None,
        }
        .into_iter()
    }

    fn writes(&self) -> impl Iterator<Item = Symbol> + '_ {
        match self {
            Op::Store(symbol) => Some(*symbol),
            _ => None,
        }
        .into_iter()
    }
}
