//! A small stack-machine instruction set with ready-made symbolic semantics.
//!
//! Front-ends may lower their syntax to [`Op`] and explore it with
//! [`StackMachineVisitor`] instead of writing a visitor for their own instruction
//! type. The engine's tests and benchmarks are written against it.

mod op;
mod visitor;

pub use op::{ComparisonOp, Op};
pub use visitor::StackMachineVisitor;
