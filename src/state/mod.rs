//! Program states and the nodes of the exploded graph.
//!
//! A [`ProgramState`] is an immutable value: every transition returns a new state and
//! leaves the old one untouched, so states can be shared freely between nodes and
//! compared for deduplication. An [`ExplodedGraphNode`] pairs a state with the
//! [`ProgramPoint`] it was reached at.

mod constraints;
mod node;
mod point;
mod program_state;

pub use node::ExplodedGraphNode;
pub use point::ProgramPoint;
pub use program_state::ProgramState;
