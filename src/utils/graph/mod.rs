//! Generic directed graph infrastructure.
//!
//! - [`NodeId`] - strongly-typed node index
//! - [`DirectedGraph`] - adjacency-list graph with node payloads
//! - [`GraphBase`], [`Successors`], [`Predecessors`], [`RootedGraph`] - traversal traits
//! - [`postorder`], [`reverse_postorder`] - depth-first orderings

mod directed;
mod node;
mod traits;
mod traversal;

pub use directed::DirectedGraph;
pub use node::NodeId;
pub use traits::{GraphBase, Predecessors, RootedGraph, Successors};
pub use traversal::{postorder, reverse_postorder};
