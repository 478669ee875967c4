//! Exploded graph nodes.

use crate::state::{ProgramPoint, ProgramState};

/// A vertex of the exploded graph: a program point under one abstract state.
///
/// Two nodes are equal iff both their points and their states are equal. The
/// walker keeps a set of nodes it has already enqueued; paths that reach an equal
/// node collapse into it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExplodedGraphNode {
    point: ProgramPoint,
    state: ProgramState,
}

impl ExplodedGraphNode {
    /// Creates a node.
    #[must_use]
    pub fn new(point: ProgramPoint, state: ProgramState) -> Self {
        ExplodedGraphNode { point, state }
    }

    /// Returns the program point.
    #[must_use]
    pub const fn point(&self) -> ProgramPoint {
        self.point
    }

    /// Returns the state.
    #[must_use]
    pub const fn state(&self) -> &ProgramState {
        &self.state
    }

    /// Splits the node into its parts.
    #[must_use]
    pub fn into_parts(self) -> (ProgramPoint, ProgramState) {
        (self.point, self.state)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::{cfg::BlockId, symbolic::SymbolicValue};

    #[test]
    fn test_node_identity_uses_point_and_state() {
        let point = ProgramPoint::start_of(BlockId::new(0));
        let state = ProgramState::new();
        let pushed = state.push_value(SymbolicValue::true_value());

        let mut seen = HashSet::new();
        assert!(seen.insert(ExplodedGraphNode::new(point, state.clone())));
        assert!(!seen.insert(ExplodedGraphNode::new(point, state.clone())));
        assert!(seen.insert(ExplodedGraphNode::new(point, pushed)));
        assert!(seen.insert(ExplodedGraphNode::new(point.next(), state)));
    }
}
