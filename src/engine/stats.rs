//! Exploration outcome and counters.

use strum::Display;

/// How an exploration ended.
///
/// Only [`Completed`](Self::Completed) means every feasible path within the visit cap
/// was explored. The other variants describe a partial exploration; callers must treat
/// it as a conservative under-approximation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ExplorationOutcome {
    /// The worklist drained.
    Completed,
    /// The step budget ran out.
    MaxStepCountReached,
    /// The node budget or the relationship closure bound was exceeded.
    MaxInternalStateCountReached,
    /// The configured deadline passed.
    TimedOut,
}

impl ExplorationOutcome {
    /// Returns `true` if every path was explored.
    #[must_use]
    pub const fn is_complete(self) -> bool {
        matches!(self, ExplorationOutcome::Completed)
    }
}

/// Counters collected while walking.
///
/// # Examples
///
/// ```ignore
/// let outcome = graph.walk()?;
/// let stats = graph.stats();
/// println!("{outcome}: {} steps, {} exit paths", stats.steps, stats.exit_paths);
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExplorationStats {
    /// Nodes dequeued and processed.
    pub steps: usize,

    /// Nodes accepted into the worklist, including the entry node.
    pub nodes_enqueued: usize,

    /// Successors dropped because an equal node was already in the graph.
    pub duplicates_dropped: usize,

    /// Successors dropped because their point hit the visit cap.
    pub visit_limit_drops: usize,

    /// Branch sides, instruction results and check results that turned out
    /// infeasible.
    pub infeasible_branches: usize,

    /// Paths that reached the exit block.
    pub exit_paths: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_display() {
        assert_eq!(ExplorationOutcome::Completed.to_string(), "Completed");
        assert_eq!(
            ExplorationOutcome::MaxStepCountReached.to_string(),
            "MaxStepCountReached"
        );
        assert!(ExplorationOutcome::Completed.is_complete());
        assert!(!ExplorationOutcome::TimedOut.is_complete());
    }
}
