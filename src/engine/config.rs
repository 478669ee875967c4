//! Exploration bounds.
//!
//! The walker terminates on every input because every path is bounded three ways: by
//! a global step budget, by a per-point visit cap carried inside each state, and by a
//! cap on distinct exploded-graph nodes. [`ExplorationConfig`] holds those bounds plus
//! an optional wall-clock deadline.
//!
//! # Presets
//!
//! - [`ExplorationConfig::default()`] - The standard bounds listed below
//! - [`ExplorationConfig::quick()`] - Small budgets for interactive tooling
//! - [`ExplorationConfig::thorough()`] - Larger budgets for batch analysis

use std::time::Duration;

/// Default number of nodes the walker dequeues before giving up.
pub const MAX_STEP_COUNT: usize = 1000;

/// Default number of times one program point may be entered along a path.
pub const MAX_PROGRAM_POINT_EXECUTION_COUNT: u32 = 2;

/// Default bound on distinct exploded-graph nodes, and the fixed bound on the size of a
/// relationship closure.
pub const MAX_INTERNAL_STATE_COUNT: usize = 10_000;

/// Limits for one exploration.
///
/// Hitting a limit is not an error: the walk stops, the corresponding
/// [`ExplorationEvent`](crate::engine::ExplorationEvent) fires, and
/// [`ExplodedGraph::walk`](crate::engine::ExplodedGraph::walk) reports the matching
/// [`ExplorationOutcome`](crate::engine::ExplorationOutcome). Callers treat an
/// incomplete exploration as "no finding".
///
/// # Builder Pattern
///
/// ```rust
/// use std::time::Duration;
/// use symscope::engine::ExplorationConfig;
///
/// let config = ExplorationConfig::new()
///     .with_max_steps(5_000)
///     .with_timeout(Duration::from_millis(250));
/// assert_eq!(config.max_program_point_visits, 2);
/// ```
///
/// # Default Values
///
/// | Limit | Default Value |
/// |-------|---------------|
/// | `max_steps` | 1,000 |
/// | `max_program_point_visits` | 2 |
/// | `max_internal_states` | 10,000 |
/// | `timeout` | none |
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExplorationConfig {
    /// Maximum number of dequeued nodes.
    ///
    /// When exceeded, exploration stops with
    /// [`MaxStepCountReached`](crate::engine::ExplorationOutcome::MaxStepCountReached).
    pub max_steps: usize,

    /// Maximum visits of one program point along a single path.
    ///
    /// A successor whose state already visited its point this often is dropped. This
    /// is what makes loops terminate.
    pub max_program_point_visits: u32,

    /// Maximum number of distinct nodes kept for deduplication.
    pub max_internal_states: usize,

    /// Wall-clock deadline, polled once per step.
    pub timeout: Option<Duration>,
}

impl Default for ExplorationConfig {
    /// Creates the standard bounds.
    ///
    /// See the struct documentation for default values.
    fn default() -> Self {
        Self {
            max_steps: MAX_STEP_COUNT,
            max_program_point_visits: MAX_PROGRAM_POINT_EXECUTION_COUNT,
            max_internal_states: MAX_INTERNAL_STATE_COUNT,
            timeout: None,
        }
    }
}

impl ExplorationConfig {
    /// Creates a configuration with default values.
    ///
    /// Equivalent to [`ExplorationConfig::default()`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Small budgets for editors and other interactive hosts.
    ///
    /// 250 steps, 2,500 nodes and a 100 ms deadline.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            max_steps: 250,
            max_internal_states: 2_500,
            timeout: Some(Duration::from_millis(100)),
            ..Self::default()
        }
    }

    /// Larger budgets for offline analysis of big methods.
    ///
    /// 20,000 steps and 100,000 nodes, no deadline. The visit cap stays at 2: raising
    /// it grows the explored graph exponentially in the loop nesting depth.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            max_steps: 20_000,
            max_internal_states: 100_000,
            ..Self::default()
        }
    }

    /// Sets the step budget.
    ///
    /// # Arguments
    ///
    /// * `max` - Maximum number of dequeued nodes
    ///
    /// # Returns
    ///
    /// Returns `self` for method chaining.
    #[must_use]
    pub fn with_max_steps(mut self, max: usize) -> Self {
        self.max_steps = max;
        self
    }

    /// Sets the per-point visit cap.
    ///
    /// # Arguments
    ///
    /// * `max` - Maximum visits of one program point along a path
    ///
    /// # Returns
    ///
    /// Returns `self` for method chaining.
    #[must_use]
    pub fn with_max_program_point_visits(mut self, max: u32) -> Self {
        self.max_program_point_visits = max;
        self
    }

    /// Sets the node budget.
    ///
    /// # Arguments
    ///
    /// * `max` - Maximum number of distinct exploded-graph nodes
    ///
    /// # Returns
    ///
    /// Returns `self` for method chaining.
    #[must_use]
    pub fn with_max_internal_states(mut self, max: usize) -> Self {
        self.max_internal_states = max;
        self
    }

    /// Sets a wall-clock deadline.
    ///
    /// # Arguments
    ///
    /// * `timeout` - Time after which the walk stops with
    ///   [`TimedOut`](crate::engine::ExplorationOutcome::TimedOut)
    ///
    /// # Returns
    ///
    /// Returns `self` for method chaining.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
