//! The exploration engine.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  ExplodedGraph::walk                                             │
//! │    worklist of (ProgramPoint, ProgramState) nodes, FIFO          │
//! │    ├─ instruction  → checks.pre_process                          │
//! │    │                 → InstructionVisitor::visit                 │
//! │    │                 → checks.post_process                       │
//! │    ├─ terminator   → split / clean dead symbols / successors     │
//! │    └─ enqueue      → visit cap, node dedup, state budget         │
//! │                                                                  │
//! │  ExplorationEvent ──► listeners + EventLog                       │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Components
//!
//! - [`ExplodedGraph`] - The walker
//! - [`ExplorationConfig`] - Step, visit, state and time bounds
//! - [`InstructionVisitor`] / [`InstructionContext`] - Language-specific instruction semantics
//! - [`SymbolicCheck`] / [`CheckRegistry`] - Plugins observing and refining states
//! - [`ExplorationEvent`] / [`EventLog`] / [`ExplorationListener`] - Lifecycle notifications
//! - [`explore_methods`] - Parallel exploration of independent methods

mod batch;
mod check;
mod config;
mod events;
mod stats;
mod visitor;
mod walker;

pub use batch::{explore_methods, ExplorationSummary, MethodBody};
pub use check::{AsAny, CheckRegistry, SymbolicCheck};
pub use config::{
    ExplorationConfig, MAX_INTERNAL_STATE_COUNT, MAX_PROGRAM_POINT_EXECUTION_COUNT,
    MAX_STEP_COUNT,
};
pub use events::{Event, EventKind, EventLog, ExplorationEvent, ExplorationListener};
pub use stats::{ExplorationOutcome, ExplorationStats};
pub use visitor::{InstructionContext, InstructionVisitor};
pub use walker::ExplodedGraph;
