//! Block-level data flow analyses over a [`ControlFlowGraph`](crate::cfg::ControlFlowGraph).
//!
//! - [`DataFlowAnalysis`] / [`Direction`] - the analysis contract
//! - [`MeetSemiLattice`] - how facts combine at merge points
//! - [`DataFlowSolver`] - worklist fixpoint solver
//! - [`LiveVariables`] - backward liveness, the default [`LivenessOracle`]

mod framework;
mod lattice;
mod liveness;
mod solver;

pub use framework::{AnalysisResults, DataFlowAnalysis, Direction};
pub use lattice::MeetSemiLattice;
pub use liveness::{KeepAllLive, LiveSet, LiveVariables, LivenessOracle, SymbolAccess};
pub use solver::DataFlowSolver;
