//! # symscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the symscope library. Import this module to get quick access to the essential
//! types for building control-flow graphs and exploring them.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all symscope operations
pub use crate::Error;

/// The result type used throughout symscope
pub use crate::Result;

// ================================================================================================
// Semantic Boundary
// ================================================================================================

/// Storage locations and their allocation
pub use crate::semantic::{Symbol, SymbolKind, SymbolTable};

/// Method declarations and parameter nullability
pub use crate::semantic::{
    Declaration, NoNullabilityPolicy, Parameter, ParameterPolicy, RefKind, TypeFlags,
    ValueTypePolicy,
};

// ================================================================================================
// Control-Flow Graphs
// ================================================================================================

/// Blocks, terminators and graph construction
pub use crate::cfg::{
    BasicBlock, BlockId, BlockKind, CfgBuilder, ControlFlowGraph, JumpKind, ShortCircuit,
    Terminator,
};

/// Liveness oracles consumed by the walker
pub use crate::cfg::{KeepAllLive, LiveVariables, LivenessOracle, SymbolAccess};

// ================================================================================================
// Symbolic Values and Facts
// ================================================================================================

/// Abstract values
pub use crate::symbolic::{SymbolicValue, SymbolicValueFactory, SymbolicValueKind};

/// Unary constraints
pub use crate::symbolic::{ConstraintDomain, ConstraintSet, SymbolicConstraint};

/// Binary relationships
pub use crate::symbolic::{BinaryRelationship, RelationshipKind, RelationshipSet};

// ================================================================================================
// Program States
// ================================================================================================

/// Points, states and exploded-graph nodes
pub use crate::state::{ExplodedGraphNode, ProgramPoint, ProgramState};

// ================================================================================================
// Exploration Engine
// ================================================================================================

/// The walker and its configuration
pub use crate::engine::{ExplodedGraph, ExplorationConfig, ExplorationOutcome, ExplorationStats};

/// Plug-in surface
pub use crate::engine::{CheckRegistry, InstructionContext, InstructionVisitor, SymbolicCheck};

/// Exploration events
pub use crate::engine::{Event, EventKind, EventLog, ExplorationEvent, ExplorationListener};

/// Batch exploration
pub use crate::engine::{explore_methods, ExplorationSummary, MethodBody};

// ================================================================================================
// Stack-Machine IR
// ================================================================================================

/// Ready-made instruction set and visitor
pub use crate::ir::{ComparisonOp, Op, StackMachineVisitor};
