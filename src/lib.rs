// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![allow(clippy::too_many_arguments)]

//! # symscope
//!
//! A path-sensitive symbolic execution engine for statement-level static analysis.
//!
//! `symscope` walks the *exploded graph* of a method: the product of its control-flow
//! graph with the abstract program states that reach each instruction. Every feasible
//! path is explored up to configurable bounds, branch conditions constrain the values
//! they test, and contradictory paths are pruned as soon as they are discovered.
//! Analysis rules plug in as checks and observe (or veto) every instruction.
//!
//! ## Features
//!
//! - **🧭 Exploded-graph exploration** - worklist walk with per-path visit caps, node deduplication and step/state/time budgets
//! - **🔗 Constraint propagation** - nullness and boolean facts flow through equality and inequality relationships
//! - **♻️ Persistent states** - immutable program states share structure via [`imbl`] collections
//! - **🧹 Liveness-driven cleanup** - dead bindings are dropped so equivalent states merge
//! - **🔌 Pluggable checks** - typed check registry with pre/post instruction and object-creation hooks
//! - **⚡ Parallel batches** - explore many methods concurrently with [`rayon`]
//!
//! ## Architecture
//!
//! - [`cfg`] - basic blocks, terminators, graph validation and live-variable analysis
//! - [`semantic`] - symbols, method declarations and parameter nullability policies
//! - [`symbolic`] - symbolic values, unary constraints and binary relationships
//! - [`state`] - program points, persistent program states and exploded-graph nodes
//! - [`engine`] - the walker, its configuration, checks, events and batch exploration
//! - [`ir`] - a small stack-machine instruction set with a ready-made visitor
//! - [`utils`] - generic directed-graph infrastructure shared by the layers above
//!
//! ## Quick Start
//!
//! ```rust
//! use symscope::prelude::*;
//!
//! # fn main() -> symscope::Result<()> {
//! let mut symbols = SymbolTable::new();
//! let flag = symbols.parameter("flag");
//!
//! let mut builder = CfgBuilder::new();
//! let test = builder.add_block(vec![Op::Load(flag)]);
//! let then = builder.add_block(vec![Op::LoadTrue, Op::Pop]);
//! let exit = builder.add_exit();
//! builder.terminate(test, Terminator::branch(then, exit))?;
//! builder.terminate(then, Terminator::goto(exit))?;
//! let cfg = builder.build()?;
//!
//! let declaration = Declaration::new("Run");
//! let liveness = LiveVariables::compute(&cfg);
//! let mut graph = ExplodedGraph::new(&cfg, &declaration, &liveness, StackMachineVisitor::new());
//! let outcome = graph.walk()?;
//!
//! println!("{outcome}: {} steps", graph.stats().steps);
//! assert!(outcome.is_complete());
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Infeasible paths and exhausted budgets are not errors. Fallible operations return
//! [`Result<T>`], whose [`Error`] variants signal wiring defects such as a malformed
//! graph or a visitor whose stack effects underflow the expression stack.

#[macro_use]
pub(crate) mod error;

/// Convenient re-exports of the most commonly used types and traits.
///
/// ```rust
/// use symscope::prelude::*;
///
/// let state = ProgramState::new();
/// assert_eq!(state.stack_depth(), 0);
/// ```
pub mod prelude;

/// Generic graph infrastructure.
pub mod utils;

/// Symbols, declarations and nullability policies supplied by a front-end.
pub mod semantic;

/// Control-flow graphs and the data-flow analyses run over them.
pub mod cfg;

/// Symbolic values, constraints and relationships.
pub mod symbolic;

/// Program points, program states and exploded-graph nodes.
pub mod state;

/// The exploded-graph walker and its plug-in surface.
pub mod engine;

/// A minimal stack-machine IR and its instruction visitor.
pub mod ir;

/// `symscope` Result type
///
/// A type alias for `std::result::Result<T, Error>` where the error type is always
/// [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `symscope` Error type
///
/// The main error type for all operations in this crate. See [`Error`] for the
/// variants and when each one is raised.
pub use error::Error;
