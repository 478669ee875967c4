use thiserror::Error;

use crate::cfg::BlockId;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Infeasible program paths are **not** errors: operations that may discover a contradiction
/// return `Ok(None)` (or omit the contradicting state) and the exploration silently drops that
/// path. Exhausted exploration budgets are not errors either; the walker reports them as
/// events and through [`ExplorationOutcome`](crate::engine::ExplorationOutcome). The variants
/// below are reserved for wiring defects between the engine and its collaborators.
///
/// # Error Categories
///
/// ## Graph Construction Errors
/// - [`Error::Malformed`] - A control-flow graph violates a structural invariant
/// - [`Error::InvalidBlock`] - A block identifier does not name a block of the graph
/// - [`Error::GraphError`] - Low-level graph operation failure
///
/// ## Contract Violations
/// - [`Error::StackUnderflow`] - An instruction visitor popped more values than the stack holds
/// - [`Error::Check`] - A check plugin reported an unrecoverable failure
///
/// ## Resource Limits
/// - [`Error::TooManyInternalStates`] - The relationship closure or node table outgrew its bound
///
/// # Examples
///
/// ```rust
/// use symscope::{state::ProgramState, Error};
///
/// let state = ProgramState::new();
/// match state.pop_value() {
///     Ok((_, value)) => println!("popped {value}"),
///     Err(Error::StackUnderflow { requested, available }) => {
///         eprintln!("wanted {requested} values, stack held {available}");
///     }
///     Err(e) => eprintln!("Other error: {e}"),
/// }
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The control-flow graph handed to the engine is structurally invalid.
    ///
    /// Raised by [`CfgBuilder`](crate::cfg::CfgBuilder) when a block is left without a
    /// terminator, when the graph has no (or several) exit blocks, or when a terminator's
    /// shape does not match its successor list. The error includes the source location
    /// where the malformation was detected for debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// A block identifier does not name a block of the control-flow graph.
    #[error("Block {0} does not exist in the control-flow graph")]
    InvalidBlock(BlockId),

    /// Failure during a low-level graph operation, such as adding an edge to a missing node.
    #[error("Graph error: {0}")]
    GraphError(String),

    /// More values were popped or peeked than the expression stack holds.
    ///
    /// This indicates a defect in the instruction visitor (its stack effects do not match
    /// the instructions it evaluates), never a property of the analysed program.
    #[error("Expression stack underflow - requested {requested}, available {available}")]
    StackUnderflow {
        /// Number of values requested
        requested: usize,
        /// Number of values on the stack
        available: usize,
    },

    /// The number of internal states exceeded the configured bound.
    ///
    /// Raised by the relationship closure when the derived fact set grows past
    /// [`MAX_INTERNAL_STATE_COUNT`](crate::engine::MAX_INTERNAL_STATE_COUNT), and used by the
    /// walker for its node table. The walker converts it into a
    /// [`MaxInternalStateCountReached`](crate::engine::ExplorationEvent::MaxInternalStateCountReached)
    /// event; it never escapes [`ExplodedGraph::walk`](crate::engine::ExplodedGraph::walk).
    #[error("Too many internal states - {count} exceeds limit of {limit}")]
    TooManyInternalStates {
        /// Number of states at the time the limit was hit
        count: usize,
        /// The configured limit
        limit: usize,
    },

    /// A check plugin failed in a way that cannot be expressed as a dropped path.
    #[error("Check failure: {0}")]
    Check(String),
}
