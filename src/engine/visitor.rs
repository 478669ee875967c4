//! The boundary between the walker and a language's instruction semantics.

use crate::{
    engine::CheckRegistry,
    state::{ProgramPoint, ProgramState},
    symbolic::{SymbolicValue, SymbolicValueFactory},
    Result,
};

/// Evaluates the symbolic effect of one instruction.
///
/// The walker calls [`visit`](Self::visit) once per instruction and path, after the
/// checks' `pre_process` hooks and before their `post_process` hooks. The visitor
/// reads and writes bindings, manipulates the expression stack, and may constrain
/// values (a member access proves its receiver is not null).
///
/// # Errors
///
/// Stack underflows and other visitor defects surface as errors and abort the walk.
/// An infeasible instruction (one whose effect contradicts the state) yields no
/// state.
pub trait InstructionVisitor<I> {
    /// Returns the states after `instruction`: usually one, several when a creation
    /// hook forked the path, none to drop it.
    fn visit(
        &mut self,
        instruction: &I,
        state: &ProgramState,
        ctx: &mut InstructionContext<'_, I>,
    ) -> Result<Vec<ProgramState>>;
}

/// What a visitor may use from the walker while evaluating an instruction.
pub struct InstructionContext<'c, I> {
    point: ProgramPoint,
    factory: &'c mut SymbolicValueFactory,
    checks: &'c mut CheckRegistry<I>,
}

impl<'c, I: 'static> InstructionContext<'c, I> {
    /// Creates a context for evaluating the instruction at `point`.
    pub fn new(
        point: ProgramPoint,
        factory: &'c mut SymbolicValueFactory,
        checks: &'c mut CheckRegistry<I>,
    ) -> Self {
        InstructionContext {
            point,
            factory,
            checks,
        }
    }

    /// Returns the point of the instruction being evaluated.
    #[must_use]
    pub const fn point(&self) -> ProgramPoint {
        self.point
    }

    /// Mints a fresh opaque value.
    pub fn create_value(&mut self) -> SymbolicValue {
        self.factory.create()
    }

    /// Returns the method's value factory, for derived values.
    pub fn factory(&mut self) -> &mut SymbolicValueFactory {
        self.factory
    }

    /// Runs the checks' [`object_creating`](crate::engine::SymbolicCheck::object_creating)
    /// hooks.
    ///
    /// # Errors
    ///
    /// Propagates check failures.
    pub fn object_creating(
        &mut self,
        instruction: &I,
        state: ProgramState,
    ) -> Result<Vec<ProgramState>> {
        self.checks.object_creating(instruction, state)
    }

    /// Runs the checks' [`object_created`](crate::engine::SymbolicCheck::object_created)
    /// hooks for the new object `value`.
    ///
    /// # Errors
    ///
    /// Propagates check failures.
    pub fn object_created(
        &mut self,
        instruction: &I,
        value: &SymbolicValue,
        state: ProgramState,
    ) -> Result<Vec<ProgramState>> {
        self.checks.object_created(instruction, value, state)
    }
}
