//! Check plugins.
//!
//! A check observes and refines states around every instruction the walker
//! evaluates. Rules such as null-dereference detection are checks: they read
//! constraints in [`pre_process`](SymbolicCheck::pre_process), record findings on
//! themselves, and may drop a path by returning no state at all. A check may also
//! fork a path, for example into a state where a call result is null and one where
//! it is not.
//!
//! Checks live in a [`CheckRegistry`] keyed by their concrete type. Registering a
//! second check of a type already present replaces the first in place.

use std::any::{Any, TypeId};

use crate::{
    state::{ProgramPoint, ProgramState},
    symbolic::SymbolicValue,
    Result,
};

/// Upcast to [`Any`] for typed retrieval from a [`CheckRegistry`].
///
/// Implemented for every `'static` type; check authors never implement it.
pub trait AsAny: Any {
    /// Returns `self` as `&dyn Any`.
    fn as_any(&self) -> &dyn Any;
    /// Returns `self` as `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A plugin observing the instructions of an exploration.
///
/// Every hook receives the current state and returns the states to continue with:
/// one state to continue (possibly refined), several to fork the path, none to drop
/// it as infeasible. Hooks must only refine the state from what they are given;
/// anything else they want to remember (findings, counters) belongs on `self`, never
/// inside the state, or deduplication of equal nodes breaks.
///
/// All hooks default to passing the state through unchanged.
///
/// Instruction types used with checks must be `'static`, since the registry looks
/// checks up by type.
///
/// # Errors
///
/// Hooks return [`Error::Check`](crate::Error::Check) for failures that are not a
/// property of the analysed program. The error aborts the walk.
pub trait SymbolicCheck<I>: AsAny {
    /// Runs before the visitor evaluates `instruction`.
    fn pre_process(
        &mut self,
        point: ProgramPoint,
        instruction: &I,
        state: &ProgramState,
    ) -> Result<Vec<ProgramState>> {
        let _ = (point, instruction);
        Ok(vec![state.clone()])
    }

    /// Runs after the visitor evaluated `instruction`.
    fn post_process(
        &mut self,
        point: ProgramPoint,
        instruction: &I,
        state: &ProgramState,
    ) -> Result<Vec<ProgramState>> {
        let _ = (point, instruction);
        Ok(vec![state.clone()])
    }

    /// Runs when the visitor is about to create an object, before its value exists.
    fn object_creating(
        &mut self,
        instruction: &I,
        state: &ProgramState,
    ) -> Result<Vec<ProgramState>> {
        let _ = instruction;
        Ok(vec![state.clone()])
    }

    /// Runs once the visitor created `value` for a new object.
    fn object_created(
        &mut self,
        instruction: &I,
        value: &SymbolicValue,
        state: &ProgramState,
    ) -> Result<Vec<ProgramState>> {
        let _ = (instruction, value);
        Ok(vec![state.clone()])
    }
}

/// Ordered set of checks, at most one per concrete type.
///
/// # Examples
///
/// ```rust
/// use symscope::engine::{CheckRegistry, SymbolicCheck};
///
/// #[derive(Default)]
/// struct Counter(usize);
/// impl SymbolicCheck<u8> for Counter {}
///
/// let mut registry: CheckRegistry<u8> = CheckRegistry::new();
/// registry.add(Counter(1));
/// registry.add(Counter(2));
///
/// assert_eq!(registry.len(), 1);
/// assert_eq!(registry.get::<Counter>().map(|c| c.0), Some(2));
/// ```
pub struct CheckRegistry<I> {
    checks: Vec<(TypeId, Box<dyn SymbolicCheck<I>>)>,
}

impl<I> Default for CheckRegistry<I> {
    fn default() -> Self {
        Self { checks: Vec::new() }
    }
}

impl<I: 'static> CheckRegistry<I> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `check`.
    ///
    /// A check of the same type already registered is replaced and keeps its position
    /// in the run order; otherwise `check` runs after all others.
    pub fn add<C: SymbolicCheck<I>>(&mut self, check: C) {
        let id = TypeId::of::<C>();
        let boxed: Box<dyn SymbolicCheck<I>> = Box::new(check);
        match self.checks.iter_mut().find(|(existing, _)| *existing == id) {
            Some(slot) => slot.1 = boxed,
            None => self.checks.push((id, boxed)),
        }
    }

    /// Removes the check of type `C`.
    ///
    /// # Returns
    ///
    /// `true` if such a check was registered.
    pub fn remove<C: SymbolicCheck<I>>(&mut self) -> bool {
        let id = TypeId::of::<C>();
        let before = self.checks.len();
        self.checks.retain(|(existing, _)| *existing != id);
        self.checks.len() != before
    }

    /// Returns the registered check of type `C`.
    #[must_use]
    pub fn get<C: SymbolicCheck<I>>(&self) -> Option<&C> {
        let id = TypeId::of::<C>();
        self.checks
            .iter()
            .find(|(existing, _)| *existing == id)
            .and_then(|(_, check)| check.as_ref().as_any().downcast_ref::<C>())
    }

    /// Returns the registered check of type `C` mutably.
    pub fn get_mut<C: SymbolicCheck<I>>(&mut self) -> Option<&mut C> {
        let id = TypeId::of::<C>();
        self.checks
            .iter_mut()
            .find(|(existing, _)| *existing == id)
            .and_then(|(_, check)| check.as_mut().as_any_mut().downcast_mut::<C>())
    }

    /// Returns the number of registered checks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    /// Returns `true` if no check is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Threads `state` through every check's `pre_process` hook.
    pub(crate) fn pre_process(
        &mut self,
        point: ProgramPoint,
        instruction: &I,
        state: ProgramState,
    ) -> Result<Vec<ProgramState>> {
        self.run(state, |check, state| {
            check.pre_process(point, instruction, state)
        })
    }

    /// Threads `state` through every check's `post_process` hook.
    pub(crate) fn post_process(
        &mut self,
        point: ProgramPoint,
        instruction: &I,
        state: ProgramState,
    ) -> Result<Vec<ProgramState>> {
        self.run(state, |check, state| {
            check.post_process(point, instruction, state)
        })
    }

    /// Threads `state` through every check's `object_creating` hook.
    pub(crate) fn object_creating(
        &mut self,
        instruction: &I,
        state: ProgramState,
    ) -> Result<Vec<ProgramState>> {
        self.run(state, |check, state| check.object_creating(instruction, state))
    }

    /// Threads `state` through every check's `object_created` hook.
    pub(crate) fn object_created(
        &mut self,
        instruction: &I,
        value: &SymbolicValue,
        state: ProgramState,
    ) -> Result<Vec<ProgramState>> {
        self.run(state, |check, state| {
            check.object_created(instruction, value, state)
        })
    }

    /// Threads every state through each check in turn; the states a check returns
    /// for one input replace that input.
    fn run(
        &mut self,
        state: ProgramState,
        mut hook: impl FnMut(
            &mut Box<dyn SymbolicCheck<I>>,
            &ProgramState,
        ) -> Result<Vec<ProgramState>>,
    ) -> Result<Vec<ProgramState>> {
        let mut states = vec![state];
        for (_, check) in &mut self.checks {
            let mut next = Vec::with_capacity(states.len());
            for state in &states {
                next.extend(hook(check, state)?);
            }
            if next.is_empty() {
                return Ok(next);
            }
            states = next;
        }
        Ok(states)
    }
}
