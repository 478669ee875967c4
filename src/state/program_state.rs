//! The immutable abstract machine state.

use std::sync::LazyLock;

use imbl::{OrdMap, Vector};
use rustc_hash::FxHashSet;

use crate::{
    semantic::Symbol,
    state::ProgramPoint,
    symbolic::{
        BinaryRelationship, ConstraintDomain, ConstraintSet, RelationshipSet,
        SymbolicConstraint, SymbolicValue,
    },
    Error, Result,
};

static INITIAL: LazyLock<ProgramState> = LazyLock::new(|| {
    let singleton_constraints = [
        (
            SymbolicValue::true_value(),
            [SymbolicConstraint::TRUE, SymbolicConstraint::NOT_NULL].as_slice(),
        ),
        (
            SymbolicValue::false_value(),
            [SymbolicConstraint::FALSE, SymbolicConstraint::NOT_NULL].as_slice(),
        ),
        (SymbolicValue::null(), [SymbolicConstraint::NULL].as_slice()),
        (SymbolicValue::this(), [SymbolicConstraint::NOT_NULL].as_slice()),
        (SymbolicValue::base(), [SymbolicConstraint::NOT_NULL].as_slice()),
    ];

    ProgramState {
        values: OrdMap::new(),
        constraints: singleton_constraints
            .into_iter()
            .map(|(value, constraints)| (value, constraints.iter().copied().collect()))
            .collect(),
        visit_counts: OrdMap::new(),
        stack: Vector::new(),
        relationships: RelationshipSet::new(),
    }
});

/// The abstract machine state at one program point.
///
/// Every operation returns a new state; the receiver is never modified. All maps are
/// persistent ([`imbl`]) so a transition copies only the path to the changed entry.
/// Equality and hashing cover all five components: symbol bindings, constraints,
/// visit counts, the expression stack and the relationship set. Maps and sets are
/// compared as unordered collections, the stack in order.
///
/// # Examples
///
/// ```rust
/// use symscope::{
///     semantic::SymbolTable,
///     state::ProgramState,
///     symbolic::{SymbolicConstraint, SymbolicValueFactory},
/// };
///
/// let mut symbols = SymbolTable::new();
/// let x = symbols.local("x");
/// let mut factory = SymbolicValueFactory::new();
/// let value = factory.create();
///
/// let state = ProgramState::new()
///     .store_symbolic_value(x, value.clone())
///     .set_constraint(&value, SymbolicConstraint::NOT_NULL);
///
/// assert_eq!(state.get_symbol_value(x), Some(&value));
/// assert!(state.has_constraint(&value, SymbolicConstraint::NOT_NULL));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProgramState {
    values: OrdMap<Symbol, SymbolicValue>,
    constraints: OrdMap<SymbolicValue, ConstraintSet>,
    visit_counts: OrdMap<ProgramPoint, u32>,
    stack: Vector<SymbolicValue>,
    relationships: RelationshipSet,
}

impl Default for ProgramState {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgramState {
    /// Returns the empty state: no bindings, an empty stack, and the fixed constraints
    /// of the singleton values (`true` is True and NotNull, `null` is Null, ...).
    #[must_use]
    pub fn new() -> Self {
        INITIAL.clone()
    }

    // Expression stack

    /// Pushes `value` on the expression stack.
    #[must_use]
    pub fn push_value(&self, value: SymbolicValue) -> Self {
        let mut state = self.clone();
        state.stack.push_back(value);
        state
    }

    /// Pushes `values` in iteration order; the last one ends up on top.
    #[must_use]
    pub fn push_values(&self, values: impl IntoIterator<Item = SymbolicValue>) -> Self {
        let mut state = self.clone();
        for value in values {
            state.stack.push_back(value);
        }
        state
    }

    /// Pops the top of the expression stack.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StackUnderflow`] if the stack is empty.
    pub fn pop_value(&self) -> Result<(Self, SymbolicValue)> {
        let mut state = self.clone();
        match state.stack.pop_back() {
            Some(value) => Ok((state, value)),
            None => Err(Error::StackUnderflow {
                requested: 1,
                available: 0,
            }),
        }
    }

    /// Pops `count` values.
    ///
    /// # Returns
    ///
    /// The new state and the popped values, top of stack first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StackUnderflow`] if fewer than `count` values are on the stack.
    pub fn pop_values(&self, count: usize) -> Result<(Self, Vec<SymbolicValue>)> {
        if count > self.stack.len() {
            return Err(Error::StackUnderflow {
                requested: count,
                available: self.stack.len(),
            });
        }

        let mut state = self.clone();
        let mut popped = Vec::with_capacity(count);
        while popped.len() < count {
            let Some(value) = state.stack.pop_back() else {
                break;
            };
            popped.push(value);
        }
        Ok((state, popped))
    }

    /// Returns the top of the expression stack.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StackUnderflow`] if the stack is empty.
    pub fn peek_value(&self) -> Result<&SymbolicValue> {
        self.peek_value_at(0)
    }

    /// Returns the value `depth` entries below the top (`0` is the top).
    ///
    /// # Errors
    ///
    /// Returns [`Error::StackUnderflow`] if the stack holds `depth` values or fewer.
    pub fn peek_value_at(&self, depth: usize) -> Result<&SymbolicValue> {
        let available = self.stack.len();
        available
            .checked_sub(depth + 1)
            .and_then(|index| self.stack.get(index))
            .ok_or(Error::StackUnderflow {
                requested: depth + 1,
                available,
            })
    }

    /// Returns the number of values on the expression stack.
    #[must_use]
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// Iterates over the expression stack from bottom to top.
    pub fn stack(&self) -> impl Iterator<Item = &SymbolicValue> + '_ {
        self.stack.iter()
    }

    // Bindings

    /// Binds `symbol` to `value`, replacing any previous binding.
    #[must_use]
    pub fn store_symbolic_value(&self, symbol: Symbol, value: SymbolicValue) -> Self {
        let mut state = self.clone();
        state.values.insert(symbol, value);
        state
    }

    /// Returns the value bound to `symbol`, or `None` if the symbol is not tracked.
    #[must_use]
    pub fn get_symbol_value(&self, symbol: Symbol) -> Option<&SymbolicValue> {
        self.values.get(&symbol)
    }

    /// Iterates over all bindings in symbol order.
    pub fn bindings(&self) -> impl Iterator<Item = (Symbol, &SymbolicValue)> + '_ {
        self.values.iter().map(|(symbol, value)| (*symbol, value))
    }

    // Visit counts

    /// Increments the visit counter of `point`.
    #[must_use]
    pub fn add_visit(&self, point: ProgramPoint) -> Self {
        let mut state = self.clone();
        let count = self.visited_count(point);
        state.visit_counts.insert(point, count.saturating_add(1));
        state
    }

    /// Returns how often `point` was visited on the path leading to this state.
    #[must_use]
    pub fn visited_count(&self, point: ProgramPoint) -> u32 {
        self.visit_counts.get(&point).copied().unwrap_or(0)
    }

    // Constraints

    /// Returns all constraints on `value`.
    #[must_use]
    pub fn constraints_of(&self, value: &SymbolicValue) -> Option<&ConstraintSet> {
        self.constraints.get(value)
    }

    /// Returns the constraint `value` holds in `domain`.
    #[must_use]
    pub fn constraint(
        &self,
        value: &SymbolicValue,
        domain: ConstraintDomain,
    ) -> Option<SymbolicConstraint> {
        self.constraints.get(value)?.get(domain)
    }

    /// Returns `true` if `value` holds exactly `constraint`.
    #[must_use]
    pub fn has_constraint(&self, value: &SymbolicValue, constraint: SymbolicConstraint) -> bool {
        self.constraints
            .get(value)
            .is_some_and(|set| set.has(constraint))
    }

    /// Sets `constraint` on `value` unconditionally, replacing whatever `value` held in
    /// the same domain.
    ///
    /// Use [`try_set_constraint`](Self::try_set_constraint) to assume a fact on a
    /// path; this method is for checks that track their own domains.
    #[must_use]
    pub fn set_constraint(&self, value: &SymbolicValue, constraint: SymbolicConstraint) -> Self {
        let mut state = self.clone();
        let set = self
            .constraints
            .get(value)
            .map_or_else(|| ConstraintSet::new().with(constraint), |set| set.with(constraint));
        state.constraints.insert(value.clone(), set);
        state
    }

    /// Removes whatever constraint `value` holds in `domain`.
    #[must_use]
    pub fn remove_constraint(&self, value: &SymbolicValue, domain: ConstraintDomain) -> Self {
        let Some(set) = self.constraints.get(value) else {
            return self.clone();
        };
        let mut state = self.clone();
        let remaining = set.without(domain);
        if remaining.is_empty() {
            state.constraints.remove(value);
        } else {
            state.constraints.insert(value.clone(), remaining);
        }
        state
    }

    /// Forgets what is known about fields.
    ///
    /// Drops every constraint on values bound to field symbols unless the constraint
    /// is marked [`preserved_on_field_reset`](SymbolicConstraint::preserved_on_field_reset).
    /// Used when a call may have mutated the receiver's fields.
    #[must_use]
    pub fn reset_field_constraints(&self) -> Self {
        let mut state = self.clone();
        for (symbol, value) in &self.values {
            if !symbol.is_field() || value.is_singleton() {
                continue;
            }
            let Some(set) = self.constraints.get(value) else {
                continue;
            };
            let kept = set.filter(SymbolicConstraint::preserve_on_field_reset);
            if kept.is_empty() {
                state.constraints.remove(value);
            } else {
                state.constraints.insert(value.clone(), kept);
            }
        }
        state
    }

    // Relationships

    /// Returns the relationship set.
    #[must_use]
    pub const fn relationships(&self) -> &RelationshipSet {
        &self.relationships
    }

    /// Adds `relationship` and its consequences.
    ///
    /// # Returns
    ///
    /// `Ok(None)` if the relationship contradicts what the state knows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TooManyInternalStates`] if the relationship closure outgrows
    /// its bound.
    pub fn try_set_relationship(&self, relationship: BinaryRelationship) -> Result<Option<Self>> {
        Ok(self
            .relationships
            .try_insert(relationship)?
            .map(|relationships| ProgramState {
                relationships,
                ..self.clone()
            }))
    }

    // Pruning

    /// Drops the bindings of symbols for which `is_dead` returns `true`, then forgets
    /// constraints and relationships of values nothing refers to anymore. The
    /// collection runs even when no binding was dropped, so facts about popped
    /// temporaries go too.
    ///
    /// A binding survives even when its symbol is dead if its value is still
    /// reachable from the expression stack. A value is reachable if it is bound, on
    /// the stack, a singleton, or an operand of a reachable derived value.
    #[must_use]
    pub fn remove_symbols(&self, mut is_dead: impl FnMut(Symbol) -> bool) -> Self {
        let from_stack = reachable(self.stack.iter().cloned());

        let values: OrdMap<Symbol, SymbolicValue> = self
            .values
            .iter()
            .filter(|(symbol, value)| !is_dead(**symbol) || from_stack.contains(*value))
            .map(|(symbol, value)| (*symbol, value.clone()))
            .collect();

        let live = reachable(
            self.stack
                .iter()
                .cloned()
                .chain(values.values().cloned())
                .chain(SymbolicValue::singletons()),
        );
        let constraints: OrdMap<SymbolicValue, ConstraintSet> = self
            .constraints
            .iter()
            .filter(|(value, _)| live.contains(*value))
            .map(|(value, set)| (value.clone(), set.clone()))
            .collect();
        let relationships = self
            .relationships
            .filter(|fact| live.contains(fact.left()) && live.contains(fact.right()));

        if values.len() == self.values.len()
            && constraints.len() == self.constraints.len()
            && relationships.len() == self.relationships.len()
        {
            return self.clone();
        }

        ProgramState {
            values,
            constraints,
            visit_counts: self.visit_counts.clone(),
            stack: self.stack.clone(),
            relationships,
        }
    }
}

/// Closes `roots` under the operand relation of derived values.
fn reachable(roots: impl IntoIterator<Item = SymbolicValue>) -> FxHashSet<SymbolicValue> {
    let mut seen = FxHashSet::default();
    let mut pending: Vec<SymbolicValue> = roots.into_iter().collect();
    while let Some(value) = pending.pop() {
        if seen.insert(value.clone()) {
            pending.extend(value.operands());
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cfg::BlockId,
        semantic::SymbolKind,
        symbolic::SymbolicValueFactory,
    };

    fn local(id: u32) -> Symbol {
        Symbol::new(id, SymbolKind::Local)
    }

    fn field(id: u32) -> Symbol {
        Symbol::new(id, SymbolKind::Field)
    }

    #[test]
    fn test_initial_singleton_constraints() {
        let state = ProgramState::new();
        assert!(state.has_constraint(&SymbolicValue::true_value(), SymbolicConstraint::TRUE));
        assert!(state.has_constraint(&SymbolicValue::true_value(), SymbolicConstraint::NOT_NULL));
        assert!(state.has_constraint(&SymbolicValue::false_value(), SymbolicConstraint::FALSE));
        assert!(state.has_constraint(&SymbolicValue::null(), SymbolicConstraint::NULL));
        assert!(state.has_constraint(&SymbolicValue::this(), SymbolicConstraint::NOT_NULL));
        assert!(state.has_constraint(&SymbolicValue::base(), SymbolicConstraint::NOT_NULL));
        assert_eq!(state, ProgramState::default());
    }

    #[test]
    fn test_stack_operations() {
        let mut factory = SymbolicValueFactory::new();
        let (a, b, c) = (factory.create(), factory.create(), factory.create());

        let state = ProgramState::new()
            .push_value(a.clone())
            .push_values([b.clone(), c.clone()]);
        assert_eq!(state.stack_depth(), 3);
        assert_eq!(state.peek_value().unwrap(), &c);
        assert_eq!(state.peek_value_at(2).unwrap(), &a);

        let (popped_state, popped) = state.pop_values(2).unwrap();
        assert_eq!(popped, vec![c, b]);
        assert_eq!(popped_state.stack_depth(), 1);
        // The receiver is untouched
        assert_eq!(state.stack_depth(), 3);

        let (empty, value) = popped_state.pop_value().unwrap();
        assert_eq!(value, a);
        assert_eq!(empty, ProgramState::new());
    }

    #[test]
    fn test_stack_underflow_is_an_error() {
        let state = ProgramState::new();
        assert_eq!(
            state.pop_value().unwrap_err(),
            Error::StackUnderflow {
                requested: 1,
                available: 0
            }
        );
        assert!(state.push_value(SymbolicValue::null()).pop_values(2).is_err());
        assert!(state.peek_value().is_err());
        assert!(state.push_value(SymbolicValue::null()).peek_value_at(1).is_err());
    }

    #[test]
    fn test_bindings_and_visits() {
        let mut factory = SymbolicValueFactory::new();
        let value = factory.create();
        let point = ProgramPoint::start_of(BlockId::new(1));

        let state = ProgramState::new()
            .store_symbolic_value(local(0), value.clone())
            .add_visit(point)
            .add_visit(point);

        assert_eq!(state.get_symbol_value(local(0)), Some(&value));
        assert_eq!(state.get_symbol_value(local(1)), None);
        assert_eq!(state.visited_count(point), 2);
        assert_eq!(state.visited_count(point.next()), 0);
        assert_eq!(state.bindings().count(), 1);
    }

    #[test]
    fn test_constraint_set_and_remove() {
        let mut factory = SymbolicValueFactory::new();
        let value = factory.create();

        let state = ProgramState::new()
            .set_constraint(&value, SymbolicConstraint::NULL)
            .set_constraint(&value, SymbolicConstraint::NOT_NULL);
        assert_eq!(
            state.constraint(&value, ConstraintDomain::OBJECT),
            Some(SymbolicConstraint::NOT_NULL)
        );

        let cleared = state.remove_constraint(&value, ConstraintDomain::OBJECT);
        assert!(cleared.constraints_of(&value).is_none());
        assert_eq!(cleared, ProgramState::new());
    }

    #[test]
    fn test_equality_is_order_independent() {
        let mut factory = SymbolicValueFactory::new();
        let (a, b) = (factory.create(), factory.create());

        let first = ProgramState::new()
            .store_symbolic_value(local(0), a.clone())
            .store_symbolic_value(local(1), b.clone())
            .set_constraint(&a, SymbolicConstraint::NOT_NULL)
            .set_constraint(&b, SymbolicConstraint::TRUE)
            .try_set_relationship(BinaryRelationship::less(a.clone(), b.clone()))
            .unwrap()
            .unwrap();
        let second = ProgramState::new()
            .try_set_relationship(BinaryRelationship::less(a.clone(), b.clone()))
            .unwrap()
            .unwrap()
            .set_constraint(&b, SymbolicConstraint::TRUE)
            .store_symbolic_value(local(1), b)
            .set_constraint(&a, SymbolicConstraint::NOT_NULL)
            .store_symbolic_value(local(0), a);

        assert_eq!(first, second);
        let hash = |state: &ProgramState| {
            use std::hash::{BuildHasher, BuildHasherDefault};
            BuildHasherDefault::<rustc_hash::FxHasher>::default().hash_one(state)
        };
        assert_eq!(hash(&first), hash(&second));
    }

    #[test]
    fn test_remove_symbols_prunes_dead_data() {
        let mut factory = SymbolicValueFactory::new();
        let (a, b) = (factory.create(), factory.create());

        let state = ProgramState::new()
            .store_symbolic_value(local(0), a.clone())
            .store_symbolic_value(local(1), b.clone())
            .set_constraint(&a, SymbolicConstraint::NULL)
            .set_constraint(&b, SymbolicConstraint::NOT_NULL)
            .try_set_relationship(BinaryRelationship::less(a.clone(), b.clone()))
            .unwrap()
            .unwrap();

        let pruned = state.remove_symbols(|symbol| symbol == local(0));

        assert_eq!(pruned.get_symbol_value(local(0)), None);
        assert!(pruned.constraints_of(&a).is_none());
        assert!(pruned.has_constraint(&b, SymbolicConstraint::NOT_NULL));
        assert!(pruned.relationships().is_empty());
        // Singletons keep their constraints
        assert!(pruned.has_constraint(&SymbolicValue::null(), SymbolicConstraint::NULL));
    }

    #[test]
    fn test_remove_symbols_keeps_stack_referenced_bindings() {
        let mut factory = SymbolicValueFactory::new();
        let x = factory.create();
        let condition = factory.equals(x.clone(), SymbolicValue::null());

        let state = ProgramState::new()
            .store_symbolic_value(local(0), x.clone())
            .set_constraint(&x, SymbolicConstraint::NOT_NULL)
            .push_value(condition);

        let pruned = state.remove_symbols(|_| true);
        assert_eq!(pruned.get_symbol_value(local(0)), Some(&x));
        assert!(pruned.has_constraint(&x, SymbolicConstraint::NOT_NULL));
        assert_eq!(pruned, state);
    }

    #[test]
    fn test_remove_symbols_collects_popped_temporaries() {
        let mut factory = SymbolicValueFactory::new();
        let (x, tmp) = (factory.create(), factory.create());

        let state = ProgramState::new()
            .store_symbolic_value(local(0), x.clone())
            .set_constraint(&x, SymbolicConstraint::NOT_NULL)
            .push_value(tmp.clone())
            .try_set_constraint(&tmp, SymbolicConstraint::TRUE)
            .unwrap()
            .unwrap()
            .try_set_relationship(BinaryRelationship::less(x.clone(), tmp.clone()))
            .unwrap()
            .unwrap();
        let (popped, _) = state.pop_value().unwrap();
        assert!(popped.constraints_of(&tmp).is_some());

        // No binding is dead, yet the temporary's facts are gone
        let pruned = popped.remove_symbols(|_| false);
        assert_eq!(pruned.get_symbol_value(local(0)), Some(&x));
        assert!(pruned.constraints_of(&tmp).is_none());
        assert!(pruned.relationships().is_empty());
        assert!(pruned.has_constraint(&x, SymbolicConstraint::NOT_NULL));

        // With nothing left to collect the state is unchanged
        assert_eq!(pruned.remove_symbols(|_| false), pruned);
    }

    #[test]
    fn test_reset_field_constraints() {
        const TRACKED: SymbolicConstraint = SymbolicConstraint::new(
            ConstraintDomain::new("Tracked"),
            "Tracked",
            Some("Untracked"),
        )
        .preserved_on_field_reset();

        let mut factory = SymbolicValueFactory::new();
        let (f, l) = (factory.create(), factory.create());

        let state = ProgramState::new()
            .store_symbolic_value(field(0), f.clone())
            .store_symbolic_value(local(1), l.clone())
            .set_constraint(&f, SymbolicConstraint::NOT_NULL)
            .set_constraint(&f, TRACKED)
            .set_constraint(&l, SymbolicConstraint::NOT_NULL)
            .store_symbolic_value(field(2), SymbolicValue::null());

        let reset = state.reset_field_constraints();
        assert!(!reset.has_constraint(&f, SymbolicConstraint::NOT_NULL));
        assert!(reset.has_constraint(&f, TRACKED));
        assert!(reset.has_constraint(&l, SymbolicConstraint::NOT_NULL));
        assert!(reset.has_constraint(&SymbolicValue::null(), SymbolicConstraint::NULL));
    }
}
