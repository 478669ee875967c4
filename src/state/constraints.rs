//! Assuming facts about symbolic values.
//!
//! [`ProgramState::try_set_constraint`] is the single entry point through which the
//! engine learns something on a path. Unlike [`ProgramState::set_constraint`], it
//! checks the new fact against what the state already knows and reports a
//! contradiction as `Ok(None)`. Boolean facts about derived values are translated into
//! facts about their operands:
//!
//! | value       | constrained to | consequence                       |
//! |-------------|----------------|-----------------------------------|
//! | `!a`        | True / False   | `a` is False / True               |
//! | `a == b`    | True / False   | `a` equals / differs from `b`     |
//! | `a != b`    | True / False   | `a` differs from / equals `b`     |
//! | `a < b`     | True / False   | `a < b` / `b <= a`                |
//! | `a <= b`    | True / False   | `a <= b` / `b < a`                |

use crate::{
    state::ProgramState,
    symbolic::{
        BinaryRelationship, ConstraintDomain, SymbolicConstraint, SymbolicValue,
        SymbolicValueKind,
    },
    Result,
};

impl ProgramState {
    /// Assumes `value` satisfies `constraint` on the current path.
    ///
    /// # Arguments
    ///
    /// * `value` - The value to constrain
    /// * `constraint` - The fact to assume
    ///
    /// # Returns
    ///
    /// The refined state, or `None` if the fact is infeasible in this state. Setting a
    /// constraint the value already holds returns an equal state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TooManyInternalStates`](crate::Error::TooManyInternalStates)
    /// if a derived relationship overflows the closure bound.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use symscope::{
    ///     state::ProgramState,
    ///     symbolic::{SymbolicConstraint, SymbolicValue, SymbolicValueFactory},
    /// };
    ///
    /// let mut factory = SymbolicValueFactory::new();
    /// let x = factory.create();
    /// let is_null = factory.equals(x.clone(), SymbolicValue::null());
    ///
    /// let state = ProgramState::new()
    ///     .try_set_constraint(&is_null, SymbolicConstraint::FALSE)?
    ///     .expect("x == null can be false");
    /// assert!(state.has_constraint(&x, SymbolicConstraint::NOT_NULL));
    /// # Ok::<(), symscope::Error>(())
    /// ```
    pub fn try_set_constraint(
        &self,
        value: &SymbolicValue,
        constraint: SymbolicConstraint,
    ) -> Result<Option<Self>> {
        if self.has_constraint(value, constraint) {
            return Ok(Some(self.clone()));
        }
        let Some(state) = self.constrain(value, constraint)? else {
            return Ok(None);
        };
        if constraint.domain() != ConstraintDomain::BOOL {
            return Ok(Some(state));
        }

        let holds = constraint == SymbolicConstraint::TRUE;
        match value.kind() {
            SymbolicValueKind::Not(operand) => match constraint.opposite() {
                Some(opposite) => state.try_set_constraint(operand, opposite),
                None => Ok(Some(state)),
            },
            SymbolicValueKind::Equals(left, right) if holds => state.assume_equal(left, right),
            SymbolicValueKind::Equals(left, right) => state.assume_not_equal(left, right),
            SymbolicValueKind::NotEquals(left, right) if holds => {
                state.assume_not_equal(left, right)
            }
            SymbolicValueKind::NotEquals(left, right) => state.assume_equal(left, right),
            SymbolicValueKind::Comparison(kind, left, right) => {
                let fact = BinaryRelationship::new((*kind).into(), left.clone(), right.clone());
                state.try_set_relationship(if holds { fact } else { fact.negate() })
            }
            _ => Ok(Some(state)),
        }
    }

    /// Forks the state on `constraint`.
    ///
    /// # Returns
    ///
    /// `(positive, negative)`: the state assuming `constraint`, and the state assuming
    /// its opposite. Either side is `None` when infeasible. A constraint without an
    /// opposite leaves the negative side unchanged.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`try_set_constraint`](Self::try_set_constraint).
    pub fn try_split(
        &self,
        value: &SymbolicValue,
        constraint: SymbolicConstraint,
    ) -> Result<(Option<Self>, Option<Self>)> {
        let positive = self.try_set_constraint(value, constraint)?;
        let negative = match constraint.opposite() {
            Some(opposite) => self.try_set_constraint(value, opposite)?,
            None => Some(self.clone()),
        };
        Ok((positive, negative))
    }

    /// Records `constraint` on `value` and on every value known to equal it.
    fn constrain(
        &self,
        value: &SymbolicValue,
        constraint: SymbolicConstraint,
    ) -> Result<Option<Self>> {
        if self.constraint(value, constraint.domain()).is_some() {
            return Ok(None);
        }

        let is_bool = constraint.domain() == ConstraintDomain::BOOL;
        if is_bool && self.has_constraint(value, SymbolicConstraint::NULL) {
            return Ok(None);
        }
        if constraint == SymbolicConstraint::NULL
            && self.constraint(value, ConstraintDomain::BOOL).is_some()
        {
            return Ok(None);
        }

        let mut state = self.set_constraint(value, constraint);
        if is_bool && state.constraint(value, ConstraintDomain::OBJECT).is_none() {
            state = state.set_constraint(value, SymbolicConstraint::NOT_NULL);
        }

        for other in self.relationships().equal_values(value) {
            match state.try_set_constraint(&other, constraint)? {
                Some(next) => state = next,
                None => return Ok(None),
            }
        }
        Ok(Some(state))
    }

    /// Assumes `left == right`: each side inherits the other's constraints.
    fn assume_equal(&self, left: &SymbolicValue, right: &SymbolicValue) -> Result<Option<Self>> {
        if left == right {
            return Ok(Some(self.clone()));
        }

        let mut state = self.clone();
        for (from, to) in [(left, right), (right, left)] {
            let inherited: Vec<SymbolicConstraint> = state
                .constraints_of(from)
                .map(|set| set.iter().collect())
                .unwrap_or_default();
            for constraint in inherited {
                match state.try_set_constraint(to, constraint)? {
                    Some(next) => state = next,
                    None => return Ok(None),
                }
            }
        }

        state.try_set_relationship(BinaryRelationship::equal(left.clone(), right.clone()))
    }

    /// Assumes `left != right`.
    fn assume_not_equal(
        &self,
        left: &SymbolicValue,
        right: &SymbolicValue,
    ) -> Result<Option<Self>> {
        if left == right {
            return Ok(None);
        }

        let left_null = self.has_constraint(left, SymbolicConstraint::NULL);
        let right_null = self.has_constraint(right, SymbolicConstraint::NULL);
        if left_null && right_null {
            return Ok(None);
        }

        let mut state = self.clone();
        if left_null || right_null {
            let other = if left_null { right } else { left };
            match state.try_set_constraint(other, SymbolicConstraint::NOT_NULL)? {
                Some(next) => state = next,
                None => return Ok(None),
            }
        }

        let bools = (
            state.constraint(left, ConstraintDomain::BOOL),
            state.constraint(right, ConstraintDomain::BOOL),
        );
        let implied = match bools {
            (Some(l), Some(r)) if l == r => return Ok(None),
            (Some(known), None) => known.opposite().map(|opposite| (right, opposite)),
            (None, Some(known)) => known.opposite().map(|opposite| (left, opposite)),
            _ => None,
        };
        if let Some((target, constraint)) = implied {
            match state.try_set_constraint(target, constraint)? {
                Some(next) => state = next,
                None => return Ok(None),
            }
        }

        state.try_set_relationship(BinaryRelationship::not_equal(left.clone(), right.clone()))
    }
}
