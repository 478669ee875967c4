//! Binary relationships between symbolic values.
//!
//! A [`RelationshipSet`] holds facts such as `a < b` or `a == c` and keeps them
//! transitively closed and free of contradictions. Inserting a fact either yields a
//! new closed set or reports the path infeasible.
//!
//! After closure the set is reduced by rewriting redundant facts:
//!
//! | Facts | Kept |
//! |-------|------|
//! | `a <= b`, `b <= a` | `a == b` |
//! | `a <= b`, `a < b` | `a < b` |
//! | `a <= b`, `a == b` | `a == b` |
//! | `a <= b`, `a != b` | `a < b` |
//! | `a != b`, `a < b` | `a < b` |
//!
//! Every dropped fact is implied by the one that is kept, and contradiction detection
//! against the kept fact catches everything the dropped one would have.

use std::fmt;

use imbl::OrdSet;
use strum::Display;

use crate::{
    engine::MAX_INTERNAL_STATE_COUNT,
    symbolic::{ComparisonKind, SymbolicValue},
    Error, Result,
};

/// The relation a [`BinaryRelationship`] asserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
pub enum RelationshipKind {
    /// `left == right`
    Equal,
    /// `left != right`
    NotEqual,
    /// `left < right`
    Less,
    /// `left <= right`
    LessOrEqual,
}

impl From<ComparisonKind> for RelationshipKind {
    fn from(kind: ComparisonKind) -> Self {
        match kind {
            ComparisonKind::Less => RelationshipKind::Less,
            ComparisonKind::LessOrEqual => RelationshipKind::LessOrEqual,
        }
    }
}

/// A fact `left OP right`.
///
/// Symmetric relations (`==`, `!=`) are stored with the lower id on the left, so
/// `a == b` and `b == a` are the same fact.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BinaryRelationship {
    kind: RelationshipKind,
    left: SymbolicValue,
    right: SymbolicValue,
}

impl BinaryRelationship {
    /// Creates a relationship, normalizing operand order for symmetric kinds.
    #[must_use]
    pub fn new(kind: RelationshipKind, left: SymbolicValue, right: SymbolicValue) -> Self {
        let symmetric = matches!(kind, RelationshipKind::Equal | RelationshipKind::NotEqual);
        if symmetric && right < left {
            BinaryRelationship {
                kind,
                left: right,
                right: left,
            }
        } else {
            BinaryRelationship { kind, left, right }
        }
    }

    /// `left == right`
    #[must_use]
    pub fn equal(left: SymbolicValue, right: SymbolicValue) -> Self {
        Self::new(RelationshipKind::Equal, left, right)
    }

    /// `left != right`
    #[must_use]
    pub fn not_equal(left: SymbolicValue, right: SymbolicValue) -> Self {
        Self::new(RelationshipKind::NotEqual, left, right)
    }

    /// `left < right`
    #[must_use]
    pub fn less(left: SymbolicValue, right: SymbolicValue) -> Self {
        Self::new(RelationshipKind::Less, left, right)
    }

    /// `left <= right`
    #[must_use]
    pub fn less_or_equal(left: SymbolicValue, right: SymbolicValue) -> Self {
        Self::new(RelationshipKind::LessOrEqual, left, right)
    }

    /// Returns the relation.
    #[must_use]
    pub const fn kind(&self) -> RelationshipKind {
        self.kind
    }

    /// Returns the left operand.
    #[must_use]
    pub const fn left(&self) -> &SymbolicValue {
        &self.left
    }

    /// Returns the right operand.
    #[must_use]
    pub const fn right(&self) -> &SymbolicValue {
        &self.right
    }

    /// Returns `true` if `value` is one of the operands.
    #[must_use]
    pub fn involves(&self, value: &SymbolicValue) -> bool {
        &self.left == value || &self.right == value
    }

    /// Returns the fact that holds when this one does not.
    ///
    /// `!(a < b)` is `b <= a` and `!(a <= b)` is `b < a`.
    #[must_use]
    pub fn negate(&self) -> Self {
        let (left, right) = (self.left.clone(), self.right.clone());
        match self.kind {
            RelationshipKind::Equal => Self::not_equal(left, right),
            RelationshipKind::NotEqual => Self::equal(left, right),
            RelationshipKind::Less => Self::less_or_equal(right, left),
            RelationshipKind::LessOrEqual => Self::less(right, left),
        }
    }

    /// Returns `true` if either operand is a singleton. Such facts are not tracked.
    #[must_use]
    pub fn involves_singleton(&self) -> bool {
        self.left.is_singleton() || self.right.is_singleton()
    }

    /// `a == a` and `a <= a` carry no information.
    #[must_use]
    pub fn is_tautology(&self) -> bool {
        self.left == self.right
            && matches!(
                self.kind,
                RelationshipKind::Equal | RelationshipKind::LessOrEqual
            )
    }

    /// `a != a` and `a < a` can never hold.
    #[must_use]
    pub fn is_absurd(&self) -> bool {
        self.left == self.right
            && matches!(self.kind, RelationshipKind::NotEqual | RelationshipKind::Less)
    }

    fn same_operands(&self, other: &Self) -> bool {
        (self.left == other.left && self.right == other.right)
            || (self.left == other.right && self.right == other.left)
    }

    fn is_reverse_of(&self, other: &Self) -> bool {
        self.left == other.right && self.right == other.left
    }

    fn conflicts_one_way(&self, other: &Self) -> bool {
        match self.kind {
            RelationshipKind::Equal => {
                self.same_operands(other)
                    && matches!(other.kind, RelationshipKind::NotEqual | RelationshipKind::Less)
            }
            RelationshipKind::Less => {
                self.is_reverse_of(other)
                    && matches!(
                        other.kind,
                        RelationshipKind::Less | RelationshipKind::LessOrEqual
                    )
            }
            RelationshipKind::NotEqual | RelationshipKind::LessOrEqual => false,
        }
    }

    /// Returns `true` if both facts cannot hold at the same time.
    #[must_use]
    pub fn contradicts(&self, other: &Self) -> bool {
        self.conflicts_one_way(other) || other.conflicts_one_way(self)
    }

    /// Derives the facts implied by combining this fact with `other`.
    ///
    /// - equality substitutes one operand for the other: `a == b`, `b < c` gives `a < c`
    /// - orderings chain: `a < b`, `b <= c` gives `a < c`; `a <= b`, `b <= c` gives `a <= c`
    #[must_use]
    pub fn derive(&self, other: &Self) -> Vec<Self> {
        let mut derived = Vec::new();
        if self.kind == RelationshipKind::Equal {
            self.substitute_into(other, &mut derived);
        }
        if other.kind == RelationshipKind::Equal {
            other.substitute_into(self, &mut derived);
        }
        if let Some(chained) = Self::chain(self, other) {
            derived.push(chained);
        }
        if let Some(chained) = Self::chain(other, self) {
            derived.push(chained);
        }
        derived.retain(|fact| !fact.is_tautology());
        derived
    }

    /// Pushes `target` with each occurrence of one side of this equality replaced by
    /// the other side, one occurrence at a time.
    fn substitute_into(&self, target: &Self, out: &mut Vec<Self>) {
        for (from, to) in [(&self.left, &self.right), (&self.right, &self.left)] {
            if &target.left == from {
                out.push(Self::new(target.kind, to.clone(), target.right.clone()));
            }
            if &target.right == from {
                out.push(Self::new(target.kind, target.left.clone(), to.clone()));
            }
        }
    }

    /// `first` = `a op b`, `second` = `b op c` gives `a op c`.
    fn chain(first: &Self, second: &Self) -> Option<Self> {
        let ordering = |kind: RelationshipKind| {
            matches!(kind, RelationshipKind::Less | RelationshipKind::LessOrEqual)
        };
        if !ordering(first.kind) || !ordering(second.kind) || first.right != second.left {
            return None;
        }
        let kind = if first.kind == RelationshipKind::Less || second.kind == RelationshipKind::Less
        {
            RelationshipKind::Less
        } else {
            RelationshipKind::LessOrEqual
        };
        Some(Self::new(kind, first.left.clone(), second.right.clone()))
    }
}

impl fmt::Display for BinaryRelationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.kind {
            RelationshipKind::Equal => "==",
            RelationshipKind::NotEqual => "!=",
            RelationshipKind::Less => "<",
            RelationshipKind::LessOrEqual => "<=",
        };
        write!(f, "{} {op} {}", self.left, self.right)
    }
}

/// A transitively closed, contradiction-free set of relationships.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RelationshipSet(OrdSet<BinaryRelationship>);

impl RelationshipSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `relationship` is held verbatim.
    #[must_use]
    pub fn contains(&self, relationship: &BinaryRelationship) -> bool {
        self.0.contains(relationship)
    }

    /// Iterates over the held facts in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &BinaryRelationship> + '_ {
        self.0.iter()
    }

    /// Returns the number of held facts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no fact is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the values known to be equal to `value`.
    #[must_use]
    pub fn equal_values(&self, value: &SymbolicValue) -> Vec<SymbolicValue> {
        self.0
            .iter()
            .filter(|fact| fact.kind == RelationshipKind::Equal)
            .filter_map(|fact| {
                if &fact.left == value {
                    Some(fact.right.clone())
                } else if &fact.right == value {
                    Some(fact.left.clone())
                } else {
                    None
                }
            })
            .collect()
    }

    /// Returns the subset of facts matching `keep`.
    #[must_use]
    pub fn filter(&self, mut keep: impl FnMut(&BinaryRelationship) -> bool) -> Self {
        RelationshipSet(self.0.iter().filter(|fact| keep(fact)).cloned().collect())
    }

    /// Adds `relationship` and everything it implies.
    ///
    /// Facts about singletons, tautologies and facts already held leave the set
    /// unchanged.
    ///
    /// # Returns
    ///
    /// `Ok(Some(set))` with the closed and reduced set, or `Ok(None)` if the new fact
    /// contradicts what is known.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TooManyInternalStates`] if the closure grows past
    /// [`MAX_INTERNAL_STATE_COUNT`] facts.
    pub fn try_insert(&self, relationship: BinaryRelationship) -> Result<Option<Self>> {
        if relationship.involves_singleton()
            || relationship.is_tautology()
            || self.contains(&relationship)
        {
            return Ok(Some(self.clone()));
        }
        if relationship.is_absurd() {
            return Ok(None);
        }

        let mut facts = self.0.clone();
        if !close(&mut facts, vec![relationship])? {
            return Ok(None);
        }
        if !reduce(&mut facts)? {
            return Ok(None);
        }
        Ok(Some(RelationshipSet(facts)))
    }
}

/// Adds the pending facts and all their consequences to `facts`.
///
/// Returns `Ok(false)` on contradiction.
fn close(
    facts: &mut OrdSet<BinaryRelationship>,
    mut pending: Vec<BinaryRelationship>,
) -> Result<bool> {
    while let Some(fact) = pending.pop() {
        if fact.is_tautology() || facts.contains(&fact) {
            continue;
        }
        if fact.is_absurd() || facts.iter().any(|existing| existing.contradicts(&fact)) {
            return Ok(false);
        }

        for existing in facts.iter() {
            pending.extend(
                fact.derive(existing)
                    .into_iter()
                    .filter(|derived| !facts.contains(derived)),
            );
        }
        facts.insert(fact);

        if facts.len() > MAX_INTERNAL_STATE_COUNT {
            return Err(Error::TooManyInternalStates {
                count: facts.len(),
                limit: MAX_INTERNAL_STATE_COUNT,
            });
        }
    }
    Ok(true)
}

/// Rewrites redundant facts until none is left, re-closing over every fact the
/// rewriting introduces.
///
/// Returns `Ok(false)` if re-closing uncovers a contradiction.
fn reduce(facts: &mut OrdSet<BinaryRelationship>) -> Result<bool> {
    loop {
        let mut introduced = Vec::new();
        let mut changed = false;
        let snapshot: Vec<BinaryRelationship> = facts.iter().cloned().collect();

        for fact in snapshot {
            if !facts.contains(&fact) {
                continue;
            }
            let (a, b) = (fact.left.clone(), fact.right.clone());
            match fact.kind {
                RelationshipKind::LessOrEqual => {
                    let reversed = BinaryRelationship::less_or_equal(b.clone(), a.clone());
                    let not_equal = BinaryRelationship::not_equal(a.clone(), b.clone());
                    if facts.contains(&reversed) {
                        facts.remove(&fact);
                        facts.remove(&reversed);
                        introduced.push(BinaryRelationship::equal(a, b));
                    } else if facts.contains(&BinaryRelationship::less(a.clone(), b.clone()))
                        || facts.contains(&BinaryRelationship::equal(a.clone(), b.clone()))
                    {
                        facts.remove(&fact);
                    } else if facts.contains(&not_equal) {
                        facts.remove(&fact);
                        facts.remove(&not_equal);
                        introduced.push(BinaryRelationship::less(a, b));
                    } else {
                        continue;
                    }
                    changed = true;
                }
                RelationshipKind::NotEqual => {
                    if facts.contains(&BinaryRelationship::less(a.clone(), b.clone()))
                        || facts.contains(&BinaryRelationship::less(b, a))
                    {
                        facts.remove(&fact);
                        changed = true;
                    }
                }
                RelationshipKind::Equal | RelationshipKind::Less => {}
            }
        }

        if !changed {
            return Ok(true);
        }
        if !close(facts, introduced)? {
            return Ok(false);
        }
    }
}
