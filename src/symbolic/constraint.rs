//! Unary facts about symbolic values.
//!
//! A [`SymbolicConstraint`] belongs to exactly one [`ConstraintDomain`]; constraints of
//! one domain are mutually exclusive, so a value carries at most one per domain. The
//! engine knows two domains (`Bool` and `Object`); checks declare further ones with
//! `const` constructors:
//!
//! ```rust
//! use symscope::symbolic::{ConstraintDomain, SymbolicConstraint};
//!
//! const DISPOSABLE: ConstraintDomain = ConstraintDomain::new("Disposable");
//! const DISPOSED: SymbolicConstraint =
//!     SymbolicConstraint::new(DISPOSABLE, "Disposed", Some("NotDisposed"))
//!         .preserved_on_field_reset();
//!
//! assert_eq!(DISPOSED.opposite().map(|c| c.name()), Some("NotDisposed"));
//! ```

use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
};

use imbl::OrdMap;

/// A family of mutually exclusive constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConstraintDomain(&'static str);

impl ConstraintDomain {
    /// Boolean truth: `True` / `False`.
    pub const BOOL: ConstraintDomain = ConstraintDomain("Bool");
    /// Nullability: `Null` / `NotNull`.
    pub const OBJECT: ConstraintDomain = ConstraintDomain("Object");

    /// Declares a domain. Domain names must be unique within a process.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        ConstraintDomain(name)
    }

    /// Returns the domain's name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ConstraintDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A unary fact from one domain.
///
/// Identity is `(domain, name)`; the opposite and the field-reset flag are metadata
/// and are assumed consistent for one name.
#[derive(Debug, Clone, Copy)]
pub struct SymbolicConstraint {
    domain: ConstraintDomain,
    name: &'static str,
    opposite: Option<&'static str>,
    preserve_on_field_reset: bool,
}

impl SymbolicConstraint {
    /// The value is `true`.
    pub const TRUE: SymbolicConstraint =
        SymbolicConstraint::new(ConstraintDomain::BOOL, "True", Some("False"));
    /// The value is `false`.
    pub const FALSE: SymbolicConstraint =
        SymbolicConstraint::new(ConstraintDomain::BOOL, "False", Some("True"));
    /// The value is `null`.
    pub const NULL: SymbolicConstraint =
        SymbolicConstraint::new(ConstraintDomain::OBJECT, "Null", Some("NotNull"));
    /// The value is not `null`.
    pub const NOT_NULL: SymbolicConstraint =
        SymbolicConstraint::new(ConstraintDomain::OBJECT, "NotNull", Some("Null"));

    /// Declares a constraint.
    ///
    /// # Arguments
    ///
    /// * `domain` - The domain the constraint belongs to
    /// * `name` - Name, unique within the domain
    /// * `opposite` - Name of the constraint that holds on the other side of a branch
    #[must_use]
    pub const fn new(
        domain: ConstraintDomain,
        name: &'static str,
        opposite: Option<&'static str>,
    ) -> Self {
        SymbolicConstraint {
            domain,
            name,
            opposite,
            preserve_on_field_reset: false,
        }
    }

    /// Marks the constraint (and its opposite) as surviving a field reset.
    #[must_use]
    pub const fn preserved_on_field_reset(mut self) -> Self {
        self.preserve_on_field_reset = true;
        self
    }

    /// Returns the domain.
    #[must_use]
    pub const fn domain(&self) -> ConstraintDomain {
        self.domain
    }

    /// Returns the name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the opposite constraint, used by branch splitting.
    #[must_use]
    pub const fn opposite(&self) -> Option<SymbolicConstraint> {
        match self.opposite {
            Some(opposite) => Some(SymbolicConstraint {
                domain: self.domain,
                name: opposite,
                opposite: Some(self.name),
                preserve_on_field_reset: self.preserve_on_field_reset,
            }),
            None => None,
        }
    }

    /// Returns `true` if field resets keep this constraint.
    #[must_use]
    pub const fn preserve_on_field_reset(&self) -> bool {
        self.preserve_on_field_reset
    }
}

impl PartialEq for SymbolicConstraint {
    fn eq(&self, other: &Self) -> bool {
        self.domain == other.domain && self.name == other.name
    }
}

impl Eq for SymbolicConstraint {}

impl Hash for SymbolicConstraint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.domain.hash(state);
        self.name.hash(state);
    }
}

impl PartialOrd for SymbolicConstraint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SymbolicConstraint {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.domain, self.name).cmp(&(other.domain, other.name))
    }
}

impl fmt::Display for SymbolicConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// The constraints attached to one value, at most one per domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ConstraintSet(OrdMap<ConstraintDomain, SymbolicConstraint>);

impl ConstraintSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the constraint held in `domain`.
    #[must_use]
    pub fn get(&self, domain: ConstraintDomain) -> Option<SymbolicConstraint> {
        self.0.get(&domain).copied()
    }

    /// Returns `true` if exactly `constraint` is held.
    #[must_use]
    pub fn has(&self, constraint: SymbolicConstraint) -> bool {
        self.get(constraint.domain()) == Some(constraint)
    }

    /// Returns a set holding `constraint`, replacing any other constraint of its domain.
    #[must_use]
    pub fn with(&self, constraint: SymbolicConstraint) -> Self {
        ConstraintSet(self.0.update(constraint.domain(), constraint))
    }

    /// Returns a set without any constraint from `domain`.
    #[must_use]
    pub fn without(&self, domain: ConstraintDomain) -> Self {
        ConstraintSet(self.0.without(&domain))
    }

    /// Returns the subset matching `keep`.
    #[must_use]
    pub fn filter(&self, mut keep: impl FnMut(&SymbolicConstraint) -> bool) -> Self {
        ConstraintSet(
            self.0
                .iter()
                .filter(|(_, constraint)| keep(constraint))
                .map(|(domain, constraint)| (*domain, *constraint))
                .collect(),
        )
    }

    /// Iterates over the held constraints in domain order.
    pub fn iter(&self) -> impl Iterator<Item = SymbolicConstraint> + '_ {
        self.0.values().copied()
    }

    /// Returns the number of held constraints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if nothing is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<SymbolicConstraint> for ConstraintSet {
    fn from_iter<T: IntoIterator<Item = SymbolicConstraint>>(iter: T) -> Self {
        ConstraintSet(
            iter.into_iter()
                .map(|constraint| (constraint.domain(), constraint))
                .collect(),
        )
    }
}
