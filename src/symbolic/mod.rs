//! Symbolic values and the facts attached to them.
//!
//! - [`SymbolicValue`] / [`SymbolicValueFactory`] - identity-based abstract values
//! - [`SymbolicConstraint`] / [`ConstraintDomain`] / [`ConstraintSet`] - unary facts
//! - [`BinaryRelationship`] / [`RelationshipSet`] - closed sets of binary facts

mod constraint;
mod relationship;
mod value;

pub use constraint::{ConstraintDomain, ConstraintSet, SymbolicConstraint};
pub use relationship::{BinaryRelationship, RelationshipKind, RelationshipSet};
pub use value::{
    ComparisonKind, SymbolicValue, SymbolicValueFactory, SymbolicValueKind, FIRST_FRESH_ID,
};
