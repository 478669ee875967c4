//! Method declarations and the parameter nullability policy.
//!
//! The walker seeds its initial state from a [`Declaration`]: every parameter is
//! bound to a fresh symbolic value, and parameters the active [`ParameterPolicy`]
//! declares non-nullable start out with a `NotNull` constraint.

use bitflags::bitflags;
use strum::Display;

use crate::semantic::Symbol;

bitflags! {
    /// Type facts the front-end resolved for a parameter.
    ///
    /// Only the facts the nullability policy needs are modelled; everything else about
    /// a type stays on the front-end side.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TypeFlags: u8 {
        /// The type is a value type (struct / primitive)
        const VALUE_TYPE = 0x01;
        /// The type is a nullable wrapper around a value type (`int?`)
        const NULLABLE_WRAPPER = 0x02;
        /// The type is an unmanaged pointer
        const POINTER = 0x04;
        /// The type overloads `==` in a way that can compare against `null`
        const NULL_EQUALITY_OVERLOAD = 0x08;
    }
}

/// How a parameter is passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
pub enum RefKind {
    /// Passed by value
    #[default]
    Value,
    /// Passed by reference (`ref`)
    Ref,
    /// Output parameter (`out`)
    Out,
    /// Read-only reference (`in`)
    In,
}

/// A formal parameter of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Parameter {
    /// The symbol the parameter is bound to in program states
    pub symbol: Symbol,
    /// How the parameter is passed
    pub ref_kind: RefKind,
    /// Resolved type facts
    pub ty: TypeFlags,
}

impl Parameter {
    /// Creates a by-value parameter.
    #[must_use]
    pub const fn new(symbol: Symbol, ty: TypeFlags) -> Self {
        Parameter {
            symbol,
            ref_kind: RefKind::Value,
            ty,
        }
    }

    /// Returns a copy of this parameter passed with `ref_kind`.
    #[must_use]
    pub const fn with_ref_kind(mut self, ref_kind: RefKind) -> Self {
        self.ref_kind = ref_kind;
        self
    }
}

/// The method (or lambda, accessor, constructor) being analysed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Declaration {
    /// Display name, used in logs only
    pub name: String,
    /// Formal parameters in declaration order
    pub parameters: Vec<Parameter>,
    /// `true` for static methods, which have no `this`
    pub is_static: bool,
}

impl Declaration {
    /// Creates an instance method declaration without parameters.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Declaration {
            name: name.into(),
            parameters: Vec::new(),
            is_static: false,
        }
    }

    /// Appends a parameter.
    #[must_use]
    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Marks the declaration as static.
    #[must_use]
    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }
}

/// Decides which parameters are known non-null on entry.
///
/// The rule depends on the source language's type system, so it is supplied by the
/// front-end rather than hard-coded into the walker.
pub trait ParameterPolicy: Send + Sync {
    /// Returns `true` if `parameter` can never hold `null` on entry.
    fn is_not_null(&self, parameter: &Parameter) -> bool;
}

/// Value types are non-null unless they are nullable wrappers, pointers, or overload
/// a null-compatible equality operator.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueTypePolicy;

impl ParameterPolicy for ValueTypePolicy {
    fn is_not_null(&self, parameter: &Parameter) -> bool {
        parameter.ty.contains(TypeFlags::VALUE_TYPE)
            && !parameter.ty.intersects(
                TypeFlags::NULLABLE_WRAPPER
                    | TypeFlags::POINTER
                    | TypeFlags::NULL_EQUALITY_OVERLOAD,
            )
    }
}

/// Asserts nothing about parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoNullabilityPolicy;

impl ParameterPolicy for NoNullabilityPolicy {
    fn is_not_null(&self, _parameter: &Parameter) -> bool {
        false
    }
}

impl<F> ParameterPolicy for F
where
    F: Fn(&Parameter) -> bool + Send + Sync,
{
    fn is_not_null(&self, parameter: &Parameter) -> bool {
        self(parameter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::{Symbol, SymbolKind};

    fn param(ty: TypeFlags) -> Parameter {
        Parameter::new(Symbol::new(0, SymbolKind::Parameter), ty)
    }

    #[test]
    fn test_value_type_policy() {
        let policy = ValueTypePolicy;

        assert!(policy.is_not_null(&param(TypeFlags::VALUE_TYPE)));
        assert!(!policy.is_not_null(&param(TypeFlags::empty())));
        assert!(!policy.is_not_null(&param(
            TypeFlags::VALUE_TYPE | TypeFlags::NULLABLE_WRAPPER
        )));
        assert!(!policy.is_not_null(&param(TypeFlags::VALUE_TYPE | TypeFlags::POINTER)));
        assert!(!policy.is_not_null(&param(
            TypeFlags::VALUE_TYPE | TypeFlags::NULL_EQUALITY_OVERLOAD
        )));
    }

    #[test]
    fn test_closure_policy() {
        let everything = |_: &Parameter| true;
        assert!(everything.is_not_null(&param(TypeFlags::empty())));
        assert!(!NoNullabilityPolicy.is_not_null(&param(TypeFlags::VALUE_TYPE)));
    }

    #[test]
    fn test_declaration_builder() {
        let p = param(TypeFlags::VALUE_TYPE).with_ref_kind(RefKind::Out);
        let decl = Declaration::new("Foo").with_parameter(p).as_static();

        assert_eq!(decl.name, "Foo");
        assert!(decl.is_static);
        assert_eq!(decl.parameters[0].ref_kind, RefKind::Out);
        assert_eq!(RefKind::Out.to_string(), "Out");
    }
}
