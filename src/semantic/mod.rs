//! The semantic boundary between a front-end and the engine.
//!
//! The engine does not resolve names or types. A front-end hands it [`Symbol`]s for
//! every storage location it wants tracked, a [`Declaration`] describing the method's
//! parameters, and a [`ParameterPolicy`] encoding its language's nullability rules.

mod declaration;
mod symbol;

pub use declaration::{
    Declaration, NoNullabilityPolicy, Parameter, ParameterPolicy, RefKind, TypeFlags,
    ValueTypePolicy,
};
pub use symbol::{Symbol, SymbolKind, SymbolTable};
