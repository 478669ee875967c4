//! Symbols tracked by program states.
//!
//! A [`Symbol`] is the identity of a storage location the front-end resolved: a
//! parameter, a local variable or a field. Symbols are cheap copyable keys; their
//! display names live in a [`SymbolTable`] so states never carry strings.

use std::fmt;

use strum::{Display, EnumIter};

/// Kind of storage location a [`Symbol`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter)]
pub enum SymbolKind {
    /// A formal parameter of the analysed method
    Parameter,
    /// A local variable
    Local,
    /// A field of `this` or of another object; retained across block boundaries
    Field,
}

/// Identity of a parameter, local or field.
///
/// Equality, ordering and hashing use the numeric id and kind only, so the same
/// symbol minted by a [`SymbolTable`] can be freely copied into states, instructions
/// and liveness sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol {
    id: u32,
    kind: SymbolKind,
}

impl Symbol {
    /// Creates a symbol from a raw id.
    ///
    /// Front-ends normally go through [`SymbolTable`], which guarantees unique ids.
    #[must_use]
    pub const fn new(id: u32, kind: SymbolKind) -> Self {
        Symbol { id, kind }
    }

    /// Returns the numeric id.
    #[must_use]
    pub const fn id(self) -> u32 {
        self.id
    }

    /// Returns the kind of storage location.
    #[must_use]
    pub const fn kind(self) -> SymbolKind {
        self.kind
    }

    /// Returns `true` for fields.
    #[must_use]
    pub const fn is_field(self) -> bool {
        matches!(self.kind, SymbolKind::Field)
    }

    /// Returns `true` for formal parameters.
    #[must_use]
    pub const fn is_parameter(self) -> bool {
        matches!(self.kind, SymbolKind::Parameter)
    }

    /// Returns `true` for locals.
    #[must_use]
    pub const fn is_local(self) -> bool {
        matches!(self.kind, SymbolKind::Local)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.kind {
            SymbolKind::Parameter => 'p',
            SymbolKind::Local => 'l',
            SymbolKind::Field => 'f',
        };
        write!(f, "{prefix}{}", self.id)
    }
}

/// Mints symbols with unique ids and remembers their names.
///
/// # Examples
///
/// ```rust
/// use symscope::semantic::{SymbolKind, SymbolTable};
///
/// let mut table = SymbolTable::new();
/// let x = table.parameter("x");
/// let count = table.field("count");
///
/// assert_eq!(x.kind(), SymbolKind::Parameter);
/// assert!(count.is_field());
/// assert_eq!(table.name(x), Some("x"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    names: Vec<(String, SymbolKind)>,
}

impl SymbolTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new symbol of the given kind.
    ///
    /// Registering the same name twice yields two distinct symbols, mirroring shadowed
    /// locals in the source language.
    #[allow(clippy::cast_possible_truncation)]
    pub fn declare(&mut self, name: &str, kind: SymbolKind) -> Symbol {
        let id = self.names.len() as u32;
        self.names.push((name.to_string(), kind));
        Symbol::new(id, kind)
    }

    /// Registers a parameter.
    pub fn parameter(&mut self, name: &str) -> Symbol {
        self.declare(name, SymbolKind::Parameter)
    }

    /// Registers a local variable.
    pub fn local(&mut self, name: &str) -> Symbol {
        self.declare(name, SymbolKind::Local)
    }

    /// Registers a field.
    pub fn field(&mut self, name: &str) -> Symbol {
        self.declare(name, SymbolKind::Field)
    }

    /// Returns the name `symbol` was registered with, if it came from this table.
    #[must_use]
    pub fn name(&self, symbol: Symbol) -> Option<&str> {
        self.names
            .get(symbol.id() as usize)
            .filter(|(_, kind)| *kind == symbol.kind())
            .map(|(name, _)| name.as_str())
    }

    /// Looks up the most recent symbol registered under `name`.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Symbol> {
        self.names
            .iter()
            .enumerate()
            .rev()
            .find(|(_, (candidate, _))| candidate == name)
            .and_then(|(id, (_, kind))| u32::try_from(id).ok().map(|id| Symbol::new(id, *kind)))
    }

    /// Returns the number of registered symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if no symbol has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterates over all registered symbols in registration order.
    pub fn symbols(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.names
            .iter()
            .enumerate()
            .filter_map(|(id, (_, kind))| u32::try_from(id).ok().map(|id| Symbol::new(id, *kind)))
    }
}
