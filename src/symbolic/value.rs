//! Symbolic values.
//!
//! A [`SymbolicValue`] stands in for a runtime value the analysis cannot determine.
//! Values are identity based: two values are equal iff they carry the same id. The
//! five distinguished singletons (`true`, `false`, `null`, `this`, `base`) have
//! reserved ids and are shared by every analysis in the process; all other values
//! are minted by a per-method [`SymbolicValueFactory`].
//!
//! Besides opaque values, the factory builds *derived* boolean values that remember
//! how they were computed (`a == b`, `a < b`, `!a`). Constraining a derived value to
//! `True` or `False` is translated into facts about its operands, which is how a
//! branch on `x == null` teaches the engine about `x`.

use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    sync::{Arc, LazyLock},
};

use strum::Display;

/// Id of the first value minted by a [`SymbolicValueFactory`].
pub const FIRST_FRESH_ID: u32 = 5;

/// Ordering comparison recorded by a derived comparison value.
///
/// `>` and `>=` are expressed by swapping operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ComparisonKind {
    /// `left < right`
    Less,
    /// `left <= right`
    LessOrEqual,
}

/// What a symbolic value stands for.
#[derive(Debug, Clone)]
pub enum SymbolicValueKind {
    /// The literal `true`
    True,
    /// The literal `false`
    False,
    /// The literal `null`
    Null,
    /// The receiver of the analysed method
    This,
    /// The receiver viewed as its base type
    Base,
    /// An opaque value
    Plain,
    /// Result of `left == right`
    Equals(SymbolicValue, SymbolicValue),
    /// Result of `left != right`
    NotEquals(SymbolicValue, SymbolicValue),
    /// Result of an ordering comparison
    Comparison(ComparisonKind, SymbolicValue, SymbolicValue),
    /// Result of a logical negation
    Not(SymbolicValue),
}

#[derive(Debug)]
struct ValueData {
    id: u32,
    kind: SymbolicValueKind,
}

/// Handle to an abstract runtime value.
///
/// Cloning is a reference count increment. Equality, ordering and hashing use the
/// id only.
#[derive(Clone)]
pub struct SymbolicValue(Arc<ValueData>);

static TRUE: LazyLock<SymbolicValue> =
    LazyLock::new(|| SymbolicValue::from_parts(0, SymbolicValueKind::True));
static FALSE: LazyLock<SymbolicValue> =
    LazyLock::new(|| SymbolicValue::from_parts(1, SymbolicValueKind::False));
static NULL: LazyLock<SymbolicValue> =
    LazyLock::new(|| SymbolicValue::from_parts(2, SymbolicValueKind::Null));
static THIS: LazyLock<SymbolicValue> =
    LazyLock::new(|| SymbolicValue::from_parts(3, SymbolicValueKind::This));
static BASE: LazyLock<SymbolicValue> =
    LazyLock::new(|| SymbolicValue::from_parts(4, SymbolicValueKind::Base));

impl SymbolicValue {
    fn from_parts(id: u32, kind: SymbolicValueKind) -> Self {
        SymbolicValue(Arc::new(ValueData { id, kind }))
    }

    /// The literal `true`.
    #[must_use]
    pub fn true_value() -> Self {
        TRUE.clone()
    }

    /// The literal `false`.
    #[must_use]
    pub fn false_value() -> Self {
        FALSE.clone()
    }

    /// The literal `null`.
    #[must_use]
    pub fn null() -> Self {
        NULL.clone()
    }

    /// The method's receiver.
    #[must_use]
    pub fn this() -> Self {
        THIS.clone()
    }

    /// The method's receiver as its base type.
    #[must_use]
    pub fn base() -> Self {
        BASE.clone()
    }

    /// The literal for a boolean.
    #[must_use]
    pub fn from_bool(value: bool) -> Self {
        if value {
            Self::true_value()
        } else {
            Self::false_value()
        }
    }

    /// Returns all five singletons.
    #[must_use]
    pub fn singletons() -> [SymbolicValue; 5] {
        [
            Self::true_value(),
            Self::false_value(),
            Self::null(),
            Self::this(),
            Self::base(),
        ]
    }

    /// Returns the value's id.
    #[must_use]
    pub fn id(&self) -> u32 {
        self.0.id
    }

    /// Returns what the value stands for.
    #[must_use]
    pub fn kind(&self) -> &SymbolicValueKind {
        &self.0.kind
    }

    /// Returns `true` for the process-wide singletons.
    #[must_use]
    pub fn is_singleton(&self) -> bool {
        self.0.id < FIRST_FRESH_ID
    }

    /// Returns the operands of a derived value; empty for opaque values and singletons.
    #[must_use]
    pub fn operands(&self) -> Vec<SymbolicValue> {
        match &self.0.kind {
            SymbolicValueKind::Equals(left, right)
            | SymbolicValueKind::NotEquals(left, right)
            | SymbolicValueKind::Comparison(_, left, right) => vec![left.clone(), right.clone()],
            SymbolicValueKind::Not(operand) => vec![operand.clone()],
            _ => Vec::new(),
        }
    }
}

impl PartialEq for SymbolicValue {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for SymbolicValue {}

impl Hash for SymbolicValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl PartialOrd for SymbolicValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SymbolicValue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.id.cmp(&other.0.id)
    }
}

impl fmt::Display for SymbolicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.kind {
            SymbolicValueKind::True => write!(f, "true"),
            SymbolicValueKind::False => write!(f, "false"),
            SymbolicValueKind::Null => write!(f, "null"),
            SymbolicValueKind::This => write!(f, "this"),
            SymbolicValueKind::Base => write!(f, "base"),
            _ => write!(f, "#{}", self.0.id),
        }
    }
}

impl fmt::Debug for SymbolicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.kind {
            SymbolicValueKind::Equals(left, right) => {
                write!(f, "#{}({left:?} == {right:?})", self.0.id)
            }
            SymbolicValueKind::NotEquals(left, right) => {
                write!(f, "#{}({left:?} != {right:?})", self.0.id)
            }
            SymbolicValueKind::Comparison(ComparisonKind::Less, left, right) => {
                write!(f, "#{}({left:?} < {right:?})", self.0.id)
            }
            SymbolicValueKind::Comparison(ComparisonKind::LessOrEqual, left, right) => {
                write!(f, "#{}({left:?} <= {right:?})", self.0.id)
            }
            SymbolicValueKind::Not(operand) => write!(f, "#{}(!{operand:?})", self.0.id),
            _ => fmt::Display::fmt(self, f),
        }
    }
}

/// Mints fresh symbolic values for one analysed method.
///
/// Ids start after the singletons and increase monotonically. Each walker owns its
/// own factory, so values from different methods must not be mixed.
#[derive(Debug)]
pub struct SymbolicValueFactory {
    next_id: u32,
}

impl Default for SymbolicValueFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolicValueFactory {
    /// Creates a factory whose first value gets [`FIRST_FRESH_ID`].
    #[must_use]
    pub const fn new() -> Self {
        SymbolicValueFactory {
            next_id: FIRST_FRESH_ID,
        }
    }

    fn mint(&mut self, kind: SymbolicValueKind) -> SymbolicValue {
        let id = self.next_id;
        self.next_id += 1;
        SymbolicValue::from_parts(id, kind)
    }

    /// Creates a fresh opaque value.
    pub fn create(&mut self) -> SymbolicValue {
        self.mint(SymbolicValueKind::Plain)
    }

    /// Creates the value of `left == right`.
    pub fn equals(&mut self, left: SymbolicValue, right: SymbolicValue) -> SymbolicValue {
        self.mint(SymbolicValueKind::Equals(left, right))
    }

    /// Creates the value of `left != right`.
    pub fn not_equals(&mut self, left: SymbolicValue, right: SymbolicValue) -> SymbolicValue {
        self.mint(SymbolicValueKind::NotEquals(left, right))
    }

    /// Creates the value of `left < right` or `left <= right`.
    pub fn comparison(
        &mut self,
        kind: ComparisonKind,
        left: SymbolicValue,
        right: SymbolicValue,
    ) -> SymbolicValue {
        self.mint(SymbolicValueKind::Comparison(kind, left, right))
    }

    /// Creates the value of `!operand`.
    pub fn not(&mut self, operand: SymbolicValue) -> SymbolicValue {
        self.mint(SymbolicValueKind::Not(operand))
    }

    /// Returns the number of values minted so far.
    #[must_use]
    pub fn created(&self) -> u32 {
        self.next_id - FIRST_FRESH_ID
    }
}
