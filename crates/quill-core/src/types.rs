//! Static type descriptors for the target language.
//!
//! This module provides [`Type`], the descriptor attached to every value the
//! builder manipulates. It covers the primitive types (with property flags
//! used by the operator checker), named library types carrying method
//! signatures, the composite shapes the iteration loop can walk (map, slice,
//! array, channel), and the untyped-constant kinds whose concrete type is
//! deferred until an assignment context forces defaulting.

use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

use bitflags::bitflags;

bitflags! {
    /// Property flags of a primitive type, driving operator and
    /// assignability checks.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TypeProps: u16 {
        /// Usable as a condition or logical operand.
        const BOOLEAN  = 1 << 0;
        /// Supports arithmetic operators.
        const NUMERIC  = 1 << 1;
        /// Integer representation (enables %, bitwise, shifts).
        const INTEGER  = 1 << 2;
        /// Unsigned integer representation.
        const UNSIGNED = 1 << 3;
        /// Floating-point representation.
        const FLOAT    = 1 << 4;
        /// Supports ordering comparisons (<, <=, >, >=).
        const ORDERED  = 1 << 5;
        /// Text type (supports + as concatenation).
        const TEXT     = 1 << 6;
    }
}

/// The primitive types of the target language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasicType {
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
    Str,
}

impl BasicType {
    /// The source-level name of this type.
    pub fn name(&self) -> &'static str {
        use BasicType::*;
        match self {
            Bool => "bool",
            Int => "int",
            Int8 => "int8",
            Int16 => "int16",
            Int32 => "int32",
            Int64 => "int64",
            Uint => "uint",
            Uint8 => "uint8",
            Uint16 => "uint16",
            Uint32 => "uint32",
            Uint64 => "uint64",
            Float32 => "float32",
            Float64 => "float64",
            Str => "string",
        }
    }

    /// Property flags of this type.
    pub fn props(&self) -> TypeProps {
        use BasicType::*;
        match self {
            Bool => TypeProps::BOOLEAN,
            Int | Int8 | Int16 | Int32 | Int64 => {
                TypeProps::NUMERIC | TypeProps::INTEGER | TypeProps::ORDERED
            }
            Uint | Uint8 | Uint16 | Uint32 | Uint64 => {
                TypeProps::NUMERIC | TypeProps::INTEGER | TypeProps::UNSIGNED | TypeProps::ORDERED
            }
            Float32 | Float64 => TypeProps::NUMERIC | TypeProps::FLOAT | TypeProps::ORDERED,
            Str => TypeProps::TEXT | TypeProps::ORDERED,
        }
    }
}

/// The kinds of untyped compile-time constants.
///
/// A closed variant set: the environment extends behavior only by mapping
/// kinds to concrete types through its [`DefaultPolicy`], never by adding
/// kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UntypedKind {
    Bool,
    Int,
    Float,
    Str,
    /// An exact rational constant. `prefer_int` hints that the constant
    /// originated from integer-flavored source and should default to the
    /// environment's big-integer type rather than its big-rational type.
    Rat { prefer_int: bool },
}

impl UntypedKind {
    /// Property flags the constant kind exposes before defaulting.
    pub fn props(&self) -> TypeProps {
        match self {
            UntypedKind::Bool => TypeProps::BOOLEAN,
            UntypedKind::Int => TypeProps::NUMERIC | TypeProps::INTEGER | TypeProps::ORDERED,
            UntypedKind::Float | UntypedKind::Rat { .. } => {
                TypeProps::NUMERIC | TypeProps::FLOAT | TypeProps::ORDERED
            }
            UntypedKind::Str => TypeProps::TEXT | TypeProps::ORDERED,
        }
    }

    /// Human-readable name for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            UntypedKind::Bool => "untyped bool",
            UntypedKind::Int => "untyped int",
            UntypedKind::Float => "untyped float",
            UntypedKind::Str => "untyped string",
            UntypedKind::Rat { .. } => "untyped rational",
        }
    }
}

/// A routine signature: parameter types and an optional result type.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Signature {
    pub params: Vec<Type>,
    pub result: Option<Type>,
}

impl Signature {
    pub fn new(params: Vec<Type>, result: Option<Type>) -> Self {
        Signature { params, result }
    }
}

/// A method declared on a named type.
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub name: String,
    pub sig: Signature,
}

/// A named library type resolved by the environment, e.g. `bignum.Int`.
///
/// Carries the method signatures the operator checker dispatches to via
/// the `Op_<Name>` convention, and an optional primitive underlying type.
#[derive(Debug)]
pub struct NamedType {
    /// Package qualifier, if the type lives in an imported package.
    pub pkg: Option<String>,
    /// The type's own name.
    pub name: String,
    /// Underlying primitive, when the named type is a primitive wrapper.
    pub underlying: Option<BasicType>,
    /// Declared methods, operator methods included.
    pub methods: Vec<Method>,
}

impl NamedType {
    pub fn new(pkg: Option<&str>, name: &str) -> Self {
        NamedType {
            pkg: pkg.map(str::to_string),
            name: name.to_string(),
            underlying: None,
            methods: Vec::new(),
        }
    }

    /// Attach a method. Builder-style, used during environment bootstrap.
    pub fn with_method(mut self, name: &str, sig: Signature) -> Self {
        self.methods.push(Method {
            name: name.to_string(),
            sig,
        });
        self
    }

    /// Set the underlying primitive type.
    pub fn with_underlying(mut self, basic: BasicType) -> Self {
        self.underlying = Some(basic);
        self
    }

    /// The package-qualified name, e.g. `bignum.Int`.
    pub fn qualified_name(&self) -> String {
        match &self.pkg {
            Some(pkg) => format!("{}.{}", pkg, self.name),
            None => self.name.clone(),
        }
    }

    /// Look up a declared method by name.
    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// A static type descriptor.
#[derive(Debug, Clone)]
pub enum Type {
    /// A primitive type.
    Basic(BasicType),
    /// A named library type.
    Named(Arc<NamedType>),
    /// `map[key]elem`.
    Map { key: Box<Type>, elem: Box<Type> },
    /// `[]elem`.
    Slice(Box<Type>),
    /// `[len]elem`.
    Array { elem: Box<Type>, len: u64 },
    /// `chan elem`.
    Chan(Box<Type>),
    /// An untyped constant kind, concrete type deferred until defaulting.
    Untyped(UntypedKind),
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        use Type::*;
        match (self, other) {
            (Basic(a), Basic(b)) => a == b,
            // Named types are identical when their qualified names match;
            // the method list is bootstrap detail, not identity.
            (Named(a), Named(b)) => a.pkg == b.pkg && a.name == b.name,
            (Map { key: ka, elem: ea }, Map { key: kb, elem: eb }) => ka == kb && ea == eb,
            (Slice(a), Slice(b)) => a == b,
            (Array { elem: ea, len: la }, Array { elem: eb, len: lb }) => ea == eb && la == lb,
            (Chan(a), Chan(b)) => a == b,
            (Untyped(a), Untyped(b)) => a == b,
            _ => false,
        }
    }
}

impl Type {
    pub fn bool() -> Self {
        Type::Basic(BasicType::Bool)
    }

    pub fn int() -> Self {
        Type::Basic(BasicType::Int)
    }

    pub fn string() -> Self {
        Type::Basic(BasicType::Str)
    }

    pub fn named(named: NamedType) -> Self {
        Type::Named(Arc::new(named))
    }

    pub fn map(key: Type, elem: Type) -> Self {
        Type::Map {
            key: Box::new(key),
            elem: Box::new(elem),
        }
    }

    pub fn slice(elem: Type) -> Self {
        Type::Slice(Box::new(elem))
    }

    pub fn array(elem: Type, len: u64) -> Self {
        Type::Array {
            elem: Box::new(elem),
            len,
        }
    }

    pub fn chan(elem: Type) -> Self {
        Type::Chan(Box::new(elem))
    }

    /// Whether this is an untyped-constant type.
    pub fn is_untyped(&self) -> bool {
        matches!(self, Type::Untyped(_))
    }

    /// Property flags. Named types expose their underlying primitive's
    /// flags; composites expose none.
    pub fn props(&self) -> TypeProps {
        match self {
            Type::Basic(b) => b.props(),
            Type::Named(n) => n.underlying.map(|b| b.props()).unwrap_or(TypeProps::empty()),
            Type::Untyped(k) => k.props(),
            _ => TypeProps::empty(),
        }
    }

    /// Assignability under the target language's rules: identical types,
    /// or an untyped constant representable in the destination.
    pub fn assignable_to(&self, to: &Type) -> bool {
        if self == to {
            return true;
        }
        match self {
            Type::Untyped(kind) => {
                let props = to.props();
                match kind {
                    UntypedKind::Bool => props.contains(TypeProps::BOOLEAN),
                    UntypedKind::Int => props.contains(TypeProps::NUMERIC),
                    UntypedKind::Float | UntypedKind::Rat { .. } => {
                        props.contains(TypeProps::FLOAT)
                    }
                    UntypedKind::Str => props.contains(TypeProps::TEXT),
                }
            }
            _ => false,
        }
    }

    /// Equality-comparability: either side assignable to the other.
    pub fn comparable_with(&self, other: &Type) -> bool {
        self.assignable_to(other) || other.assignable_to(self)
    }

    /// Derive the (key, value) types an iteration loop sees when walking a
    /// value of this type. `None` means the type is not iterable; a `None`
    /// value slot means the source yields no value component (channels).
    pub fn range_key_value(&self) -> Option<(Type, Option<Type>)> {
        match self {
            Type::Map { key, elem } => Some(((**key).clone(), Some((**elem).clone()))),
            Type::Slice(elem) => Some((Type::int(), Some((**elem).clone()))),
            Type::Array { elem, .. } => Some((Type::int(), Some((**elem).clone()))),
            Type::Chan(elem) => Some(((**elem).clone(), None)),
            _ => None,
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Type::Basic(b) => f.write_str(b.name()),
            Type::Named(n) => f.write_str(&n.qualified_name()),
            Type::Map { key, elem } => write!(f, "map[{}]{}", key, elem),
            Type::Slice(elem) => write!(f, "[]{}", elem),
            Type::Array { elem, len } => write!(f, "[{}]{}", len, elem),
            Type::Chan(elem) => write!(f, "chan {}", elem),
            Type::Untyped(kind) => f.write_str(kind.name()),
        }
    }
}

/// Pluggable policy converting an untyped-constant kind to its default
/// concrete type. Supplied by the collaborator environment; default types
/// are target-environment specific (e.g. an untyped rational may default
/// to a library big-rational type).
pub trait DefaultPolicy {
    /// The concrete type the kind defaults to, or `None` when the
    /// environment declares no default for it.
    fn default_type(&self, kind: &UntypedKind) -> Option<Type>;
}

/// The standard defaults: bool, int, float64, string. Rational constants
/// have no default here; environments with bignum support override this.
#[derive(Debug, Default)]
pub struct StdDefaults;

impl DefaultPolicy for StdDefaults {
    fn default_type(&self, kind: &UntypedKind) -> Option<Type> {
        match kind {
            UntypedKind::Bool => Some(Type::bool()),
            UntypedKind::Int => Some(Type::int()),
            UntypedKind::Float => Some(Type::Basic(BasicType::Float64)),
            UntypedKind::Str => Some(Type::string()),
            UntypedKind::Rat { .. } => None,
        }
    }
}

/// A callable routine descriptor: a free function (`recv: None`) or a
/// method on a receiver type. The overload resolver and the builtin
/// operator table both hand these out.
#[derive(Debug, Clone, PartialEq)]
pub struct Routine {
    /// Package qualifier for free functions.
    pub pkg: Option<String>,
    /// Declared name (overload suffix included, for family members).
    pub name: String,
    /// Receiver type for methods.
    pub recv: Option<Type>,
    pub sig: Signature,
}

impl Routine {
    /// A free function in an optional package.
    pub fn func(pkg: Option<&str>, name: &str, sig: Signature) -> Self {
        Routine {
            pkg: pkg.map(str::to_string),
            name: name.to_string(),
            recv: None,
            sig,
        }
    }

    /// A method on `recv`.
    pub fn method(recv: Type, name: &str, sig: Signature) -> Self {
        Routine {
            pkg: None,
            name: name.to_string(),
            recv: Some(recv),
            sig,
        }
    }

    /// The package-qualified name for free functions, the bare name for
    /// methods.
    pub fn qualified_name(&self) -> String {
        match &self.pkg {
            Some(pkg) => format!("{}.{}", pkg, self.name),
            None => self.name.clone(),
        }
    }
}
