//! Unified error types for the builder engine.
//!
//! One enum per failure phase, following the taxonomy every construction
//! error falls into:
//!
//! ```text
//! BuildError (top-level wrapper)
//! ├── ProtocolError     - builder methods invoked out of sequence
//! ├── TypeError         - the generated program would be invalid
//! └── RegistrationError - overload bootstrap / resolution failures
//! ```
//!
//! All three are fatal for the construction session: each is evidence of an
//! invalid build script or invalid target-program shape, not a transient
//! condition. There is no recovery or retry path.

use thiserror::Error;

// ============================================================================
// Protocol Errors
// ============================================================================

/// The calling generator invoked builder methods out of the required
/// sequence. Signals a bug in the caller, not a property of the generated
/// program.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProtocolError {
    /// A pop was requested with fewer values available than expected.
    #[error("value stack underflow: need {expected} value(s), have {len}")]
    StackUnderflow { expected: usize, len: usize },

    /// A builder method was called in a state that does not permit it.
    #[error("{construct}: '{operation}' not valid in state {state}")]
    OutOfSequence {
        construct: &'static str,
        operation: &'static str,
        state: &'static str,
    },

    /// A frame-scoped operation was called with no construct in progress.
    #[error("'{operation}' called with no construct in progress")]
    NoActiveConstruct { operation: &'static str },

    /// A frame-scoped operation was called on the wrong construct kind.
    #[error("'{operation}' not valid inside {found}")]
    ConstructMismatch {
        operation: &'static str,
        found: &'static str,
    },

    /// More than one statement accumulated in a construct's init region.
    #[error("{construct} has too many init statements ({count})")]
    TooManyInitStmts {
        construct: &'static str,
        count: usize,
    },

    /// The counted loop's post region must hold exactly one statement.
    #[error("loop post region holds {count} statements, expected exactly one")]
    PostStmtCount { count: usize },

    /// `else` was supplied twice for one conditional.
    #[error("else branch already set")]
    ElseAlreadySet,

    /// A second default clause within one branch frame.
    #[error("duplicate default clause")]
    DuplicateDefault,

    /// `fallthrough` emitted outside an open branch clause.
    #[error("fallthrough outside a branch clause")]
    FallthroughOutsideClause,

    /// Assignment-mode iteration header with an impossible target count.
    #[error("iteration header has {count} values, expected 1 to 3")]
    RangeTargetCount { count: usize },

    /// Definition-mode iteration with an impossible binding count.
    #[error("iteration declares {count} names, expected 1 or 2")]
    RangeNameCount { count: usize },

    /// A block context was closed with none open.
    #[error("no open block context to close")]
    UnbalancedBlock,

    /// The session was finalized with a construct still in progress.
    #[error("session finished with {construct} still in progress")]
    UnfinishedConstruct { construct: &'static str },
}

// ============================================================================
// Type Errors
// ============================================================================

/// The generated program would be invalid: an operand or target fails the
/// target language's typing rules.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TypeError {
    /// A condition or logical operand is not boolean.
    #[error("expression of type {found} is not a boolean")]
    NotBoolean { found: String },

    /// An assignment source is not assignable to its target type.
    #[error("{from} is not assignable to {to}")]
    NotAssignable { from: String, to: String },

    /// Two types do not support equality comparison.
    #[error("{left} is not comparable with {right}")]
    NotComparable { left: String, right: String },

    /// The iteration source type cannot be ranged over.
    #[error("cannot iterate over {found}")]
    NotIterable { found: String },

    /// A channel source yields no value component.
    #[error("channel iteration yields no value for target of type {target}")]
    NoRangeValue { target: String },

    /// No binary operator applies to the operand types.
    #[error("operator {op} not defined for {left} and {right}")]
    NoBinaryOp {
        op: String,
        left: String,
        right: String,
    },

    /// No unary operator applies to the operand type.
    #[error("operator {op} not defined for {operand}")]
    NoUnaryOp { op: String, operand: String },

    /// The environment's policy declares no default type for the kind.
    #[error("no default type for {kind}")]
    NoDefaultType { kind: String },

    /// An iteration binding collides with an existing declaration.
    #[error("variable already defined: {name}")]
    Redeclared { name: String },

    /// A referenced variable has not been declared.
    #[error("unknown variable: {name}")]
    UnknownVariable { name: String },

    /// Constant folding divided by zero.
    #[error("division by zero in constant expression")]
    DivisionByZero,

    /// Constant folding applied an operator outside its domain.
    #[error("invalid constant operation: {op} on {operand}")]
    InvalidConstantOp { op: String, operand: String },
}

// ============================================================================
// Registration Errors
// ============================================================================

/// Overload-family bootstrap or call-site resolution failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistrationError {
    /// A candidate name lacks a decodable positional suffix.
    #[error("overload candidate '{name}' has no valid positional suffix")]
    InvalidSuffix { name: String },

    /// A decoded index is outside the candidate family.
    #[error("overload candidate '{name}' decodes to index {index}, family has {count}")]
    IndexOutOfRange {
        name: String,
        index: usize,
        count: usize,
    },

    /// Two candidates decode to the same index.
    #[error("duplicate overload index {index} in family '{name}'")]
    DuplicateIndex { name: String, index: usize },

    /// An operator was registered twice for one operand type.
    #[error("operator {op} already registered for {ty}")]
    DuplicateOperator { op: String, ty: String },

    /// No candidate matches the call's argument shape.
    #[error("no matching overload for '{name}({args})'")]
    NoMatchingOverload { name: String, args: String },

    /// The named overload family is unknown.
    #[error("unknown overload family '{name}'")]
    UnknownFamily { name: String },
}

// ============================================================================
// Top-Level Wrapper
// ============================================================================

/// Any error the builder engine can produce, for callers that handle all
/// phases uniformly.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    Registration(#[from] RegistrationError),
}
