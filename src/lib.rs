//! quill: a code-construction backend for a statically typed, C-family
//! imperative target language.
//!
//! A higher-level generator (a transpiler front-end, typically) drives one
//! [`Session`](quill_builder::Session) per function body with a scripted
//! call sequence: push values, apply operators, begin and end control
//! constructs. The engine type-checks each fragment inline, folds
//! constants, dispatches overloaded operators through the environment's
//! registry, and emits one finished statement node at each construct's
//! terminating call.

pub use quill_builder;
pub use quill_core;
pub use quill_registry;

/// The common surface a generator needs.
pub mod prelude {
    pub use quill_builder::{Environment, Session, Value};
    pub use quill_core::{
        BasicType, BinaryOp, BuildError, Constant, DefaultPolicy, Expr, NamedType, ProtocolError,
        RegistrationError, Routine, Signature, StdDefaults, Stmt, Type, TypeError, UnaryOp,
        UntypedKind, stmt_to_source, stmts_to_source,
    };
    pub use quill_registry::{OverloadSet, Registry};
}
