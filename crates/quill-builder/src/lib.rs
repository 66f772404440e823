//! The quill builder engine.
//!
//! A code-construction backend for a statically typed, C-family target
//! language: a generator scripts a sequence of calls (push values, apply
//! operators, begin and end constructs) and the engine assembles valid,
//! type-checked statement trees, folding constants and dispatching
//! overloaded operators as each fragment is produced.
//!
//! ## Modules
//!
//! - [`stack`]: the session's typed value stack
//! - [`scope`]: block contexts and variable scope
//! - [`env`]: the collaborator environment (registry + defaulting policy)
//! - [`operators`]: operator application and type checking
//! - [`session`]: the construction session and its fluent surface
//! - [`stmt`]: the per-construct control-flow state machines

pub mod env;
pub mod operators;
pub mod scope;
pub mod session;
pub mod stack;
pub mod stmt;

pub use env::Environment;
pub use operators::{
    apply_binary, apply_unary, check_assignable, check_boolean, check_comparable, default_value,
};
pub use scope::{BlockChain, BlockCtx, VarScope};
pub use session::Session;
pub use stack::{Value, ValueStack};
pub use stmt::Frame;

// Re-export the shared error types for convenience.
pub use quill_core::{BuildError, ProtocolError, RegistrationError, TypeError};
