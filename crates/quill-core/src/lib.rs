//! Core data model for the quill code-construction backend.
//!
//! This crate holds everything the builder and registry crates share:
//!
//! - [`ast`]: target-language statement and expression trees
//! - [`printer`]: compact serialization of trees to source text
//! - [`types`]: static type descriptors, property flags, defaulting policy
//! - [`constant`]: exact compile-time constants and folding
//! - [`ops`]: binary/unary operator enums and their dispatch suffixes
//! - [`error`]: the typed error hierarchy shared by every phase

pub mod ast;
pub mod constant;
pub mod error;
pub mod ops;
pub mod printer;
pub mod types;

pub use ast::{Block, CaseClause, Expr, LitKind, Stmt};
pub use constant::Constant;
pub use error::{BuildError, ProtocolError, RegistrationError, TypeError};
pub use ops::{BinaryOp, UnaryOp};
pub use printer::{stmt_to_source, stmts_to_source};
pub use types::{
    BasicType, DefaultPolicy, Method, NamedType, Routine, Signature, StdDefaults, Type, TypeProps,
    UntypedKind,
};
