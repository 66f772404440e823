//! The construction session.
//!
//! One [`Session`] owns everything a single function-body build needs: the
//! value stack, the chain of block contexts, the variable scope, and the
//! stack of in-progress control frames. Sessions are single-threaded and
//! never shared; parallel generation of independent bodies takes one
//! session each.
//!
//! The public methods form a fluent surface the generator scripts against:
//!
//! ```
//! use quill_builder::{Environment, Session};
//! use quill_core::{BinaryOp, Type};
//! use quill_registry::Registry;
//!
//! let env = Environment::new(Registry::new());
//! let mut sess = Session::new(&env);
//! sess.new_var(Type::int(), &["a", "b"])?;
//! sess.new_var_start(Some(Type::int()), "c")?
//!     .var_ref("a")?
//!     .var_ref("b")?
//!     .binary_op(BinaryOp::Add)?
//!     .end_init(1)?;
//! let stmts = sess.finish()?;
//! # Ok::<(), quill_core::BuildError>(())
//! ```

use quill_core::{BinaryOp, BuildError, Expr, ProtocolError, Stmt, Type, TypeError, UnaryOp};

use crate::env::Environment;
use crate::operators::{apply_binary, apply_unary, assignable_with_default, check_boolean, default_value};
use crate::scope::{BlockChain, VarScope};
use crate::stack::{Value, ValueStack};
use crate::stmt::Frame;

/// A variable declaration awaiting its initializer.
#[derive(Debug)]
pub(crate) struct PendingDecl {
    name: String,
    ty: Option<Type>,
}

/// One in-progress function-body construction.
pub struct Session<'env> {
    pub(crate) env: &'env Environment,
    pub(crate) stack: ValueStack,
    pub(crate) blocks: BlockChain,
    pub(crate) scope: VarScope,
    pub(crate) frames: Vec<Frame>,
    /// Finished statements emitted outside any open context.
    pub(crate) out: Vec<Stmt>,
    pub(crate) pending_decl: Option<PendingDecl>,
}

impl std::fmt::Debug for Session<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("stack", &self.stack)
            .field("blocks", &self.blocks)
            .field("scope", &self.scope)
            .field("frames", &self.frames)
            .field("out", &self.out)
            .field("pending_decl", &self.pending_decl)
            .finish_non_exhaustive()
    }
}

impl<'env> Session<'env> {
    /// Start a fresh session against an environment.
    pub fn new(env: &'env Environment) -> Self {
        Session {
            env,
            stack: ValueStack::new(),
            blocks: BlockChain::new(),
            scope: VarScope::new(),
            frames: Vec::new(),
            out: Vec::new(),
            pending_decl: None,
        }
    }

    // ==========================================================================
    // Values
    // ==========================================================================

    /// Push a value onto the stack.
    pub fn val(&mut self, v: Value) -> &mut Self {
        self.stack.push(v);
        self
    }

    /// Push a reference to a declared variable.
    pub fn var_ref(&mut self, name: &str) -> Result<&mut Self, BuildError> {
        let ty = self
            .scope
            .lookup(name)
            .cloned()
            .ok_or_else(|| TypeError::UnknownVariable {
                name: name.to_string(),
            })?;
        self.stack.push(Value::ident(name, ty));
        Ok(self)
    }

    /// Pop two operands and push the result of a binary operation.
    pub fn binary_op(&mut self, op: BinaryOp) -> Result<&mut Self, BuildError> {
        if self.stack.len() < 2 {
            return Err(ProtocolError::StackUnderflow {
                expected: 2,
                len: self.stack.len(),
            }
            .into());
        }
        let rhs = self.stack.pop()?;
        let lhs = self.stack.pop()?;
        let result = apply_binary(self.env, op, lhs, rhs)?;
        self.stack.push(result);
        Ok(self)
    }

    /// Pop one operand and push the result of a unary operation.
    pub fn unary_op(&mut self, op: UnaryOp) -> Result<&mut Self, BuildError> {
        let v = self.stack.pop()?;
        let result = apply_unary(self.env, op, v)?;
        self.stack.push(result);
        Ok(self)
    }

    /// Apply the defaulting policy to the top of the stack.
    pub fn default_top(&mut self) -> Result<&mut Self, BuildError> {
        let v = self.stack.pop()?;
        let defaulted = default_value(self.env, v)?;
        self.stack.push(defaulted);
        Ok(self)
    }

    /// Pop the top value off the stack, handing ownership of its node to
    /// the caller (e.g. to lift a finished expression out of the session).
    pub fn pop_val(&mut self) -> Result<Value, BuildError> {
        Ok(self.stack.pop()?)
    }

    /// The top of the stack, if any.
    pub fn peek_val(&self) -> Option<&Value> {
        self.stack.peek_n(1).ok().map(|vs| &vs[0])
    }

    /// Current stack depth, for balance checks by the driving generator.
    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    // ==========================================================================
    // Plain Statements
    // ==========================================================================

    /// Pop the top value and emit it as an expression statement.
    pub fn end_stmt(&mut self) -> Result<&mut Self, BuildError> {
        let v = self.stack.pop()?;
        self.emit(Stmt::Expr(v.node));
        Ok(self)
    }

    /// Declare variables without initializers: `var a, b T`.
    pub fn new_var(&mut self, ty: Type, names: &[&str]) -> Result<&mut Self, BuildError> {
        for name in names {
            self.scope.declare(name, ty.clone())?;
        }
        self.emit(Stmt::VarDecl {
            names: names.iter().map(|s| s.to_string()).collect(),
            ty: Some(ty),
            init: Vec::new(),
        });
        Ok(self)
    }

    /// Begin a declaration with an initializer: `var c T = ...`. The
    /// initializer value is built on the stack and consumed by
    /// [`end_init`](Self::end_init). Pass `None` to infer the type from
    /// the defaulted initializer.
    pub fn new_var_start(
        &mut self,
        ty: Option<Type>,
        name: &str,
    ) -> Result<&mut Self, BuildError> {
        if self.pending_decl.is_some() {
            return Err(ProtocolError::OutOfSequence {
                construct: "variable declaration",
                operation: "new_var_start",
                state: "initializer pending",
            }
            .into());
        }
        self.pending_decl = Some(PendingDecl {
            name: name.to_string(),
            ty,
        });
        Ok(self)
    }

    /// Finish a pending declaration, popping `n` initializer values.
    pub fn end_init(&mut self, n: usize) -> Result<&mut Self, BuildError> {
        let decl = self
            .pending_decl
            .take()
            .ok_or(ProtocolError::OutOfSequence {
                construct: "variable declaration",
                operation: "end_init",
                state: "no declaration started",
            })?;
        let values = self.stack.pop_n(n)?;

        let mut init = Vec::with_capacity(values.len());
        let declared_ty = match &decl.ty {
            Some(ty) => {
                for v in values {
                    init.push(self.coerce_init(v, ty)?);
                }
                ty.clone()
            }
            None => {
                // Infer from the first defaulted initializer.
                let mut inferred = None;
                for v in values {
                    let v = default_value(self.env, v)?;
                    inferred.get_or_insert_with(|| v.ty.clone());
                    init.push(v.node);
                }
                inferred.ok_or(ProtocolError::StackUnderflow { expected: 1, len: 0 })?
            }
        };
        self.scope.declare(&decl.name, declared_ty)?;
        self.emit(Stmt::VarDecl {
            names: vec![decl.name],
            ty: decl.ty,
            init,
        });
        Ok(self)
    }

    /// Check one initializer against the declared type and produce its
    /// final node. Untyped constants must be representable in the target
    /// type or default to exactly it; their nodes re-render as literals
    /// when a literal form exists.
    fn coerce_init(&self, v: Value, to: &Type) -> Result<Expr, BuildError> {
        if !assignable_with_default(self.env, &v.ty, to) {
            return Err(TypeError::NotAssignable {
                from: v.ty.to_string(),
                to: to.to_string(),
            }
            .into());
        }
        if v.ty.is_untyped() {
            if let Some(lit) = v.constant.as_ref().and_then(|c| c.to_expr()) {
                return Ok(lit);
            }
        }
        Ok(v.node)
    }

    // ==========================================================================
    // Internals shared with the control-flow builders
    // ==========================================================================

    /// Append a finished statement to the innermost open context, or to
    /// the session output when none is open.
    pub(crate) fn emit(&mut self, stmt: Stmt) {
        if let Some(stmt) = self.blocks.emit(stmt) {
            self.out.push(stmt);
        }
    }

    /// Open a nested block context. Variable scopes are pushed per
    /// construct, not per context: an init-region declaration stays
    /// visible in the construct's body.
    pub(crate) fn open_ctx(&mut self, label: &'static str) {
        self.blocks.open(label, self.stack.len());
    }

    /// Close the current context, returning its statements.
    pub(crate) fn close_ctx(&mut self) -> Result<Vec<Stmt>, BuildError> {
        Ok(self.blocks.close()?)
    }

    /// Values currently above the open context's base.
    pub(crate) fn above_base(&self) -> usize {
        let base = self.blocks.base().unwrap_or(0);
        self.stack.len().saturating_sub(base)
    }

    /// Pop the condition pushed for the current construct. It must sit
    /// above the context base and be boolean.
    pub(crate) fn pop_cond(&mut self) -> Result<Expr, BuildError> {
        if self.above_base() == 0 {
            return Err(ProtocolError::StackUnderflow { expected: 1, len: 0 }.into());
        }
        let v = self.stack.pop()?;
        check_boolean(&v)?;
        Ok(v.node)
    }

    /// Close the construct's init context, extracting at most one pending
    /// statement.
    pub(crate) fn close_init(
        &mut self,
        construct: &'static str,
    ) -> Result<Option<Stmt>, BuildError> {
        let mut stmts = self.close_ctx()?;
        match stmts.len() {
            0 => Ok(None),
            1 => Ok(stmts.pop()),
            count => Err(ProtocolError::TooManyInitStmts { construct, count }.into()),
        }
    }

    // ==========================================================================
    // Finalization
    // ==========================================================================

    /// Finish the session, returning the emitted statements. Fails when a
    /// construct, block, or declaration is still in progress.
    pub fn finish(self) -> Result<Vec<Stmt>, BuildError> {
        if let Some(frame) = self.frames.last() {
            return Err(ProtocolError::UnfinishedConstruct {
                construct: frame.kind_name(),
            }
            .into());
        }
        if let Some(label) = self.blocks.label() {
            return Err(ProtocolError::UnfinishedConstruct { construct: label }.into());
        }
        if self.pending_decl.is_some() {
            return Err(ProtocolError::UnfinishedConstruct {
                construct: "variable declaration",
            }
            .into());
        }
        Ok(self.out)
    }
}
