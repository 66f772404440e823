//! Block contexts and variable scope for one construction session.
//!
//! This module provides the two pieces of lexical bookkeeping the
//! control-flow builders lean on:
//! - [`BlockChain`]: a strictly stack-disciplined chain of open block
//!   contexts, each recording the value-stack depth at entry and
//!   accumulating the statements emitted inside it.
//! - [`VarScope`]: depth-tracked variable declarations, used when an
//!   iteration loop introduces new bindings (and by callers declaring
//!   names up front). Shadowing in a nested scope is allowed; collision
//!   at the same depth is not.

use rustc_hash::FxHashMap;

use quill_core::{ProtocolError, Stmt, Type, TypeError};

// ============================================================================
// Block Contexts
// ============================================================================

/// One open block context: the value-stack depth recorded at entry and the
/// statements accumulated since.
#[derive(Debug)]
pub struct BlockCtx {
    /// Value-stack length when the context opened. Values below this mark
    /// belong to enclosing constructs and are out of reach for bulk pops
    /// scoped to this block.
    pub base: usize,
    /// Statements emitted while this context is current.
    pub stmts: Vec<Stmt>,
    /// What opened the context, for diagnostics.
    pub label: &'static str,
}

/// The chain of open block contexts. Contexts close in reverse order of
/// opening; anything else is a protocol violation.
#[derive(Debug, Default)]
pub struct BlockChain {
    contexts: Vec<BlockCtx>,
}

impl BlockChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a child context recording `stack_len` as its base.
    pub fn open(&mut self, label: &'static str, stack_len: usize) {
        self.contexts.push(BlockCtx {
            base: stack_len,
            stmts: Vec::new(),
            label,
        });
    }

    /// Close the current context, returning its accumulated statements and
    /// restoring the parent as current.
    pub fn close(&mut self) -> Result<Vec<Stmt>, ProtocolError> {
        self.contexts
            .pop()
            .map(|ctx| ctx.stmts)
            .ok_or(ProtocolError::UnbalancedBlock)
    }

    /// The current context's base, if one is open.
    pub fn base(&self) -> Option<usize> {
        self.contexts.last().map(|ctx| ctx.base)
    }

    /// The current context's label, if one is open.
    pub fn label(&self) -> Option<&'static str> {
        self.contexts.last().map(|ctx| ctx.label)
    }

    /// Number of open contexts.
    pub fn depth(&self) -> usize {
        self.contexts.len()
    }

    /// Append a statement to the current context, or hand it back when no
    /// context is open (the session then owns it as finished output).
    pub fn emit(&mut self, stmt: Stmt) -> Option<Stmt> {
        match self.contexts.last_mut() {
            Some(ctx) => {
                ctx.stmts.push(stmt);
                None
            }
            None => Some(stmt),
        }
    }
}

// ============================================================================
// Variable Scope
// ============================================================================

#[derive(Debug, Clone)]
struct VarEntry {
    ty: Type,
    depth: u32,
}

/// Depth-tracked variable declarations for one session.
#[derive(Debug, Default)]
pub struct VarScope {
    vars: FxHashMap<String, VarEntry>,
    depth: u32,
    /// Shadowed entries saved with the depth at which shadowing occurred.
    shadowed: Vec<(u32, String, VarEntry)>,
}

impl VarScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a nested scope.
    pub fn push_scope(&mut self) {
        self.depth += 1;
    }

    /// Exit the current scope, dropping its declarations and restoring any
    /// shadowed ones.
    pub fn pop_scope(&mut self) {
        self.vars.retain(|_, var| var.depth < self.depth);
        while let Some((shadow_depth, _, _)) = self.shadowed.last() {
            if *shadow_depth == self.depth {
                let (_, name, var) = self.shadowed.pop().unwrap();
                self.vars.insert(name, var);
            } else {
                break;
            }
        }
        self.depth -= 1;
    }

    /// Declare a name at the current depth. Same-depth collision is an
    /// error; shadowing an outer declaration is allowed.
    pub fn declare(&mut self, name: &str, ty: Type) -> Result<(), TypeError> {
        if let Some(existing) = self.vars.get(name) {
            if existing.depth == self.depth {
                return Err(TypeError::Redeclared {
                    name: name.to_string(),
                });
            }
            self.shadowed
                .push((self.depth, name.to_string(), existing.clone()));
        }
        self.vars.insert(
            name.to_string(),
            VarEntry {
                ty,
                depth: self.depth,
            },
        );
        Ok(())
    }

    /// Look up a declared name.
    pub fn lookup(&self, name: &str) -> Option<&Type> {
        self.vars.get(name).map(|v| &v.ty)
    }
}
