//! Target-language syntax trees.
//!
//! The builder assembles these nodes incrementally and emits them into the
//! enclosing block once a construct completes. Nodes own their children;
//! ownership transfers from the value stack into whatever consumes them.

use crate::ops::{BinaryOp, UnaryOp};
use crate::types::Type;

/// Literal kinds carried by [`Expr::Lit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitKind {
    /// Integer literal, e.g. `42`.
    Int,
    /// Floating-point literal, e.g. `1.5`.
    Float,
    /// String literal; `value` holds the unquoted text.
    Str,
}

/// An expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A bare identifier.
    Ident(String),
    /// A literal with its source text.
    Lit { kind: LitKind, value: String },
    /// A prefix unary operation.
    Unary { op: UnaryOp, expr: Box<Expr> },
    /// A binary operation.
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// Member selection, `recv.name`.
    Selector { recv: Box<Expr>, name: String },
    /// A call, `callee(args...)`.
    Call { callee: Box<Expr>, args: Vec<Expr> },
}

impl Expr {
    /// An identifier expression.
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident(name.into())
    }

    /// An integer literal.
    pub fn int_lit(value: impl ToString) -> Self {
        Expr::Lit {
            kind: LitKind::Int,
            value: value.to_string(),
        }
    }

    /// A string literal (unquoted text; the printer adds quotes).
    pub fn str_lit(value: impl Into<String>) -> Self {
        Expr::Lit {
            kind: LitKind::Str,
            value: value.into(),
        }
    }

    /// Member selection, `recv.name`.
    pub fn selector(recv: Expr, name: impl Into<String>) -> Self {
        Expr::Selector {
            recv: Box::new(recv),
            name: name.into(),
        }
    }

    /// A call expression.
    pub fn call(callee: Expr, args: Vec<Expr>) -> Self {
        Expr::Call {
            callee: Box::new(callee),
            args,
        }
    }

    /// A binary operation node.
    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// A unary operation node.
    pub fn unary(op: UnaryOp, expr: Expr) -> Self {
        Expr::Unary {
            op,
            expr: Box::new(expr),
        }
    }
}

/// An ordered sequence of statements forming a lexical block.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

impl Block {
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Block { stmts }
    }
}

/// One clause of a multi-way branch. An empty label list denotes the
/// default clause.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseClause {
    pub labels: Vec<Expr>,
    pub body: Vec<Stmt>,
}

impl CaseClause {
    /// Whether this is the default clause.
    pub fn is_default(&self) -> bool {
        self.labels.is_empty()
    }
}

/// A statement node.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// A bare expression statement.
    Expr(Expr),
    /// `var a, b T` or `var c T = init...`.
    VarDecl {
        names: Vec<String>,
        ty: Option<Type>,
        init: Vec<Expr>,
    },
    /// `lhs := rhs` (define) or `lhs = rhs`.
    Assign {
        lhs: Vec<Expr>,
        define: bool,
        rhs: Vec<Expr>,
    },
    /// A conditional with optional init statement and else block.
    If {
        init: Option<Box<Stmt>>,
        cond: Expr,
        body: Block,
        else_branch: Option<Block>,
    },
    /// A multi-way branch. `tag: None` is the boolean-switch form.
    Switch {
        init: Option<Box<Stmt>>,
        tag: Option<Expr>,
        clauses: Vec<CaseClause>,
    },
    /// A counted loop with optional init and post statements.
    For {
        init: Option<Box<Stmt>>,
        cond: Expr,
        post: Option<Box<Stmt>>,
        body: Block,
    },
    /// An iteration loop over a map, slice, array, or channel source.
    ForRange {
        key: Option<Expr>,
        value: Option<Expr>,
        define: bool,
        source: Expr,
        body: Block,
    },
    /// Fallthrough marker inside a branch clause.
    Fallthrough,
    /// A free-standing nested block.
    Block(Block),
}
