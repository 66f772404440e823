//! Serialization of syntax trees to target source text.
//!
//! A compact printer, not a formatting engine: blocks print one statement
//! per line with tab indentation, expressions print with minimal
//! parenthesization. The output shapes are the ones the round-trip tests
//! compare against.

use std::fmt::{self, Display, Formatter, Write as _};

use crate::ast::{Block, CaseClause, Expr, LitKind, Stmt};
use crate::ops::BinaryOp;

/// Binding strength for minimal parenthesization. Mirrors the target
/// language's operator precedence levels.
fn precedence(op: BinaryOp) -> u8 {
    use BinaryOp::*;
    match op {
        LOr => 1,
        LAnd => 2,
        Eql | Neq | Lss | Leq | Gtr | Geq => 3,
        Add | Sub | Or | Xor => 4,
        Mul | Quo | Rem | Shl | Shr | And => 5,
    }
}

fn write_operand(f: &mut Formatter<'_>, e: &Expr, parent: u8, is_rhs: bool) -> fmt::Result {
    let needs_parens = match e {
        Expr::Binary { op, .. } => {
            let child = precedence(*op);
            child < parent || (child == parent && is_rhs)
        }
        _ => false,
    };
    if needs_parens {
        write!(f, "({})", e)
    } else {
        write!(f, "{}", e)
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Ident(name) => f.write_str(name),
            Expr::Lit { kind, value } => match kind {
                LitKind::Str => write!(f, "{:?}", value),
                LitKind::Int | LitKind::Float => f.write_str(value),
            },
            Expr::Unary { op, expr } => {
                if matches!(**expr, Expr::Binary { .. }) {
                    write!(f, "{}({})", op, expr)
                } else {
                    write!(f, "{}{}", op, expr)
                }
            }
            Expr::Binary { op, lhs, rhs } => {
                let prec = precedence(*op);
                write_operand(f, lhs, prec, false)?;
                write!(f, " {} ", op)?;
                write_operand(f, rhs, prec, true)
            }
            Expr::Selector { recv, name } => write!(f, "{}.{}", recv, name),
            Expr::Call { callee, args } => {
                write!(f, "{}(", callee)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Serialize one statement at top level (no indentation).
pub fn stmt_to_source(stmt: &Stmt) -> String {
    let mut out = String::new();
    write_stmt(&mut out, stmt, 0);
    out
}

/// Serialize a statement list at top level, one statement per line.
pub fn stmts_to_source(stmts: &[Stmt]) -> String {
    let mut out = String::new();
    for stmt in stmts {
        write_stmt(&mut out, stmt, 0);
        out.push('\n');
    }
    out
}

fn indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push('\t');
    }
}

/// A statement printed inline in a header position (if/for init, for post):
/// no indentation, no trailing newline.
fn write_inline_stmt(out: &mut String, stmt: &Stmt) {
    write_stmt(out, stmt, 0);
}

fn write_block(out: &mut String, block: &Block, level: usize) {
    out.push('{');
    if block.stmts.is_empty() {
        out.push('}');
        return;
    }
    out.push('\n');
    for stmt in &block.stmts {
        indent(out, level + 1);
        write_stmt(out, stmt, level + 1);
        out.push('\n');
    }
    indent(out, level);
    out.push('}');
}

fn write_stmt(out: &mut String, stmt: &Stmt, level: usize) {
    match stmt {
        Stmt::Expr(e) => {
            let _ = write!(out, "{}", e);
        }
        Stmt::VarDecl { names, ty, init } => {
            out.push_str("var ");
            out.push_str(&names.join(", "));
            if let Some(ty) = ty {
                let _ = write!(out, " {}", ty);
            }
            if !init.is_empty() {
                out.push_str(" = ");
                for (i, e) in init.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    let _ = write!(out, "{}", e);
                }
            }
        }
        Stmt::Assign { lhs, define, rhs } => {
            for (i, e) in lhs.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                let _ = write!(out, "{}", e);
            }
            out.push_str(if *define { " := " } else { " = " });
            for (i, e) in rhs.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                let _ = write!(out, "{}", e);
            }
        }
        Stmt::If {
            init,
            cond,
            body,
            else_branch,
        } => {
            out.push_str("if ");
            if let Some(init) = init {
                write_inline_stmt(out, init);
                out.push_str("; ");
            }
            let _ = write!(out, "{} ", cond);
            write_block(out, body, level);
            if let Some(els) = else_branch {
                out.push_str(" else ");
                write_block(out, els, level);
            }
        }
        Stmt::Switch { init, tag, clauses } => {
            out.push_str("switch ");
            if let Some(init) = init {
                write_inline_stmt(out, init);
                out.push_str("; ");
            }
            if let Some(tag) = tag {
                let _ = write!(out, "{} ", tag);
            }
            out.push('{');
            if clauses.is_empty() {
                out.push('}');
                return;
            }
            out.push('\n');
            for clause in clauses {
                write_clause(out, clause, level);
            }
            indent(out, level);
            out.push('}');
        }
        Stmt::For {
            init,
            cond,
            post,
            body,
        } => {
            out.push_str("for ");
            if init.is_some() || post.is_some() {
                if let Some(init) = init {
                    write_inline_stmt(out, init);
                }
                out.push_str("; ");
                let _ = write!(out, "{}", cond);
                out.push(';');
                if let Some(post) = post {
                    out.push(' ');
                    write_inline_stmt(out, post);
                }
                out.push(' ');
            } else {
                let _ = write!(out, "{} ", cond);
            }
            write_block(out, body, level);
        }
        Stmt::ForRange {
            key,
            value,
            define,
            source,
            body,
        } => {
            out.push_str("for ");
            if key.is_some() || value.is_some() {
                if let Some(key) = key {
                    let _ = write!(out, "{}", key);
                } else {
                    out.push('_');
                }
                if let Some(value) = value {
                    let _ = write!(out, ", {}", value);
                }
                out.push_str(if *define { " := " } else { " = " });
            }
            let _ = write!(out, "range {} ", source);
            write_block(out, body, level);
        }
        Stmt::Fallthrough => out.push_str("fallthrough"),
        Stmt::Block(block) => write_block(out, block, level),
    }
}

fn write_clause(out: &mut String, clause: &CaseClause, level: usize) {
    indent(out, level);
    if clause.is_default() {
        out.push_str("default:");
    } else {
        out.push_str("case ");
        for (i, label) in clause.labels.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            let _ = write!(out, "{}", label);
        }
        out.push(':');
    }
    out.push('\n');
    for stmt in &clause.body {
        indent(out, level + 1);
        write_stmt(out, stmt, level + 1);
        out.push('\n');
    }
}
