//! Multi-way branch construction.
//!
//! Call sequence: `switch_stmt` → (emit ≤1 init statement, push the
//! optional tag) → `then` → repeated (push labels → `case(n)` → emit
//! clause body → `end`) → `end`.
//!
//! A branch without a tag is the boolean-switch form: every clause label
//! must then be boolean. `case(0)` opens the default clause; a second
//! default in one branch is a fatal construction error.

use quill_core::{BuildError, CaseClause, Expr, ProtocolError, Stmt};

use crate::operators::{check_boolean, check_comparable};
use crate::session::Session;
use crate::stack::Value;
use crate::stmt::Frame;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SwitchState {
    /// Opened, awaiting the tag.
    Init,
    /// Accepting clauses.
    Clauses,
}

impl SwitchState {
    fn name(&self) -> &'static str {
        match self {
            SwitchState::Init => "Init",
            SwitchState::Clauses => "Clauses",
        }
    }
}

/// In-progress branch statement.
#[derive(Debug)]
pub struct SwitchFrame {
    state: SwitchState,
    init: Option<Stmt>,
    /// The tag value; absent in boolean-switch mode. The type stays
    /// attached for clause label checking.
    tag: Option<Value>,
    pub(crate) clauses: Vec<CaseClause>,
    has_default: bool,
}

impl SwitchFrame {
    pub(crate) fn new() -> Self {
        SwitchFrame {
            state: SwitchState::Init,
            init: None,
            tag: None,
            clauses: Vec::new(),
            has_default: false,
        }
    }
}

/// One open clause: its checked labels, body under construction.
#[derive(Debug)]
pub struct CaseFrame {
    labels: Vec<Expr>,
}

fn out_of_sequence(operation: &'static str, state: SwitchState) -> BuildError {
    ProtocolError::OutOfSequence {
        construct: "switch statement",
        operation,
        state: state.name(),
    }
    .into()
}

pub(crate) fn on_then(sess: &mut Session<'_>, frame: &mut SwitchFrame) -> Result<(), BuildError> {
    if frame.state != SwitchState::Init {
        return Err(out_of_sequence("then", frame.state));
    }
    frame.tag = match sess.above_base() {
        0 => None,
        1 => Some(sess.stack.pop()?),
        _ => {
            return Err(ProtocolError::OutOfSequence {
                construct: "switch statement",
                operation: "then",
                state: "multiple pending tag values",
            }
            .into());
        }
    };
    frame.init = sess.close_init("switch statement")?;
    frame.state = SwitchState::Clauses;
    Ok(())
}

pub(crate) fn on_case(
    sess: &mut Session<'_>,
    frame: &mut SwitchFrame,
    n: usize,
) -> Result<CaseFrame, BuildError> {
    if frame.state != SwitchState::Clauses {
        return Err(out_of_sequence("case", frame.state));
    }
    if n == 0 {
        if frame.has_default {
            return Err(ProtocolError::DuplicateDefault.into());
        }
        frame.has_default = true;
        return Ok(CaseFrame { labels: Vec::new() });
    }
    let values = sess.stack.pop_n(n)?;
    let mut labels = Vec::with_capacity(n);
    for v in values {
        match &frame.tag {
            Some(tag) => check_comparable(&v.ty, &tag.ty)?,
            None => check_boolean(&v)?,
        }
        labels.push(v.node);
    }
    Ok(CaseFrame { labels })
}

pub(crate) fn on_case_end(sess: &mut Session<'_>, frame: CaseFrame) -> Result<(), BuildError> {
    let body = sess.close_ctx()?;
    sess.scope.pop_scope();
    match sess.frames.last_mut() {
        Some(Frame::Switch(sw)) => {
            sw.clauses.push(CaseClause {
                labels: frame.labels,
                body,
            });
            Ok(())
        }
        // Clause frames only ever sit directly above their branch frame.
        _ => Err(ProtocolError::ConstructMismatch {
            operation: "end",
            found: "case clause",
        }
        .into()),
    }
}

pub(crate) fn on_end(sess: &mut Session<'_>, frame: SwitchFrame) -> Result<(), BuildError> {
    if frame.state != SwitchState::Clauses {
        return Err(out_of_sequence("end", frame.state));
    }
    sess.scope.pop_scope();
    sess.emit(Stmt::Switch {
        init: frame.init.map(Box::new),
        tag: frame.tag.map(|v| v.node),
        clauses: frame.clauses,
    });
    Ok(())
}
