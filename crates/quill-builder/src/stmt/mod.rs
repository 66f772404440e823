//! Control-flow builders: one state machine per construct kind.
//!
//! Each construct is driven by a scripted call sequence; the in-progress
//! state lives in a [`Frame`] on the session's frame stack and is consumed
//! into one finished statement at the terminating call. Every public
//! operation checks the frame's explicit state and returns a typed
//! protocol error on mismatch.
//!
//! ## Modules
//!
//! - [`if_stmt`]: conditional (`if`/`else`)
//! - [`switch_stmt`]: multi-way branch with clauses
//! - [`for_stmt`]: counted loop with optional post statement
//! - [`for_range_stmt`]: iteration loop over map/slice/array/channel

pub mod for_range_stmt;
pub mod for_stmt;
pub mod if_stmt;
pub mod switch_stmt;

use quill_core::{BuildError, ProtocolError, Stmt};

use crate::session::Session;

use for_range_stmt::RangeFrame;
use for_stmt::ForFrame;
use if_stmt::IfFrame;
use switch_stmt::{CaseFrame, SwitchFrame};

/// The in-progress state of one control-flow construct, tagged by kind.
#[derive(Debug)]
pub enum Frame {
    If(IfFrame),
    Switch(SwitchFrame),
    Case(CaseFrame),
    For(ForFrame),
    Range(RangeFrame),
}

impl Frame {
    /// The construct's name for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Frame::If(_) => "if statement",
            Frame::Switch(_) => "switch statement",
            Frame::Case(_) => "case clause",
            Frame::For(_) => "for statement",
            Frame::Range(_) => "range statement",
        }
    }
}

impl Session<'_> {
    // ==========================================================================
    // Construct entry points
    // ==========================================================================

    /// Begin a conditional. Statements emitted before `then` become the
    /// init statement.
    pub fn if_stmt(&mut self) -> &mut Self {
        self.frames.push(Frame::If(IfFrame::new()));
        self.scope.push_scope();
        self.open_ctx("if init");
        self
    }

    /// Begin a multi-way branch.
    pub fn switch_stmt(&mut self) -> &mut Self {
        self.frames.push(Frame::Switch(SwitchFrame::new()));
        self.scope.push_scope();
        self.open_ctx("switch init");
        self
    }

    /// Begin a counted loop.
    pub fn for_stmt(&mut self) -> &mut Self {
        self.frames.push(Frame::For(ForFrame::new()));
        self.scope.push_scope();
        self.open_ctx("for init");
        self
    }

    /// Begin an iteration loop that declares new bindings (one or two
    /// names; `_` discards a component).
    pub fn for_range(&mut self, names: &[&str]) -> Result<&mut Self, BuildError> {
        if names.is_empty() || names.len() > 2 {
            return Err(ProtocolError::RangeNameCount { count: names.len() }.into());
        }
        self.frames.push(Frame::Range(RangeFrame::define(names)));
        self.scope.push_scope();
        self.open_ctx("range statement");
        Ok(self)
    }

    /// Begin an iteration loop over existing assignment targets.
    pub fn for_range_assign(&mut self) -> &mut Self {
        self.frames.push(Frame::Range(RangeFrame::assign()));
        self.scope.push_scope();
        self.open_ctx("range statement");
        self
    }

    // ==========================================================================
    // Frame-scoped operations
    // ==========================================================================

    /// Supply the condition (and tag, for a branch) of the innermost
    /// construct and open its body.
    pub fn then(&mut self) -> Result<&mut Self, BuildError> {
        let mut frame = self.pop_frame("then")?;
        let kind = frame.kind_name();
        let result = match &mut frame {
            Frame::If(f) => if_stmt::on_then(self, f),
            Frame::Switch(f) => switch_stmt::on_then(self, f),
            Frame::For(f) => for_stmt::on_then(self, f),
            _ => Err(ProtocolError::ConstructMismatch {
                operation: "then",
                found: kind,
            }
            .into()),
        };
        result?;
        self.frames.push(frame);
        Ok(self)
    }

    /// Close the then-body of the innermost conditional and open its else
    /// body.
    pub fn else_stmt(&mut self) -> Result<&mut Self, BuildError> {
        let mut frame = self.pop_frame("else")?;
        let kind = frame.kind_name();
        let result = match &mut frame {
            Frame::If(f) => if_stmt::on_else(self, f),
            _ => Err(ProtocolError::ConstructMismatch {
                operation: "else",
                found: kind,
            }
            .into()),
        };
        result?;
        self.frames.push(frame);
        Ok(self)
    }

    /// Open one clause of the innermost branch, popping `n` label values.
    /// `n == 0` opens the default clause.
    pub fn case(&mut self, n: usize) -> Result<&mut Self, BuildError> {
        let mut frame = self.pop_frame("case")?;
        let kind = frame.kind_name();
        let clause = match &mut frame {
            Frame::Switch(f) => switch_stmt::on_case(self, f, n),
            _ => Err(ProtocolError::ConstructMismatch {
                operation: "case",
                found: kind,
            }
            .into()),
        };
        let clause = clause?;
        self.frames.push(frame);
        self.frames.push(Frame::Case(clause));
        self.scope.push_scope();
        self.open_ctx("case body");
        Ok(self)
    }

    /// Emit a fallthrough marker into the open clause body.
    pub fn fallthrough_stmt(&mut self) -> Result<&mut Self, BuildError> {
        match self.frames.last() {
            Some(Frame::Case(_)) => {
                self.emit(Stmt::Fallthrough);
                Ok(self)
            }
            _ => Err(ProtocolError::FallthroughOutsideClause.into()),
        }
    }

    /// Close the innermost counted loop's body and open its post region.
    pub fn post(&mut self) -> Result<&mut Self, BuildError> {
        let mut frame = self.pop_frame("post")?;
        let kind = frame.kind_name();
        let result = match &mut frame {
            Frame::For(f) => for_stmt::on_post(self, f),
            _ => Err(ProtocolError::ConstructMismatch {
                operation: "post",
                found: kind,
            }
            .into()),
        };
        result?;
        self.frames.push(frame);
        Ok(self)
    }

    /// Consume the iteration header values from the stack and settle the
    /// innermost range loop's bindings or targets.
    pub fn range_then(&mut self) -> Result<&mut Self, BuildError> {
        let mut frame = self.pop_frame("range_then")?;
        let kind = frame.kind_name();
        let result = match &mut frame {
            Frame::Range(f) => for_range_stmt::on_then(self, f),
            _ => Err(ProtocolError::ConstructMismatch {
                operation: "range_then",
                found: kind,
            }
            .into()),
        };
        result?;
        self.frames.push(frame);
        Ok(self)
    }

    /// Terminate the innermost construct (or clause), emitting its
    /// finished statement into the enclosing block.
    pub fn end(&mut self) -> Result<&mut Self, BuildError> {
        let frame = self.pop_frame("end")?;
        match frame {
            Frame::If(f) => if_stmt::on_end(self, f)?,
            Frame::Switch(f) => switch_stmt::on_end(self, f)?,
            Frame::Case(f) => switch_stmt::on_case_end(self, f)?,
            Frame::For(f) => for_stmt::on_end(self, f)?,
            Frame::Range(f) => for_range_stmt::on_end(self, f)?,
        }
        Ok(self)
    }

    fn pop_frame(&mut self, operation: &'static str) -> Result<Frame, BuildError> {
        self.frames
            .pop()
            .ok_or(ProtocolError::NoActiveConstruct { operation }.into())
    }
}
