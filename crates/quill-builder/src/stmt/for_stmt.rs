//! Counted loop construction.
//!
//! Call sequence: `for_stmt` → (emit ≤1 init statement, push condition) →
//! `then` → (emit body) → [`post` → (emit exactly one post statement)] →
//! `end`.

use quill_core::{Block, BuildError, Expr, ProtocolError, Stmt};

use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ForState {
    /// Opened, awaiting the condition.
    Init,
    /// Loop body under construction.
    Body,
    /// Post region under construction.
    Post,
}

impl ForState {
    fn name(&self) -> &'static str {
        match self {
            ForState::Init => "Init",
            ForState::Body => "Body",
            ForState::Post => "Post",
        }
    }
}

/// In-progress counted loop.
#[derive(Debug)]
pub struct ForFrame {
    state: ForState,
    init: Option<Stmt>,
    cond: Option<Expr>,
    /// Captured once `post` closes the body region.
    body: Option<Block>,
}

impl ForFrame {
    pub(crate) fn new() -> Self {
        ForFrame {
            state: ForState::Init,
            init: None,
            cond: None,
            body: None,
        }
    }
}

fn out_of_sequence(operation: &'static str, state: ForState) -> BuildError {
    ProtocolError::OutOfSequence {
        construct: "for statement",
        operation,
        state: state.name(),
    }
    .into()
}

pub(crate) fn on_then(sess: &mut Session<'_>, frame: &mut ForFrame) -> Result<(), BuildError> {
    if frame.state != ForState::Init {
        return Err(out_of_sequence("then", frame.state));
    }
    let cond = sess.pop_cond()?;
    frame.init = sess.close_init("for statement")?;
    frame.cond = Some(cond);
    sess.open_ctx("for body");
    frame.state = ForState::Body;
    Ok(())
}

pub(crate) fn on_post(sess: &mut Session<'_>, frame: &mut ForFrame) -> Result<(), BuildError> {
    if frame.state != ForState::Body {
        return Err(out_of_sequence("post", frame.state));
    }
    frame.body = Some(Block::new(sess.close_ctx()?));
    sess.open_ctx("for post");
    frame.state = ForState::Post;
    Ok(())
}

pub(crate) fn on_end(sess: &mut Session<'_>, frame: ForFrame) -> Result<(), BuildError> {
    let (body, post) = match frame.state {
        ForState::Init => return Err(out_of_sequence("end", frame.state)),
        ForState::Body => (Block::new(sess.close_ctx()?), None),
        ForState::Post => {
            let mut stmts = sess.close_ctx()?;
            if stmts.len() != 1 {
                return Err(ProtocolError::PostStmtCount { count: stmts.len() }.into());
            }
            let post = stmts.pop();
            let body = frame.body.ok_or(ProtocolError::OutOfSequence {
                construct: "for statement",
                operation: "end",
                state: "Post",
            })?;
            (body, post)
        }
    };
    let cond = frame.cond.ok_or(ProtocolError::OutOfSequence {
        construct: "for statement",
        operation: "end",
        state: "Init",
    })?;
    sess.scope.pop_scope();
    sess.emit(Stmt::For {
        init: frame.init.map(Box::new),
        cond,
        post: post.map(Box::new),
        body,
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use quill_core::{stmts_to_source, BinaryOp, BuildError, ProtocolError, Type};
    use quill_registry::Registry;

    use crate::env::Environment;
    use crate::session::Session;
    use crate::stack::Value;

    fn env() -> Environment {
        Environment::new(Registry::new())
    }

    /// `for var i int = 0; i < 10; <post> { body }` built piece by piece.
    fn counted_loop(sess: &mut Session<'_>) {
        sess.for_stmt();
        sess.new_var_start(Some(Type::int()), "i")
            .unwrap()
            .val(Value::untyped_int(0))
            .end_init(1)
            .unwrap();
        sess.var_ref("i")
            .unwrap()
            .val(Value::untyped_int(10))
            .binary_op(BinaryOp::Lss)
            .unwrap()
            .then()
            .unwrap();
    }

    #[test]
    fn loop_without_post() {
        let env = env();
        let mut sess = Session::new(&env);
        counted_loop(&mut sess);
        sess.var_ref("i").unwrap().end_stmt().unwrap();
        sess.end().unwrap();
        let stmts = sess.finish().unwrap();
        assert_eq!(
            stmts_to_source(&stmts),
            "for var i int = 0; i < 10; {\n\ti\n}\n"
        );
    }

    #[test]
    fn loop_with_post() {
        let env = env();
        let mut sess = Session::new(&env);
        counted_loop(&mut sess);
        sess.var_ref("i").unwrap().end_stmt().unwrap();
        sess.post().unwrap();
        sess.var_ref("i").unwrap().end_stmt().unwrap();
        sess.end().unwrap();
        let stmts = sess.finish().unwrap();
        assert_eq!(
            stmts_to_source(&stmts),
            "for var i int = 0; i < 10; i {\n\ti\n}\n"
        );
    }

    #[test]
    fn empty_post_region_is_fatal() {
        let env = env();
        let mut sess = Session::new(&env);
        counted_loop(&mut sess);
        sess.post().unwrap();
        let err = sess.end().unwrap_err();
        assert_eq!(
            err,
            BuildError::Protocol(ProtocolError::PostStmtCount { count: 0 })
        );
    }

    #[test]
    fn two_post_statements_are_fatal() {
        let env = env();
        let mut sess = Session::new(&env);
        counted_loop(&mut sess);
        sess.post().unwrap();
        sess.var_ref("i").unwrap().end_stmt().unwrap();
        sess.var_ref("i").unwrap().end_stmt().unwrap();
        let err = sess.end().unwrap_err();
        assert_eq!(
            err,
            BuildError::Protocol(ProtocolError::PostStmtCount { count: 2 })
        );
    }

    #[test]
    fn post_before_then_is_out_of_sequence() {
        let env = env();
        let mut sess = Session::new(&env);
        sess.for_stmt();
        let err = sess.post().unwrap_err();
        assert!(matches!(
            err,
            BuildError::Protocol(ProtocolError::OutOfSequence { .. })
        ));
    }

    #[test]
    fn loop_variable_goes_out_of_scope() {
        let env = env();
        let mut sess = Session::new(&env);
        counted_loop(&mut sess);
        sess.end().unwrap();
        let err = sess.var_ref("i").unwrap_err();
        assert!(matches!(err, BuildError::Type(_)));
    }
}
