//! Conditional construction.
//!
//! Call sequence: `if_stmt` → (emit ≤1 init statement, push condition) →
//! `then` → (emit then-body) → [`else_stmt` → (emit else-body)] → `end`.

use quill_core::{Block, BuildError, Expr, ProtocolError, Stmt};

use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IfState {
    /// Opened, awaiting the condition.
    Init,
    /// Then-body under construction.
    Body,
    /// Else-body under construction.
    Else,
}

impl IfState {
    fn name(&self) -> &'static str {
        match self {
            IfState::Init => "Init",
            IfState::Body => "Body",
            IfState::Else => "Else",
        }
    }
}

/// In-progress conditional.
#[derive(Debug)]
pub struct IfFrame {
    state: IfState,
    init: Option<Stmt>,
    cond: Option<Expr>,
    then_body: Option<Block>,
}

impl IfFrame {
    pub(crate) fn new() -> Self {
        IfFrame {
            state: IfState::Init,
            init: None,
            cond: None,
            then_body: None,
        }
    }
}

fn out_of_sequence(operation: &'static str, state: IfState) -> BuildError {
    ProtocolError::OutOfSequence {
        construct: "if statement",
        operation,
        state: state.name(),
    }
    .into()
}

pub(crate) fn on_then(sess: &mut Session<'_>, frame: &mut IfFrame) -> Result<(), BuildError> {
    if frame.state != IfState::Init {
        return Err(out_of_sequence("then", frame.state));
    }
    let cond = sess.pop_cond()?;
    frame.init = sess.close_init("if statement")?;
    frame.cond = Some(cond);
    sess.open_ctx("if body");
    frame.state = IfState::Body;
    Ok(())
}

pub(crate) fn on_else(sess: &mut Session<'_>, frame: &mut IfFrame) -> Result<(), BuildError> {
    match frame.state {
        IfState::Body => {}
        IfState::Else => return Err(ProtocolError::ElseAlreadySet.into()),
        IfState::Init => return Err(out_of_sequence("else", frame.state)),
    }
    frame.then_body = Some(Block::new(sess.close_ctx()?));
    sess.open_ctx("else body");
    frame.state = IfState::Else;
    Ok(())
}

pub(crate) fn on_end(sess: &mut Session<'_>, frame: IfFrame) -> Result<(), BuildError> {
    let closed = match frame.state {
        IfState::Init => return Err(out_of_sequence("end", frame.state)),
        IfState::Body | IfState::Else => Block::new(sess.close_ctx()?),
    };
    let (body, else_branch) = match frame.then_body {
        // `else` was called: the closed block is the else branch.
        Some(then_body) => (then_body, Some(closed)),
        None => (closed, None),
    };
    let cond = frame.cond.ok_or(ProtocolError::OutOfSequence {
        construct: "if statement",
        operation: "end",
        state: "Init",
    })?;
    sess.scope.pop_scope();
    sess.emit(Stmt::If {
        init: frame.init.map(Box::new),
        cond,
        body,
        else_branch,
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use quill_core::{stmts_to_source, BuildError, ProtocolError, Type, TypeError};
    use quill_registry::Registry;

    use crate::env::Environment;
    use crate::session::Session;
    use crate::stack::Value;

    fn env() -> Environment {
        Environment::new(Registry::new())
    }

    #[test]
    fn if_without_else() {
        let env = env();
        let mut sess = Session::new(&env);
        sess.new_var(Type::int(), &["a"]).unwrap();
        sess.if_stmt()
            .val(Value::untyped_bool(true))
            .then()
            .unwrap()
            .var_ref("a")
            .unwrap()
            .end_stmt()
            .unwrap()
            .end()
            .unwrap();
        let stmts = sess.finish().unwrap();
        assert_eq!(stmts_to_source(&stmts), "var a int\nif true {\n\ta\n}\n");
    }

    #[test]
    fn if_with_else() {
        let env = env();
        let mut sess = Session::new(&env);
        sess.new_var(Type::int(), &["a", "b"]).unwrap();
        sess.if_stmt()
            .val(Value::untyped_bool(true))
            .then()
            .unwrap()
            .var_ref("a")
            .unwrap()
            .end_stmt()
            .unwrap()
            .else_stmt()
            .unwrap()
            .var_ref("b")
            .unwrap()
            .end_stmt()
            .unwrap()
            .end()
            .unwrap();
        let stmts = sess.finish().unwrap();
        assert_eq!(
            stmts_to_source(&stmts),
            "var a, b int\nif true {\n\ta\n} else {\n\tb\n}\n"
        );
    }

    #[test]
    fn init_statement_is_extracted() {
        let env = env();
        let mut sess = Session::new(&env);
        sess.if_stmt();
        sess.new_var_start(Some(Type::int()), "x")
            .unwrap()
            .val(Value::untyped_int(1))
            .end_init(1)
            .unwrap();
        sess.val(Value::untyped_bool(true))
            .then()
            .unwrap()
            .var_ref("x")
            .unwrap()
            .end_stmt()
            .unwrap()
            .end()
            .unwrap();
        let stmts = sess.finish().unwrap();
        assert_eq!(
            stmts_to_source(&stmts),
            "if var x int = 1; true {\n\tx\n}\n"
        );
    }

    #[test]
    fn too_many_init_statements() {
        let env = env();
        let mut sess = Session::new(&env);
        sess.if_stmt();
        sess.new_var(Type::int(), &["x"]).unwrap();
        sess.new_var(Type::int(), &["y"]).unwrap();
        sess.val(Value::untyped_bool(true));
        let err = sess.then().unwrap_err();
        assert_eq!(
            err,
            BuildError::Protocol(ProtocolError::TooManyInitStmts {
                construct: "if statement",
                count: 2,
            })
        );
    }

    #[test]
    fn non_boolean_condition() {
        let env = env();
        let mut sess = Session::new(&env);
        sess.if_stmt().val(Value::untyped_int(1));
        let err = sess.then().unwrap_err();
        assert!(matches!(
            err,
            BuildError::Type(TypeError::NotBoolean { .. })
        ));
    }

    #[test]
    fn duplicate_else() {
        let env = env();
        let mut sess = Session::new(&env);
        sess.if_stmt()
            .val(Value::untyped_bool(true))
            .then()
            .unwrap()
            .else_stmt()
            .unwrap();
        let err = sess.else_stmt().unwrap_err();
        assert_eq!(err, BuildError::Protocol(ProtocolError::ElseAlreadySet));
    }

    #[test]
    fn else_before_then() {
        let env = env();
        let mut sess = Session::new(&env);
        sess.if_stmt();
        let err = sess.else_stmt().unwrap_err();
        assert!(matches!(
            err,
            BuildError::Protocol(ProtocolError::OutOfSequence { .. })
        ));
    }

    #[test]
    fn stack_is_balanced_across_the_construct() {
        let env = env();
        let mut sess = Session::new(&env);
        sess.val(Value::untyped_int(7));
        let before = sess.stack_len();
        sess.if_stmt()
            .val(Value::untyped_bool(false))
            .then()
            .unwrap()
            .end()
            .unwrap();
        assert_eq!(sess.stack_len(), before);
    }

    #[test]
    fn nested_conditionals() {
        let env = env();
        let mut sess = Session::new(&env);
        sess.if_stmt()
            .val(Value::untyped_bool(true))
            .then()
            .unwrap()
            .if_stmt()
            .val(Value::untyped_bool(false))
            .then()
            .unwrap()
            .end()
            .unwrap()
            .end()
            .unwrap();
        let stmts = sess.finish().unwrap();
        assert_eq!(
            stmts_to_source(&stmts),
            "if true {\n\tif false {}\n}\n"
        );
    }
}
