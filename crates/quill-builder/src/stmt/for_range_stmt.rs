//! Iteration loop construction.
//!
//! Two modes, selected at entry:
//! - definition mode (`for_range(&["k", "v"])`): new bindings are declared
//!   with types derived from the iterated source's shape
//! - assignment mode (`for_range_assign()`): existing targets are popped
//!   alongside the source and checked for assignability
//!
//! Call sequence: entry → (push targets and source) → `range_then` →
//! (emit body) → `end`.

use quill_core::{Block, BuildError, Expr, ProtocolError, Stmt, Type, TypeError};

use crate::operators::check_assignable;
use crate::session::Session;
use crate::stack::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RangeState {
    /// Opened, awaiting the header values.
    Header,
    /// Loop body under construction.
    Body,
}

impl RangeState {
    fn name(&self) -> &'static str {
        match self {
            RangeState::Header => "Header",
            RangeState::Body => "Body",
        }
    }
}

/// The settled iteration header.
#[derive(Debug)]
struct RangeHeader {
    key: Option<Expr>,
    value: Option<Expr>,
    define: bool,
    source: Expr,
}

/// In-progress iteration loop.
#[derive(Debug)]
pub struct RangeFrame {
    state: RangeState,
    /// Binding names in definition mode; `None` in assignment mode.
    names: Option<Vec<String>>,
    header: Option<RangeHeader>,
}

impl RangeFrame {
    pub(crate) fn define(names: &[&str]) -> Self {
        RangeFrame {
            state: RangeState::Header,
            names: Some(names.iter().map(|s| s.to_string()).collect()),
            header: None,
        }
    }

    pub(crate) fn assign() -> Self {
        RangeFrame {
            state: RangeState::Header,
            names: None,
            header: None,
        }
    }
}

fn out_of_sequence(operation: &'static str, state: RangeState) -> BuildError {
    ProtocolError::OutOfSequence {
        construct: "range statement",
        operation,
        state: state.name(),
    }
    .into()
}

/// Derive (key, value) types from the source, or fail as not iterable.
fn derive_key_value(source: &Value) -> Result<(Type, Option<Type>), BuildError> {
    source
        .ty
        .range_key_value()
        .ok_or_else(|| {
            TypeError::NotIterable {
                found: source.ty.to_string(),
            }
            .into()
        })
}

pub(crate) fn on_then(sess: &mut Session<'_>, frame: &mut RangeFrame) -> Result<(), BuildError> {
    if frame.state != RangeState::Header {
        return Err(out_of_sequence("range_then", frame.state));
    }
    let header = match frame.names.take() {
        Some(names) => define_header(sess, names)?,
        None => assign_header(sess)?,
    };
    frame.header = Some(header);
    frame.state = RangeState::Body;
    Ok(())
}

/// Definition mode: pop the source, derive binding types, declare the
/// non-discarded names in the loop scope.
fn define_header(sess: &mut Session<'_>, names: Vec<String>) -> Result<RangeHeader, BuildError> {
    if sess.above_base() == 0 {
        return Err(ProtocolError::StackUnderflow { expected: 1, len: 0 }.into());
    }
    let source = sess.stack.pop()?;
    let (key_ty, value_ty) = derive_key_value(&source)?;

    if names.len() == 2 && value_ty.is_none() {
        return Err(TypeError::NoRangeValue {
            target: names[1].clone(),
        }
        .into());
    }
    for (name, ty) in names
        .iter()
        .zip([Some(key_ty), value_ty])
        .filter_map(|(name, ty)| ty.map(|ty| (name, ty)))
    {
        if name != "_" {
            sess.scope.declare(name, ty)?;
        }
    }

    let value = names.get(1).map(Expr::ident);
    let key = Some(Expr::ident(&names[0]));
    Ok(RangeHeader {
        key,
        value,
        define: true,
        source: source.node,
    })
}

/// Assignment mode: pop {source} | {key, source} | {key, value, source}
/// by stack depth above the loop's base, then check target types.
fn assign_header(sess: &mut Session<'_>) -> Result<RangeHeader, BuildError> {
    let count = sess.above_base();
    if !(1..=3).contains(&count) {
        return Err(ProtocolError::RangeTargetCount { count }.into());
    }
    let mut values = sess.stack.pop_n(count)?;
    let source = values
        .pop()
        .ok_or(ProtocolError::StackUnderflow { expected: 1, len: 0 })?;
    let mut targets = values.into_iter();
    let key = targets.next();
    let value = targets.next();

    let (key_ty, value_ty) = derive_key_value(&source)?;
    if let Some(key) = &key {
        check_assignable(&key_ty, &key.ty)?;
    }
    if let Some(value) = &value {
        let value_ty = value_ty.ok_or_else(|| TypeError::NoRangeValue {
            target: value.ty.to_string(),
        })?;
        check_assignable(&value_ty, &value.ty)?;
    }

    Ok(RangeHeader {
        key: key.map(|v| v.node),
        value: value.map(|v| v.node),
        define: false,
        source: source.node,
    })
}

pub(crate) fn on_end(sess: &mut Session<'_>, frame: RangeFrame) -> Result<(), BuildError> {
    if frame.state != RangeState::Body {
        return Err(out_of_sequence("end", frame.state));
    }
    let body = Block::new(sess.close_ctx()?);
    let header = frame.header.ok_or(ProtocolError::OutOfSequence {
        construct: "range statement",
        operation: "end",
        state: "Header",
    })?;
    sess.scope.pop_scope();
    sess.emit(Stmt::ForRange {
        key: header.key,
        value: header.value,
        define: header.define,
        source: header.source,
        body,
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

    fn string_int_map() -> Type {
        Type::map(Type::string(), Type::int())
    }

    #[test]
    fn map_iteration_defines_typed_bindings() {
        let env = env();
        let mut sess = Session::new(&env);
        sess.new_var(string_int_map(), &["m"]).unwrap();
        sess.for_range(&["k", "v"]).unwrap();
        sess.var_ref("m").unwrap().range_then().unwrap();
        // Bindings carry the derived types inside the body.
        assert_eq!(sess.scope.lookup("k"), Some(&Type::string()));
        assert_eq!(sess.scope.lookup("v"), Some(&Type::int()));
        sess.var_ref("k").unwrap().end_stmt().unwrap();
        sess.end().unwrap();
        let stmts = sess.finish().unwrap();
        assert_eq!(
            stmts_to_source(&stmts),
            "var m map[string]int\nfor k, v := range m {\n\tk\n}\n"
        );
        // The loop scope closed with the construct.
        assert!(sess.scope.lookup("k").is_none());
    }

    #[test]
    fn slice_iteration_key_is_integer() {
        let env = env();
        let mut sess = Session::new(&env);
        sess.new_var(Type::slice(Type::string()), &["xs"]).unwrap();
        sess.for_range(&["i", "s"]).unwrap();
        sess.var_ref("xs").unwrap().range_then().unwrap();
        assert_eq!(sess.scope.lookup("i"), Some(&Type::int()));
        assert_eq!(sess.scope.lookup("s"), Some(&Type::string()));
        sess.end().unwrap();
    }

    #[test]
    fn discarded_binding_is_not_declared() {
        let env = env();
        let mut sess = Session::new(&env);
        sess.new_var(Type::slice(Type::int()), &["xs"]).unwrap();
        sess.for_range(&["_", "x"]).unwrap();
        sess.var_ref("xs").unwrap().range_then().unwrap();
        assert!(sess.scope.lookup("_").is_none());
        assert_eq!(sess.scope.lookup("x"), Some(&Type::int()));
        sess.end().unwrap();
        let stmts = sess.finish().unwrap();
        assert_eq!(
            stmts_to_source(&stmts),
            "var xs []int\nfor _, x := range xs {}\n"
        );
    }

    #[test]
    fn channel_iteration_yields_single_binding() {
        let env = env();
        let mut sess = Session::new(&env);
        sess.new_var(Type::chan(Type::int()), &["ch"]).unwrap();
        sess.for_range(&["x"]).unwrap();
        sess.var_ref("ch").unwrap().range_then().unwrap();
        assert_eq!(sess.scope.lookup("x"), Some(&Type::int()));
        sess.end().unwrap();
        let stmts = sess.finish().unwrap();
        assert_eq!(
            stmts_to_source(&stmts),
            "var ch chan int\nfor x := range ch {}\n"
        );
    }

    #[test]
    fn channel_iteration_rejects_value_binding() {
        let env = env();
        let mut sess = Session::new(&env);
        sess.new_var(Type::chan(Type::int()), &["ch"]).unwrap();
        sess.for_range(&["x", "y"]).unwrap();
        sess.var_ref("ch").unwrap();
        let err = sess.range_then().unwrap_err();
        assert!(matches!(
            err,
            BuildError::Type(TypeError::NoRangeValue { .. })
        ));
    }

    #[test]
    fn non_iterable_source_is_a_type_error() {
        let env = env();
        let mut sess = Session::new(&env);
        sess.new_var(Type::int(), &["n"]).unwrap();
        sess.for_range(&["x"]).unwrap();
        sess.var_ref("n").unwrap();
        let err = sess.range_then().unwrap_err();
        assert!(matches!(
            err,
            BuildError::Type(TypeError::NotIterable { .. })
        ));
    }

    #[test]
    fn redeclared_binding_is_a_type_error() {
        let env = env();
        let mut sess = Session::new(&env);
        sess.new_var(Type::slice(Type::int()), &["xs"]).unwrap();
        sess.for_range(&["x", "x"]).unwrap();
        sess.var_ref("xs").unwrap();
        let err = sess.range_then().unwrap_err();
        assert!(matches!(
            err,
            BuildError::Type(TypeError::Redeclared { .. })
        ));
    }

    #[test]
    fn assignment_mode_with_key_and_value() {
        let env = env();
        let mut sess = Session::new(&env);
        sess.new_var(string_int_map(), &["m"]).unwrap();
        sess.new_var(Type::string(), &["k"]).unwrap();
        sess.new_var(Type::int(), &["v"]).unwrap();
        sess.for_range_assign();
        sess.var_ref("k")
            .unwrap()
            .var_ref("v")
            .unwrap()
            .var_ref("m")
            .unwrap()
            .range_then()
            .unwrap();
        sess.end().unwrap();
        let stmts = sess.finish().unwrap();
        assert_eq!(
            stmts_to_source(&stmts),
            "var m map[string]int\nvar k string\nvar v int\nfor k, v = range m {}\n"
        );
    }

    #[test]
    fn assignment_mode_source_only() {
        let env = env();
        let mut sess = Session::new(&env);
        sess.new_var(Type::slice(Type::int()), &["xs"]).unwrap();
        sess.for_range_assign();
        sess.var_ref("xs").unwrap().range_then().unwrap();
        sess.end().unwrap();
        let stmts = sess.finish().unwrap();
        assert_eq!(
            stmts_to_source(&stmts),
            "var xs []int\nfor range xs {}\n"
        );
    }

    #[test]
    fn assignment_mode_rejects_mismatched_key_type() {
        let env = env();
        let mut sess = Session::new(&env);
        sess.new_var(string_int_map(), &["m"]).unwrap();
        sess.new_var(Type::int(), &["k"]).unwrap();
        sess.for_range_assign();
        sess.var_ref("k").unwrap().var_ref("m").unwrap();
        let err = sess.range_then().unwrap_err();
        assert!(matches!(
            err,
            BuildError::Type(TypeError::NotAssignable { .. })
        ));
    }

    #[test]
    fn assignment_mode_value_target_for_channel_is_a_type_error() {
        let env = env();
        let mut sess = Session::new(&env);
        sess.new_var(Type::chan(Type::int()), &["ch"]).unwrap();
        sess.new_var(Type::int(), &["k", "v"]).unwrap();
        sess.for_range_assign();
        sess.var_ref("k")
            .unwrap()
            .var_ref("v")
            .unwrap()
            .var_ref("ch")
            .unwrap();
        let err = sess.range_then().unwrap_err();
        assert!(matches!(
            err,
            BuildError::Type(TypeError::NoRangeValue { .. })
        ));
    }

    #[test]
    fn assignment_mode_rejects_extra_values() {
        let env = env();
        let mut sess = Session::new(&env);
        sess.new_var(Type::slice(Type::int()), &["xs"]).unwrap();
        sess.for_range_assign();
        for _ in 0..4 {
            sess.var_ref("xs").unwrap();
        }
        let err = sess.range_then().unwrap_err();
        assert_eq!(
            err,
            BuildError::Protocol(ProtocolError::RangeTargetCount { count: 4 })
        );
    }

    #[test]
    fn too_many_binding_names_rejected_at_entry() {
        let env = env();
        let mut sess = Session::new(&env);
        let err = sess.for_range(&["a", "b", "c"]).unwrap_err();
        assert_eq!(
            err,
            BuildError::Protocol(ProtocolError::RangeNameCount { count: 3 })
        );
    }

    #[test]
    fn range_then_twice_is_out_of_sequence() {
        let env = env();
        let mut sess = Session::new(&env);
        sess.new_var(Type::slice(Type::int()), &["xs"]).unwrap();
        sess.for_range(&["x"]).unwrap();
        sess.var_ref("xs").unwrap().range_then().unwrap();
        let err = sess.range_then().unwrap_err();
        assert!(matches!(
            err,
            BuildError::Protocol(ProtocolError::OutOfSequence { .. })
        ));
    }
}
