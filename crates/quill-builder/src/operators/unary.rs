//! Unary operator application.

use quill_core::{Constant, Expr, Type, TypeError, TypeProps, UnaryOp, UntypedKind};

use crate::env::Environment;
use crate::stack::Value;

use super::binary::dispatch_node;

/// Apply a unary operator to one popped operand.
///
/// Same resolution order as the binary form: constant folding, the
/// operator table, then the built-in primitive forms.
pub fn apply_unary(env: &Environment, op: UnaryOp, v: Value) -> Result<Value, TypeError> {
    if let Some(c) = v.constant.as_ref()
        && let Type::Untyped(kind) = &v.ty
    {
        let kind = *kind;
        let folded = Constant::unary_op(op, c)?;
        let kind = match &folded {
            Constant::Bool(_) => UntypedKind::Bool,
            // Negation and complement keep the operand's kind, hint
            // included.
            _ => kind,
        };
        let node = match folded.to_expr() {
            Some(lit) => lit,
            None => Expr::unary(op, v.node),
        };
        return Ok(Value::untyped(node, kind, folded));
    }

    if let Some(routine) = env.registry.unary_operator(op, &v.ty) {
        let routine = routine.clone();
        let result = routine
            .sig
            .result
            .clone()
            .ok_or_else(|| no_unary_op(op, &v.ty))?;
        let node = dispatch_node(&routine, v.node, None);
        return Ok(Value::new(node, result));
    }

    let props = v.ty.props();
    let ok = match op {
        UnaryOp::Neg => props.contains(TypeProps::NUMERIC),
        UnaryOp::Not => props.contains(TypeProps::BOOLEAN),
        UnaryOp::BitNot => props.contains(TypeProps::INTEGER),
    };
    if !ok {
        return Err(no_unary_op(op, &v.ty));
    }
    let ty = v.ty;
    Ok(Value::new(Expr::unary(op, v.node), ty))
}

fn no_unary_op(op: UnaryOp, operand: &Type) -> TypeError {
    TypeError::NoUnaryOp {
        op: op.to_string(),
        operand: operand.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::{NamedType, Signature};
    use quill_registry::Registry;

    fn plain_env() -> Environment {
        Environment::new(Registry::new())
    }

    #[test]
    fn negation_of_primitive() {
        let env = plain_env();
        let result = apply_unary(&env, UnaryOp::Neg, Value::ident("a", Type::int())).unwrap();
        assert_eq!(result.node.to_string(), "-a");
        assert_eq!(result.ty, Type::int());
    }

    #[test]
    fn negation_folds_constants() {
        let env = plain_env();
        let result = apply_unary(&env, UnaryOp::Neg, Value::untyped_int(4)).unwrap();
        assert_eq!(result.constant, Some(Constant::int(-4)));
        assert_eq!(result.node.to_string(), "-4");
        assert_eq!(result.ty, Type::Untyped(UntypedKind::Int));
    }

    #[test]
    fn rational_negation_keeps_hint() {
        let env = plain_env();
        let v = Value::untyped_rat(Expr::ident("r"), 3, 1, true);
        let result = apply_unary(&env, UnaryOp::Neg, v).unwrap();
        assert_eq!(
            result.ty,
            Type::Untyped(UntypedKind::Rat { prefer_int: true })
        );
        assert_eq!(result.constant, Some(Constant::rat(-3, 1)));
    }

    #[test]
    fn overloaded_negation_dispatches_to_method() {
        let recv = Type::named(NamedType::new(Some("bignum"), "Rat"));
        let ty = Type::named(
            NamedType::new(Some("bignum"), "Rat")
                .with_method("Op_Neg", Signature::new(vec![], Some(recv.clone()))),
        );
        let mut registry = Registry::new();
        registry.install_operators(&ty).unwrap();
        let env = Environment::new(registry);

        let result = apply_unary(&env, UnaryOp::Neg, Value::ident("a", ty.clone())).unwrap();
        assert_eq!(result.node.to_string(), "a.Op_Neg()");
        assert_eq!(result.ty, ty);
    }

    #[test]
    fn not_requires_boolean() {
        let env = plain_env();
        assert!(apply_unary(&env, UnaryOp::Not, Value::ident("p", Type::bool())).is_ok());
        let err = apply_unary(&env, UnaryOp::Not, Value::ident("n", Type::int())).unwrap_err();
        assert!(matches!(err, TypeError::NoUnaryOp { .. }));
    }

    #[test]
    fn bitnot_requires_integer() {
        let env = plain_env();
        let err = apply_unary(
            &env,
            UnaryOp::BitNot,
            Value::ident("f", Type::Basic(quill_core::BasicType::Float64)),
        )
        .unwrap_err();
        assert!(matches!(err, TypeError::NoUnaryOp { .. }));
    }
}
