//! Operand validation and untyped-constant defaulting.

use quill_core::{Type, TypeError, TypeProps};

use crate::env::Environment;
use crate::stack::Value;

/// The value must be usable where a boolean is required.
pub fn check_boolean(v: &Value) -> Result<(), TypeError> {
    if v.ty.props().contains(TypeProps::BOOLEAN) {
        Ok(())
    } else {
        Err(TypeError::NotBoolean {
            found: v.ty.to_string(),
        })
    }
}

/// `from` must be assignable to `to` under the target language's rules.
pub fn check_assignable(from: &Type, to: &Type) -> Result<(), TypeError> {
    if from.assignable_to(to) {
        Ok(())
    } else {
        Err(TypeError::NotAssignable {
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}

/// Assignability that also accepts an untyped constant whose
/// environment-default type is exactly the destination (how a rational
/// constant reaches a library bignum type).
pub fn assignable_with_default(env: &Environment, from: &Type, to: &Type) -> bool {
    if from.assignable_to(to) {
        return true;
    }
    match from {
        Type::Untyped(kind) => env.default_type(kind).as_ref() == Some(to),
        _ => false,
    }
}

/// The two types must support equality comparison.
pub fn check_comparable(a: &Type, b: &Type) -> Result<(), TypeError> {
    if a.comparable_with(b) {
        Ok(())
    } else {
        Err(TypeError::NotComparable {
            left: a.to_string(),
            right: b.to_string(),
        })
    }
}

/// Convert an untyped constant to its default concrete type under the
/// environment's policy. A no-op for concretely typed values, so applying
/// it twice returns the same type.
///
/// The constant is cleared; when it has a literal form, the node is
/// re-rendered from it so folded results print as their folded value.
pub fn default_value(env: &Environment, v: Value) -> Result<Value, TypeError> {
    let kind = match &v.ty {
        Type::Untyped(kind) => *kind,
        _ => return Ok(v),
    };
    let ty = env
        .default_type(&kind)
        .ok_or_else(|| TypeError::NoDefaultType {
            kind: kind.name().to_string(),
        })?;
    let node = match v.constant.as_ref().and_then(|c| c.to_expr()) {
        Some(lit) => lit,
        None => v.node,
    };
    Ok(Value::new(node, ty))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::{BasicType, Constant, Expr, NamedType, UntypedKind};
    use quill_registry::Registry;

    fn env() -> Environment {
        Environment::new(Registry::new())
    }

    #[test]
    fn boolean_check_accepts_untyped_and_underlying() {
        assert!(check_boolean(&Value::untyped_bool(true)).is_ok());
        assert!(check_boolean(&Value::ident("ok", Type::bool())).is_ok());

        let flag = Type::named(NamedType::new(None, "Flag").with_underlying(BasicType::Bool));
        assert!(check_boolean(&Value::ident("f", flag)).is_ok());

        let err = check_boolean(&Value::ident("n", Type::int())).unwrap_err();
        assert_eq!(
            err,
            TypeError::NotBoolean {
                found: "int".to_string()
            }
        );
    }

    #[test]
    fn assignability_check() {
        assert!(check_assignable(&Type::int(), &Type::int()).is_ok());
        assert!(check_assignable(&Type::Untyped(UntypedKind::Int), &Type::int()).is_ok());
        assert!(check_assignable(&Type::int(), &Type::bool()).is_err());
    }

    #[test]
    fn comparability_check() {
        assert!(check_comparable(&Type::Untyped(UntypedKind::Int), &Type::int()).is_ok());
        assert!(check_comparable(&Type::int(), &Type::Untyped(UntypedKind::Int)).is_ok());
        assert!(check_comparable(&Type::int(), &Type::string()).is_err());
    }

    #[test]
    fn defaulting_converts_and_clears_constant() {
        let v = Value::untyped_int(3);
        let defaulted = default_value(&env(), v).unwrap();
        assert_eq!(defaulted.ty, Type::int());
        assert!(defaulted.constant.is_none());
        assert_eq!(defaulted.node, Expr::int_lit(3));
    }

    #[test]
    fn defaulting_is_idempotent() {
        let v = Value::untyped_int(3);
        let once = default_value(&env(), v).unwrap();
        let twice = default_value(&env(), once.clone()).unwrap();
        assert_eq!(once.ty, twice.ty);
        assert_eq!(once, twice);
    }

    #[test]
    fn defaulting_rerenders_folded_node() {
        // A folded constant whose node is still structural prints as the
        // folded literal once defaulted.
        let v = Value::untyped(
            Expr::binary(quill_core::BinaryOp::Add, Expr::int_lit(1), Expr::int_lit(2)),
            UntypedKind::Int,
            Constant::int(3),
        );
        let defaulted = default_value(&env(), v).unwrap();
        assert_eq!(defaulted.node, Expr::int_lit(3));
    }

    #[test]
    fn missing_default_is_a_type_error() {
        let v = Value::untyped_rat(Expr::ident("r"), 1, 2, false);
        let err = default_value(&env(), v).unwrap_err();
        assert!(matches!(err, TypeError::NoDefaultType { .. }));
    }
}
