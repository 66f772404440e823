//! Binary operator application.

use quill_core::{BinaryOp, Constant, Expr, Routine, Type, TypeError, TypeProps, UntypedKind};

use crate::env::Environment;
use crate::stack::Value;

use super::check::{assignable_with_default, check_boolean, check_comparable};
use super::join_untyped;

/// Apply a binary operator to two popped operands, producing the result
/// value.
///
/// Resolution order: constant folding when both operands carry constants,
/// the environment's operator table when the left operand's type overloads
/// the operator, then the built-in primitive forms.
pub fn apply_binary(
    env: &Environment,
    op: BinaryOp,
    lhs: Value,
    rhs: Value,
) -> Result<Value, TypeError> {
    // Constant folding. The result stays untyped until defaulted.
    if let (Some(ca), Some(cb)) = (lhs.constant.as_ref(), rhs.constant.as_ref())
        && let (Type::Untyped(ka), Type::Untyped(kb)) = (&lhs.ty, &rhs.ty)
    {
        let (ka, kb) = (*ka, *kb);
        let folded = Constant::binary_op(op, ca, cb)?;
        let kind = folded_kind(&folded, ka, kb);
        let node = match folded.to_expr() {
            Some(lit) => lit,
            None => Expr::binary(op, lhs.node, rhs.node),
        };
        return Ok(Value::untyped(node, kind, folded));
    }

    // Overloaded operator on the left operand's type.
    if let Some(routine) = env.registry.binary_operator(op, &lhs.ty) {
        let routine = routine.clone();
        let no_op = no_binary_op(op, &lhs.ty, &rhs.ty);
        let param = routine.sig.params.first().ok_or_else(|| no_op.clone())?;
        if !assignable_with_default(env, &rhs.ty, param) {
            return Err(TypeError::NotAssignable {
                from: rhs.ty.to_string(),
                to: param.to_string(),
            });
        }
        let result = routine.sig.result.clone().ok_or(no_op)?;
        let node = dispatch_node(&routine, lhs.node, Some(rhs.node));
        return Ok(Value::new(node, result));
    }

    builtin_binary(op, lhs, rhs)
}

/// The call node for an operator routine: a method call on the left
/// operand, or a package-level function taking both operands.
pub(crate) fn dispatch_node(routine: &Routine, lhs: Expr, rhs: Option<Expr>) -> Expr {
    let mut args = Vec::new();
    let callee = if routine.recv.is_some() {
        Expr::selector(lhs, routine.name.clone())
    } else {
        args.push(lhs);
        match &routine.pkg {
            Some(pkg) => Expr::selector(Expr::ident(pkg.clone()), routine.name.clone()),
            None => Expr::ident(routine.name.clone()),
        }
    };
    if let Some(rhs) = rhs {
        args.push(rhs);
    }
    Expr::call(callee, args)
}

fn no_binary_op(op: BinaryOp, left: &Type, right: &Type) -> TypeError {
    TypeError::NoBinaryOp {
        op: op.to_string(),
        left: left.to_string(),
        right: right.to_string(),
    }
}

/// Untyped kind of a folded result.
fn folded_kind(folded: &Constant, ka: UntypedKind, kb: UntypedKind) -> UntypedKind {
    match folded {
        Constant::Bool(_) => UntypedKind::Bool,
        Constant::Str(_) => UntypedKind::Str,
        // A non-integer rational can only default to a rational type, so
        // the prefer-int hint is dropped; float-kinded operands keep
        // their kind.
        Constant::Rat(_) => match join_untyped(ka, kb) {
            UntypedKind::Float => UntypedKind::Float,
            _ => UntypedKind::Rat { prefer_int: false },
        },
        Constant::Int(_) => join_untyped(ka, kb),
    }
}

/// Built-in node construction for primitive operand types.
fn builtin_binary(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, TypeError> {
    let lp = lhs.ty.props();
    let rp = rhs.ty.props();

    if op.is_logical() {
        check_boolean(&lhs)?;
        check_boolean(&rhs)?;
        let ty = result_type(&lhs.ty, &rhs.ty);
        return Ok(Value::new(Expr::binary(op, lhs.node, rhs.node), ty));
    }

    if op.is_comparison() {
        check_comparable(&lhs.ty, &rhs.ty)?;
        let ordering = matches!(
            op,
            BinaryOp::Lss | BinaryOp::Leq | BinaryOp::Gtr | BinaryOp::Geq
        );
        if ordering && !(lp.contains(TypeProps::ORDERED) && rp.contains(TypeProps::ORDERED)) {
            return Err(no_binary_op(op, &lhs.ty, &rhs.ty));
        }
        return Ok(Value::new(
            Expr::binary(op, lhs.node, rhs.node),
            Type::bool(),
        ));
    }

    // Arithmetic family: operand types must be mutually compatible.
    if !(lhs.ty.assignable_to(&rhs.ty) || rhs.ty.assignable_to(&lhs.ty)) {
        return Err(no_binary_op(op, &lhs.ty, &rhs.ty));
    }
    let ok = if op.is_integer_only() {
        lp.contains(TypeProps::INTEGER) && rp.contains(TypeProps::INTEGER)
    } else if op == BinaryOp::Add {
        (lp.contains(TypeProps::NUMERIC) && rp.contains(TypeProps::NUMERIC))
            || (lp.contains(TypeProps::TEXT) && rp.contains(TypeProps::TEXT))
    } else {
        lp.contains(TypeProps::NUMERIC) && rp.contains(TypeProps::NUMERIC)
    };
    if !ok {
        return Err(no_binary_op(op, &lhs.ty, &rhs.ty));
    }
    let ty = result_type(&lhs.ty, &rhs.ty);
    Ok(Value::new(Expr::binary(op, lhs.node, rhs.node), ty))
}

/// The concrete side wins; two untyped sides join kinds.
fn result_type(a: &Type, b: &Type) -> Type {
    match (a, b) {
        (Type::Untyped(ka), Type::Untyped(kb)) => Type::Untyped(join_untyped(*ka, *kb)),
        (Type::Untyped(_), concrete) => concrete.clone(),
        (concrete, _) => concrete.clone(),
    }
}
