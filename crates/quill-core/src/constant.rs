//! Compile-time constant values and folding.
//!
//! Integer constants are arbitrary-precision; rational constants are exact.
//! Folding an operation outside its domain (division by zero, a shift by a
//! negative count) is a [`TypeError`], since it means the generated program
//! would be invalid.

use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive, Zero};

use crate::ast::Expr;
use crate::error::TypeError;
use crate::ops::{BinaryOp, UnaryOp};
use crate::types::UntypedKind;

/// A compile-time constant carried by an untyped value on the stack.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Bool(bool),
    Str(String),
    Int(BigInt),
    Rat(BigRational),
}

impl Constant {
    /// An integer constant.
    pub fn int(v: i64) -> Self {
        Constant::Int(BigInt::from(v))
    }

    /// An exact rational constant `num/den`.
    pub fn rat(num: i64, den: i64) -> Self {
        Constant::Rat(BigRational::new(BigInt::from(num), BigInt::from(den)))
    }

    /// The untyped kind this constant naturally carries.
    pub fn kind(&self) -> UntypedKind {
        match self {
            Constant::Bool(_) => UntypedKind::Bool,
            Constant::Str(_) => UntypedKind::Str,
            Constant::Int(_) => UntypedKind::Int,
            Constant::Rat(_) => UntypedKind::Rat { prefer_int: false },
        }
    }

    /// Render the constant back to a literal expression, when the target
    /// language has a literal form for it. Rationals have none; their
    /// structural node is kept instead.
    pub fn to_expr(&self) -> Option<Expr> {
        match self {
            Constant::Bool(b) => Some(Expr::ident(if *b { "true" } else { "false" })),
            Constant::Str(s) => Some(Expr::str_lit(s.clone())),
            Constant::Int(i) => Some(Expr::int_lit(i)),
            Constant::Rat(_) => None,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Constant::Bool(_) => "bool constant",
            Constant::Str(_) => "string constant",
            Constant::Int(_) => "int constant",
            Constant::Rat(_) => "rational constant",
        }
    }
}

impl Display for Constant {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Bool(b) => write!(f, "{}", b),
            Constant::Str(s) => write!(f, "{:?}", s),
            Constant::Int(i) => write!(f, "{}", i),
            Constant::Rat(r) => write!(f, "{}/{}", r.numer(), r.denom()),
        }
    }
}

fn invalid(op: impl Display, operand: &Constant) -> TypeError {
    TypeError::InvalidConstantOp {
        op: op.to_string(),
        operand: operand.type_name().to_string(),
    }
}

/// Promote to rational for mixed numeric arithmetic.
fn as_rat(c: &Constant) -> Option<BigRational> {
    match c {
        Constant::Int(i) => Some(BigRational::from_integer(i.clone())),
        Constant::Rat(r) => Some(r.clone()),
        _ => None,
    }
}

fn rat_pair(a: &Constant, b: &Constant) -> Option<(BigRational, BigRational)> {
    Some((as_rat(a)?, as_rat(b)?))
}

/// A rational result collapses back to an integer when exact.
fn normalize_rat(r: BigRational) -> Constant {
    if r.is_integer() {
        Constant::Int(r.to_integer())
    } else {
        Constant::Rat(r)
    }
}

fn numeric_cmp(a: &Constant, b: &Constant) -> Option<Ordering> {
    match (a, b) {
        (Constant::Int(x), Constant::Int(y)) => Some(x.cmp(y)),
        _ => {
            let x = as_rat(a)?;
            let y = as_rat(b)?;
            Some(x.cmp(&y))
        }
    }
}

fn shift_count(b: &Constant, op: BinaryOp) -> Result<usize, TypeError> {
    match b {
        Constant::Int(i) if !i.is_negative() => {
            i.to_usize().ok_or_else(|| invalid(op, b))
        }
        _ => Err(invalid(op, b)),
    }
}

impl Constant {
    /// Fold a binary operation over two constants.
    pub fn binary_op(op: BinaryOp, a: &Constant, b: &Constant) -> Result<Constant, TypeError> {
        use BinaryOp::*;
        use Constant::*;

        match op {
            // Equality applies to every kind; ordering to numerics and
            // strings.
            Eql | Neq => {
                let eq = match (a, b) {
                    (Bool(x), Bool(y)) => x == y,
                    (Str(x), Str(y)) => x == y,
                    (Int(_) | Rat(_), Int(_) | Rat(_)) => {
                        numeric_cmp(a, b) == Some(Ordering::Equal)
                    }
                    _ => return Err(invalid(op, a)),
                };
                Ok(Bool(if op == Eql { eq } else { !eq }))
            }
            Lss | Leq | Gtr | Geq => {
                let ord = match (a, b) {
                    (Str(x), Str(y)) => x.cmp(y),
                    (Int(_) | Rat(_), Int(_) | Rat(_)) => {
                        numeric_cmp(a, b).ok_or_else(|| invalid(op, a))?
                    }
                    _ => return Err(invalid(op, a)),
                };
                let res = match op {
                    Lss => ord == Ordering::Less,
                    Leq => ord != Ordering::Greater,
                    Gtr => ord == Ordering::Greater,
                    Geq => ord != Ordering::Less,
                    _ => unreachable!(),
                };
                Ok(Bool(res))
            }

            LAnd | LOr => match (a, b) {
                (Bool(x), Bool(y)) => Ok(Bool(if op == LAnd { *x && *y } else { *x || *y })),
                _ => Err(invalid(op, a)),
            },

            Add => match (a, b) {
                (Str(x), Str(y)) => Ok(Str(format!("{}{}", x, y))),
                (Int(x), Int(y)) => Ok(Int(x + y)),
                _ => {
                    let (x, y) = rat_pair(a, b).ok_or_else(|| invalid(op, a))?;
                    Ok(normalize_rat(x + y))
                }
            },
            Sub | Mul => match (a, b) {
                (Int(x), Int(y)) => Ok(Int(if op == Sub { x - y } else { x * y })),
                _ => {
                    let (x, y) = rat_pair(a, b).ok_or_else(|| invalid(op, a))?;
                    Ok(normalize_rat(if op == Sub { x - y } else { x * y }))
                }
            },
            // Quotient is exact: integer operands fold to a rational
            // unless the division is even.
            Quo => {
                let (x, y) = match (as_rat(a), as_rat(b)) {
                    (Some(x), Some(y)) => (x, y),
                    _ => return Err(invalid(op, a)),
                };
                if y.is_zero() {
                    return Err(TypeError::DivisionByZero);
                }
                Ok(normalize_rat(x / y))
            }
            Rem => match (a, b) {
                (Int(x), Int(y)) => {
                    if y.is_zero() {
                        Err(TypeError::DivisionByZero)
                    } else {
                        Ok(Int(x % y))
                    }
                }
                _ => Err(invalid(op, a)),
            },

            And | Or | Xor => match (a, b) {
                (Int(x), Int(y)) => Ok(Int(match op {
                    And => x & y,
                    Or => x | y,
                    _ => x ^ y,
                })),
                _ => Err(invalid(op, a)),
            },
            Shl => match a {
                Int(x) => Ok(Int(x << shift_count(b, op)?)),
                _ => Err(invalid(op, a)),
            },
            Shr => match a {
                Int(x) => Ok(Int(x >> shift_count(b, op)?)),
                _ => Err(invalid(op, a)),
            },
        }
    }

    /// Fold a unary operation over a constant.
    pub fn unary_op(op: UnaryOp, v: &Constant) -> Result<Constant, TypeError> {
        match (op, v) {
            (UnaryOp::Neg, Constant::Int(i)) => Ok(Constant::Int(-i)),
            (UnaryOp::Neg, Constant::Rat(r)) => Ok(Constant::Rat(-r)),
            (UnaryOp::Not, Constant::Bool(b)) => Ok(Constant::Bool(!b)),
            (UnaryOp::BitNot, Constant::Int(i)) => Ok(Constant::Int(!i)),
            _ => Err(invalid(op, v)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_arithmetic() {
        let a = Constant::int(7);
        let b = Constant::int(3);
        assert_eq!(
            Constant::binary_op(BinaryOp::Add, &a, &b).unwrap(),
            Constant::int(10)
        );
        assert_eq!(
            Constant::binary_op(BinaryOp::Mul, &a, &b).unwrap(),
            Constant::int(21)
        );
        assert_eq!(
            Constant::binary_op(BinaryOp::Rem, &a, &b).unwrap(),
            Constant::int(1)
        );
    }

    #[test]
    fn quotient_of_ints_is_exact() {
        let a = Constant::int(1);
        let b = Constant::int(2);
        let q = Constant::binary_op(BinaryOp::Quo, &a, &b).unwrap();
        assert_eq!(q, Constant::rat(1, 2));

        // Even division collapses back to an integer.
        let q = Constant::binary_op(BinaryOp::Quo, &Constant::int(6), &Constant::int(3)).unwrap();
        assert_eq!(q, Constant::int(2));
    }

    #[test]
    fn rational_arithmetic() {
        let a = Constant::rat(1, 2);
        let b = Constant::rat(1, 3);
        assert_eq!(
            Constant::binary_op(BinaryOp::Add, &a, &b).unwrap(),
            Constant::rat(5, 6)
        );
        assert_eq!(
            Constant::binary_op(BinaryOp::Sub, &a, &b).unwrap(),
            Constant::rat(1, 6)
        );
        // 1/2 + 1/2 = 1, an integer again.
        assert_eq!(
            Constant::binary_op(BinaryOp::Add, &a, &a).unwrap(),
            Constant::int(1)
        );
    }

    #[test]
    fn division_by_zero() {
        let err =
            Constant::binary_op(BinaryOp::Quo, &Constant::int(1), &Constant::int(0)).unwrap_err();
        assert_eq!(err, TypeError::DivisionByZero);

        let err =
            Constant::binary_op(BinaryOp::Rem, &Constant::int(1), &Constant::int(0)).unwrap_err();
        assert_eq!(err, TypeError::DivisionByZero);
    }

    #[test]
    fn comparisons_cross_representation() {
        // 1/2 < 1
        let half = Constant::rat(1, 2);
        let one = Constant::int(1);
        assert_eq!(
            Constant::binary_op(BinaryOp::Lss, &half, &one).unwrap(),
            Constant::Bool(true)
        );
        // 2/1 == 2 after promotion
        let two = Constant::rat(2, 1);
        assert_eq!(
            Constant::binary_op(BinaryOp::Eql, &two, &Constant::int(2)).unwrap(),
            Constant::Bool(true)
        );
    }

    #[test]
    fn string_concat_and_compare() {
        let a = Constant::Str("foo".into());
        let b = Constant::Str("bar".into());
        assert_eq!(
            Constant::binary_op(BinaryOp::Add, &a, &b).unwrap(),
            Constant::Str("foobar".into())
        );
        assert_eq!(
            Constant::binary_op(BinaryOp::Lss, &b, &a).unwrap(),
            Constant::Bool(true)
        );
    }

    #[test]
    fn shifts_and_bitwise() {
        let a = Constant::int(5);
        let b = Constant::int(3);
        assert_eq!(
            Constant::binary_op(BinaryOp::Shl, &a, &b).unwrap(),
            Constant::int(40)
        );
        assert_eq!(
            Constant::binary_op(BinaryOp::And, &a, &b).unwrap(),
            Constant::int(1)
        );

        let err =
            Constant::binary_op(BinaryOp::Shl, &a, &Constant::int(-1)).unwrap_err();
        assert!(matches!(err, TypeError::InvalidConstantOp { .. }));
    }

    #[test]
    fn unary_folding() {
        assert_eq!(
            Constant::unary_op(UnaryOp::Neg, &Constant::int(4)).unwrap(),
            Constant::int(-4)
        );
        assert_eq!(
            Constant::unary_op(UnaryOp::Neg, &Constant::rat(1, 2)).unwrap(),
            Constant::rat(-1, 2)
        );
        assert_eq!(
            Constant::unary_op(UnaryOp::Not, &Constant::Bool(true)).unwrap(),
            Constant::Bool(false)
        );
        assert!(Constant::unary_op(UnaryOp::Not, &Constant::int(1)).is_err());
    }

    #[test]
    fn literal_rendering() {
        assert_eq!(Constant::int(42).to_expr(), Some(Expr::int_lit(42)));
        assert_eq!(
            Constant::Bool(true).to_expr(),
            Some(Expr::ident("true"))
        );
        assert_eq!(Constant::rat(1, 2).to_expr(), None);
    }

    #[test]
    fn mixed_operand_kinds_rejected() {
        let err = Constant::binary_op(BinaryOp::Add, &Constant::Bool(true), &Constant::int(1))
            .unwrap_err();
        assert!(matches!(err, TypeError::InvalidConstantOp { .. }));
    }
}
