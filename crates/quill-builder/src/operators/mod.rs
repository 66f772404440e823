//! Operator application and type checking.
//!
//! This module decides how each operator the generator applies is
//! expressed in the emitted tree:
//! - both operands constant: fold, result stays untyped until defaulted
//! - operand type in the builtin operator table: method or function call
//!   (`a.Op_Add(b)`)
//! - primitive operand types: a plain operator node (`a + b`)

mod binary;
mod check;
mod unary;

pub use binary::apply_binary;
pub use check::{
    assignable_with_default, check_assignable, check_boolean, check_comparable, default_value,
};
pub use unary::apply_unary;

use quill_core::types::UntypedKind;

/// Join the untyped kinds of two constant operands for the folded result.
/// Rational-ness dominates float-ness dominates integer-ness; the
/// prefer-int hint survives only when every rational operand carries it.
pub(crate) fn join_untyped(a: UntypedKind, b: UntypedKind) -> UntypedKind {
    use UntypedKind::*;
    match (a, b) {
        (Rat { prefer_int: x }, Rat { prefer_int: y }) => Rat {
            prefer_int: x && y,
        },
        (Rat { prefer_int }, _) | (_, Rat { prefer_int }) => Rat { prefer_int },
        (Float, _) | (_, Float) => Float,
        _ => a,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use UntypedKind::*;

    #[test]
    fn rational_dominates() {
        assert_eq!(
            join_untyped(Rat { prefer_int: true }, Int),
            Rat { prefer_int: true }
        );
        assert_eq!(
            join_untyped(Float, Rat { prefer_int: false }),
            Rat { prefer_int: false }
        );
    }

    #[test]
    fn prefer_int_requires_both_sides() {
        assert_eq!(
            join_untyped(Rat { prefer_int: true }, Rat { prefer_int: true }),
            Rat { prefer_int: true }
        );
        assert_eq!(
            join_untyped(Rat { prefer_int: true }, Rat { prefer_int: false }),
            Rat { prefer_int: false }
        );
    }

    #[test]
    fn float_dominates_int() {
        assert_eq!(join_untyped(Float, Int), Float);
        assert_eq!(join_untyped(Int, Int), Int);
    }
}
