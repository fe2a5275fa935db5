//! Constant folding.
//!
//! Only the shapes used to split a known 16-bit word into bytes are folded:
//! `lit >> lit` and `lit & lit`. Everything else is returned as is, and the
//! fold never looks below the node it is given.

use crate::ir::{BinaryOp, Expr, Literal};

/// Reduce `expr` to a literal if it is a foldable shift or mask of two
/// numeric literals; otherwise return it unchanged.
#[must_use]
pub fn fold(expr: Expr) -> Expr {
    let (op, lhs, rhs) = match expr {
        Expr::Binary(op @ (BinaryOp::Shr | BinaryOp::And), lhs, rhs) => (op, lhs, rhs),
        other => return other,
    };

    let (Some(value), Some(right)) = (lhs.as_num(), rhs.as_num()) else {
        return Expr::Binary(op, lhs, rhs);
    };

    // Shift counts are masked to five bits, as the executing engine does.
    let result = match op {
        BinaryOp::Shr => value.wrapping_shr(right as u32),
        _ => value & right,
    };

    let mut folded = Literal::num(result);
    if matches!(lhs.as_ref(), Expr::Literal(lit) if lit.raw.is_some()) {
        folded.annotate();
    }
    Expr::Literal(folded)
}
