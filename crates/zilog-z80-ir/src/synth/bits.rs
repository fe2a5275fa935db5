//! `BIT`, `RES` and `SET`.

use super::{location, pair_value, read_mem, set_location, write_mem};
use crate::error::SynthError;
use crate::ir::{AssignOp, Stmt, assign_op, bit, exec, reg};
use crate::operand::{BitOp, BitTarget, Pair};

pub(super) fn bit_op(op: BitOp, n: u8, target: BitTarget) -> Result<Vec<Stmt>, SynthError> {
    if n > 7 {
        return Err(SynthError::BitOutOfRange(n));
    }
    let mask = bit(n);

    if let BitTarget::Reg(r) = target {
        let stmt = match op {
            BitOp::Test => exec("bit", vec![reg(r) & mask]),
            BitOp::Reset => assign_op(AssignOp::And, reg(r), !mask),
            BitOp::Set => assign_op(AssignOp::Or, reg(r), mask),
        };
        return Ok(vec![stmt]);
    }

    // Memory operand: (HL), or the masked (IX+d) location.
    let (mut stmts, addr) = match target {
        BitTarget::Indexed(index) => (vec![set_location(index)], location()),
        _ => (Vec::new(), pair_value(Pair::HL)),
    };
    let stmt = match op {
        BitOp::Test => exec("bit", vec![read_mem(addr) & mask]),
        BitOp::Reset => write_mem(addr.clone(), read_mem(addr) & !mask),
        BitOp::Set => write_mem(addr.clone(), read_mem(addr) | mask),
    };
    stmts.push(stmt);
    Ok(stmts)
}
