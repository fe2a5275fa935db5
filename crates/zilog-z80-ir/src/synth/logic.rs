//! Accumulator ALU group.
//!
//! `ADD/ADC/SUB/SBC/CP` hand the operand to a primitive that computes the
//! result and flags. `AND/XOR/OR` are computed inline and take their flags
//! from `SZP_TABLE`, with `H` forced on for `AND`.

use super::{displaced, general, pair_value, read_mem, szp, value};
use crate::error::SynthError;
use crate::flags::{F_HALFCARRY, SZP_TABLE};
use crate::ir::{AssignOp, Expr, Stmt, assign, assign_op, exec, index, num, reg};
use crate::operand::{AluOp, AluSrc, Pair, Reg};

fn operand(src: AluSrc, family: &'static str) -> Result<Expr, SynthError> {
    match src {
        AluSrc::Imm => Ok(value()),
        AluSrc::Reg(r) => general(r, family),
        AluSrc::Indirect(Pair::HL) => Ok(read_mem(pair_value(Pair::HL))),
        AluSrc::Indirect(_) => Err(SynthError::unsupported(family, src)),
        AluSrc::Indexed(index) => Ok(read_mem(displaced(index))),
    }
}

/// Flags after an inline logical op on `a`.
fn logic_flags(op: AluOp) -> Stmt {
    if op == AluOp::And {
        assign(reg(Reg::F), szp(Reg::A) | F_HALFCARRY)
    } else {
        assign(reg(Reg::F), szp(Reg::A))
    }
}

pub(super) fn alu(op: AluOp, src: AluSrc, family: &'static str) -> Result<Vec<Stmt>, SynthError> {
    let operand = operand(src, family)?;

    if let Some(primitive) = op.primitive() {
        return Ok(vec![exec(primitive, vec![operand])]);
    }

    // Only the three logical ops lack a primitive.
    let compound = match op {
        AluOp::And => AssignOp::And,
        AluOp::Xor => AssignOp::Xor,
        _ => AssignOp::Or,
    };

    // Operating on A itself leaves A unchanged, except XOR A which clears it.
    let stmts = match (op, src) {
        (AluOp::Xor, AluSrc::Reg(Reg::A)) => vec![
            assign(reg(Reg::A), 0),
            assign(reg(Reg::F), index(SZP_TABLE, num(0))),
        ],
        (AluOp::And | AluOp::Or, AluSrc::Reg(Reg::A)) => vec![logic_flags(op)],
        _ => vec![assign_op(compound, reg(Reg::A), operand), logic_flags(op)],
    };
    Ok(stmts)
}
