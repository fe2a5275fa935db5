//! Flag operations, interrupt control and `HALT`.

use super::{paged, pc, tstates};
use crate::config::SynthConfig;
use crate::error::SynthError;
use crate::flags::{F_CARRY, F_HALFCARRY, F_NEGATIVE};
use crate::ir::{AssignOp, Expr, Hole, Operand, Stmt, assign, assign_op, exec, ident, num, reg, ret};
use crate::operand::Reg;

/// Instructions whose whole effect lives in one environment primitive.
pub(super) fn delegate(primitive: &'static str) -> Vec<Stmt> {
    vec![exec(primitive, Vec::new())]
}

pub(super) fn scf() -> Vec<Stmt> {
    vec![
        assign_op(AssignOp::Or, reg(Reg::F), F_CARRY),
        assign_op(AssignOp::And, reg(Reg::F), !Expr::from(F_NEGATIVE)),
        assign_op(AssignOp::And, reg(Reg::F), !Expr::from(F_HALFCARRY)),
    ]
}

/// `DI`/`EI` both flag the instruction so the interrupt check skips one step.
fn interrupts(enabled: bool) -> Vec<Stmt> {
    vec![
        assign(ident("iff1"), enabled),
        assign(ident("iff2"), enabled),
        assign(ident("EI_inst"), true),
    ]
}

pub(super) fn di() -> Vec<Stmt> {
    interrupts(false)
}

pub(super) fn ei() -> Vec<Stmt> {
    interrupts(true)
}

pub(super) fn im(mode: u8, family: &'static str) -> Result<Vec<Stmt>, SynthError> {
    if mode > 2 {
        return Err(SynthError::unsupported(family, mode));
    }
    Ok(vec![assign(ident("im"), num(i32::from(mode)))])
}

/// Parks `pc` on the `HALT` itself so the dispatch loop keeps re-running it
/// until an interrupt. With the speed-up policy the rest of the frame's
/// T-states are dropped as well.
pub(super) fn halt(config: &SynthConfig) -> Vec<Stmt> {
    let mut stmts = Vec::with_capacity(4);
    if config.halt_speedup {
        stmts.push(assign(tstates(), 0));
    }
    let this_insn = Hole::new(Operand::NextAddress).offset(-1);
    stmts.push(assign(ident("halt"), true));
    stmts.push(assign(pc(), paged(this_insn)));
    stmts.push(ret());
    stmts
}
