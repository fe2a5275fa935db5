//! Stack and register exchange.
//!
//! Exchanges are unrolled into three-statement swaps through `temp`, one per
//! register, with the shadow set addressed by name (`a2`, `f2`, ...).

use super::{halves, pair_value, read_mem, read_mem_word, set16, sp, temp, write_mem};
use crate::error::SynthError;
use crate::ir::{AssignOp, Stmt, assign, assign_op, exec, ident, reg};
use crate::operand::{Pair, Reg};

fn stack_pair(pair: Pair, family: &'static str) -> Result<(Reg, Reg), SynthError> {
    match pair {
        Pair::SP => Err(SynthError::unsupported(family, pair)),
        _ => halves(pair, family),
    }
}

pub(super) fn push(pair: Pair, family: &'static str) -> Result<Vec<Stmt>, SynthError> {
    let (hi, lo) = stack_pair(pair, family)?;
    Ok(vec![exec("push2", vec![reg(hi), reg(lo)])])
}

pub(super) fn pop(pair: Pair, family: &'static str) -> Result<Vec<Stmt>, SynthError> {
    let (hi, lo) = stack_pair(pair, family)?;
    let mut stmts = set16(hi, lo, read_mem_word(sp()));
    stmts.push(assign_op(AssignOp::Add, sp(), 2));
    Ok(stmts)
}

/// `temp = r; r = r2; r2 = temp;`
fn swap_with_shadow(r: Reg) -> Vec<Stmt> {
    let Some(shadow) = r.shadow() else {
        return Vec::new();
    };
    vec![
        assign(temp(), reg(r)),
        assign(reg(r), ident(shadow)),
        assign(ident(shadow), temp()),
    ]
}

pub(super) fn ex_af() -> Vec<Stmt> {
    [Reg::A, Reg::F].into_iter().flat_map(swap_with_shadow).collect()
}

pub(super) fn exx() -> Vec<Stmt> {
    [Reg::B, Reg::C, Reg::D, Reg::E, Reg::H, Reg::L]
        .into_iter()
        .flat_map(swap_with_shadow)
        .collect()
}

pub(super) fn ex_de_hl() -> Vec<Stmt> {
    [(Reg::D, Reg::H), (Reg::E, Reg::L)]
        .into_iter()
        .flat_map(|(x, y)| {
            [
                assign(temp(), reg(x)),
                assign(reg(x), reg(y)),
                assign(reg(y), temp()),
            ]
        })
        .collect()
}

/// `EX (SP),HL` swaps byte by byte. `EX (SP),IX` and `EX (SP),IY` load the
/// index pair as a word and store the old value back low byte first.
pub(super) fn ex_sp(pair: Pair, family: &'static str) -> Result<Vec<Stmt>, SynthError> {
    match pair {
        Pair::HL => Ok(vec![
            assign(temp(), reg(Reg::H)),
            assign(reg(Reg::H), read_mem(sp() + 1)),
            write_mem(sp() + 1, temp()),
            assign(temp(), reg(Reg::L)),
            assign(reg(Reg::L), read_mem(sp())),
            write_mem(sp(), temp()),
        ]),
        Pair::IX | Pair::IY => {
            let (hi, lo) = halves(pair, family)?;
            let mut stmts = vec![assign(temp(), pair_value(pair))];
            stmts.extend(set16(hi, lo, read_mem_word(sp())));
            stmts.push(write_mem(sp(), temp() & 0xFF));
            stmts.push(write_mem(sp() + 1, temp() >> 8));
            Ok(stmts)
        }
        _ => Err(SynthError::unsupported(family, pair)),
    }
}
