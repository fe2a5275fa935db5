//! 8- and 16-bit loads.

use super::{
    displaced, general, halves, pair_value, read_mem, read_mem_word, set16, sp, value, write_mem,
};
use crate::config::SynthConfig;
use crate::error::SynthError;
use crate::flags::{F_CARRY, F_PARITY, SZ_TABLE};
use crate::ir::{Expr, Hole, Operand, Stmt, assign, call, conditional, hole, ident, index, num, reg};
use crate::operand::{Address, Index, Pair, Reg, SpSrc, Src8, Src16, Store};

/// `value + 1`, for the high byte of a direct word store.
fn value_hi() -> Expr {
    hole(Hole::new(Operand::Value).offset(1))
}

/// Memory address held in a register pair. `(HL)` pairs with any register;
/// `(BC)` and `(DE)` only with the accumulator.
fn indirect(pair: Pair, r: Reg, family: &'static str) -> Result<Expr, SynthError> {
    match (pair, r) {
        (Pair::HL, _) | (Pair::BC | Pair::DE, Reg::A) => Ok(pair_value(pair)),
        _ => Err(SynthError::unsupported(family, (pair, r))),
    }
}

/// `f = (f & F_CARRY) | SZ_TABLE[r] | (iff2 ? F_PARITY : 0);`
fn special_flags(r: Reg) -> Stmt {
    assign(
        reg(Reg::F),
        reg(Reg::F) & F_CARRY | index(SZ_TABLE, reg(r)) | conditional(ident("iff2"), F_PARITY, 0),
    )
}

pub(super) fn ld8(
    dst: Reg,
    src: Src8,
    config: &SynthConfig,
    family: &'static str,
) -> Result<Vec<Stmt>, SynthError> {
    let refused = || SynthError::unsupported(family, (dst, src));
    let stmts = match src {
        Src8::Reg(Reg::I) if dst == Reg::A => {
            vec![assign(reg(dst), reg(Reg::I)), special_flags(dst)]
        }
        Src8::Reg(Reg::R) if dst == Reg::A => {
            let refresh = if config.refresh_emulation {
                reg(Reg::R)
            } else {
                call("rndInt", vec![num(255)])
            };
            vec![assign(reg(dst), refresh), special_flags(dst)]
        }
        Src8::Reg(Reg::A) if matches!(dst, Reg::I | Reg::R) => {
            vec![assign(reg(dst), reg(Reg::A))]
        }
        Src8::Imm => vec![assign(general(dst, family).map_err(|_| refused())?, value())],
        Src8::Reg(r) => match (general(dst, family), general(r, family)) {
            (Ok(to), Ok(from)) => vec![assign(to, from)],
            _ => return Err(refused()),
        },
        Src8::Direct if dst == Reg::A => vec![assign(reg(dst), read_mem(value()))],
        Src8::Direct => return Err(refused()),
        Src8::Indirect(pair) => {
            let target = general(dst, family).map_err(|_| refused())?;
            vec![assign(target, read_mem(indirect(pair, dst, family)?))]
        }
    };
    Ok(stmts)
}

pub(super) fn ld8_indexed(dst: Reg, index: Index) -> Vec<Stmt> {
    vec![assign(reg(dst), read_mem(displaced(index)))]
}

pub(super) fn ld16(dst: Pair, src: Src16, family: &'static str) -> Result<Vec<Stmt>, SynthError> {
    if dst == Pair::AF {
        return Err(SynthError::unsupported(family, (dst, src)));
    }
    let (hi, lo) = halves(dst, family)?;
    match src {
        Src16::Imm => Ok(set16(hi, lo, value())),
        Src16::Direct => Ok(set16(hi, lo, read_mem_word(value()))),
        Src16::Pair(_) | Src16::Indirect(_) => Err(SynthError::unsupported(family, (dst, src))),
    }
}

pub(super) fn ld_write_mem(
    addr: Address,
    src: Store,
    family: &'static str,
) -> Result<Vec<Stmt>, SynthError> {
    match (addr, src) {
        (Address::Indirect(Pair::HL), Store::Imm) => {
            Ok(vec![write_mem(pair_value(Pair::HL), value())])
        }
        (Address::Indirect(pair), Store::Reg(r)) => {
            let byte = general(r, family)?;
            Ok(vec![write_mem(indirect(pair, r, family)?, byte)])
        }
        (Address::Direct, Store::Reg(Reg::A)) => Ok(vec![write_mem(value(), reg(Reg::A))]),
        (Address::Direct, Store::Pair(pair)) if pair != Pair::AF => {
            let (hi, lo) = halves(pair, family)?;
            Ok(vec![write_mem(value(), reg(lo)), write_mem(value_hi(), reg(hi))])
        }
        _ => Err(SynthError::unsupported(family, (addr, src))),
    }
}

pub(super) fn ld_indexed(index: Index, src: Option<Reg>) -> Vec<Stmt> {
    let base = pair_value(index.pair());
    match src {
        // Displacement in the low byte, immediate in the high byte.
        None => vec![write_mem(base + (value() & 0xFF), value() >> 8)],
        Some(r) => vec![write_mem(base + value(), reg(r))],
    }
}

pub(super) fn ld_sp(src: SpSrc, family: &'static str) -> Result<Vec<Stmt>, SynthError> {
    let stmt = match src {
        SpSrc::Imm => assign(sp(), value()),
        SpSrc::Direct => assign(sp(), read_mem_word(value())),
        SpSrc::Pair(pair @ (Pair::HL | Pair::IX | Pair::IY)) => assign(sp(), pair_value(pair)),
        SpSrc::Pair(_) => return Err(SynthError::unsupported(family, src)),
    };
    Ok(vec![stmt])
}

pub(super) fn ld_nn(pair: Pair, family: &'static str) -> Result<Vec<Stmt>, SynthError> {
    if pair == Pair::AF {
        return Err(SynthError::unsupported(family, pair));
    }
    if pair == Pair::SP {
        return Ok(vec![
            write_mem(value(), sp() & 0xFF),
            write_mem(value_hi(), sp() >> 8),
        ]);
    }
    let (hi, lo) = halves(pair, family)?;
    Ok(vec![write_mem(value(), reg(lo)), write_mem(value_hi(), reg(hi))])
}
