//! Increment, decrement and 16-bit arithmetic.
//!
//! `ADC HL,rr` and `SBC HL,rr` compute their flags inline. The two flag
//! expressions are kept separate and must stay bit-for-bit as written.

use super::{displaced, general, halves, pair_value, reg_pair_word, set16, sp, temp};
use crate::error::SynthError;
use crate::flags::F_CARRY;
use crate::ir::{Expr, Stmt, assign, call, conditional, exec, ident, if_then, num, reg, var};
use crate::operand::{Index, Operand8, Pair, Reg};

pub(super) fn inc8(target: Operand8, family: &'static str) -> Result<Vec<Stmt>, SynthError> {
    match target {
        Operand8::Reg(r) => {
            let r = general(r, family)?;
            Ok(vec![assign(r.clone(), call("inc8", vec![r]))])
        }
        Operand8::Indirect => Ok(vec![exec("incMem", vec![pair_value(Pair::HL)])]),
    }
}

pub(super) fn dec8(target: Operand8, family: &'static str) -> Result<Vec<Stmt>, SynthError> {
    match target {
        Operand8::Reg(r) => {
            let r = general(r, family)?;
            Ok(vec![assign(r.clone(), call("dec8", vec![r]))])
        }
        Operand8::Indirect => Ok(vec![exec("decMem", vec![pair_value(Pair::HL)])]),
    }
}

/// The low half wraps independently and carries into the high half when it
/// reaches 0.
pub(super) fn inc16(pair: Pair, family: &'static str) -> Result<Vec<Stmt>, SynthError> {
    if pair == Pair::SP {
        return Ok(vec![assign(sp(), (sp() + 1) & 0xFFFF)]);
    }
    if pair == Pair::AF {
        return Err(SynthError::unsupported(family, pair));
    }
    let (hi, lo) = halves(pair, family)?;
    Ok(vec![
        assign(reg(lo), (reg(lo) + 1) & 0xFF),
        if_then(
            reg(lo).equals(0),
            vec![assign(reg(hi), (reg(hi) + 1) & 0xFF)],
        ),
    ])
}

/// Mirror of [`inc16`]: the borrow fires when the low half reaches 255.
pub(super) fn dec16(pair: Pair, family: &'static str) -> Result<Vec<Stmt>, SynthError> {
    if pair == Pair::SP {
        return Ok(vec![assign(sp(), (sp() - 1) & 0xFFFF)]);
    }
    if pair == Pair::AF {
        return Err(SynthError::unsupported(family, pair));
    }
    let (hi, lo) = halves(pair, family)?;
    Ok(vec![
        assign(reg(lo), (reg(lo) - 1) & 0xFF),
        if_then(
            reg(lo).equals(255),
            vec![assign(reg(hi), (reg(hi) - 1) & 0xFF)],
        ),
    ])
}

pub(super) fn inc_indexed(index: Index) -> Vec<Stmt> {
    vec![exec("incMem", vec![displaced(index)])]
}

pub(super) fn dec_indexed(index: Index) -> Vec<Stmt> {
    vec![exec("decMem", vec![displaced(index)])]
}

/// `ADD HL,rr` / `ADD IX,rr` / `ADD IY,rr` through the `add16` primitive.
pub(super) fn add16(dst: Pair, src: Pair, family: &'static str) -> Result<Vec<Stmt>, SynthError> {
    let accumulator = matches!(dst, Pair::HL | Pair::IX | Pair::IY);
    let operand = matches!(src, Pair::BC | Pair::DE | Pair::SP) || src == dst;
    if !accumulator || !operand {
        return Err(SynthError::unsupported(family, (dst, src)));
    }
    let (hi, lo) = halves(dst, family)?;
    let sum = call("add16", vec![pair_value(dst), pair_value(src)]);
    Ok(set16(hi, lo, sum))
}

/// `var value = ...; var val = (h << 8) | l;`
fn operands16(src: Pair, family: &'static str) -> Result<[Stmt; 2], SynthError> {
    let value = match src {
        Pair::SP => sp(),
        Pair::BC | Pair::DE | Pair::HL => reg_pair_word(src, family)?,
        _ => return Err(SynthError::unsupported(family, src)),
    };
    Ok([
        var("value", value),
        var("val", reg_pair_word(Pair::HL, family)?),
    ])
}

/// `h = (temp >> 8) & 0xFF; l = temp & 0xFF;`
fn store_hl() -> [Stmt; 2] {
    [
        assign(reg(Reg::H), (temp() >> 8) & 0xFF),
        assign(reg(Reg::L), temp() & 0xFF),
    ]
}

/// `((temp & 0xFFFF) != 0) ? 0 : 0x40`
fn zero16() -> Expr {
    conditional((temp() & 0xFFFF).not_equals(0), 0, 0x40)
}

pub(super) fn adc16(src: Pair, family: &'static str) -> Result<Vec<Stmt>, SynthError> {
    let val = || ident("val");
    let value = || ident("value");
    let [decl_value, decl_val] = operands16(src, family)?;

    let half = ((val() ^ temp()) ^ value()) >> 8 & 0x10;
    let carry = (temp() >> 16) & 1;
    let sign = (temp() >> 8) & 0x80;
    let overflow = (((value() ^ val()) ^ 0x8000) & (value() ^ temp()) & 0x8000) >> 13;
    let flags = half | carry | sign | zero16() | overflow;

    let mut stmts = vec![
        decl_value,
        decl_val,
        assign(temp(), (val() + value()) + (reg(Reg::F) & F_CARRY)),
        assign(reg(Reg::F), flags),
    ];
    stmts.extend(store_hl());
    Ok(stmts)
}

pub(super) fn sbc16(src: Pair, family: &'static str) -> Result<Vec<Stmt>, SynthError> {
    let val = || ident("val");
    let value = || ident("value");
    let [decl_value, decl_val] = operands16(src, family)?;

    let half = ((val() ^ temp()) ^ value()) >> 8 & 0x10;
    let carry = (temp() >> 16) & 1;
    let sign = (temp() >> 8) & 0x80;
    let overflow = ((value() ^ val()) & (val() ^ temp()) & 0x8000) >> 13;
    let flags = half | num(0x02) | carry | sign | zero16() | overflow;

    let mut stmts = vec![
        decl_value,
        decl_val,
        assign(temp(), (val() - value()) - (reg(Reg::F) & F_CARRY)),
        assign(reg(Reg::F), flags),
    ];
    stmts.extend(store_hl());
    Ok(stmts)
}

pub(super) fn neg() -> Vec<Stmt> {
    vec![
        assign(temp(), reg(Reg::A)),
        assign(reg(Reg::A), 0),
        exec("sub_a", vec![temp()]),
    ]
}
