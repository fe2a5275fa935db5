//! Reference flag arithmetic behind the sandbox primitives.
//!
//! These are the results an engine's `add_a`, `inc8`, `rlc` and friends are
//! expected to produce. 8-bit flags lean on the same `sz`/`szp` entries the
//! fragments index, so only the arithmetic-specific bits are worked out here.

#![allow(clippy::cast_possible_truncation)] // Intentional truncation for low byte extraction.
#![allow(clippy::verbose_bit_mask)]

use crate::flags::{
    F_BIT3, F_BIT5, F_CARRY, F_HALFCARRY, F_NEGATIVE, F_PARITY, F_SIGN, F_ZERO, sz, szp,
};

const UNDOCUMENTED: u8 = F_BIT5 | F_BIT3;

/// Result of an ALU operation with flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluResult {
    pub value: u8,
    pub flags: u8,
}

const fn set_if(cond: bool, flag: u8) -> u8 {
    if cond { flag } else { 0 }
}

/// Add with optional carry.
#[must_use]
pub fn add8(a: u8, b: u8, carry: bool) -> AluResult {
    let c = u8::from(carry);
    let wide = u16::from(a) + u16::from(b) + u16::from(c);
    let value = wide as u8;

    // Overflow: same-sign operands, different-sign result.
    let overflow = (a ^ b) & 0x80 == 0 && (a ^ value) & 0x80 != 0;
    let flags = sz(value)
        | set_if((a & 0x0F) + (b & 0x0F) + c > 0x0F, F_HALFCARRY)
        | set_if(overflow, F_PARITY)
        | set_if(wide > 0xFF, F_CARRY);
    AluResult { value, flags }
}

/// Subtract with optional borrow.
#[must_use]
pub fn sub8(a: u8, b: u8, carry: bool) -> AluResult {
    let c = u8::from(carry);
    let value = a.wrapping_sub(b).wrapping_sub(c);

    let overflow = (a ^ b) & 0x80 != 0 && (b ^ value) & 0x80 == 0;
    let flags = F_NEGATIVE
        | sz(value)
        | set_if((a & 0x0F) < (b & 0x0F) + c, F_HALFCARRY)
        | set_if(overflow, F_PARITY)
        | set_if(u16::from(a) < u16::from(b) + u16::from(c), F_CARRY);
    AluResult { value, flags }
}

/// Compare. Bits 3 and 5 come from the operand, not the difference.
#[must_use]
pub fn cp8(a: u8, b: u8) -> AluResult {
    let diff = sub8(a, b, false);
    AluResult {
        value: a,
        flags: (diff.flags & !UNDOCUMENTED) | (b & UNDOCUMENTED),
    }
}

/// Increment. Carry is not computed here; callers keep the old one.
#[must_use]
pub fn inc8(a: u8) -> AluResult {
    let value = a.wrapping_add(1);
    let flags = sz(value) | set_if(a & 0x0F == 0x0F, F_HALFCARRY) | set_if(a == 0x7F, F_PARITY);
    AluResult { value, flags }
}

/// Decrement. Carry is not computed here; callers keep the old one.
#[must_use]
pub fn dec8(a: u8) -> AluResult {
    let value = a.wrapping_sub(1);
    let flags = F_NEGATIVE
        | sz(value)
        | set_if(a & 0x0F == 0, F_HALFCARRY)
        | set_if(a == 0x80, F_PARITY);
    AluResult { value, flags }
}

/// Flags shared by the CB rotate/shift group.
fn shifted(value: u8, carry_out: bool) -> AluResult {
    AluResult {
        value,
        flags: szp(value) | set_if(carry_out, F_CARRY),
    }
}

#[must_use]
pub fn rlc8(a: u8) -> AluResult {
    shifted(a.rotate_left(1), a & 0x80 != 0)
}

#[must_use]
pub fn rrc8(a: u8) -> AluResult {
    shifted(a.rotate_right(1), a & 1 != 0)
}

#[must_use]
pub fn rl8(a: u8, carry: bool) -> AluResult {
    shifted((a << 1) | u8::from(carry), a & 0x80 != 0)
}

#[must_use]
pub fn rr8(a: u8, carry: bool) -> AluResult {
    shifted((a >> 1) | (u8::from(carry) << 7), a & 1 != 0)
}

#[must_use]
pub fn sla8(a: u8) -> AluResult {
    shifted(a << 1, a & 0x80 != 0)
}

/// Bit 7 is preserved.
#[must_use]
pub fn sra8(a: u8) -> AluResult {
    shifted((a >> 1) | (a & 0x80), a & 1 != 0)
}

/// Undocumented: bit 0 is filled with 1.
#[must_use]
pub fn sll8(a: u8) -> AluResult {
    shifted((a << 1) | 1, a & 0x80 != 0)
}

#[must_use]
pub fn srl8(a: u8) -> AluResult {
    shifted(a >> 1, a & 1 != 0)
}

/// Accumulator rotates (`RLCA` and friends) leave S, Z and P/V alone.
fn rotated_a(value: u8, carry_out: bool, f: u8) -> AluResult {
    AluResult {
        value,
        flags: (f & (F_SIGN | F_ZERO | F_PARITY)) | (value & UNDOCUMENTED) | set_if(carry_out, F_CARRY),
    }
}

#[must_use]
pub fn rlca(a: u8, f: u8) -> AluResult {
    rotated_a(a.rotate_left(1), a & 0x80 != 0, f)
}

#[must_use]
pub fn rrca(a: u8, f: u8) -> AluResult {
    rotated_a(a.rotate_right(1), a & 1 != 0, f)
}

#[must_use]
pub fn rla(a: u8, f: u8) -> AluResult {
    rotated_a((a << 1) | (f & F_CARRY), a & 0x80 != 0, f)
}

#[must_use]
pub fn rra(a: u8, f: u8) -> AluResult {
    rotated_a((a >> 1) | ((f & F_CARRY) << 7), a & 1 != 0, f)
}

/// Decimal adjust after an add or subtract, steered by N, H and C.
#[must_use]
pub fn daa(a: u8, f: u8) -> AluResult {
    let subtract = f & F_NEGATIVE != 0;
    let mut correction = 0u8;
    let mut carry = f & F_CARRY != 0;

    if f & F_HALFCARRY != 0 || a & 0x0F > 9 {
        correction |= 0x06;
    }
    if carry || a > 0x99 {
        correction |= 0x60;
        carry = true;
    }

    let (value, half) = if subtract {
        (a.wrapping_sub(correction), f & F_HALFCARRY != 0 && a & 0x0F < 6)
    } else {
        (a.wrapping_add(correction), a & 0x0F > 9)
    };

    let flags = szp(value)
        | (f & F_NEGATIVE)
        | set_if(half, F_HALFCARRY)
        | set_if(carry, F_CARRY);
    AluResult { value, flags }
}

#[must_use]
pub fn cpl(a: u8, f: u8) -> AluResult {
    let value = !a;
    let flags = (f & (F_SIGN | F_ZERO | F_PARITY | F_CARRY))
        | F_HALFCARRY
        | F_NEGATIVE
        | (value & UNDOCUMENTED);
    AluResult { value, flags }
}

/// H takes the old carry, then carry is inverted.
#[must_use]
pub fn ccf(a: u8, f: u8) -> u8 {
    let carry = f & F_CARRY != 0;
    (f & (F_SIGN | F_ZERO | F_PARITY))
        | (a & UNDOCUMENTED)
        | set_if(carry, F_HALFCARRY)
        | set_if(!carry, F_CARRY)
}

/// Flags after `BIT n`, given the operand already masked down to that bit.
#[must_use]
pub const fn bit(masked: u8, f: u8) -> u8 {
    let zero = if masked == 0 { F_ZERO | F_PARITY } else { 0 };
    (f & F_CARRY) | F_HALFCARRY | zero | (masked & F_SIGN) | (masked & UNDOCUMENTED)
}

/// 16-bit add for HL/IX/IY. S, Z and P/V are left to the caller.
#[must_use]
pub fn add16(a: u16, b: u16) -> (u16, u8) {
    let wide = u32::from(a) + u32::from(b);
    let value = wide as u16;
    let flags = ((value >> 8) as u8 & UNDOCUMENTED)
        | set_if((a & 0x0FFF) + (b & 0x0FFF) > 0x0FFF, F_HALFCARRY)
        | set_if(wide > 0xFFFF, F_CARRY);
    (value, flags)
}

/// 16-bit add with carry for HL.
#[must_use]
pub fn adc16(a: u16, b: u16, carry: bool) -> (u16, u8) {
    let c = u16::from(carry);
    let wide = u32::from(a) + u32::from(b) + u32::from(c);
    let value = wide as u16;

    let overflow = (a ^ b) & 0x8000 == 0 && (a ^ value) & 0x8000 != 0;
    let flags = sz16(value)
        | set_if((a & 0x0FFF) + (b & 0x0FFF) + c > 0x0FFF, F_HALFCARRY)
        | set_if(overflow, F_PARITY)
        | set_if(wide > 0xFFFF, F_CARRY);
    (value, flags)
}

/// 16-bit subtract with borrow for HL.
#[must_use]
pub fn sbc16(a: u16, b: u16, carry: bool) -> (u16, u8) {
    let c = u16::from(carry);
    let value = a.wrapping_sub(b).wrapping_sub(c);

    let overflow = (a ^ b) & 0x8000 != 0 && (b ^ value) & 0x8000 == 0;
    let flags = F_NEGATIVE
        | sz16(value)
        | set_if((a & 0x0FFF) < (b & 0x0FFF) + c, F_HALFCARRY)
        | set_if(overflow, F_PARITY)
        | set_if(u32::from(a) < u32::from(b) + u32::from(c), F_CARRY);
    (value, flags)
}

/// Sign, zero and undocumented bits of a 16-bit result.
fn sz16(value: u16) -> u8 {
    let high = (value >> 8) as u8;
    (high & (F_SIGN | UNDOCUMENTED)) | set_if(value == 0, F_ZERO)
}
