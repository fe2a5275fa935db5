//! Z80 flag register bits and the constants fragments are built from.
//!
//! The numeric values here are baked into synthesised fragments as literals,
//! so they must match the executing engine bit-for-bit.

/// Carry flag (bit 0) - carry out of bit 7 (or bit 15 for 16-bit ops).
pub const F_CARRY: u8 = 0b0000_0001;

/// Add/Subtract flag (bit 1) - set if last operation was a subtraction.
pub const F_NEGATIVE: u8 = 0b0000_0010;

/// Parity/Overflow flag (bit 2).
pub const F_PARITY: u8 = 0b0000_0100;

/// Undocumented flag (bit 3) - copy of bit 3 of the result.
pub const F_BIT3: u8 = 0b0000_1000;

/// Half-carry flag (bit 4) - carry from bit 3 to bit 4.
pub const F_HALFCARRY: u8 = 0b0001_0000;

/// Undocumented flag (bit 5) - copy of bit 5 of the result.
pub const F_BIT5: u8 = 0b0010_0000;

/// Zero flag (bit 6).
pub const F_ZERO: u8 = 0b0100_0000;

/// Sign flag (bit 7).
pub const F_SIGN: u8 = 0b1000_0000;

/// Size of one banked memory page. Branch targets and return addresses are
/// reduced modulo this and recombined with the live `page` register.
pub const PAGE_SIZE: i32 = 0x4000;

/// Single-bit masks indexed by bit number.
pub const BIT_TABLE: [u8; 8] = [0x01, 0x02, 0x04, 0x08, 0x10, 0x20, 0x40, 0x80];

/// Name of the sign/zero lookup table in the execution environment.
pub const SZ_TABLE: &str = "SZ_TABLE";

/// Name of the sign/zero/parity lookup table in the execution environment.
pub const SZP_TABLE: &str = "SZP_TABLE";

/// True if a byte has an even number of set bits.
#[must_use]
pub const fn parity(value: u8) -> bool {
    value.count_ones().is_multiple_of(2)
}

/// Entry of `SZ_TABLE`: sign, zero and the two undocumented bits.
#[must_use]
pub const fn sz(value: u8) -> u8 {
    let mut f = 0;
    if value == 0 {
        f |= F_ZERO;
    }
    if value & 0x80 != 0 {
        f |= F_SIGN;
    }
    f | (value & (F_BIT5 | F_BIT3))
}

/// Entry of `SZP_TABLE`: `SZ_TABLE` plus even parity.
#[must_use]
pub const fn szp(value: u8) -> u8 {
    let f = sz(value);
    if parity(value) { f | F_PARITY } else { f }
}
