//! Operand descriptors.
//!
//! These are known when the opcode table is assembled and pick the IR shape
//! of an instruction. Each descriptor also knows the symbolic names it maps
//! to in the execution environment.

#![allow(clippy::upper_case_acronyms)] // Pair and condition names follow Zilog mnemonics.

use std::fmt;

use crate::flags::{F_CARRY, F_PARITY, F_SIGN, F_ZERO};

/// An 8-bit register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Reg {
    A,
    F,
    B,
    C,
    D,
    E,
    H,
    L,
    I,
    R,
    IxH,
    IxL,
    IyH,
    IyL,
}

impl Reg {
    /// Name of the register in the execution environment.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::A => "a",
            Self::F => "f",
            Self::B => "b",
            Self::C => "c",
            Self::D => "d",
            Self::E => "e",
            Self::H => "h",
            Self::L => "l",
            Self::I => "i",
            Self::R => "r",
            Self::IxH => "ixH",
            Self::IxL => "ixL",
            Self::IyH => "iyH",
            Self::IyL => "iyL",
        }
    }

    /// Name of the shadow-set counterpart, for the registers that have one.
    #[must_use]
    pub const fn shadow(self) -> Option<&'static str> {
        match self {
            Self::A => Some("a2"),
            Self::F => Some("f2"),
            Self::B => Some("b2"),
            Self::C => Some("c2"),
            Self::D => Some("d2"),
            Self::E => Some("e2"),
            Self::H => Some("h2"),
            Self::L => Some("l2"),
            _ => None,
        }
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A 16-bit register pair, or `SP`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Pair {
    AF,
    BC,
    DE,
    HL,
    IX,
    IY,
    SP,
}

impl Pair {
    /// High and low halves. `SP` is a single scalar and has none.
    #[must_use]
    pub const fn halves(self) -> Option<(Reg, Reg)> {
        match self {
            Self::AF => Some((Reg::A, Reg::F)),
            Self::BC => Some((Reg::B, Reg::C)),
            Self::DE => Some((Reg::D, Reg::E)),
            Self::HL => Some((Reg::H, Reg::L)),
            Self::IX => Some((Reg::IxH, Reg::IxL)),
            Self::IY => Some((Reg::IyH, Reg::IyL)),
            Self::SP => None,
        }
    }

    /// Getter primitive (`get<HI><LO>()`). `SP` is read directly.
    #[must_use]
    pub const fn getter(self) -> Option<&'static str> {
        match self {
            Self::AF => Some("getAF"),
            Self::BC => Some("getBC"),
            Self::DE => Some("getDE"),
            Self::HL => Some("getHL"),
            Self::IX => Some("getIXHIXL"),
            Self::IY => Some("getIYHIYL"),
            Self::SP => None,
        }
    }

    /// Setter primitive (`set<HI><LO>(value)`).
    #[must_use]
    pub const fn setter(self) -> Option<&'static str> {
        match self {
            Self::AF => Some("setAF"),
            Self::BC => Some("setBC"),
            Self::DE => Some("setDE"),
            Self::HL => Some("setHL"),
            Self::IX => Some("setIXHIXL"),
            Self::IY => Some("setIYHIYL"),
            Self::SP => None,
        }
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AF => "AF",
            Self::BC => "BC",
            Self::DE => "DE",
            Self::HL => "HL",
            Self::IX => "IX",
            Self::IY => "IY",
            Self::SP => "SP",
        };
        f.write_str(name)
    }
}

/// Index register used by displacement addressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Index {
    IX,
    IY,
}

impl Index {
    #[must_use]
    pub const fn pair(self) -> Pair {
        match self {
            Self::IX => Pair::IX,
            Self::IY => Pair::IY,
        }
    }
}

/// Branch condition: a flag mask and whether the branch is taken when the
/// flag is set or clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Cond {
    NZ,
    Z,
    NC,
    C,
    PO,
    PE,
    P,
    M,
}

impl Cond {
    pub const ALL: [Cond; 8] = [
        Self::NZ,
        Self::Z,
        Self::NC,
        Self::C,
        Self::PO,
        Self::PE,
        Self::P,
        Self::M,
    ];

    #[must_use]
    pub const fn mask(self) -> u8 {
        match self {
            Self::NZ | Self::Z => F_ZERO,
            Self::NC | Self::C => F_CARRY,
            Self::PO | Self::PE => F_PARITY,
            Self::P | Self::M => F_SIGN,
        }
    }

    /// True if the branch is taken when the flag is set.
    #[must_use]
    pub const fn when_set(self) -> bool {
        matches!(self, Self::Z | Self::C | Self::PE | Self::M)
    }

    /// `JR` only encodes the zero and carry conditions.
    #[must_use]
    pub const fn is_relative(self) -> bool {
        matches!(self, Self::NZ | Self::Z | Self::NC | Self::C)
    }
}

/// Accumulator ALU operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum AluOp {
    Add,
    Adc,
    Sub,
    Sbc,
    And,
    Xor,
    Or,
    Cp,
}

impl AluOp {
    pub const ALL: [AluOp; 8] = [
        Self::Add,
        Self::Adc,
        Self::Sub,
        Self::Sbc,
        Self::And,
        Self::Xor,
        Self::Or,
        Self::Cp,
    ];

    /// Primitive that performs the operation, for the ops not computed inline.
    #[must_use]
    pub const fn primitive(self) -> Option<&'static str> {
        match self {
            Self::Add => Some("add_a"),
            Self::Adc => Some("adc_a"),
            Self::Sub => Some("sub_a"),
            Self::Sbc => Some("sbc_a"),
            Self::Cp => Some("cp_a"),
            Self::And | Self::Xor | Self::Or => None,
        }
    }
}

/// CB-prefix rotate/shift mnemonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ShiftOp {
    Rlc,
    Rrc,
    Rl,
    Rr,
    Sla,
    Sra,
    Sll,
    Srl,
}

impl ShiftOp {
    pub const ALL: [ShiftOp; 8] = [
        Self::Rlc,
        Self::Rrc,
        Self::Rl,
        Self::Rr,
        Self::Sla,
        Self::Sra,
        Self::Sll,
        Self::Srl,
    ];

    #[must_use]
    pub const fn primitive(self) -> &'static str {
        match self {
            Self::Rlc => "rlc",
            Self::Rrc => "rrc",
            Self::Rl => "rl",
            Self::Rr => "rr",
            Self::Sla => "sla",
            Self::Sra => "sra",
            Self::Sll => "sll",
            Self::Srl => "srl",
        }
    }
}

/// `BIT`, `RES` or `SET`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum BitOp {
    Test,
    Reset,
    Set,
}

/// Source of an 8-bit load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Src8 {
    /// `LD r,n`.
    Imm,
    /// `LD r,r'` (and `LD A,I` / `LD A,R`).
    Reg(Reg),
    /// `LD A,(nn)`.
    Direct,
    /// `LD r,(rr)`.
    Indirect(Pair),
}

/// Source of a 16-bit load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Src16 {
    /// `LD rr,nn`.
    Imm,
    /// `LD rr,(nn)`.
    Direct,
    Pair(Pair),
    Indirect(Pair),
}

/// Memory destination of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Address {
    /// `(nn)`.
    Direct,
    /// `(rr)`.
    Indirect(Pair),
}

/// Value written by a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Store {
    Imm,
    Reg(Reg),
    Pair(Pair),
}

/// Source for `LD SP,...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum SpSrc {
    Imm,
    Direct,
    Pair(Pair),
}

/// Register or `(HL)` operand of INC/DEC and the CB rotate/shift group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Operand8 {
    Reg(Reg),
    /// `(HL)`.
    Indirect,
}

/// Source operand of an accumulator ALU instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum AluSrc {
    Imm,
    Reg(Reg),
    Indirect(Pair),
    Indexed(Index),
}

/// Operand of `BIT`/`RES`/`SET`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum BitTarget {
    Reg(Reg),
    /// `(HL)`.
    Indirect,
    Indexed(Index),
}

/// Port operand of `IN`/`OUT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Port {
    /// `(n)`.
    Imm,
    /// `(C)`.
    Reg(Reg),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_pairs_use_long_getters() {
        assert_eq!(Index::IX.pair().getter(), Some("getIXHIXL"));
        assert_eq!(Index::IY.pair().setter(), Some("setIYHIYL"));
        assert_eq!(Pair::SP.getter(), None);
    }

    #[test]
    fn conditions_pair_up_on_one_flag() {
        for pair in Cond::ALL.chunks(2) {
            assert_eq!(pair[0].mask(), pair[1].mask());
            assert!(!pair[0].when_set());
            assert!(pair[1].when_set());
        }
    }
}
