//! Instruction descriptors.
//!
//! One variant per mnemonic family, carrying the operand shape that selects
//! the IR. Runtime-decoded operands (immediates, displacements, targets) are
//! not part of the descriptor; they arrive later through
//! [`Operands`](crate::Operands).

#![allow(clippy::upper_case_acronyms)] // Variant names follow Zilog mnemonics.

use crate::operand::{
    Address, AluOp, AluSrc, BitOp, BitTarget, Cond, Index, Operand8, Pair, Port, Reg, ShiftOp,
    SpSrc, Src8, Src16, Store,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Instruction {
    Nop,

    // Loads
    /// `LD r,n`, `LD r,r'`, `LD A,(nn)`, `LD r,(rr)`, `LD A,I`, `LD A,R`.
    Ld8 { dst: Reg, src: Src8 },
    /// `LD r,(IX+d)`.
    Ld8Indexed { dst: Reg, index: Index },
    /// `LD rr,nn`, `LD rr,(nn)`.
    Ld16 { dst: Pair, src: Src16 },
    /// `LD (rr),r`, `LD (HL),n`, `LD (nn),A`, `LD (nn),rr`.
    LdWriteMem { addr: Address, src: Store },
    /// `LD (IX+d),n` when `src` is `None`, otherwise `LD (IX+d),r`.
    LdIndexed { index: Index, src: Option<Reg> },
    LdSp(SpSrc),
    /// `LD (nn),rr` for the ED-prefixed encodings, including `SP`.
    LdNn(Pair),

    // Increment / decrement
    Inc8(Operand8),
    Dec8(Operand8),
    Inc16(Pair),
    Dec16(Pair),
    IncIndexed(Index),
    DecIndexed(Index),

    // Arithmetic and logic
    Add16 { dst: Pair, src: Pair },
    Adc16(Pair),
    Sbc16(Pair),
    Alu { op: AluOp, src: AluSrc },
    Rlca,
    Rrca,
    Rla,
    Rra,
    Daa,
    Cpl,
    Scf,
    Ccf,
    Neg,

    // CB / DDCB / FDCB
    Shift { op: ShiftOp, target: Operand8 },
    /// `RLC (IX+d)`, or `LD r,RLC (IX+d)` when `mirror` names a register.
    ShiftIndexed {
        op: ShiftOp,
        index: Index,
        mirror: Option<Reg>,
    },
    Bit { op: BitOp, bit: u8, target: BitTarget },

    // Control transfer
    Jr(Option<Cond>),
    Djnz,
    Jp(Option<Cond>),
    /// `JP (HL)`, `JP (IX)`, `JP (IY)`.
    JpIndirect(Pair),
    Call(Option<Cond>),
    Rst(u16),
    Ret(Option<Cond>),
    RetnReti,

    // Stack and exchange
    Push(Pair),
    Pop(Pair),
    ExAf,
    Exx,
    ExDeHl,
    /// `EX (SP),HL`, `EX (SP),IX`, `EX (SP),IY`.
    ExSp(Pair),

    // I/O
    In { dst: Reg, port: Port },
    Out { port: Port, src: Reg },

    // Block transfer, compare and I/O
    Ini,
    Outi,
    Outd,
    Otir,
    Ldi,
    Ldd,
    Ldir,
    Lddr,
    Cpi,
    Cpir,

    // Interrupts and CPU control
    Di,
    Ei,
    Im(u8),
    Halt,
}

impl Instruction {
    /// Family name used in diagnostics.
    #[must_use]
    pub const fn family(&self) -> &'static str {
        match self {
            Self::Nop => "NOOP",
            Self::Ld8 { .. } => "LD8",
            Self::Ld8Indexed { .. } => "LD8_D",
            Self::Ld16 { .. } => "LD16",
            Self::LdWriteMem { .. } => "LD_WRITE_MEM",
            Self::LdIndexed { .. } => "LD_X",
            Self::LdSp(_) => "LD_SP",
            Self::LdNn(_) => "LD_NN",
            Self::Inc8(_) => "INC8",
            Self::Dec8(_) => "DEC8",
            Self::Inc16(_) => "INC16",
            Self::Dec16(_) => "DEC16",
            Self::IncIndexed(_) => "INC_X",
            Self::DecIndexed(_) => "DEC_X",
            Self::Add16 { .. } => "ADD16",
            Self::Adc16(_) => "ADC16",
            Self::Sbc16(_) => "SBC16",
            Self::Alu { op, src } => match (op, src) {
                (AluOp::Add, AluSrc::Indexed(_)) => "ADD_X",
                (AluOp::Adc, AluSrc::Indexed(_)) => "ADC_X",
                (AluOp::Sub, AluSrc::Indexed(_)) => "SUB_X",
                (AluOp::Sbc, AluSrc::Indexed(_)) => "SBC_X",
                (AluOp::And, AluSrc::Indexed(_)) => "AND_X",
                (AluOp::Xor, AluSrc::Indexed(_)) => "XOR_X",
                (AluOp::Or, AluSrc::Indexed(_)) => "OR_X",
                (AluOp::Cp, AluSrc::Indexed(_)) => "CP_X",
                (AluOp::Add, _) => "ADD",
                (AluOp::Adc, _) => "ADC",
                (AluOp::Sub, _) => "SUB",
                (AluOp::Sbc, _) => "SBC",
                (AluOp::And, _) => "AND",
                (AluOp::Xor, _) => "XOR",
                (AluOp::Or, _) => "OR",
                (AluOp::Cp, _) => "CP",
            },
            Self::Rlca => "RLCA",
            Self::Rrca => "RRCA",
            Self::Rla => "RLA",
            Self::Rra => "RRA",
            Self::Daa => "DAA",
            Self::Cpl => "CPL",
            Self::Scf => "SCF",
            Self::Ccf => "CCF",
            Self::Neg => "NEG",
            Self::Shift { op, .. } => match op {
                ShiftOp::Rlc => "RLC",
                ShiftOp::Rrc => "RRC",
                ShiftOp::Rl => "RL",
                ShiftOp::Rr => "RR",
                ShiftOp::Sla => "SLA",
                ShiftOp::Sra => "SRA",
                ShiftOp::Sll => "SLL",
                ShiftOp::Srl => "SRL",
            },
            Self::ShiftIndexed { op, .. } => match op {
                ShiftOp::Rlc => "LD_RLC",
                ShiftOp::Rrc => "LD_RRC",
                ShiftOp::Rl => "LD_RL",
                ShiftOp::Rr => "LD_RR",
                ShiftOp::Sla => "LD_SLA",
                ShiftOp::Sra => "LD_SRA",
                ShiftOp::Sll => "LD_SLL",
                ShiftOp::Srl => "LD_SRL",
            },
            Self::Bit { op, .. } => match op {
                BitOp::Test => "BIT",
                BitOp::Reset => "RES",
                BitOp::Set => "SET",
            },
            Self::Jr(None) => "JR",
            Self::Jr(Some(cond)) => match cond {
                Cond::NZ => "JRNZ",
                Cond::Z => "JRZ",
                Cond::NC => "JRNC",
                Cond::C => "JRC",
                _ => "JR",
            },
            Self::Djnz => "DJNZ",
            Self::Jp(_) => "JP",
            Self::JpIndirect(_) => "JP_X",
            Self::Call(_) => "CALL",
            Self::Rst(_) => "RST",
            Self::Ret(_) => "RET",
            Self::RetnReti => "RETN_RETI",
            Self::Push(_) => "PUSH",
            Self::Pop(_) => "POP",
            Self::ExAf => "EX_AF",
            Self::Exx => "EXX",
            Self::ExDeHl => "EX_DE_HL",
            Self::ExSp(Pair::HL) => "EX_SP_HL",
            Self::ExSp(_) => "EX_SP_X",
            Self::In { .. } => "IN",
            Self::Out { .. } => "OUT",
            Self::Ini => "INI",
            Self::Outi => "OUTI",
            Self::Outd => "OUTD",
            Self::Otir => "OTIR",
            Self::Ldi => "LDI",
            Self::Ldd => "LDD",
            Self::Ldir => "LDIR",
            Self::Lddr => "LDDR",
            Self::Cpi => "CPI",
            Self::Cpir => "CPIR",
            Self::Di => "DI",
            Self::Ei => "EI",
            Self::Im(_) => "IM",
            Self::Halt => "HALT",
        }
    }
}
