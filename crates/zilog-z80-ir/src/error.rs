//! Synthesis errors.
//!
//! Both kinds indicate a bug in the opcode table, so they surface while the
//! table is being built and never during emulation.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthError {
    /// The operand combination has no Z80 encoding.
    UnsupportedOperands {
        family: &'static str,
        operands: String,
    },
    /// `BIT`/`RES`/`SET` with a bit number above 7.
    BitOutOfRange(u8),
}

impl SynthError {
    pub(crate) fn unsupported(family: &'static str, operands: impl fmt::Debug) -> Self {
        Self::UnsupportedOperands {
            family,
            operands: format!("{operands:?}"),
        }
    }
}

impl fmt::Display for SynthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedOperands { family, operands } => {
                write!(f, "{family}: unsupported operands {operands}")
            }
            Self::BitOutOfRange(bit) => write!(f, "bit number {bit} out of range (0-7)"),
        }
    }
}

impl std::error::Error for SynthError {}
