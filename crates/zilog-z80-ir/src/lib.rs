//! Z80 instruction semantics as operand-specialised IR fragments.
//!
//! Every Z80 instruction variant (unprefixed, CB, DD, FD, ED, DDCB, FDCB) is
//! described by an [`Instruction`] whose operand shape is fixed when the
//! opcode table is built. [`Synth::template`] turns it into a [`Template`]:
//! a ready [`Fragment`] when nothing depends on the instruction stream, or a
//! pending skeleton whose immediate, target and next-address holes are
//! filled per opcode with [`Template::instantiate`].
//!
//! Fragments only describe effects. Register storage, memory, ports, the
//! flag lookup tables and the arithmetic primitives are named symbolically
//! and belong to whatever executes the IR.

pub mod config;
pub mod error;
pub mod flags;
pub mod fold;
pub mod instruction;
pub mod ir;
pub mod operand;
mod synth;
pub mod template;

#[cfg(feature = "test-utils")]
pub mod sandbox;

pub use config::SynthConfig;
pub use error::SynthError;
pub use fold::fold;
pub use instruction::Instruction;
pub use ir::{Expr, Stmt};
pub use synth::Synth;
pub use template::{Fragment, Operands, Pending, Template};
