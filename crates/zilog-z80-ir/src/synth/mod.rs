//! Instruction family templates.
//!
//! Every family picks its IR shape from the operand descriptors alone.
//! Values decoded from the instruction stream appear as [`Hole`]s and are
//! filled in when the template is instantiated.

mod arith;
mod bits;
mod block;
mod branches;
mod io;
mod load;
mod logic;
mod misc;
mod shifts;
mod stack;

use crate::config::SynthConfig;
use crate::error::SynthError;
use crate::flags::{PAGE_SIZE, SZP_TABLE};
use crate::fold::fold;
use crate::instruction::Instruction;
use crate::ir::{Expr, Hole, Operand, Stmt, assign, call, exec, hole, ident, index, reg, var};
use crate::operand::{Cond, Index, Pair, Reg};
use crate::template::Template;

/// Template synthesiser.
///
/// Holds the policies that change fragment shape. Synthesis itself is pure:
/// the same instruction always yields the same template.
#[derive(Debug, Clone, Default)]
pub struct Synth {
    config: SynthConfig,
}

impl Synth {
    #[must_use]
    pub const fn new(config: SynthConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &SynthConfig {
        &self.config
    }

    /// Build the template for one instruction variant.
    ///
    /// Fails only for operand combinations with no Z80 encoding.
    pub fn template(&self, insn: &Instruction) -> Result<Template, SynthError> {
        let family = insn.family();
        let stmts = match *insn {
            Instruction::Nop => Vec::new(),

            Instruction::Ld8 { dst, src } => load::ld8(dst, src, &self.config, family)?,
            Instruction::Ld8Indexed { dst, index } => load::ld8_indexed(dst, index),
            Instruction::Ld16 { dst, src } => load::ld16(dst, src, family)?,
            Instruction::LdWriteMem { addr, src } => load::ld_write_mem(addr, src, family)?,
            Instruction::LdIndexed { index, src } => load::ld_indexed(index, src),
            Instruction::LdSp(src) => load::ld_sp(src, family)?,
            Instruction::LdNn(pair) => load::ld_nn(pair, family)?,

            Instruction::Inc8(target) => arith::inc8(target, family)?,
            Instruction::Dec8(target) => arith::dec8(target, family)?,
            Instruction::Inc16(pair) => arith::inc16(pair, family)?,
            Instruction::Dec16(pair) => arith::dec16(pair, family)?,
            Instruction::IncIndexed(index) => arith::inc_indexed(index),
            Instruction::DecIndexed(index) => arith::dec_indexed(index),
            Instruction::Add16 { dst, src } => arith::add16(dst, src, family)?,
            Instruction::Adc16(src) => arith::adc16(src, family)?,
            Instruction::Sbc16(src) => arith::sbc16(src, family)?,
            Instruction::Alu { op, src } => logic::alu(op, src, family)?,
            Instruction::Neg => arith::neg(),

            Instruction::Rlca => misc::delegate("rlca_a"),
            Instruction::Rrca => misc::delegate("rrca_a"),
            Instruction::Rla => misc::delegate("rla_a"),
            Instruction::Rra => misc::delegate("rra_a"),
            Instruction::Daa => misc::delegate("daa"),
            Instruction::Cpl => misc::delegate("cpl_a"),
            Instruction::Ccf => misc::delegate("ccf"),
            Instruction::Scf => misc::scf(),

            Instruction::Shift { op, target } => shifts::cb(op.primitive(), target, family)?,
            Instruction::ShiftIndexed { op, index, mirror } => {
                shifts::indexed_cb(op.primitive(), index, mirror, family)?
            }
            Instruction::Bit { op, bit, target } => bits::bit_op(op, bit, target)?,

            Instruction::Jr(cond) => branches::jr(cond, family)?,
            Instruction::Djnz => branches::djnz(),
            Instruction::Jp(cond) => branches::jp(cond),
            Instruction::JpIndirect(pair) => branches::jp_indirect(pair, family)?,
            Instruction::Call(cond) => branches::call(cond),
            Instruction::Rst(vector) => branches::rst(vector, family)?,
            Instruction::Ret(cond) => branches::ret(cond),
            Instruction::RetnReti => branches::retn_reti(),

            Instruction::Push(pair) => stack::push(pair, family)?,
            Instruction::Pop(pair) => stack::pop(pair, family)?,
            Instruction::ExAf => stack::ex_af(),
            Instruction::Exx => stack::exx(),
            Instruction::ExDeHl => stack::ex_de_hl(),
            Instruction::ExSp(pair) => stack::ex_sp(pair, family)?,

            Instruction::In { dst, port } => io::input(dst, port),
            Instruction::Out { port, src } => io::output(port, src),

            Instruction::Ini => block::ini(),
            Instruction::Outi => block::outi(),
            Instruction::Outd => block::outd(),
            Instruction::Otir => block::otir(),
            Instruction::Ldi => block::ldi(),
            Instruction::Ldd => block::ldd(),
            Instruction::Ldir => block::ldir(),
            Instruction::Lddr => block::lddr(),
            Instruction::Cpi => block::cpi(),
            Instruction::Cpir => block::cpir(),

            Instruction::Di => misc::di(),
            Instruction::Ei => misc::ei(),
            Instruction::Im(mode) => misc::im(mode, family)?,
            Instruction::Halt => misc::halt(&self.config),
        };

        Ok(Template::new(stmts, self.config.annotate_literals))
    }
}

// ---------------------------------------------------------------------------
// Shared sub-expression builders
// ---------------------------------------------------------------------------

fn sp() -> Expr {
    ident("sp")
}

fn pc() -> Expr {
    ident("pc")
}

fn temp() -> Expr {
    ident("temp")
}

fn tstates() -> Expr {
    ident("tstates")
}

fn location() -> Expr {
    ident("location")
}

/// The instruction's immediate byte/word or displacement.
fn value() -> Expr {
    hole(Hole::new(Operand::Value))
}

/// Absolute branch target, unbanked.
fn target() -> Expr {
    hole(Hole::new(Operand::Target))
}

fn read_mem(addr: Expr) -> Expr {
    call("readMem", vec![addr])
}

fn read_mem_word(addr: Expr) -> Expr {
    call("readMemWord", vec![addr])
}

fn write_mem(addr: Expr, value: impl Into<Expr>) -> Stmt {
    exec("writeMem", vec![addr, value.into()])
}

/// `get<PAIR>()` call, or `sp` itself.
fn pair_value(pair: Pair) -> Expr {
    match pair.getter() {
        Some(getter) => call(getter, Vec::new()),
        None => sp(),
    }
}

/// Register halves of `pair`, or the unsupported-operand error for `SP`.
fn halves(pair: Pair, family: &'static str) -> Result<(Reg, Reg), SynthError> {
    pair.halves()
        .ok_or_else(|| SynthError::unsupported(family, pair))
}

/// One of the registers an opcode can name in its register field. `I`, `R`
/// and `F` only appear in dedicated encodings.
fn general(r: Reg, family: &'static str) -> Result<Expr, SynthError> {
    match r {
        Reg::I | Reg::R | Reg::F => Err(SynthError::unsupported(family, r)),
        _ => Ok(reg(r)),
    }
}

/// `(hi << 8) | lo`, read from the registers rather than the pair getter.
fn reg_pair_word(pair: Pair, family: &'static str) -> Result<Expr, SynthError> {
    let (hi, lo) = halves(pair, family)?;
    Ok((reg(hi) << 8) | reg(lo))
}

/// `get<IX|IY>() + d`, unmasked.
fn displaced(index: Index) -> Expr {
    pair_value(index.pair()) + value()
}

/// `location = (get<IX|IY>() + d) & 0xFFFF;`
fn set_location(index: Index) -> Stmt {
    assign(location(), displaced(index) & 0xFFFF)
}

/// Address reduced into the page window and re-based on the live `page`.
fn paged(h: Hole) -> Expr {
    hole(h.in_page()) + ident("page") * PAGE_SIZE
}

/// `(f & mask) != 0` when the condition wants the flag set, `== 0` otherwise.
fn flag_test(cond: Cond) -> Expr {
    let masked = reg(Reg::F) & cond.mask();
    if cond.when_set() {
        masked.not_equals(0)
    } else {
        masked.equals(0)
    }
}

fn szp(r: Reg) -> Expr {
    index(SZP_TABLE, reg(r))
}

/// Load a register pair from a 16-bit value.
///
/// Constants (literals and holes) are split directly and each half folds to
/// a literal, immediately for literals and on fill for holes. Anything else goes through a
/// `val` temporary.
fn set16(hi: Reg, lo: Reg, value: Expr) -> Vec<Stmt> {
    if value.is_constant() {
        vec![
            assign(reg(hi), fold(value.clone() >> 8)),
            assign(reg(lo), fold(value & 0xFF)),
        ]
    } else {
        vec![
            var("val", value),
            assign(reg(hi), ident("val") >> 8),
            assign(reg(lo), ident("val") & 0xFF),
        ]
    }
}
