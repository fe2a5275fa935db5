//! Behavioural tests: fragments executed in the reference sandbox.
//!
//! Each test sets up machine state, runs the fragment for one instruction
//! and checks registers, memory and flags against the reference ALU.

use zilog_z80_ir::flags::{
    F_CARRY, F_HALFCARRY, F_NEGATIVE, F_PARITY, F_SIGN, F_ZERO,
};
use zilog_z80_ir::operand::{
    AluOp, AluSrc, BitOp, BitTarget, Cond, Index, Operand8, Pair, Port, Reg, ShiftOp, Src8,
    Src16,
};
use zilog_z80_ir::sandbox::alu::{self, AluResult};
use zilog_z80_ir::sandbox::{Access, Flow, Sandbox};
use zilog_z80_ir::{Instruction, Operands, Synth, SynthConfig};

/// Flags the grid compares; bits 3 and 5 are left out.
const DOCUMENTED: i32 = (F_SIGN | F_ZERO | F_HALFCARRY | F_PARITY | F_NEGATIVE | F_CARRY) as i32;

const WORDS: [i32; 5] = [0x0000, 0x0001, 0x7FFF, 0x8000, 0xFFFF];

fn synth() -> Synth {
    Synth::new(SynthConfig::default())
}

/// Synthesise, instantiate and execute one instruction.
fn step(sb: &mut Sandbox, insn: Instruction, operands: Operands) -> Flow {
    let fragment = synth()
        .template(&insn)
        .unwrap_or_else(|e| panic!("{insn:?} should synthesise: {e}"))
        .instantiate(&operands);
    sb.run(&fragment)
        .unwrap_or_else(|e| panic!("{insn:?} failed in the sandbox: {e}"))
}

fn exec(sb: &mut Sandbox, insn: Instruction) -> Flow {
    step(sb, insn, Operands::default())
}

/// Re-run a repeating block instruction until it falls through.
fn run_block(sb: &mut Sandbox, insn: Instruction) -> u32 {
    let mut iterations = 1;
    while exec(sb, insn) == Flow::Returned {
        iterations += 1;
        assert!(iterations < 0x1_0000, "{insn:?} never terminated");
    }
    iterations
}

// ---------------------------------------------------------------------------
// 16-bit carry arithmetic
// ---------------------------------------------------------------------------

fn carry_grid(insn: fn(Pair) -> Instruction, reference: fn(u16, u16, bool) -> (u16, u8)) {
    for src in [Pair::BC, Pair::DE, Pair::HL, Pair::SP] {
        for hl in WORDS {
            for operand in WORDS {
                for carry in [false, true] {
                    // ADC HL,HL can only ever see HL on both sides.
                    let operand = if src == Pair::HL { hl } else { operand };

                    let mut sb = Sandbox::new();
                    sb.set_pair(Pair::HL, hl);
                    sb.set_pair(src, operand);
                    sb.set_reg(Reg::F, i32::from(carry));

                    exec(&mut sb, insn(src));

                    let (value, flags) = reference(hl as u16, operand as u16, carry);
                    let context = format!("{src:?} hl={hl:#06X} rr={operand:#06X} c={carry}");
                    assert_eq!(sb.pair(Pair::HL), i32::from(value), "result, {context}");
                    assert_eq!(
                        sb.reg(Reg::F) & DOCUMENTED,
                        i32::from(flags) & DOCUMENTED,
                        "flags, {context}"
                    );
                }
            }
        }
    }
}

#[test]
fn test_adc16_matches_reference() {
    carry_grid(Instruction::Adc16, alu::adc16);
}

#[test]
fn test_sbc16_matches_reference() {
    carry_grid(Instruction::Sbc16, alu::sbc16);
}

#[test]
fn test_add_hl_half_carry() {
    let mut sb = Sandbox::new();
    sb.set_pair(Pair::HL, 0x0FFF);
    sb.set_pair(Pair::BC, 0x0001);
    sb.set_reg(Reg::F, i32::from(F_ZERO));
    exec(
        &mut sb,
        Instruction::Add16 {
            dst: Pair::HL,
            src: Pair::BC,
        },
    );
    assert_eq!(sb.pair(Pair::HL), 0x1000);
    assert_eq!(sb.reg(Reg::F), i32::from(F_ZERO | F_HALFCARRY));
}

#[test]
fn test_inc_dec_16_wrap() {
    let mut sb = Sandbox::new();
    sb.set_pair(Pair::BC, 0x00FF);
    exec(&mut sb, Instruction::Inc16(Pair::BC));
    assert_eq!(sb.pair(Pair::BC), 0x0100);

    sb.set_pair(Pair::DE, 0x0000);
    exec(&mut sb, Instruction::Dec16(Pair::DE));
    assert_eq!(sb.pair(Pair::DE), 0xFFFF);

    sb.set("sp", 0xFFFF);
    exec(&mut sb, Instruction::Inc16(Pair::SP));
    assert_eq!(sb.get("sp"), 0);
    exec(&mut sb, Instruction::Dec16(Pair::SP));
    assert_eq!(sb.get("sp"), 0xFFFF);
}

#[test]
fn test_ld_hl_from_memory_loads_low_byte_first() {
    let mut sb = Sandbox::new();
    sb.load(0x1234, &[0xCD, 0xAB]);
    step(
        &mut sb,
        Instruction::Ld16 {
            dst: Pair::HL,
            src: Src16::Direct,
        },
        Operands::value(0x1234),
    );
    assert_eq!(sb.reg(Reg::L), 0xCD);
    assert_eq!(sb.reg(Reg::H), 0xAB);
    assert_eq!(sb.writes(), 0);
}

// ---------------------------------------------------------------------------
// Rotate and shift group
// ---------------------------------------------------------------------------

fn reference_shift(op: ShiftOp, value: u8, carry: bool) -> AluResult {
    match op {
        ShiftOp::Rlc => alu::rlc8(value),
        ShiftOp::Rrc => alu::rrc8(value),
        ShiftOp::Rl => alu::rl8(value, carry),
        ShiftOp::Rr => alu::rr8(value, carry),
        ShiftOp::Sla => alu::sla8(value),
        ShiftOp::Sra => alu::sra8(value),
        ShiftOp::Sll => alu::sll8(value),
        ShiftOp::Srl => alu::srl8(value),
    }
}

#[test]
fn test_shift_register_touches_no_memory() {
    for op in ShiftOp::ALL {
        let mut sb = Sandbox::new();
        sb.set_reg(Reg::D, 0x81);
        sb.set_reg(Reg::F, i32::from(F_CARRY));
        exec(
            &mut sb,
            Instruction::Shift {
                op,
                target: Operand8::Reg(Reg::D),
            },
        );
        let expected = reference_shift(op, 0x81, true);
        assert_eq!(sb.reg(Reg::D), i32::from(expected.value), "{op:?}");
        assert_eq!(sb.reg(Reg::F), i32::from(expected.flags), "{op:?}");
        assert!(sb.accesses().is_empty(), "{op:?}");
    }
}

#[test]
fn test_shift_hl_reads_once_and_writes_once() {
    for op in ShiftOp::ALL {
        let mut sb = Sandbox::new();
        sb.set_pair(Pair::HL, 0x8000);
        sb.load(0x8000, &[0x41]);
        exec(
            &mut sb,
            Instruction::Shift {
                op,
                target: Operand8::Indirect,
            },
        );
        let expected = reference_shift(op, 0x41, false);
        assert_eq!(
            sb.accesses(),
            [Access::Read(0x8000), Access::Write(0x8000, expected.value)],
            "{op:?}"
        );
        assert_eq!(sb.reg(Reg::F), i32::from(expected.flags), "{op:?}");
    }
}

#[test]
fn test_shift_indexed_reads_once_and_writes_once() {
    for index in [Index::IX, Index::IY] {
        for op in ShiftOp::ALL {
            let mut sb = Sandbox::new();
            sb.set_pair(index.pair(), 0x9000);
            sb.load(0x8FFE, &[0xC3]);
            // Negative displacement.
            step(
                &mut sb,
                Instruction::ShiftIndexed {
                    op,
                    index,
                    mirror: None,
                },
                Operands::value(-2),
            );
            let expected = reference_shift(op, 0xC3, false);
            assert_eq!(sb.reads(), 1, "{index:?} {op:?}");
            assert_eq!(sb.writes(), 1, "{index:?} {op:?}");
            assert_eq!(sb.peek(0x8FFE), expected.value, "{index:?} {op:?}");
        }
    }
}

#[test]
fn test_shift_indexed_mirror_copies_the_result() {
    let mut sb = Sandbox::new();
    sb.set_pair(Pair::IX, 0x4000);
    sb.load(0x4010, &[0x02]);
    step(
        &mut sb,
        Instruction::ShiftIndexed {
            op: ShiftOp::Srl,
            index: Index::IX,
            mirror: Some(Reg::E),
        },
        Operands::value(0x10),
    );
    assert_eq!(sb.reg(Reg::E), 0x01);
    assert_eq!(sb.peek(0x4010), 0x01);
    assert_eq!(sb.writes(), 1);
}

#[test]
fn test_indexed_address_wraps_at_64k() {
    let mut sb = Sandbox::new();
    sb.set_pair(Pair::IY, 0xFFFF);
    sb.load(0x0001, &[0x00]);
    step(
        &mut sb,
        Instruction::Bit {
            op: BitOp::Set,
            bit: 7,
            target: BitTarget::Indexed(Index::IY),
        },
        Operands::value(2),
    );
    assert_eq!(sb.peek(0x0001), 0x80);
}

#[test]
fn test_res_hl_writes_back_through_hl() {
    let mut sb = Sandbox::new();
    sb.set_pair(Pair::HL, 0xC000);
    sb.load(0xC000, &[0xFF]);
    exec(
        &mut sb,
        Instruction::Bit {
            op: BitOp::Reset,
            bit: 1,
            target: BitTarget::Indirect,
        },
    );
    assert_eq!(sb.peek(0xC000), 0xFD);
}

#[test]
fn test_bit_sets_zero_for_a_clear_bit() {
    let mut sb = Sandbox::new();
    sb.set_reg(Reg::H, 0x7F);
    exec(
        &mut sb,
        Instruction::Bit {
            op: BitOp::Test,
            bit: 7,
            target: BitTarget::Reg(Reg::H),
        },
    );
    assert_ne!(sb.reg(Reg::F) & i32::from(F_ZERO), 0);
}

// ---------------------------------------------------------------------------
// Accumulator ALU
// ---------------------------------------------------------------------------

#[test]
fn test_every_alu_op_reads_hl_once() {
    for op in AluOp::ALL {
        let mut sb = Sandbox::new();
        sb.set_reg(Reg::A, 0x3C);
        sb.set_pair(Pair::HL, 0x8000);
        sb.load(0x8000, &[0x0F]);
        exec(
            &mut sb,
            Instruction::Alu {
                op,
                src: AluSrc::Indirect(Pair::HL),
            },
        );
        let expected = match op {
            AluOp::Add | AluOp::Adc => 0x4B,
            AluOp::Sub | AluOp::Sbc => 0x2D,
            AluOp::And => 0x0C,
            AluOp::Xor => 0x33,
            AluOp::Or => 0x3F,
            AluOp::Cp => 0x3C,
        };
        assert_eq!(sb.reg(Reg::A), expected, "{op:?}");
        assert_eq!(sb.accesses(), [Access::Read(0x8000)], "{op:?}");
    }
}

#[test]
fn test_xor_a_clears_accumulator() {
    let mut sb = Sandbox::new();
    sb.set_reg(Reg::A, 0x5A);
    exec(
        &mut sb,
        Instruction::Alu {
            op: AluOp::Xor,
            src: AluSrc::Reg(Reg::A),
        },
    );
    assert_eq!(sb.reg(Reg::A), 0);
    assert_eq!(sb.reg(Reg::F), i32::from(F_ZERO | F_PARITY));
}

#[test]
fn test_and_indexed_uses_the_displacement() {
    let mut sb = Sandbox::new();
    sb.set_reg(Reg::A, 0xF0);
    sb.set_pair(Pair::IX, 0x5000);
    sb.load(0x5003, &[0x3C]);
    step(
        &mut sb,
        Instruction::Alu {
            op: AluOp::And,
            src: AluSrc::Indexed(Index::IX),
        },
        Operands::value(3),
    );
    assert_eq!(sb.reg(Reg::A), 0x30);
    assert_ne!(sb.reg(Reg::F) & i32::from(F_HALFCARRY), 0);
}

#[test]
fn test_neg() {
    let mut sb = Sandbox::new();
    sb.set_reg(Reg::A, 0x01);
    exec(&mut sb, Instruction::Neg);
    assert_eq!(sb.reg(Reg::A), 0xFF);
    assert_ne!(sb.reg(Reg::F) & i32::from(F_CARRY), 0);
}

#[test]
fn test_scf_then_ccf() {
    let mut sb = Sandbox::new();
    exec(&mut sb, Instruction::Scf);
    assert_ne!(sb.reg(Reg::F) & i32::from(F_CARRY), 0);
    exec(&mut sb, Instruction::Ccf);
    assert_eq!(sb.reg(Reg::F) & i32::from(F_CARRY), 0);
    assert_ne!(sb.reg(Reg::F) & i32::from(F_HALFCARRY), 0);
}

#[test]
fn test_ld_a_i_copies_iff2_into_parity() {
    let mut sb = Sandbox::new();
    sb.set_reg(Reg::I, 0x80);
    sb.set("iff2", 1);
    exec(
        &mut sb,
        Instruction::Ld8 {
            dst: Reg::A,
            src: Src8::Reg(Reg::I),
        },
    );
    assert_eq!(sb.reg(Reg::A), 0x80);
    assert_eq!(sb.reg(Reg::F), i32::from(F_SIGN | F_PARITY));
}

// ---------------------------------------------------------------------------
// Control transfer and banking
// ---------------------------------------------------------------------------

#[test]
fn test_banked_call_pushes_paged_return_address() {
    let mut sb = Sandbox::new();
    sb.set("sp", 0xDFF0);
    sb.set("page", 1);
    let flow = step(&mut sb, Instruction::Call(None), Operands::branch(0x50, 0x203));
    assert_eq!(flow, Flow::Returned);
    assert_eq!(sb.get("pc"), 0x50);
    assert_eq!(sb.get("sp"), 0xDFEE);
    assert_eq!(sb.peek(0xDFEE), 0x03);
    assert_eq!(sb.peek(0xDFEF), 0x42);

    let flow = exec(&mut sb, Instruction::Ret(None));
    assert_eq!(flow, Flow::Returned);
    assert_eq!(sb.get("pc"), 0x4203);
    assert_eq!(sb.get("sp"), 0xDFF0);
}

#[test]
fn test_conditional_call_charges_extra_tstates_when_taken() {
    let mut sb = Sandbox::new();
    sb.set("sp", 0xDFF0);
    sb.set("tstates", 100);

    let flow = step(&mut sb, Instruction::Call(Some(Cond::Z)), Operands::branch(0x50, 0x203));
    assert_eq!(flow, Flow::Continue);
    assert_eq!(sb.get("tstates"), 100);

    sb.set_reg(Reg::F, i32::from(F_ZERO));
    let flow = step(&mut sb, Instruction::Call(Some(Cond::Z)), Operands::branch(0x50, 0x203));
    assert_eq!(flow, Flow::Returned);
    assert_eq!(sb.get("tstates"), 93);
    assert_eq!(sb.get("pc"), 0x50);
}

#[test]
fn test_jr_stays_in_the_current_page() {
    let mut sb = Sandbox::new();
    sb.set("page", 2);
    let flow = step(&mut sb, Instruction::Jr(None), Operands::branch(0x4120, 0x4102));
    assert_eq!(flow, Flow::Returned);
    assert_eq!(sb.get("pc"), 0x8120);
}

#[test]
fn test_jr_nz_falls_through_on_zero() {
    let mut sb = Sandbox::new();
    sb.set_reg(Reg::F, i32::from(F_ZERO));
    let flow = step(&mut sb, Instruction::Jr(Some(Cond::NZ)), Operands::branch(0x10, 0x02));
    assert_eq!(flow, Flow::Continue);
}

#[test]
fn test_djnz_counts_down() {
    let mut sb = Sandbox::new();
    sb.set_reg(Reg::B, 2);
    sb.set("tstates", 50);
    let branch = Operands::branch(0x0000, 0x0002);
    assert_eq!(step(&mut sb, Instruction::Djnz, branch), Flow::Returned);
    assert_eq!(sb.get("tstates"), 45);
    assert_eq!(step(&mut sb, Instruction::Djnz, branch), Flow::Continue);
    assert_eq!(sb.reg(Reg::B), 0);
}

#[test]
fn test_rst_jumps_to_the_vector() {
    let mut sb = Sandbox::new();
    sb.set("sp", 0x8000);
    let flow = step(&mut sb, Instruction::Rst(0x38), Operands::branch(0, 0x1235));
    assert_eq!(flow, Flow::Returned);
    assert_eq!(sb.get("pc"), 0x38);
    assert_eq!(sb.peek(0x7FFE), 0x35);
}

#[test]
fn test_halt_stays_on_the_instruction() {
    let mut sb = Sandbox::new();
    sb.set("tstates", 1000);
    let flow = step(&mut sb, Instruction::Halt, Operands::branch(0, 0x0105));
    assert_eq!(flow, Flow::Returned);
    assert_eq!(sb.get("halt"), 1);
    assert_eq!(sb.get("pc"), 0x0104);
    assert_eq!(sb.get("tstates"), 0);
}

#[test]
fn test_retn_restores_iff1() {
    let mut sb = Sandbox::new();
    sb.set("sp", 0x8000);
    sb.load(0x8000, &[0x34, 0x12]);
    sb.set("iff2", 1);
    assert_eq!(exec(&mut sb, Instruction::RetnReti), Flow::Continue);
    assert_eq!(sb.get("pc"), 0x1234);
    assert_eq!(sb.get("iff1"), 1);
}

#[test]
fn test_di_ei() {
    let mut sb = Sandbox::new();
    exec(&mut sb, Instruction::Ei);
    assert_eq!((sb.get("iff1"), sb.get("iff2"), sb.get("EI_inst")), (1, 1, 1));
    exec(&mut sb, Instruction::Di);
    assert_eq!((sb.get("iff1"), sb.get("iff2")), (0, 0));
}

// ---------------------------------------------------------------------------
// Stack and exchange
// ---------------------------------------------------------------------------

#[test]
fn test_push_pop_round_trip() {
    let mut sb = Sandbox::new();
    sb.set("sp", 0xFFF0);
    sb.set_pair(Pair::DE, 0xBEEF);
    exec(&mut sb, Instruction::Push(Pair::DE));
    exec(&mut sb, Instruction::Pop(Pair::IY));
    assert_eq!(sb.pair(Pair::IY), 0xBEEF);
    assert_eq!(sb.get("sp"), 0xFFF0);
}

#[test]
fn test_ex_sp_ix_swaps_with_the_stack() {
    let mut sb = Sandbox::new();
    sb.set("sp", 0x8000);
    sb.load(0x8000, &[0x78, 0x56]);
    sb.set_pair(Pair::IX, 0x1234);
    exec(&mut sb, Instruction::ExSp(Pair::IX));
    assert_eq!(sb.pair(Pair::IX), 0x5678);
    assert_eq!(sb.peek(0x8000), 0x34);
    assert_eq!(sb.peek(0x8001), 0x12);
}

#[test]
fn test_ex_sp_hl_swaps_with_the_stack() {
    let mut sb = Sandbox::new();
    sb.set("sp", 0x8000);
    sb.load(0x8000, &[0x78, 0x56]);
    sb.set_pair(Pair::HL, 0x1234);
    exec(&mut sb, Instruction::ExSp(Pair::HL));
    assert_eq!(sb.pair(Pair::HL), 0x5678);
    assert_eq!(sb.peek(0x8000), 0x34);
    assert_eq!(sb.peek(0x8001), 0x12);
}

#[test]
fn test_exx_twice_is_identity() {
    let mut sb = Sandbox::new();
    sb.set_pair(Pair::BC, 0x1111);
    sb.set("h2", 0x22);
    exec(&mut sb, Instruction::Exx);
    assert_eq!(sb.reg(Reg::H), 0x22);
    assert_eq!(sb.get("b2"), 0x11);
    exec(&mut sb, Instruction::Exx);
    assert_eq!(sb.pair(Pair::BC), 0x1111);
}

// ---------------------------------------------------------------------------
// Block instructions and I/O
// ---------------------------------------------------------------------------

#[test]
fn test_ldi_parity_tracks_bc() {
    let mut sb = Sandbox::new();
    sb.set_pair(Pair::HL, 0x8000);
    sb.set_pair(Pair::DE, 0x9000);
    sb.set_pair(Pair::BC, 2);
    sb.load(0x8000, &[0x55, 0x66]);

    assert_eq!(exec(&mut sb, Instruction::Ldi), Flow::Continue);
    assert_eq!(sb.peek(0x9000), 0x55);
    assert_eq!(sb.pair(Pair::HL), 0x8001);
    assert_eq!(sb.pair(Pair::DE), 0x9001);
    assert_ne!(sb.reg(Reg::F) & i32::from(F_PARITY), 0);

    exec(&mut sb, Instruction::Ldi);
    assert_eq!(sb.pair(Pair::BC), 0);
    assert_eq!(sb.reg(Reg::F) & i32::from(F_PARITY), 0);
}

#[test]
fn test_ldir_copies_the_block() {
    let mut sb = Sandbox::new();
    sb.set_pair(Pair::HL, 0x8000);
    sb.set_pair(Pair::DE, 0x9000);
    sb.set_pair(Pair::BC, 3);
    sb.set("tstates", 100);
    sb.load(0x8000, &[1, 2, 3]);

    assert_eq!(run_block(&mut sb, Instruction::Ldir), 3);
    assert_eq!([sb.peek(0x9000), sb.peek(0x9001), sb.peek(0x9002)], [1, 2, 3]);
    assert_eq!(sb.get("tstates"), 90);
}

#[test]
fn test_lddr_copies_backwards() {
    let mut sb = Sandbox::new();
    sb.set_pair(Pair::HL, 0x8002);
    sb.set_pair(Pair::DE, 0x9002);
    sb.set_pair(Pair::BC, 3);
    sb.load(0x8000, &[7, 8, 9]);

    assert_eq!(run_block(&mut sb, Instruction::Lddr), 3);
    assert_eq!([sb.peek(0x9000), sb.peek(0x9001), sb.peek(0x9002)], [7, 8, 9]);
    assert_eq!(sb.pair(Pair::HL), 0x7FFF);
}

#[test]
fn test_ldd_steps_both_pointers_down() {
    let mut sb = Sandbox::new();
    sb.set_pair(Pair::HL, 0x8001);
    sb.set_pair(Pair::DE, 0x9001);
    sb.set_pair(Pair::BC, 1);
    sb.load(0x8001, &[0x0A]);

    assert_eq!(exec(&mut sb, Instruction::Ldd), Flow::Continue);
    assert_eq!(sb.peek(0x9001), 0x0A);
    assert_eq!(sb.pair(Pair::HL), 0x8000);
    assert_eq!(sb.pair(Pair::DE), 0x9000);
    assert_eq!(sb.pair(Pair::BC), 0);
    // Bits 3 and 5 come from A + byte; P/V clears with BC.
    assert_eq!(sb.reg(Reg::F), 0x28);
}

#[test]
fn test_cpi_merges_the_saved_carry() {
    let mut sb = Sandbox::new();
    sb.set_reg(Reg::A, 0x10);
    sb.set_reg(Reg::F, i32::from(F_CARRY));
    sb.set_pair(Pair::HL, 0x8000);
    sb.set_pair(Pair::BC, 2);
    sb.load(0x8000, &[0x10, 0x20]);

    assert_eq!(exec(&mut sb, Instruction::Cpi), Flow::Continue);
    assert_eq!(sb.pair(Pair::HL), 0x8001);
    assert_eq!(sb.pair(Pair::BC), 1);
    assert_eq!(
        sb.reg(Reg::F),
        i32::from(F_ZERO | F_PARITY | F_NEGATIVE | F_CARRY)
    );

    // The compare borrows, but C keeps its value from before the step.
    sb.set_reg(Reg::F, 0);
    exec(&mut sb, Instruction::Cpi);
    assert_eq!(sb.pair(Pair::BC), 0);
    assert_eq!(sb.reg(Reg::F), i32::from(F_SIGN | F_NEGATIVE) | 0x20);
}

#[test]
fn test_outi_moves_up_and_clears_carry() {
    let mut sb = Sandbox::new();
    sb.set_pair(Pair::HL, 0x80FF);
    sb.set_reg(Reg::B, 1);
    sb.set_reg(Reg::C, 0x10);
    sb.set_reg(Reg::F, i32::from(F_CARRY | F_HALFCARRY | F_NEGATIVE));
    sb.load(0x80FF, &[0x01]);

    exec(&mut sb, Instruction::Outi);
    assert_eq!(sb.outputs(), [(0x10, 0x01)]);
    assert_eq!(sb.pair(Pair::HL), 0x8100);
    assert_eq!(sb.reg(Reg::B), 0);
    let f = sb.reg(Reg::F);
    assert_eq!(f & i32::from(F_CARRY | F_HALFCARRY | F_NEGATIVE), 0);
    assert_ne!(f & i32::from(F_ZERO), 0);
}

#[test]
fn test_outd_moves_down_and_tracks_carry() {
    let mut sb = Sandbox::new();
    sb.set_pair(Pair::HL, 0x80F0);
    sb.set_reg(Reg::B, 3);
    sb.set_reg(Reg::C, 0x10);
    sb.load(0x80EF, &[0x90, 0x20]);

    // L after the step is 0xEF, and 0xEF + 0x20 overflows a byte.
    exec(&mut sb, Instruction::Outd);
    assert_eq!(sb.pair(Pair::HL), 0x80EF);
    assert_eq!(sb.reg(Reg::B), 2);
    let f = sb.reg(Reg::F);
    assert_eq!(f & i32::from(F_CARRY | F_HALFCARRY), i32::from(F_CARRY | F_HALFCARRY));
    assert_eq!(f & i32::from(F_NEGATIVE), 0);

    // 0xEE + 0x90 overflows too; bit 7 of the byte sets N.
    exec(&mut sb, Instruction::Outd);
    assert_eq!(sb.pair(Pair::HL), 0x80EE);
    assert_ne!(sb.reg(Reg::F) & i32::from(F_NEGATIVE), 0);

    sb.set_pair(Pair::HL, 0x8010);
    sb.load(0x8010, &[0x40]);
    exec(&mut sb, Instruction::Outd);
    assert_eq!(sb.reg(Reg::F) & i32::from(F_CARRY | F_HALFCARRY), 0);
    assert_eq!(sb.outputs(), [(0x10, 0x20), (0x10, 0x90), (0x10, 0x40)]);
}

#[test]
fn test_cpir_stops_on_match() {
    let mut sb = Sandbox::new();
    sb.set_reg(Reg::A, 0x33);
    sb.set_pair(Pair::HL, 0x8000);
    sb.set_pair(Pair::BC, 4);
    sb.load(0x8000, &[0x11, 0x22, 0x33, 0x44]);

    assert_eq!(run_block(&mut sb, Instruction::Cpir), 3);
    assert_eq!(sb.pair(Pair::HL), 0x8003);
    assert_eq!(sb.pair(Pair::BC), 1);
    let f = sb.reg(Reg::F);
    assert_ne!(f & i32::from(F_ZERO), 0);
    assert_ne!(f & i32::from(F_PARITY), 0);
    assert_ne!(f & i32::from(F_NEGATIVE), 0);
}

#[test]
fn test_otir_drains_the_buffer() {
    let mut sb = Sandbox::new();
    sb.set_pair(Pair::HL, 0x8000);
    sb.set_reg(Reg::B, 2);
    sb.set_reg(Reg::C, 0xBE);
    sb.load(0x8000, &[0x81, 0x02]);

    assert_eq!(run_block(&mut sb, Instruction::Otir), 2);
    assert_eq!(sb.outputs(), [(0xBE, 0x81), (0xBE, 0x02)]);
    assert_eq!(sb.reg(Reg::B), 0);
    assert_eq!(sb.pair(Pair::HL), 0x8002);
}

#[test]
fn test_ini_stores_the_port_byte() {
    let mut sb = Sandbox::new();
    sb.set_pair(Pair::HL, 0xC000);
    sb.set_reg(Reg::B, 1);
    sb.set_reg(Reg::C, 0x7F);
    sb.set_port(0x7F, 0x80);
    exec(&mut sb, Instruction::Ini);
    assert_eq!(sb.peek(0xC000), 0x80);
    assert_eq!(sb.pair(Pair::HL), 0xC001);
    assert_ne!(sb.reg(Reg::F) & i32::from(F_NEGATIVE), 0);
}

#[test]
fn test_in_r_c_sets_flags_from_the_byte() {
    let mut sb = Sandbox::new();
    sb.set_reg(Reg::C, 0x10);
    sb.set_port(0x10, 0x00);
    sb.set_reg(Reg::F, i32::from(F_CARRY));
    exec(
        &mut sb,
        Instruction::In {
            dst: Reg::B,
            port: Port::Reg(Reg::C),
        },
    );
    assert_eq!(sb.reg(Reg::B), 0);
    assert_eq!(sb.reg(Reg::F), i32::from(F_CARRY | F_ZERO | F_PARITY));
}
