//! Block transfer, compare and I/O.
//!
//! Each instruction performs one step. The repeating forms end with an early
//! return that charges the extra 5 T-states while the counter (`BC`, or `B`
//! for `OTIR`) has not run out, so the dispatch loop re-executes them.

use super::{pair_value, read_mem, temp, tstates, write_mem};
use crate::flags::{F_BIT3, F_CARRY, F_HALFCARRY, F_NEGATIVE, F_PARITY, F_ZERO};
use crate::ir::{
    AssignOp, Expr, LogicalOp, Stmt, assign, assign_op, call, conditional, exec, if_else, if_then,
    logical, reg, ret,
};
use crate::operand::{Pair, Reg};

fn hl() -> Expr {
    pair_value(Pair::HL)
}

fn bc() -> Expr {
    pair_value(Pair::BC)
}

fn set_flag(mask: u8) -> Stmt {
    assign_op(AssignOp::Or, reg(Reg::F), mask)
}

fn clear_flag(mask: u8) -> Stmt {
    assign_op(AssignOp::And, reg(Reg::F), !Expr::from(mask))
}

/// `N` follows bit 7 of the byte transferred.
fn negative_from(test: Expr) -> Stmt {
    if_else(test, vec![set_flag(F_NEGATIVE)], vec![clear_flag(F_NEGATIVE)])
}

fn bit7_is_set() -> Expr {
    (temp() & 0x80).equals(0x80)
}

/// `if (cond) { tstates -= 5; return; }`
fn repeat_while(cond: Expr) -> Stmt {
    if_then(cond, vec![assign_op(AssignOp::Sub, tstates(), 5), ret()])
}

/// `b = dec8(b);`
fn dec_b() -> Stmt {
    assign(reg(Reg::B), call("dec8", vec![reg(Reg::B)]))
}

pub(super) fn ini() -> Vec<Stmt> {
    vec![
        assign(temp(), call("port.in_", vec![reg(Reg::C)])),
        write_mem(hl(), temp()),
        dec_b(),
        exec("incHL", Vec::new()),
        negative_from(bit7_is_set()),
    ]
}

/// One `OUTI`/`OUTD` step, without the `N` update.
fn out_step(step: &'static str) -> Vec<Stmt> {
    vec![
        assign(temp(), read_mem(hl())),
        exec("port.out", vec![reg(Reg::C), temp()]),
        dec_b(),
        exec(step, Vec::new()),
        if_else(
            (reg(Reg::L) + temp()).greater_than(255),
            vec![set_flag(F_CARRY), set_flag(F_HALFCARRY)],
            vec![clear_flag(F_CARRY), clear_flag(F_HALFCARRY)],
        ),
    ]
}

pub(super) fn outi() -> Vec<Stmt> {
    let mut stmts = out_step("incHL");
    stmts.push(negative_from(bit7_is_set()));
    stmts
}

pub(super) fn outd() -> Vec<Stmt> {
    let mut stmts = out_step("decHL");
    stmts.push(negative_from(bit7_is_set()));
    stmts
}

pub(super) fn otir() -> Vec<Stmt> {
    let mut stmts = out_step("incHL");
    stmts.push(negative_from((temp() & 0x80).not_equals(0)));
    stmts.push(repeat_while(reg(Reg::B).not_equals(0)));
    stmts
}

/// One `LDI`/`LDD` step; `de_step` and `hl_step` name the pointer primitives.
fn transfer(de_step: &'static str, hl_step: &'static str) -> Vec<Stmt> {
    let flags = reg(Reg::F) & 0xC1
        | conditional(bc(), F_PARITY, 0)
        | temp() & F_BIT3
        | conditional(temp() & F_NEGATIVE, 0x20, 0);
    vec![
        assign(temp(), read_mem(hl())),
        write_mem(pair_value(Pair::DE), temp()),
        exec("decBC", Vec::new()),
        exec(de_step, Vec::new()),
        exec(hl_step, Vec::new()),
        assign(temp(), (temp() + reg(Reg::A)) & 0xFF),
        assign(reg(Reg::F), flags),
    ]
}

pub(super) fn ldi() -> Vec<Stmt> {
    transfer("incDE", "incHL")
}

pub(super) fn ldd() -> Vec<Stmt> {
    transfer("decDE", "decHL")
}

pub(super) fn ldir() -> Vec<Stmt> {
    let mut stmts = ldi();
    stmts.push(repeat_while(bc().not_equals(0)));
    stmts
}

pub(super) fn lddr() -> Vec<Stmt> {
    let mut stmts = ldd();
    stmts.push(repeat_while(bc().not_equals(0)));
    stmts
}

/// `f = (f & 0xF8) | temp;`
fn merge_compare_flags() -> Stmt {
    assign(reg(Reg::F), (reg(Reg::F) & 0xF8) | temp())
}

/// `CPI` up to the final flag merge. `temp` carries the preserved carry,
/// `N`, and `P/V` from the updated `BC`.
fn compare_step() -> Vec<Stmt> {
    vec![
        assign(temp(), reg(Reg::F) & F_CARRY | F_NEGATIVE),
        exec("cp_a", vec![read_mem(hl())]),
        exec("decBC", Vec::new()),
        exec("incHL", Vec::new()),
        assign_op(
            AssignOp::Or,
            temp(),
            conditional(bc().equals(0), 0, F_PARITY),
        ),
    ]
}

pub(super) fn cpi() -> Vec<Stmt> {
    let mut stmts = compare_step();
    stmts.push(merge_compare_flags());
    stmts
}

pub(super) fn cpir() -> Vec<Stmt> {
    let mut stmts = compare_step();
    let more = logical(
        LogicalOp::And,
        (temp() & F_PARITY).not_equals(0),
        (reg(Reg::F) & F_ZERO).equals(0),
    );
    stmts.push(if_then(
        more,
        vec![
            assign_op(AssignOp::Sub, tstates(), 5),
            merge_compare_flags(),
            ret(),
        ],
    ));
    stmts.push(merge_compare_flags());
    stmts
}
