//! Jumps, calls and returns.
//!
//! A taken branch always ends the fragment with `return;` once `pc` has been
//! rewritten. An untaken conditional falls through with no other effect.
//! Relative targets and return addresses are reduced into the page window
//! and re-based on the `page` live when the fragment runs.

use super::{flag_test, paged, pair_value, pc, read_mem_word, sp, target, tstates};
use crate::error::SynthError;
use crate::ir::{
    AssignOp, Expr, Hole, Operand, Stmt, assign, assign_op, exec, ident, if_then, not, num, reg,
    ret as return_,
};
use crate::operand::{Cond, Pair, Reg};

/// `JR` conditions read `(f & mask) != 0`, negated for the flag-clear forms.
fn relative_test(cond: Cond) -> Expr {
    let set = (reg(Reg::F) & cond.mask()).not_equals(0);
    if cond.when_set() { set } else { not(set) }
}

/// Taken-branch body of `JR`/`DJNZ`.
fn relative_jump() -> Vec<Stmt> {
    vec![
        assign_op(AssignOp::Sub, tstates(), 5),
        assign(pc(), paged(Hole::new(Operand::Target))),
        return_(),
    ]
}

fn push_return_address() -> Stmt {
    exec("push1", vec![paged(Hole::new(Operand::NextAddress))])
}

/// `pc = readMemWord(sp); sp += 2;`
fn pop_pc() -> [Stmt; 2] {
    [
        assign(pc(), read_mem_word(sp())),
        assign_op(AssignOp::Add, sp(), 2),
    ]
}

pub(super) fn jr(cond: Option<Cond>, family: &'static str) -> Result<Vec<Stmt>, SynthError> {
    match cond {
        None => Ok(relative_jump()),
        Some(c) if c.is_relative() => Ok(vec![if_then(relative_test(c), relative_jump())]),
        Some(c) => Err(SynthError::unsupported(family, c)),
    }
}

pub(super) fn djnz() -> Vec<Stmt> {
    vec![
        assign(reg(Reg::B), (reg(Reg::B) - 1) & 0xFF),
        if_then(reg(Reg::B).not_equals(0), relative_jump()),
    ]
}

pub(super) fn jp(cond: Option<Cond>) -> Vec<Stmt> {
    let body = vec![assign(pc(), target()), return_()];
    match cond {
        None => body,
        Some(c) => vec![if_then(flag_test(c), body)],
    }
}

pub(super) fn jp_indirect(pair: Pair, family: &'static str) -> Result<Vec<Stmt>, SynthError> {
    match pair {
        Pair::HL | Pair::IX | Pair::IY => Ok(vec![assign(pc(), pair_value(pair)), return_()]),
        _ => Err(SynthError::unsupported(family, pair)),
    }
}

pub(super) fn call(cond: Option<Cond>) -> Vec<Stmt> {
    match cond {
        None => vec![push_return_address(), assign(pc(), target()), return_()],
        Some(c) => vec![if_then(
            flag_test(c),
            vec![
                assign_op(AssignOp::Sub, tstates(), 7),
                push_return_address(),
                assign(pc(), target()),
                return_(),
            ],
        )],
    }
}

pub(super) fn rst(vector: u16, family: &'static str) -> Result<Vec<Stmt>, SynthError> {
    if vector & !0x38 != 0 {
        return Err(SynthError::unsupported(family, vector));
    }
    Ok(vec![
        push_return_address(),
        assign(pc(), num(i32::from(vector))),
        return_(),
    ])
}

pub(super) fn ret(cond: Option<Cond>) -> Vec<Stmt> {
    match cond {
        None => {
            let mut stmts = pop_pc().to_vec();
            stmts.push(return_());
            stmts
        }
        Some(c) => {
            let mut body = vec![assign_op(AssignOp::Sub, tstates(), 6)];
            body.extend(pop_pc());
            body.push(return_());
            vec![if_then(flag_test(c), body)]
        }
    }
}

/// `RETN`/`RETI` restore `iff1` and let the caller's loop pick up the new
/// `pc` on the next step.
pub(super) fn retn_reti() -> Vec<Stmt> {
    let mut stmts = pop_pc().to_vec();
    stmts.push(assign(ident("iff1"), ident("iff2")));
    stmts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(stmts: &[Stmt]) -> String {
        stmts.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn jr_nz_negates_the_flag_test() {
        let stmts = jr(Some(Cond::NZ), "JRNZ").expect("valid");
        assert_eq!(
            render(&stmts),
            "if (!((f & 64) != 0))\n{\n  tstates -= 5;\n  pc = (($target % 0x4000) + (page * 16384));\n  return;\n}\n"
        );
    }

    #[test]
    fn jr_only_takes_zero_and_carry_conditions() {
        assert!(jr(Some(Cond::PE), "JR").is_err());
    }

    #[test]
    fn rst_vectors_are_multiples_of_eight() {
        assert!(rst(0x38, "RST").is_ok());
        assert!(rst(0x39, "RST").is_err());
        assert!(rst(0x40, "RST").is_err());
    }

    #[test]
    fn jp_hl_returns() {
        let stmts = jp_indirect(Pair::HL, "JP_X").expect("valid");
        assert_eq!(render(&stmts), "pc = getHL();\nreturn;\n");
        assert!(jp_indirect(Pair::BC, "JP_X").is_err());
    }

    #[test]
    fn retn_has_no_early_return() {
        let stmts = retn_reti();
        assert!(!stmts.iter().any(|s| matches!(s, Stmt::Return(_))));
    }
}
