//! Port I/O.

use super::{szp, value};
use crate::flags::F_CARRY;
use crate::ir::{Stmt, assign, call, exec, reg};
use crate::operand::{Port, Reg};

pub(super) fn input(dst: Reg, port: Port) -> Vec<Stmt> {
    match port {
        Port::Imm => vec![assign(reg(dst), call("port.in_", vec![value()]))],
        // IN r,(C) also updates S, Z and P from the byte read.
        Port::Reg(r) => vec![
            assign(reg(dst), call("port.in_", vec![reg(r)])),
            assign(reg(Reg::F), reg(Reg::F) & F_CARRY | szp(dst)),
        ],
    }
}

pub(super) fn output(port: Port, src: Reg) -> Vec<Stmt> {
    let port = match port {
        Port::Imm => value(),
        Port::Reg(r) => reg(r),
    };
    vec![exec("port.out", vec![port, reg(src)])]
}
