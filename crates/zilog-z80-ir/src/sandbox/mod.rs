//! Reference interpreter for synthesised fragments.
//!
//! Executes a [`Fragment`] against a flat register file and 64K of memory
//! with JavaScript `int32` semantics: every value is an `i32`, comparisons
//! yield 0 or 1, `&&`/`||` return one of their operands and any non-zero
//! value is truthy. Registers are not masked on store; the fragments do
//! their own masking and the interpreter must not hide a missing one.
//!
//! The primitives (`readMem`, `add_a`, `push1`, `rlc`, ...) are implemented
//! on top of [`alu`]. Memory traffic is logged so tests can count reads and
//! writes per instruction.

pub mod alu;

use std::collections::HashMap;
use std::fmt;
use std::ops::ControlFlow;

use crate::flags::{F_CARRY, F_PARITY, F_SIGN, F_ZERO, SZ_TABLE, SZP_TABLE, sz, szp};
use crate::ir::{AssignOp, BinaryOp, Expr, Hole, LiteralValue, LogicalOp, Stmt, UnaryOp};
use crate::operand::{Pair, Reg};
use crate::template::Fragment;

use self::alu::AluResult;

const MEMORY_SIZE: usize = 0x1_0000;

/// Pairs reachable through `get<PAIR>()`/`set<PAIR>()`.
const CALLABLE_PAIRS: [Pair; 6] = [Pair::AF, Pair::BC, Pair::DE, Pair::HL, Pair::IX, Pair::IY];

/// One memory access made by a primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read(u16),
    Write(u16, u8),
}

/// How a fragment finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Ran off the end; execution continues with the next instruction.
    Continue,
    /// Hit a `return`; control has been transferred.
    Returned,
}

/// Fragment the interpreter cannot execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SandboxError {
    /// A hole survived instantiation.
    UnfilledHole(Hole),
    /// Call to a name that is not a known primitive.
    UnknownPrimitive(&'static str),
    /// Primitive called with the wrong number of arguments.
    Arity {
        name: &'static str,
        expected: usize,
        got: usize,
    },
    /// Indexing something other than `SZ_TABLE` or `SZP_TABLE`.
    UnknownTable(String),
    /// Assignment to something other than a register or identifier.
    InvalidTarget(String),
}

impl fmt::Display for SandboxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnfilledHole(hole) => write!(f, "unfilled hole {hole:?}"),
            Self::UnknownPrimitive(name) => write!(f, "unknown primitive {name}"),
            Self::Arity {
                name,
                expected,
                got,
            } => write!(f, "{name} takes {expected} arguments, got {got}"),
            Self::UnknownTable(table) => write!(f, "unknown lookup table {table}"),
            Self::InvalidTarget(target) => write!(f, "cannot assign to {target}"),
        }
    }
}

impl std::error::Error for SandboxError {}

/// Machine state a fragment runs against.
pub struct Sandbox {
    vars: HashMap<&'static str, i32>,
    memory: Vec<u8>,
    accesses: Vec<Access>,
    ports: HashMap<u8, u8>,
    outputs: Vec<(u8, u8)>,
    /// Value `rndInt` hands back, masked to its bound.
    pub random: i32,
}

impl Default for Sandbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Sandbox {
    /// Zeroed registers and memory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            vars: HashMap::new(),
            memory: vec![0; MEMORY_SIZE],
            accesses: Vec::new(),
            ports: HashMap::new(),
            outputs: Vec::new(),
            random: 0,
        }
    }

    // ---------------------------------------------------------------------
    // State access
    // ---------------------------------------------------------------------

    /// Named variable (`sp`, `pc`, `page`, `temp`, `a2`, ...). Unset names read as 0.
    #[must_use]
    pub fn get(&self, name: &str) -> i32 {
        self.vars.get(name).copied().unwrap_or(0)
    }

    pub fn set(&mut self, name: &'static str, value: i32) {
        self.vars.insert(name, value);
    }

    #[must_use]
    pub fn reg(&self, r: Reg) -> i32 {
        self.get(r.name())
    }

    pub fn set_reg(&mut self, r: Reg, value: i32) {
        self.set(r.name(), value);
    }

    #[must_use]
    pub fn pair(&self, pair: Pair) -> i32 {
        match pair.halves() {
            Some((hi, lo)) => (self.reg(hi) << 8) | self.reg(lo),
            None => self.get("sp"),
        }
    }

    pub fn set_pair(&mut self, pair: Pair, value: i32) {
        match pair.halves() {
            Some((hi, lo)) => {
                self.set_reg(hi, (value >> 8) & 0xFF);
                self.set_reg(lo, value & 0xFF);
            }
            None => self.set("sp", value),
        }
    }

    /// Copy bytes into memory without logging.
    pub fn load(&mut self, addr: u16, bytes: &[u8]) {
        for (offset, byte) in bytes.iter().enumerate() {
            self.memory[(usize::from(addr) + offset) & 0xFFFF] = *byte;
        }
    }

    #[must_use]
    pub fn peek(&self, addr: u16) -> u8 {
        self.memory[usize::from(addr)]
    }

    #[must_use]
    pub fn accesses(&self) -> &[Access] {
        &self.accesses
    }

    /// Number of logged reads.
    #[must_use]
    pub fn reads(&self) -> usize {
        self.accesses
            .iter()
            .filter(|a| matches!(a, Access::Read(_)))
            .count()
    }

    /// Number of logged writes.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.accesses
            .iter()
            .filter(|a| matches!(a, Access::Write(..)))
            .count()
    }

    pub fn clear_accesses(&mut self) {
        self.accesses.clear();
    }

    /// Byte returned by `port.in_` for `port`. Unset ports read 0xFF.
    pub fn set_port(&mut self, port: u8, value: u8) {
        self.ports.insert(port, value);
    }

    /// `(port, value)` pairs written by `port.out`, in order.
    #[must_use]
    pub fn outputs(&self) -> &[(u8, u8)] {
        &self.outputs
    }

    // ---------------------------------------------------------------------
    // Execution
    // ---------------------------------------------------------------------

    /// Execute every statement of `fragment` in order.
    pub fn run(&mut self, fragment: &Fragment) -> Result<Flow, SandboxError> {
        match self.block(fragment.stmts())? {
            ControlFlow::Break(()) => Ok(Flow::Returned),
            ControlFlow::Continue(()) => Ok(Flow::Continue),
        }
    }

    fn block(&mut self, stmts: &[Stmt]) -> Result<ControlFlow<()>, SandboxError> {
        for stmt in stmts {
            if self.stmt(stmt)?.is_break() {
                return Ok(ControlFlow::Break(()));
            }
        }
        Ok(ControlFlow::Continue(()))
    }

    fn stmt(&mut self, stmt: &Stmt) -> Result<ControlFlow<()>, SandboxError> {
        match stmt {
            Stmt::Expr(expr) => {
                self.eval(expr)?;
            }
            Stmt::Assign(op, target, value) => {
                let name = assign_target(target)?;
                let rhs = self.eval(value)?;
                let current = self.get(name);
                let result = match op {
                    AssignOp::Assign => rhs,
                    AssignOp::Add => current.wrapping_add(rhs),
                    AssignOp::Sub => current.wrapping_sub(rhs),
                    AssignOp::And => current & rhs,
                    AssignOp::Or => current | rhs,
                    AssignOp::Xor => current ^ rhs,
                };
                self.set(name, result);
            }
            Stmt::VarDecl(name, init) => {
                let value = self.eval(init)?;
                self.set(*name, value);
            }
            Stmt::Block(body) => return self.block(body),
            Stmt::If(test, then, otherwise) => {
                if self.eval(test)? != 0 {
                    return self.stmt(then);
                }
                if let Some(otherwise) = otherwise {
                    return self.stmt(otherwise);
                }
            }
            Stmt::Return(value) => {
                if let Some(value) = value {
                    self.eval(value)?;
                }
                return Ok(ControlFlow::Break(()));
            }
        }
        Ok(ControlFlow::Continue(()))
    }

    fn eval(&mut self, expr: &Expr) -> Result<i32, SandboxError> {
        let value = match expr {
            Expr::Literal(lit) => match lit.value {
                LiteralValue::Num(n) => n,
                LiteralValue::Bool(b) => i32::from(b),
            },
            Expr::Ident(name) => self.get(name),
            Expr::Register(r) => self.reg(*r),
            Expr::Hole(h) => return Err(SandboxError::UnfilledHole(*h)),
            Expr::Binary(op, lhs, rhs) => {
                let l = self.eval(lhs)?;
                let r = self.eval(rhs)?;
                binary(*op, l, r)
            }
            Expr::Unary(op, arg) => {
                let v = self.eval(arg)?;
                match op {
                    UnaryOp::Not => i32::from(v == 0),
                    UnaryOp::BitNot => !v,
                }
            }
            Expr::Logical(op, lhs, rhs) => {
                let l = self.eval(lhs)?;
                match op {
                    LogicalOp::And if l == 0 => l,
                    LogicalOp::Or if l != 0 => l,
                    _ => self.eval(rhs)?,
                }
            }
            Expr::Conditional(test, consequent, alternate) => {
                if self.eval(test)? != 0 {
                    self.eval(consequent)?
                } else {
                    self.eval(alternate)?
                }
            }
            Expr::Index(table, key) => {
                let key = self.eval(key)? as u8;
                match &**table {
                    Expr::Ident(name) if *name == SZ_TABLE => i32::from(sz(key)),
                    Expr::Ident(name) if *name == SZP_TABLE => i32::from(szp(key)),
                    other => return Err(SandboxError::UnknownTable(other.to_string())),
                }
            }
            Expr::Call(name, args) => self.call(*name, args)?,
        };
        Ok(value)
    }

    /// Evaluate exactly `N` arguments for `name`.
    fn args<const N: usize>(
        &mut self,
        name: &'static str,
        args: &[Expr],
    ) -> Result<[i32; N], SandboxError> {
        if args.len() != N {
            return Err(SandboxError::Arity {
                name,
                expected: N,
                got: args.len(),
            });
        }
        let mut values = [0; N];
        for (slot, arg) in values.iter_mut().zip(args) {
            *slot = self.eval(arg)?;
        }
        Ok(values)
    }

    fn call(&mut self, name: &'static str, args: &[Expr]) -> Result<i32, SandboxError> {
        if let Some(pair) = CALLABLE_PAIRS.iter().find(|p| p.getter() == Some(name)) {
            self.args::<0>(name, args)?;
            return Ok(self.pair(*pair));
        }
        if let Some(pair) = CALLABLE_PAIRS.iter().find(|p| p.setter() == Some(name)) {
            let [value] = self.args::<1>(name, args)?;
            self.set_pair(*pair, value);
            return Ok(0);
        }

        let result = match name {
            "readMem" => {
                let [addr] = self.args::<1>(name, args)?;
                i32::from(self.read_mem(addr))
            }
            "readMemWord" => {
                let [addr] = self.args::<1>(name, args)?;
                let lo = self.read_mem(addr);
                let hi = self.read_mem(addr.wrapping_add(1));
                i32::from(u16::from_le_bytes([lo, hi]))
            }
            "writeMem" => {
                let [addr, value] = self.args::<2>(name, args)?;
                self.write_mem(addr, value);
                0
            }
            "incMem" | "decMem" => {
                let [addr] = self.args::<1>(name, args)?;
                let old = self.read_mem(addr);
                let r = if name == "incMem" {
                    alu::inc8(old)
                } else {
                    alu::dec8(old)
                };
                self.keep_carry(r.flags);
                self.write_mem(addr, i32::from(r.value));
                0
            }
            "incHL" | "decHL" | "incBC" | "decBC" | "incDE" | "decDE" => {
                self.args::<0>(name, args)?;
                let pair = match &name[3..] {
                    "HL" => Pair::HL,
                    "BC" => Pair::BC,
                    _ => Pair::DE,
                };
                let step = if name.starts_with("inc") { 1 } else { -1 };
                let value = (self.pair(pair) + step) & 0xFFFF;
                self.set_pair(pair, value);
                0
            }
            "push1" => {
                let [value] = self.args::<1>(name, args)?;
                self.push(value >> 8, value);
                0
            }
            "push2" => {
                let [hi, lo] = self.args::<2>(name, args)?;
                self.push(hi, lo);
                0
            }
            "port.in_" => {
                let [port] = self.args::<1>(name, args)?;
                let value = self.ports.get(&(port as u8)).copied().unwrap_or(0xFF);
                i32::from(value)
            }
            "port.out" => {
                let [port, value] = self.args::<2>(name, args)?;
                self.outputs.push((port as u8, value as u8));
                0
            }
            "add_a" | "adc_a" | "sub_a" | "sbc_a" | "cp_a" => {
                let [operand] = self.args::<1>(name, args)?;
                let (a, b) = (self.reg(Reg::A) as u8, operand as u8);
                let carry = self.carry();
                let r = match name {
                    "add_a" => alu::add8(a, b, false),
                    "adc_a" => alu::add8(a, b, carry),
                    "sub_a" => alu::sub8(a, b, false),
                    "sbc_a" => alu::sub8(a, b, carry),
                    _ => alu::cp8(a, b),
                };
                self.set_reg(Reg::A, i32::from(r.value));
                self.set_reg(Reg::F, i32::from(r.flags));
                0
            }
            "add16" => {
                let [lhs, rhs] = self.args::<2>(name, args)?;
                let (value, flags) = alu::add16(lhs as u16, rhs as u16);
                let kept = self.reg(Reg::F) & i32::from(F_SIGN | F_ZERO | F_PARITY);
                self.set_reg(Reg::F, kept | i32::from(flags));
                i32::from(value)
            }
            "inc8" | "dec8" => {
                let [operand] = self.args::<1>(name, args)?;
                let r = if name == "inc8" {
                    alu::inc8(operand as u8)
                } else {
                    alu::dec8(operand as u8)
                };
                self.keep_carry(r.flags);
                i32::from(r.value)
            }
            "rlca_a" | "rrca_a" | "rla_a" | "rra_a" | "daa" | "cpl_a" => {
                self.args::<0>(name, args)?;
                let (a, f) = (self.reg(Reg::A) as u8, self.reg(Reg::F) as u8);
                let r = match name {
                    "rlca_a" => alu::rlca(a, f),
                    "rrca_a" => alu::rrca(a, f),
                    "rla_a" => alu::rla(a, f),
                    "rra_a" => alu::rra(a, f),
                    "daa" => alu::daa(a, f),
                    _ => alu::cpl(a, f),
                };
                self.set_accumulator(r);
                0
            }
            "ccf" => {
                self.args::<0>(name, args)?;
                let f = alu::ccf(self.reg(Reg::A) as u8, self.reg(Reg::F) as u8);
                self.set_reg(Reg::F, i32::from(f));
                0
            }
            "bit" => {
                let [masked] = self.args::<1>(name, args)?;
                let f = alu::bit(masked as u8, self.reg(Reg::F) as u8);
                self.set_reg(Reg::F, i32::from(f));
                0
            }
            "rlc" | "rrc" | "rl" | "rr" | "sla" | "sra" | "sll" | "srl" => {
                let [operand] = self.args::<1>(name, args)?;
                let v = operand as u8;
                let carry = self.carry();
                let r = match name {
                    "rlc" => alu::rlc8(v),
                    "rrc" => alu::rrc8(v),
                    "rl" => alu::rl8(v, carry),
                    "rr" => alu::rr8(v, carry),
                    "sla" => alu::sla8(v),
                    "sra" => alu::sra8(v),
                    "sll" => alu::sll8(v),
                    _ => alu::srl8(v),
                };
                self.set_reg(Reg::F, i32::from(r.flags));
                i32::from(r.value)
            }
            "rndInt" => {
                let [bound] = self.args::<1>(name, args)?;
                self.random & bound
            }
            _ => return Err(SandboxError::UnknownPrimitive(name)),
        };
        Ok(result)
    }

    // ---------------------------------------------------------------------
    // Primitive helpers
    // ---------------------------------------------------------------------

    fn carry(&self) -> bool {
        self.reg(Reg::F) & i32::from(F_CARRY) != 0
    }

    /// Install new flags while keeping the current carry.
    fn keep_carry(&mut self, flags: u8) {
        let carry = self.reg(Reg::F) & i32::from(F_CARRY);
        self.set_reg(Reg::F, carry | i32::from(flags & !F_CARRY));
    }

    fn set_accumulator(&mut self, r: AluResult) {
        self.set_reg(Reg::A, i32::from(r.value));
        self.set_reg(Reg::F, i32::from(r.flags));
    }

    fn read_mem(&mut self, addr: i32) -> u8 {
        let addr = addr as u16;
        self.accesses.push(Access::Read(addr));
        self.memory[usize::from(addr)]
    }

    fn write_mem(&mut self, addr: i32, value: i32) {
        let (addr, value) = (addr as u16, value as u8);
        self.accesses.push(Access::Write(addr, value));
        self.memory[usize::from(addr)] = value;
    }

    /// High byte at `sp - 1`, low byte at `sp - 2`.
    fn push(&mut self, hi: i32, lo: i32) {
        let sp = self.get("sp");
        self.write_mem(sp.wrapping_sub(1), hi);
        self.write_mem(sp.wrapping_sub(2), lo);
        self.set("sp", sp.wrapping_sub(2) & 0xFFFF);
    }
}

fn binary(op: BinaryOp, l: i32, r: i32) -> i32 {
    // Shift counts use the low five bits, as in JavaScript.
    let shift = (r & 31) as u32;
    match op {
        BinaryOp::Add => l.wrapping_add(r),
        BinaryOp::Sub => l.wrapping_sub(r),
        BinaryOp::Mul => l.wrapping_mul(r),
        BinaryOp::Shl => l.wrapping_shl(shift),
        BinaryOp::Shr => l >> shift,
        BinaryOp::And => l & r,
        BinaryOp::Or => l | r,
        BinaryOp::Xor => l ^ r,
        BinaryOp::Eq => i32::from(l == r),
        BinaryOp::Ne => i32::from(l != r),
        BinaryOp::Gt => i32::from(l > r),
    }
}

fn assign_target(target: &Expr) -> Result<&'static str, SandboxError> {
    match target {
        Expr::Ident(name) => Ok(*name),
        Expr::Register(r) => Ok(r.name()),
        other => Err(SandboxError::InvalidTarget(other.to_string())),
    }
}
