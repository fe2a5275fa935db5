//! IR node model.
//!
//! A fragment is a list of [`Stmt`]s over a small closed set of [`Expr`]
//! kinds. Nodes are plain owned trees: they are composed into bigger trees
//! or folded into literals, never mutated in place. Names of state, tables
//! and primitives are symbolic and resolved by whatever executes the IR.
//!
//! Arithmetic operators are implemented on [`Expr`] so builders read like
//! the code they describe: `reg(Reg::F) & F_CARRY | index(SZ_TABLE, reg(Reg::A))`.
//! Rust and JavaScript agree on the relative precedence of `* + - << >> & ^ |`.
//! `!expr` builds a bitwise complement (`~`), matching Rust's `!` on integers.

use std::fmt;
use std::ops;

use crate::flags::BIT_TABLE;
use crate::operand::Reg;

/// Value of a literal node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum LiteralValue {
    /// Integer with JavaScript `int32` semantics.
    Num(i32),
    /// Boolean.
    Bool(bool),
}

/// A literal node, optionally annotated with a hex rendering for dumps.
///
/// The annotation is presentation only: equality ignores it.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Literal {
    pub value: LiteralValue,
    pub raw: Option<String>,
}

impl Literal {
    #[must_use]
    pub const fn num(value: i32) -> Self {
        Self {
            value: LiteralValue::Num(value),
            raw: None,
        }
    }

    #[must_use]
    pub const fn boolean(value: bool) -> Self {
        Self {
            value: LiteralValue::Bool(value),
            raw: None,
        }
    }

    /// Numeric value, if this is a number.
    #[must_use]
    pub const fn as_num(&self) -> Option<i32> {
        match self.value {
            LiteralValue::Num(v) => Some(v),
            LiteralValue::Bool(_) => None,
        }
    }

    /// Attach the hex rendering (numbers only).
    pub fn annotate(&mut self) {
        if let LiteralValue::Num(v) = self.value {
            self.raw = Some(to_hex(v));
        }
    }
}

impl PartialEq for Literal {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for Literal {}

/// Hex rendering used for annotated literals: two digits for bytes, four
/// for anything wider.
#[must_use]
pub fn to_hex(value: i32) -> String {
    let sign = if value < 0 { "-" } else { "" };
    let magnitude = value.unsigned_abs();
    if magnitude <= 0xFF {
        format!("{sign}0x{magnitude:02X}")
    } else {
        format!("{sign}0x{magnitude:04X}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Shl,
    Shr,
    And,
    Or,
    Xor,
    Eq,
    Ne,
    Gt,
}

impl BinaryOp {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::And => "&",
            Self::Or => "|",
            Self::Xor => "^",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Gt => ">",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum UnaryOp {
    /// Logical not (`!`).
    Not,
    /// Bitwise complement (`~`).
    BitNot,
}

impl UnaryOp {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Not => "!",
            Self::BitNot => "~",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::And => "&&",
            Self::Or => "||",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    And,
    Or,
    Xor,
}

impl AssignOp {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Assign => "=",
            Self::Add => "+=",
            Self::Sub => "-=",
            Self::And => "&=",
            Self::Or => "|=",
            Self::Xor => "^=",
        }
    }
}

/// The runtime-decoded values a pending template waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Operand {
    /// Immediate byte/word or displacement.
    Value,
    /// Absolute branch target.
    Target,
    /// Address of the following instruction.
    NextAddress,
}

/// A placeholder for a value known only once the opcode table is complete.
///
/// Resolves to `operand + offset`, reduced modulo the page size when
/// `in_page` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Hole {
    pub operand: Operand,
    pub offset: i32,
    pub in_page: bool,
}

impl Hole {
    #[must_use]
    pub const fn new(operand: Operand) -> Self {
        Self {
            operand,
            offset: 0,
            in_page: false,
        }
    }

    #[must_use]
    pub const fn offset(mut self, offset: i32) -> Self {
        self.offset = offset;
        self
    }

    #[must_use]
    pub const fn in_page(mut self) -> Self {
        self.in_page = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Expr {
    Literal(Literal),
    /// Named scalar in the execution environment (`sp`, `pc`, `temp`, ...).
    Ident(&'static str),
    /// One emulated 8-bit register.
    Register(Reg),
    /// Runtime operand not yet substituted.
    Hole(Hole),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Unary(UnaryOp, Box<Expr>),
    Logical(LogicalOp, Box<Expr>, Box<Expr>),
    Conditional(Box<Expr>, Box<Expr>, Box<Expr>),
    /// `base[index]` into a named external table.
    Index(Box<Expr>, Box<Expr>),
    /// Call of an environment primitive.
    Call(&'static str, Vec<Expr>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Stmt {
    Expr(Expr),
    Assign(AssignOp, Expr, Expr),
    VarDecl(&'static str, Expr),
    Block(Vec<Stmt>),
    If(Expr, Box<Stmt>, Option<Box<Stmt>>),
    Return(Option<Expr>),
}

// ---------------------------------------------------------------------------
// Constructors
// ---------------------------------------------------------------------------

#[must_use]
pub const fn num(value: i32) -> Expr {
    Expr::Literal(Literal::num(value))
}

#[must_use]
pub const fn boolean(value: bool) -> Expr {
    Expr::Literal(Literal::boolean(value))
}

#[must_use]
pub const fn ident(name: &'static str) -> Expr {
    Expr::Ident(name)
}

#[must_use]
pub const fn reg(r: Reg) -> Expr {
    Expr::Register(r)
}

#[must_use]
pub const fn hole(h: Hole) -> Expr {
    Expr::Hole(h)
}

/// Single-bit mask literal for bit `n`. `n` must be in `0..=7`.
#[must_use]
pub fn bit(n: u8) -> Expr {
    num(i32::from(BIT_TABLE[n as usize]))
}

#[must_use]
pub fn binary(op: BinaryOp, lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Expr {
    Expr::Binary(op, Box::new(lhs.into()), Box::new(rhs.into()))
}

#[must_use]
pub fn not(arg: Expr) -> Expr {
    Expr::Unary(UnaryOp::Not, Box::new(arg))
}

#[must_use]
pub fn logical(op: LogicalOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Logical(op, Box::new(lhs), Box::new(rhs))
}

#[must_use]
pub fn conditional(test: Expr, consequent: impl Into<Expr>, alternate: impl Into<Expr>) -> Expr {
    Expr::Conditional(
        Box::new(test),
        Box::new(consequent.into()),
        Box::new(alternate.into()),
    )
}

#[must_use]
pub fn index(table: &'static str, key: Expr) -> Expr {
    Expr::Index(Box::new(ident(table)), Box::new(key))
}

#[must_use]
pub fn call(name: &'static str, args: Vec<Expr>) -> Expr {
    Expr::Call(name, args)
}

/// `target = value;`
#[must_use]
pub fn assign(target: Expr, value: impl Into<Expr>) -> Stmt {
    Stmt::Assign(AssignOp::Assign, target, value.into())
}

/// `target op= value;`
#[must_use]
pub fn assign_op(op: AssignOp, target: Expr, value: impl Into<Expr>) -> Stmt {
    Stmt::Assign(op, target, value.into())
}

#[must_use]
pub fn var(name: &'static str, init: Expr) -> Stmt {
    Stmt::VarDecl(name, init)
}

/// Call used as a statement.
#[must_use]
pub fn exec(name: &'static str, args: Vec<Expr>) -> Stmt {
    Stmt::Expr(call(name, args))
}

#[must_use]
pub fn if_then(test: Expr, body: Vec<Stmt>) -> Stmt {
    Stmt::If(test, Box::new(Stmt::Block(body)), None)
}

#[must_use]
pub fn if_else(test: Expr, body: Vec<Stmt>, otherwise: Vec<Stmt>) -> Stmt {
    Stmt::If(
        test,
        Box::new(Stmt::Block(body)),
        Some(Box::new(Stmt::Block(otherwise))),
    )
}

/// Bare `return;`.
#[must_use]
pub const fn ret() -> Stmt {
    Stmt::Return(None)
}

impl Expr {
    /// Numeric value if this node is a numeric literal.
    #[must_use]
    pub const fn as_num(&self) -> Option<i32> {
        match self {
            Self::Literal(lit) => lit.as_num(),
            _ => None,
        }
    }

    /// True if the value is fixed once the template is filled in.
    #[must_use]
    pub const fn is_constant(&self) -> bool {
        matches!(self, Self::Literal(_) | Self::Hole(_))
    }

    #[must_use]
    pub fn equals(self, rhs: impl Into<Expr>) -> Expr {
        binary(BinaryOp::Eq, self, rhs)
    }

    #[must_use]
    pub fn not_equals(self, rhs: impl Into<Expr>) -> Expr {
        binary(BinaryOp::Ne, self, rhs)
    }

    #[must_use]
    pub fn greater_than(self, rhs: impl Into<Expr>) -> Expr {
        binary(BinaryOp::Gt, self, rhs)
    }

    /// Visit this node and every node below it.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Expr)) {
        visit(self);
        match self {
            Self::Literal(_) | Self::Ident(_) | Self::Register(_) | Self::Hole(_) => {}
            Self::Binary(_, lhs, rhs) | Self::Logical(_, lhs, rhs) | Self::Index(lhs, rhs) => {
                lhs.walk(visit);
                rhs.walk(visit);
            }
            Self::Unary(_, arg) => arg.walk(visit),
            Self::Conditional(test, consequent, alternate) => {
                test.walk(visit);
                consequent.walk(visit);
                alternate.walk(visit);
            }
            Self::Call(_, args) => {
                for arg in args {
                    arg.walk(visit);
                }
            }
        }
    }

    fn for_each_literal_mut(&mut self, f: &mut impl FnMut(&mut Literal)) {
        match self {
            Self::Literal(lit) => f(lit),
            Self::Ident(_) | Self::Register(_) | Self::Hole(_) => {}
            Self::Binary(_, lhs, rhs) | Self::Logical(_, lhs, rhs) | Self::Index(lhs, rhs) => {
                lhs.for_each_literal_mut(f);
                rhs.for_each_literal_mut(f);
            }
            Self::Unary(_, arg) => arg.for_each_literal_mut(f),
            Self::Conditional(test, consequent, alternate) => {
                test.for_each_literal_mut(f);
                consequent.for_each_literal_mut(f);
                alternate.for_each_literal_mut(f);
            }
            Self::Call(_, args) => {
                for arg in args {
                    arg.for_each_literal_mut(f);
                }
            }
        }
    }
}

impl Stmt {
    /// Visit every expression in this statement, including nested blocks.
    pub fn walk_exprs<'a>(&'a self, visit: &mut impl FnMut(&'a Expr)) {
        match self {
            Self::Expr(e) | Self::VarDecl(_, e) | Self::Return(Some(e)) => e.walk(visit),
            Self::Assign(_, target, value) => {
                target.walk(visit);
                value.walk(visit);
            }
            Self::Block(body) => {
                for stmt in body {
                    stmt.walk_exprs(visit);
                }
            }
            Self::If(test, consequent, alternate) => {
                test.walk(visit);
                consequent.walk_exprs(visit);
                if let Some(alternate) = alternate {
                    alternate.walk_exprs(visit);
                }
            }
            Self::Return(None) => {}
        }
    }

    /// Attach hex renderings to every numeric literal in this statement.
    ///
    /// Builds the annotated copy used for verbose dumps; equality with the
    /// unannotated tree is unaffected.
    pub(crate) fn annotate_literals(&mut self) {
        let mut annotate = |lit: &mut Literal| lit.annotate();
        self.for_each_expr_mut(&mut |e| e.for_each_literal_mut(&mut annotate));
    }

    fn for_each_expr_mut(&mut self, f: &mut impl FnMut(&mut Expr)) {
        match self {
            Self::Expr(e) | Self::VarDecl(_, e) | Self::Return(Some(e)) => f(e),
            Self::Assign(_, target, value) => {
                f(target);
                f(value);
            }
            Self::Block(body) => {
                for stmt in body {
                    stmt.for_each_expr_mut(f);
                }
            }
            Self::If(test, consequent, alternate) => {
                f(test);
                consequent.for_each_expr_mut(f);
                if let Some(alternate) = alternate {
                    alternate.for_each_expr_mut(f);
                }
            }
            Self::Return(None) => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Operator sugar
// ---------------------------------------------------------------------------

impl From<i32> for Expr {
    fn from(value: i32) -> Self {
        num(value)
    }
}

impl From<u8> for Expr {
    fn from(value: u8) -> Self {
        num(i32::from(value))
    }
}

impl From<bool> for Expr {
    fn from(value: bool) -> Self {
        boolean(value)
    }
}

impl From<Reg> for Expr {
    fn from(r: Reg) -> Self {
        reg(r)
    }
}

impl From<Hole> for Expr {
    fn from(h: Hole) -> Self {
        hole(h)
    }
}

macro_rules! binary_operator {
    ($trait:ident, $method:ident, $op:expr) => {
        impl<T: Into<Expr>> ops::$trait<T> for Expr {
            type Output = Expr;

            fn $method(self, rhs: T) -> Expr {
                binary($op, self, rhs)
            }
        }
    };
}

binary_operator!(Add, add, BinaryOp::Add);
binary_operator!(Sub, sub, BinaryOp::Sub);
binary_operator!(Mul, mul, BinaryOp::Mul);
binary_operator!(Shl, shl, BinaryOp::Shl);
binary_operator!(Shr, shr, BinaryOp::Shr);
binary_operator!(BitAnd, bitand, BinaryOp::And);
binary_operator!(BitOr, bitor, BinaryOp::Or);
binary_operator!(BitXor, bitxor, BinaryOp::Xor);

impl ops::Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::Unary(UnaryOp::BitNot, Box::new(self))
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.raw, self.value) {
            (Some(raw), _) => f.write_str(raw),
            (None, LiteralValue::Num(v)) => write!(f, "{v}"),
            (None, LiteralValue::Bool(b)) => write!(f, "{b}"),
        }
    }
}

impl fmt::Display for Hole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.operand {
            Operand::Value => "value",
            Operand::Target => "target",
            Operand::NextAddress => "nextAddress",
        };
        match (self.offset, self.in_page) {
            (0, false) => write!(f, "${name}"),
            (0, true) => write!(f, "(${name} % 0x4000)"),
            (off, false) => write!(f, "(${name} {off:+})"),
            (off, true) => write!(f, "((${name} {off:+}) % 0x4000)"),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(lit) => write!(f, "{lit}"),
            Self::Ident(name) => f.write_str(name),
            Self::Register(r) => f.write_str(r.name()),
            Self::Hole(h) => write!(f, "{h}"),
            Self::Binary(op, lhs, rhs) => write!(f, "({lhs} {} {rhs})", op.symbol()),
            Self::Unary(op, arg) => write!(f, "{}{arg}", op.symbol()),
            Self::Logical(op, lhs, rhs) => write!(f, "({lhs} {} {rhs})", op.symbol()),
            Self::Conditional(test, consequent, alternate) => {
                write!(f, "({test} ? {consequent} : {alternate})")
            }
            Self::Index(base, key) => write!(f, "{base}[{key}]"),
            Self::Call(name, args) => {
                write!(f, "{name}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
        }
    }
}

impl Stmt {
    fn render(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let pad = "  ".repeat(depth);
        match self {
            Self::Expr(e) => writeln!(f, "{pad}{e};"),
            Self::Assign(op, target, value) => {
                writeln!(f, "{pad}{target} {} {value};", op.symbol())
            }
            Self::VarDecl(name, init) => writeln!(f, "{pad}var {name} = {init};"),
            Self::Block(body) => {
                writeln!(f, "{pad}{{")?;
                for stmt in body {
                    stmt.render(f, depth + 1)?;
                }
                writeln!(f, "{pad}}}")
            }
            Self::If(test, consequent, alternate) => {
                writeln!(f, "{pad}if ({test})")?;
                consequent.render(f, depth)?;
                if let Some(alternate) = alternate {
                    writeln!(f, "{pad}else")?;
                    alternate.render(f, depth)?;
                }
                Ok(())
            }
            Self::Return(None) => writeln!(f, "{pad}return;"),
            Self::Return(Some(e)) => writeln!(f, "{pad}return {e};"),
        }
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::{F_CARRY, SZ_TABLE};

    #[test]
    fn bit_masks_come_from_the_table() {
        assert_eq!(bit(0), num(0x01));
        assert_eq!(bit(7), num(0x80));
    }

    #[test]
    fn annotation_does_not_affect_equality() {
        let mut annotated = Literal::num(0xFF);
        annotated.annotate();
        assert_eq!(annotated.raw.as_deref(), Some("0xFF"));
        assert_eq!(annotated, Literal::num(0xFF));
    }

    #[test]
    fn hex_widths() {
        assert_eq!(to_hex(5), "0x05");
        assert_eq!(to_hex(0x4000), "0x4000");
        assert_eq!(to_hex(-3), "-0x03");
    }

    #[test]
    fn operators_build_binary_nodes() {
        let e = reg(Reg::F) & F_CARRY | index(SZ_TABLE, reg(Reg::A));
        assert_eq!(e.to_string(), "((f & 1) | SZ_TABLE[a])");
    }

    #[test]
    fn complement_renders_as_tilde() {
        let stmt = assign_op(AssignOp::And, reg(Reg::B), !bit(3));
        assert_eq!(stmt.to_string(), "b &= ~8;\n");
    }

    #[test]
    fn if_statement_rendering() {
        let stmt = if_then(reg(Reg::B).not_equals(0), vec![ret()]);
        assert_eq!(stmt.to_string(), "if ((b != 0))\n{\n  return;\n}\n");
    }

    #[test]
    fn walk_reaches_nested_calls() {
        let stmt = exec("writeMem", vec![ident("location"), call("rlc", vec![call("readMem", vec![ident("location")])])]);
        let mut calls = Vec::new();
        stmt.walk_exprs(&mut |e| {
            if let Expr::Call(name, _) = e {
                calls.push(*name);
            }
        });
        assert_eq!(calls, ["writeMem", "rlc", "readMem"]);
    }
}
