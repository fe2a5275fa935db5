//! Synthesised templates and the fragments they produce.
//!
//! A template is either ready (no runtime-decoded operand) or pending: an IR
//! skeleton whose [`Hole`]s are filled in once the table assembler knows the
//! instruction's value, branch target and next address.

use std::fmt;

use crate::flags::PAGE_SIZE;
use crate::fold::fold;
use crate::ir::{Expr, Hole, Literal, Operand, Stmt};

/// Runtime-decoded values of one instruction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Operands {
    /// Immediate byte/word or signed displacement.
    pub value: i32,
    /// Absolute branch target.
    pub target: i32,
    /// Address of the following instruction.
    pub next_address: i32,
}

impl Operands {
    #[must_use]
    pub const fn value(value: i32) -> Self {
        Self {
            value,
            target: 0,
            next_address: 0,
        }
    }

    #[must_use]
    pub const fn branch(target: i32, next_address: i32) -> Self {
        Self {
            value: 0,
            target,
            next_address,
        }
    }

    #[must_use]
    pub const fn get(&self, operand: Operand) -> i32 {
        match operand {
            Operand::Value => self.value,
            Operand::Target => self.target,
            Operand::NextAddress => self.next_address,
        }
    }

    /// Value a hole resolves to.
    #[must_use]
    pub const fn resolve(&self, hole: Hole) -> i32 {
        let raw = self.get(hole.operand).wrapping_add(hole.offset);
        if hole.in_page { raw % PAGE_SIZE } else { raw }
    }
}

/// The IR for one concrete instruction, executed in order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Fragment {
    stmts: Vec<Stmt>,
}

impl Fragment {
    #[must_use]
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Self { stmts }
    }

    #[must_use]
    pub fn stmts(&self) -> &[Stmt] {
        &self.stmts
    }

    #[must_use]
    pub fn into_stmts(self) -> Vec<Stmt> {
        self.stmts
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stmts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stmts.is_empty()
    }

    /// Every expression node in the fragment, in source order.
    pub fn exprs(&self) -> Vec<&Expr> {
        let mut out = Vec::new();
        for stmt in &self.stmts {
            stmt.walk_exprs(&mut |e| out.push(e));
        }
        out
    }

    /// Names of the primitives called, in source order.
    #[must_use]
    pub fn calls(&self) -> Vec<&'static str> {
        self.exprs()
            .into_iter()
            .filter_map(|e| match e {
                Expr::Call(name, _) => Some(*name),
                _ => None,
            })
            .collect()
    }

    fn annotate(&mut self) {
        for stmt in &mut self.stmts {
            stmt.annotate_literals();
        }
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stmt in &self.stmts {
            write!(f, "{stmt}")?;
        }
        Ok(())
    }
}

/// A skeleton waiting for its runtime operands.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Pending {
    skeleton: Vec<Stmt>,
    annotate: bool,
}

impl Pending {
    #[must_use]
    pub fn skeleton(&self) -> &[Stmt] {
        &self.skeleton
    }

    /// True if any hole refers to `operand`.
    #[must_use]
    pub fn needs(&self, operand: Operand) -> bool {
        let mut found = false;
        for stmt in &self.skeleton {
            stmt.walk_exprs(&mut |e| {
                if matches!(e, Expr::Hole(h) if h.operand == operand) {
                    found = true;
                }
            });
        }
        found
    }

    /// Substitute every hole and fold the nodes rebuilt around them.
    #[must_use]
    pub fn fill(&self, operands: &Operands) -> Fragment {
        let stmts = self
            .skeleton
            .iter()
            .map(|stmt| fill_stmt(stmt, operands))
            .collect();
        let mut fragment = Fragment::new(stmts);
        if self.annotate {
            fragment.annotate();
        }
        fragment
    }
}

/// Result of synthesising one instruction variant.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Template {
    Ready(Fragment),
    Pending(Pending),
}

impl Template {
    pub(crate) fn new(stmts: Vec<Stmt>, annotate: bool) -> Self {
        let mut has_hole = false;
        for stmt in &stmts {
            stmt.walk_exprs(&mut |e| has_hole |= matches!(e, Expr::Hole(_)));
        }

        if has_hole {
            Self::Pending(Pending {
                skeleton: stmts,
                annotate,
            })
        } else {
            let mut fragment = Fragment::new(stmts);
            if annotate {
                fragment.annotate();
            }
            Self::Ready(fragment)
        }
    }

    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// The fragment of an operand-free template.
    #[must_use]
    pub const fn ready(&self) -> Option<&Fragment> {
        match self {
            Self::Ready(fragment) => Some(fragment),
            Self::Pending(_) => None,
        }
    }

    /// Fragment for one concrete instruction. Ready templates ignore the
    /// operands.
    #[must_use]
    pub fn instantiate(&self, operands: &Operands) -> Fragment {
        match self {
            Self::Ready(fragment) => fragment.clone(),
            Self::Pending(pending) => pending.fill(operands),
        }
    }
}

fn fill_stmt(stmt: &Stmt, ops: &Operands) -> Stmt {
    match stmt {
        Stmt::Expr(e) => Stmt::Expr(fill_expr(e, ops)),
        Stmt::Assign(op, target, value) => {
            Stmt::Assign(*op, fill_expr(target, ops), fill_expr(value, ops))
        }
        Stmt::VarDecl(name, init) => Stmt::VarDecl(*name, fill_expr(init, ops)),
        Stmt::Block(body) => Stmt::Block(body.iter().map(|s| fill_stmt(s, ops)).collect()),
        Stmt::If(test, consequent, alternate) => Stmt::If(
            fill_expr(test, ops),
            Box::new(fill_stmt(consequent, ops)),
            alternate.as_ref().map(|alt| Box::new(fill_stmt(alt, ops))),
        ),
        Stmt::Return(value) => Stmt::Return(value.as_ref().map(|e| fill_expr(e, ops))),
    }
}

fn fill_expr(expr: &Expr, ops: &Operands) -> Expr {
    let fill = |e: &Expr| Box::new(fill_expr(e, ops));
    match expr {
        Expr::Hole(h) => Expr::Literal(Literal::num(ops.resolve(*h))),
        Expr::Literal(_) | Expr::Ident(_) | Expr::Register(_) => expr.clone(),
        Expr::Binary(op, lhs, rhs) => fold(Expr::Binary(*op, fill(lhs), fill(rhs))),
        Expr::Unary(op, arg) => Expr::Unary(*op, fill(arg)),
        Expr::Logical(op, lhs, rhs) => Expr::Logical(*op, fill(lhs), fill(rhs)),
        Expr::Conditional(test, consequent, alternate) => {
            Expr::Conditional(fill(test), fill(consequent), fill(alternate))
        }
        Expr::Index(base, key) => Expr::Index(fill(base), fill(key)),
        Expr::Call(name, args) => {
            Expr::Call(*name, args.iter().map(|a| fill_expr(a, ops)).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{assign, hole, ident, num, reg};
    use crate::operand::Reg;

    #[test]
    fn templates_without_holes_are_ready() {
        let t = Template::new(vec![assign(reg(Reg::B), reg(Reg::C))], false);
        assert!(t.is_ready());
    }

    #[test]
    fn filling_substitutes_and_folds() {
        let skeleton = vec![
            assign(reg(Reg::H), hole(Hole::new(Operand::Value)) >> 8),
            assign(reg(Reg::L), hole(Hole::new(Operand::Value)) & 0xFF),
        ];
        let t = Template::new(skeleton, false);
        let fragment = t.instantiate(&Operands::value(0x1234));
        assert_eq!(
            fragment.into_stmts(),
            [assign(reg(Reg::H), num(0x12)), assign(reg(Reg::L), num(0x34))]
        );
    }

    #[test]
    fn unfoldable_nodes_keep_their_shape() {
        let t = Template::new(
            vec![assign(ident("pc"), hole(Hole::new(Operand::Target).in_page()) + ident("page") * 0x4000)],
            false,
        );
        let fragment = t.instantiate(&Operands::branch(0x8123, 0));
        assert_eq!(
            fragment.stmts(),
            [assign(ident("pc"), num(0x0123) + ident("page") * 0x4000)]
        );
    }

    #[test]
    fn page_reduction_applies_after_offset() {
        let ops = Operands::branch(0, 0x4000);
        let h = Hole::new(Operand::NextAddress).offset(-1).in_page();
        assert_eq!(ops.resolve(h), 0x3FFF);
    }

    #[test]
    fn pending_reports_needed_operands() {
        let t = Template::new(vec![assign(ident("pc"), hole(Hole::new(Operand::Target)))], false);
        let Template::Pending(pending) = t else {
            panic!("expected pending template");
        };
        assert!(pending.needs(Operand::Target));
        assert!(!pending.needs(Operand::Value));
    }

    #[test]
    fn filling_leaves_the_skeleton_reusable() {
        let Template::Pending(pending) = Template::new(
            vec![assign(reg(Reg::A), hole(Hole::new(Operand::Value)))],
            false,
        ) else {
            panic!("expected pending template");
        };
        let first = pending.fill(&Operands::value(1));
        let second = pending.fill(&Operands::value(2));
        assert_eq!(first.stmts(), [assign(reg(Reg::A), num(1))]);
        assert_eq!(second.stmts(), [assign(reg(Reg::A), num(2))]);
        assert_eq!(
            pending.skeleton(),
            [assign(reg(Reg::A), hole(Hole::new(Operand::Value)))]
        );
    }

    #[test]
    fn annotation_is_applied_on_fill() {
        let t = Template::new(vec![assign(reg(Reg::A), hole(Hole::new(Operand::Value)))], true);
        let fragment = t.instantiate(&Operands::value(0x3C));
        assert_eq!(fragment.to_string(), "a = 0x3C;\n");
    }
}
