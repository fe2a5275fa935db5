//! CB-prefix rotate/shift group and its DDCB/FDCB counterparts.
//!
//! All eight mnemonics share the same addressing shapes and differ only in
//! the primitive that does the bit work, so both generators take the
//! primitive name and build the read/modify/write around it. Memory forms
//! read once and write back once.

use super::{general, location, pair_value, read_mem, set_location, write_mem};
use crate::error::SynthError;
use crate::ir::{Stmt, assign, call};
use crate::operand::{Index, Operand8, Pair, Reg};

/// `r = op(r)` or `writeMem(getHL(), op(readMem(getHL())))`.
pub(super) fn cb(
    primitive: &'static str,
    target: Operand8,
    family: &'static str,
) -> Result<Vec<Stmt>, SynthError> {
    match target {
        Operand8::Reg(r) => {
            let r = general(r, family)?;
            Ok(vec![assign(r.clone(), call(primitive, vec![r]))])
        }
        Operand8::Indirect => {
            let result = call(primitive, vec![read_mem(pair_value(Pair::HL))]);
            Ok(vec![write_mem(pair_value(Pair::HL), result)])
        }
    }
}

/// `(IX+d)` form. With a mirror register the result is also left in that
/// register (the undocumented `LD r,RLC (IX+d)` encodings).
pub(super) fn indexed_cb(
    primitive: &'static str,
    index: Index,
    mirror: Option<Reg>,
    family: &'static str,
) -> Result<Vec<Stmt>, SynthError> {
    let result = call(primitive, vec![read_mem(location())]);
    match mirror {
        None => Ok(vec![set_location(index), write_mem(location(), result)]),
        Some(r) => {
            let r = general(r, family)?;
            Ok(vec![
                set_location(index),
                assign(r.clone(), result),
                write_mem(location(), r),
            ])
        }
    }
}
