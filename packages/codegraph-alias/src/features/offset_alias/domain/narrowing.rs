//! Narrowing and Widening Operators
//!
//! Operators are discovered while addresses are expanded but only applied
//! once the graph is resolved, so they are stored on the edges as plain data.
//!
//! - A [`NarrowingOp`] records "this pointer compared `<predicate>` against
//!   `compared`", e.g. the `p < end` guard of a loop.
//! - A [`WideningOp`] records the two offsets observed for the same base
//!   across a cycle, which tells the numeric domain the direction of growth.

use super::offset::Offset;
use super::pointer_node::NodeId;
use crate::errors::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Comparison predicate (signed integer semantics)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Predicate {
    /// ==
    Eq,
    /// !=
    Ne,
    /// <
    Lt,
    /// <=
    Le,
    /// >
    Gt,
    /// >=
    Ge,
}

impl Predicate {
    /// Predicate holding on the other branch
    pub fn negate(self) -> Self {
        match self {
            Predicate::Eq => Predicate::Ne,
            Predicate::Ne => Predicate::Eq,
            Predicate::Lt => Predicate::Ge,
            Predicate::Le => Predicate::Gt,
            Predicate::Gt => Predicate::Le,
            Predicate::Ge => Predicate::Lt,
        }
    }

    /// Predicate with operands swapped (`a < b` ⇔ `b > a`)
    pub fn swap(self) -> Self {
        match self {
            Predicate::Eq => Predicate::Eq,
            Predicate::Ne => Predicate::Ne,
            Predicate::Lt => Predicate::Gt,
            Predicate::Le => Predicate::Ge,
            Predicate::Gt => Predicate::Lt,
            Predicate::Ge => Predicate::Le,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Predicate::Eq => "==",
            Predicate::Ne => "!=",
            Predicate::Lt => "<",
            Predicate::Le => "<=",
            Predicate::Gt => ">",
            Predicate::Ge => ">=",
        };
        write!(f, "{}", s)
    }
}

/// Pending narrowing: `addressee <predicate> compared + context`
#[derive(Debug, Clone)]
pub struct NarrowingOp {
    pub predicate: Predicate,
    pub compared: NodeId,
    pub context: Offset,
}

impl NarrowingOp {
    pub fn new(predicate: Predicate, compared: NodeId, context: Offset) -> Self {
        Self {
            predicate,
            compared,
            context,
        }
    }

    /// Same comparison seen from a pointer displaced by `extra`
    pub fn contextualize(&self, extra: &Offset) -> Result<NarrowingOp> {
        Ok(NarrowingOp {
            predicate: self.predicate,
            compared: self.compared,
            context: self.context.add(extra)?,
        })
    }
}

impl fmt::Display for NarrowingOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} + {}", self.predicate, self.compared, self.context)
    }
}

/// Pending widening: offsets seen before and after one trip around a cycle
#[derive(Debug, Clone)]
pub struct WideningOp {
    pub before: Offset,
    pub after: Offset,
}

impl WideningOp {
    pub fn new(before: Offset, after: Offset) -> Self {
        Self { before, after }
    }

    /// Both operators record the same trip
    pub fn same_as(&self, other: &WideningOp) -> bool {
        self.before.same_as(&other.before) && self.after.same_as(&other.after)
    }
}

impl fmt::Display for WideningOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.before, self.after)
    }
}

/// Narrowing operators keyed by the compared node
pub type NarrowingOps = BTreeMap<NodeId, NarrowingOp>;

/// Widening operators keyed by the base that closed the cycle.
///
/// Several trips through the same base can grow in different directions, so
/// every distinct operator is kept and all of them are applied.
pub type WideningOps = BTreeMap<NodeId, Vec<WideningOp>>;

/// Add `op` under `key` unless an identical operator is already there
pub fn push_widening(ops: &mut WideningOps, key: NodeId, op: WideningOp) -> bool {
    let entry = ops.entry(key).or_default();
    if entry.iter().any(|existing| existing.same_as(&op)) {
        return false;
    }
    entry.push(op);
    true
}

/// Union of two widening maps. Returns the number of operators added.
pub fn merge_widening(into: &mut WideningOps, from: &WideningOps) -> usize {
    let mut inserted = 0;
    for (key, ops) in from {
        for op in ops {
            if push_widening(into, *key, op.clone()) {
                inserted += 1;
            }
        }
    }
    inserted
}

/// Merge `from` into `into`; an existing key is never overwritten.
///
/// Returns the number of operators actually inserted.
pub fn merge_first_writer<V: Clone>(into: &mut BTreeMap<NodeId, V>, from: &BTreeMap<NodeId, V>) -> usize {
    let mut inserted = 0;
    for (key, value) in from {
        if !into.contains_key(key) {
            into.insert(*key, value.clone());
            inserted += 1;
        }
    }
    inserted
}
