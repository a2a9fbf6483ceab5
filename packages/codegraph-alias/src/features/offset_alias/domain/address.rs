//! Address Edges
//!
//! An [`Address`] records that `addressee` may equal `base + offset`.
//! Indirect addresses (whose base is a Phi or Continuous pointer) are rewritten
//! by [`Address::expand`] until every surviving address hangs off a concrete
//! base (allocation, global, argument, unknown, ...).
//!
//! # Expansion
//! ```text
//! q = p + 4            (q → p, 4)
//! p = phi(a, b + 8)    (p → a, 0), (p → b, 8)
//!
//! expand (q → p, 4)  ⇒  (q → a, 4), (q → b, 12)
//! ```
//! When the base being substituted was already substituted on the way to this
//! edge, the chain went around a cycle: instead of expanding forever the edge
//! yields a [`WideningOp`] summarising the growth.
//!
//! Only the edge's own substitution path (`expanded`) can close a cycle.
//! Histories handed over by sibling edges (a widening elsewhere in the
//! worklist, a merged duplicate) land in `inherited` and never stop an edge
//! from expanding, otherwise the addresses it leads to would be lost.
//!
//! Expansion never mutates the graph. It returns an [`ExpandOutcome`] that the
//! resolution engine applies (retire the edge, materialize successors).

use super::narrowing::{
    merge_first_writer, merge_widening, push_widening, NarrowingOps, WideningOp, WideningOps,
};
use super::offset::Offset;
use super::pointer_graph::PointerGraph;
use super::pointer_node::NodeId;
use crate::errors::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Generation-checked handle of an address slot in the graph arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AddressId {
    pub index: u32,
    pub generation: u32,
}

impl fmt::Display for AddressId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a{}.{}", self.index, self.generation)
    }
}

/// Bases substituted while producing an edge, with the offset at that point
pub type ExpandedMap = BTreeMap<NodeId, Offset>;

/// A possible address of a pointer
#[derive(Debug, Clone)]
pub struct Address {
    pub base: NodeId,
    pub addressee: NodeId,
    pub offset: Offset,
    pub narrowing_ops: NarrowingOps,
    pub widening_ops: WideningOps,
    pub expanded: ExpandedMap,
    /// Bases expanded on other paths of the same worklist
    pub inherited: ExpandedMap,
    pub widened: bool,
    pub through_argument: bool,
    pub through_global: bool,
    /// Offset as resolved, before widening and narrowing were applied.
    /// Operators are always recomputed from it.
    pub unrefined: Option<Offset>,
}

impl Address {
    /// Offset that operators start from
    pub fn resolved_offset(&self) -> &Offset {
        self.unrefined.as_ref().unwrap_or(&self.offset)
    }

    /// Attach a widening operator unless the same one is already attached
    pub fn attach_widening(&mut self, key: NodeId, op: WideningOp) -> bool {
        if !push_widening(&mut self.widening_ops, key, op) {
            return false;
        }
        self.widened = true;
        true
    }

    /// Merge narrowing operators; existing keys win
    pub fn merge_narrowing(&mut self, ops: &NarrowingOps) -> usize {
        merge_first_writer(&mut self.narrowing_ops, ops)
    }

    /// Record the history of another path; existing keys win.
    /// The edge's own path is left alone.
    pub fn inherit_expanded(&mut self, expanded: &ExpandedMap) -> usize {
        let mut inserted = 0;
        for (key, offset) in expanded {
            if !self.expanded.contains_key(key) && !self.inherited.contains_key(key) {
                self.inherited.insert(*key, offset.clone());
                inserted += 1;
            }
        }
        inserted
    }

    /// Rewrite this edge through its base.
    ///
    /// Requires the base to be indirect; the engine checks the kind before
    /// calling. See the module documentation for the three outcomes.
    pub fn expand(&self, graph: &PointerGraph) -> Result<ExpandOutcome> {
        let base = self.base;

        if let Some(before) = self.expanded.get(&base) {
            let mut expanded = self.expanded.clone();
            merge_first_writer(&mut expanded, &self.inherited);
            return Ok(ExpandOutcome::Widen {
                key: base,
                op: WideningOp::new(before.clone(), self.offset.clone()),
                narrowing: self.narrowing_ops.clone(),
                expanded,
            });
        }

        let base_node = graph.node(base)?;
        if base_node.out_addresses.is_empty() {
            return Ok(ExpandOutcome::Unresolvable);
        }

        let mut expanded = self.expanded.clone();
        expanded.insert(base, self.offset.clone());

        let mut drafts = Vec::with_capacity(base_node.out_addresses.len());
        for &id in &base_node.out_addresses {
            let via = graph.address(id)?;

            let mut narrowing_ops = self.narrowing_ops.clone();
            for (key, op) in &via.narrowing_ops {
                if !narrowing_ops.contains_key(key) {
                    narrowing_ops.insert(*key, op.contextualize(&self.offset)?);
                }
            }

            let mut widening_ops = self.widening_ops.clone();
            merge_widening(&mut widening_ops, &via.widening_ops);

            drafts.push(AddressDraft {
                base: via.base,
                addressee: self.addressee,
                offset: self.offset.add(&via.offset)?,
                narrowing_ops,
                widened: self.widened || via.widened || !widening_ops.is_empty(),
                widening_ops,
                expanded: expanded.clone(),
                inherited: self.inherited.clone(),
                through_argument: self.through_argument || via.through_argument,
                through_global: self.through_global || via.through_global,
            });
        }

        Ok(ExpandOutcome::Substitute(drafts))
    }
}

/// Description of an edge to be created by the engine
#[derive(Debug, Clone)]
pub struct AddressDraft {
    pub base: NodeId,
    pub addressee: NodeId,
    pub offset: Offset,
    pub narrowing_ops: NarrowingOps,
    pub widening_ops: WideningOps,
    pub expanded: ExpandedMap,
    pub inherited: ExpandedMap,
    pub widened: bool,
    pub through_argument: bool,
    pub through_global: bool,
}

impl AddressDraft {
    /// A fresh edge without operators or history
    pub fn direct(base: NodeId, addressee: NodeId, offset: Offset) -> Self {
        Self {
            base,
            addressee,
            offset,
            narrowing_ops: NarrowingOps::new(),
            widening_ops: WideningOps::new(),
            expanded: ExpandedMap::new(),
            inherited: ExpandedMap::new(),
            widened: false,
            through_argument: false,
            through_global: false,
        }
    }

    pub(crate) fn into_address(self) -> Address {
        Address {
            base: self.base,
            addressee: self.addressee,
            offset: self.offset,
            narrowing_ops: self.narrowing_ops,
            widening_ops: self.widening_ops,
            expanded: self.expanded,
            inherited: self.inherited,
            widened: self.widened,
            through_argument: self.through_argument,
            through_global: self.through_global,
            unrefined: None,
        }
    }
}

/// What the engine must do with an expanded edge
#[derive(Debug)]
pub enum ExpandOutcome {
    /// Retire the edge and create its successors
    Substitute(Vec<AddressDraft>),
    /// Retire the edge and spread a widening operator over the open worklists
    Widen {
        key: NodeId,
        op: WideningOp,
        narrowing: NarrowingOps,
        expanded: ExpandedMap,
    },
    /// The base has no addresses to substitute; keep the edge as it is
    Unresolvable,
}
