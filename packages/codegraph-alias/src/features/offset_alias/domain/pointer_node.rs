//! Pointer Nodes
//!
//! One node per pointer-valued entity. A node owns the endpoints of two edge
//! sets:
//! - `out_addresses`: edges where it is the addressee ("my possible addresses")
//! - `in_addresses`: edges where it is the base ("pointers described through me")

use super::address::AddressId;
use super::entity::EntityId;
use super::offset::Offset;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Stable index of a node in the pointer graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Classification of a pointer in the dependence graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PointerKind {
    #[default]
    Unknown,
    Alloc,
    Phi,
    Continuous,
    Argument,
    Call,
    Global,
    Null,
}

impl PointerKind {
    /// Kinds that must be expanded to reach concrete bases
    #[inline]
    pub fn is_indirect(self) -> bool {
        matches!(self, PointerKind::Phi | PointerKind::Continuous)
    }

    /// Kinds that keep their classification when left without addresses
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            PointerKind::Null | PointerKind::Unknown | PointerKind::Global | PointerKind::Alloc
        )
    }

    /// Bases that denote one known memory object. Distinct concrete bases
    /// never overlap; everything else may stand for any object.
    #[inline]
    pub fn is_concrete_base(self) -> bool {
        matches!(
            self,
            PointerKind::Alloc | PointerKind::Global | PointerKind::Null
        )
    }
}

impl fmt::Display for PointerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PointerKind::Unknown => "Unknown",
            PointerKind::Alloc => "Allocation",
            PointerKind::Phi => "Phi",
            PointerKind::Continuous => "Continuous",
            PointerKind::Argument => "Argument",
            PointerKind::Call => "Call",
            PointerKind::Global => "Global",
            PointerKind::Null => "Null",
        };
        write!(f, "{}", s)
    }
}

/// The chain of single-address ancestors of a node
#[derive(Debug, Clone, Default)]
pub struct LocalTree {
    /// Root of the chain (`None` until captured)
    pub root: Option<NodeId>,
    /// ancestor → (distance, cumulative offset from the ancestor)
    pub path: FxHashMap<NodeId, (usize, Offset)>,
}

impl LocalTree {
    /// Ancestors ordered by distance
    pub fn ordered(&self) -> Vec<(NodeId, usize, &Offset)> {
        let mut entries: Vec<_> = self
            .path
            .iter()
            .map(|(&node, (index, offset))| (node, *index, offset))
            .collect();
        entries.sort_by_key(|&(node, index, _)| (index, node));
        entries
    }
}

/// A pointer-valued program entity
#[derive(Debug, Clone)]
pub struct PointerNode {
    pub id: NodeId,
    pub entity: EntityId,
    pub name: Option<String>,
    pub kind: PointerKind,
    pub out_addresses: BTreeSet<AddressId>,
    pub in_addresses: BTreeSet<AddressId>,
    /// Provenance copied from the entity description
    pub entity_is_argument: bool,
    pub entity_is_global: bool,
    /// Set once the materializer ran for this node
    pub classified: bool,
    pub local_tree: LocalTree,
}

impl PointerNode {
    pub fn new(id: NodeId, entity: EntityId) -> Self {
        Self {
            id,
            entity,
            name: None,
            kind: PointerKind::Unknown,
            out_addresses: BTreeSet::new(),
            in_addresses: BTreeSet::new(),
            entity_is_argument: false,
            entity_is_global: false,
            classified: false,
            local_tree: LocalTree::default(),
        }
    }

    /// Name for reports: the entity name if known, the handle otherwise
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self.entity.to_string(),
        }
    }
}
