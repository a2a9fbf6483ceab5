//! Pointer Dependence Graph
//!
//! Arena of nodes and address edges. Nodes are never removed; address slots
//! are recycled through a free list and every reuse bumps the slot generation,
//! so a stale [`AddressId`] held by a worklist is detected instead of silently
//! aliasing a newer edge.
//!
//! Every live edge is registered in exactly two sets: the addressee's
//! `out_addresses` and the base's `in_addresses`. [`PointerGraph::retire_address`]
//! removes both registrations together.

use super::address::{Address, AddressDraft, AddressId};
use super::entity::EntityId;
use super::offset::{Offset, OffsetDomain};
use super::pointer_node::{NodeId, PointerKind, PointerNode};
use crate::errors::{AliasError, Result};
use rustc_hash::FxHashMap;
use tracing::trace;

#[derive(Debug)]
struct Slot {
    generation: u32,
    address: Option<Address>,
}

/// Running counters of edge churn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphCounters {
    pub created: usize,
    pub retired: usize,
    pub merged: usize,
}

#[derive(Debug)]
pub struct PointerGraph {
    domain: OffsetDomain,
    nodes: Vec<PointerNode>,
    by_entity: FxHashMap<EntityId, NodeId>,
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
    counters: GraphCounters,
}

impl PointerGraph {
    pub fn new(domain: OffsetDomain) -> Self {
        Self {
            domain,
            nodes: Vec::new(),
            by_entity: FxHashMap::default(),
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
            counters: GraphCounters::default(),
        }
    }

    #[inline]
    pub fn domain(&self) -> &OffsetDomain {
        &self.domain
    }

    #[inline]
    pub fn counters(&self) -> GraphCounters {
        self.counters
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of live address edges
    #[inline]
    pub fn address_count(&self) -> usize {
        self.live
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Nodes
    // ═══════════════════════════════════════════════════════════════════════

    /// Node for `entity`, creating it on first request.
    ///
    /// Returns `true` as second element if the node was just created.
    pub fn insert_node(&mut self, entity: EntityId) -> (NodeId, bool) {
        if let Some(&id) = self.by_entity.get(&entity) {
            return (id, false);
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(PointerNode::new(id, entity));
        self.by_entity.insert(entity, id);
        (id, true)
    }

    /// Node previously created for `entity`
    #[inline]
    pub fn node_for(&self, entity: EntityId) -> Option<NodeId> {
        self.by_entity.get(&entity).copied()
    }

    pub fn node(&self, id: NodeId) -> Result<&PointerNode> {
        self.nodes.get(id.index()).ok_or(AliasError::UnknownNode(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut PointerNode> {
        self.nodes
            .get_mut(id.index())
            .ok_or(AliasError::UnknownNode(id))
    }

    pub fn nodes(&self) -> impl Iterator<Item = &PointerNode> + '_ {
        self.nodes.iter()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    pub fn kind(&self, id: NodeId) -> Result<PointerKind> {
        Ok(self.node(id)?.kind)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Addresses
    // ═══════════════════════════════════════════════════════════════════════

    pub fn address(&self, id: AddressId) -> Result<&Address> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.address.as_ref())
            .ok_or(AliasError::StaleAddress(id))
    }

    pub fn address_mut(&mut self, id: AddressId) -> Result<&mut Address> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.address.as_mut())
            .ok_or(AliasError::StaleAddress(id))
    }

    /// True if `id` still names a live edge
    #[inline]
    pub fn is_live(&self, id: AddressId) -> bool {
        self.address(id).is_ok()
    }

    /// All live edges in slot order
    pub fn addresses(&self) -> impl Iterator<Item = (AddressId, &Address)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.address.as_ref().map(|address| {
                (
                    AddressId {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    address,
                )
            })
        })
    }

    /// Live edge with the same (base, addressee, offset) triple, if any
    pub fn find_address(&self, base: NodeId, addressee: NodeId, offset: &Offset) -> Option<AddressId> {
        let node = self.nodes.get(addressee.index())?;
        node.out_addresses.iter().copied().find(|&id| {
            self.address(id)
                .map(|a| a.base == base && a.offset.same_as(offset))
                .unwrap_or(false)
        })
    }

    /// Record `addressee = base + offset`
    pub fn create_address(&mut self, base: NodeId, addressee: NodeId, offset: Offset) -> Result<AddressId> {
        self.insert_draft(AddressDraft::direct(base, addressee, offset))
            .map(|(id, _)| id)
    }

    /// Materialize a draft edge.
    ///
    /// Provenance flags are OR-ed with the base's entity provenance. If an edge
    /// with the same triple is already live, the draft is merged into it
    /// (first writer wins for operators; the draft's history is inherited) and `false` is returned.
    pub fn insert_draft(&mut self, mut draft: AddressDraft) -> Result<(AddressId, bool)> {
        let base = self.node(draft.base)?;
        draft.through_argument |= base.entity_is_argument;
        draft.through_global |= base.entity_is_global;
        self.node(draft.addressee)?;

        if let Some(existing) = self.find_address(draft.base, draft.addressee, &draft.offset) {
            let address = self.address_mut(existing)?;
            address.merge_narrowing(&draft.narrowing_ops);
            address.inherit_expanded(&draft.expanded);
            address.inherit_expanded(&draft.inherited);
            for (key, ops) in draft.widening_ops {
                for op in ops {
                    address.attach_widening(key, op);
                }
            }
            address.widened |= draft.widened;
            address.through_argument |= draft.through_argument;
            address.through_global |= draft.through_global;
            self.counters.merged += 1;
            trace!(address = %existing, "merged duplicate address");
            return Ok((existing, false));
        }

        let (base, addressee) = (draft.base, draft.addressee);
        let address = draft.into_address();
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.address = Some(address);
                AddressId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    address: Some(address),
                });
                AddressId { index, generation: 0 }
            }
        };

        self.nodes[addressee.index()].out_addresses.insert(id);
        self.nodes[base.index()].in_addresses.insert(id);
        self.live += 1;
        self.counters.created += 1;
        trace!(address = %id, %base, %addressee, "created address");
        Ok((id, true))
    }

    /// Remove an edge from the graph and from both endpoints
    pub fn retire_address(&mut self, id: AddressId) -> Result<Address> {
        let slot = self
            .slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .ok_or(AliasError::StaleAddress(id))?;
        let address = slot.address.take().ok_or(AliasError::StaleAddress(id))?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);

        self.nodes[address.addressee.index()].out_addresses.remove(&id);
        self.nodes[address.base.index()].in_addresses.remove(&id);
        self.live -= 1;
        self.counters.retired += 1;
        trace!(address = %id, "retired address");
        Ok(address)
    }

    /// Check the two-sided registration of every live edge
    pub fn verify(&self) -> Result<()> {
        let mut registered = 0;
        for node in &self.nodes {
            for &id in &node.out_addresses {
                let address = self.address(id)?;
                if address.addressee != node.id {
                    return Err(AliasError::malformed(format!(
                        "{} listed as address of {} but belongs to {}",
                        id, node.id, address.addressee
                    )));
                }
                if !self.node(address.base)?.in_addresses.contains(&id) {
                    return Err(AliasError::malformed(format!(
                        "{} missing from in-addresses of base {}",
                        id, address.base
                    )));
                }
                registered += 1;
            }
        }
        if registered != self.live {
            return Err(AliasError::malformed(format!(
                "{} live addresses but {} registered",
                self.live, registered
            )));
        }
        Ok(())
    }
}
