//! Graph construction
//!
//! Nodes are classified lazily: creating a node queues it, and the builder
//! drains the queue until every reachable entity has been materialized exactly
//! once.

use crate::errors::Result;
use crate::features::offset_alias::domain::{
    AddressDraft, AddressId, EntityId, NarrowingOp, NodeId, Offset, OffsetDomain, PointerGraph,
    PointerKind,
};
use crate::features::offset_alias::ports::{AddressMaterializer, Classification, GraphAccessor};
use std::collections::VecDeque;
use tracing::{debug, trace, warn};

/// Counters of one build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub classified: usize,
    pub downgraded: usize,
    pub insufficient_call_sites: usize,
}

/// [`GraphAccessor`] over a graph under construction
pub struct GraphBuilder<'g> {
    graph: &'g mut PointerGraph,
    queue: VecDeque<NodeId>,
    stats: BuildStats,
}

impl<'g> GraphBuilder<'g> {
    pub fn new(graph: &'g mut PointerGraph) -> Self {
        Self {
            graph,
            queue: VecDeque::new(),
            stats: BuildStats::default(),
        }
    }

    #[inline]
    pub fn stats(&self) -> BuildStats {
        self.stats
    }

    /// Create nodes for `roots` and classify everything they reach
    pub fn build(
        &mut self,
        roots: impl IntoIterator<Item = EntityId>,
        materializer: &mut dyn AddressMaterializer,
    ) -> Result<()> {
        for entity in roots {
            self.get_or_create_node(entity);
        }
        self.drain(materializer)
    }

    /// Classify every queued node
    pub fn drain(&mut self, materializer: &mut dyn AddressMaterializer) -> Result<()> {
        while let Some(node) = self.queue.pop_front() {
            if self.graph.node(node)?.classified {
                continue;
            }
            let entity = self.graph.node(node)?.entity;
            let classification = materializer.materialize(node, entity, self)?;
            self.apply(node, classification)?;
        }
        debug!(
            nodes = self.graph.node_count(),
            addresses = self.graph.address_count(),
            classified = self.stats.classified,
            "pointer graph built"
        );
        Ok(())
    }

    /// Record a classification on `node`, downgrading indirect nodes that
    /// ended up without addresses
    pub fn apply(&mut self, node: NodeId, classification: Classification) -> Result<()> {
        let Classification {
            mut kind,
            name,
            entity_is_argument,
            entity_is_global,
            insufficient_call_sites,
        } = classification;

        let target = self.graph.node_mut(node)?;
        if kind.is_indirect() && target.out_addresses.is_empty() {
            trace!(%node, %kind, "indirect node without addresses downgraded");
            kind = PointerKind::Unknown;
            self.stats.downgraded += 1;
        }
        if insufficient_call_sites > 0 {
            warn!(
                %node,
                call_sites = insufficient_call_sites,
                "not enough actual arguments at call site; argument treated as unknown"
            );
            self.stats.insufficient_call_sites += insufficient_call_sites;
        }

        target.kind = kind;
        if name.is_some() {
            target.name = name;
        }
        target.entity_is_argument |= entity_is_argument;
        target.entity_is_global |= entity_is_global;
        target.classified = true;
        self.stats.classified += 1;
        Ok(())
    }

    pub fn graph(&self) -> &PointerGraph {
        self.graph
    }

    pub fn graph_mut(&mut self) -> &mut PointerGraph {
        self.graph
    }
}

impl GraphAccessor for GraphBuilder<'_> {
    fn domain(&self) -> &OffsetDomain {
        self.graph.domain()
    }

    fn get_or_create_node(&mut self, entity: EntityId) -> NodeId {
        let (node, created) = self.graph.insert_node(entity);
        if created {
            self.queue.push_back(node);
        }
        node
    }

    fn create_address(&mut self, base: NodeId, addressee: NodeId, offset: Offset) -> Result<AddressId> {
        self.graph
            .insert_draft(AddressDraft::direct(base, addressee, offset))
            .map(|(id, _)| id)
    }

    fn attach_narrowing(&mut self, address: AddressId, op: NarrowingOp) -> Result<bool> {
        let address = self.graph.address_mut(address)?;
        if address.narrowing_ops.contains_key(&op.compared) {
            return Ok(false);
        }
        address.narrowing_ops.insert(op.compared, op);
        Ok(true)
    }
}
