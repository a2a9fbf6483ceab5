//! Ports (Interfaces) for Offset-Based Alias Analysis
//!
//! The engine never looks at a concrete IR. Three collaborators plug in:
//! - [`AddressMaterializer`]: classifies a node and creates its initial addresses
//! - [`EntitySource`]: describes program entities (used by the reference
//!   materializer)
//! - [`FallbackAliasAnalysis`]: answers whatever this analysis cannot prove
//!
//! Materializers talk back to the graph through [`GraphAccessor`] only.

use crate::errors::Result;
use crate::features::offset_alias::domain::{
    AddressId, AliasResult, CallSite, EntityDescription, EntityId, FunctionId, NarrowingOp,
    NodeId, Offset, OffsetDomain, PointerKind, Predicate,
};

// ============================================================================
// Graph access for materializers
// ============================================================================

/// Narrow view of the graph under construction
pub trait GraphAccessor {
    /// Offsets of this run
    fn domain(&self) -> &OffsetDomain;

    /// Node of `entity`; a new node is queued for classification
    fn get_or_create_node(&mut self, entity: EntityId) -> NodeId;

    /// Record `addressee = base + offset`
    fn create_address(&mut self, base: NodeId, addressee: NodeId, offset: Offset) -> Result<AddressId>;

    /// Attach a narrowing operator to an edge (first writer wins).
    /// Returns false if an operator for the same compared node was present.
    fn attach_narrowing(&mut self, address: AddressId, op: NarrowingOp) -> Result<bool>;

    /// Operator for "addressee `predicate` `compared`" with a neutral context
    fn derive_narrowing_op(&mut self, predicate: Predicate, compared: EntityId) -> NarrowingOp {
        let compared = self.get_or_create_node(compared);
        NarrowingOp::new(predicate, compared, self.domain().neutral())
    }
}

// ============================================================================
// Materialization
// ============================================================================

/// Outcome of classifying one node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub kind: PointerKind,
    pub name: Option<String>,
    pub entity_is_argument: bool,
    pub entity_is_global: bool,
    /// Call sites passing fewer actual arguments than needed
    pub insufficient_call_sites: usize,
}

impl Classification {
    pub fn of_kind(kind: PointerKind) -> Self {
        Self {
            kind,
            name: None,
            entity_is_argument: false,
            entity_is_global: false,
            insufficient_call_sites: 0,
        }
    }
}

/// Classifies nodes and creates their initial addresses
pub trait AddressMaterializer {
    /// Called exactly once per node
    fn materialize(
        &mut self,
        node: NodeId,
        entity: EntityId,
        graph: &mut dyn GraphAccessor,
    ) -> Result<Classification>;

    /// Called once per argument node during the interprocedural pass, on the
    /// resolved graph. Returns `None` if the node is left as it is.
    fn materialize_call_sites(
        &mut self,
        _node: NodeId,
        _entity: EntityId,
        _graph: &mut dyn GraphAccessor,
    ) -> Result<Option<Classification>> {
        Ok(None)
    }
}

/// Program entities as seen by the reference materializer
pub trait EntitySource {
    /// Entities whose nodes are created up front
    fn entities(&self) -> Vec<EntityId>;

    /// `None` for entities the source knows nothing about
    fn describe(&self, entity: EntityId) -> Option<EntityDescription>;

    /// Every call of `function`
    fn call_sites(&self, function: FunctionId) -> Vec<CallSite>;
}

// ============================================================================
// Fallback
// ============================================================================

/// The next analysis in the chain
pub trait FallbackAliasAnalysis: Send + Sync {
    fn alias(&self, first: EntityId, second: EntityId) -> AliasResult;

    fn points_to_constant_memory(&self, entity: EntityId) -> bool;
}

/// Knows nothing: everything may alias, nothing is constant
#[derive(Debug, Clone, Copy, Default)]
pub struct ConservativeFallback;

impl FallbackAliasAnalysis for ConservativeFallback {
    fn alias(&self, _first: EntityId, _second: EntityId) -> AliasResult {
        AliasResult::MayAlias
    }

    fn points_to_constant_memory(&self, _entity: EntityId) -> bool {
        false
    }
}
