//! Alias Queries over a Resolved Graph
//!
//! Decision procedure for `alias(p1, p2)`:
//! 1. Either pointer missing from the graph ⇒ ask the fallback
//! 2. **Local tree**: same root and disjoint offsets at the nearest common
//!    ancestor ⇒ `NoAlias`
//! 3. **Pairwise**: every pair of addresses provably disjoint ⇒ `NoAlias`
//!    - argument rule: exactly one side comes from an argument, the other is
//!      a local object untouched by globals
//!    - different bases: disjoint only if both denote one known object
//!    - same base: disjoint iff the offsets are
//! 4. Anything else ⇒ ask the fallback
//!
//! The graph is frozen once resolved, so queries take `&self` and may run in
//! parallel.

use crate::features::offset_alias::domain::{
    Address, AliasResult, AliasVerdict, DecidedBy, EntityId, NodeId, PointerGraph, PointerKind,
};
use crate::features::offset_alias::infrastructure::local_tree::nearest_common_ancestor;
use crate::features::offset_alias::ports::FallbackAliasAnalysis;
use std::sync::Arc;
use tracing::trace;

use super::report::AnalysisReport;

/// A resolved pointer graph plus the policy to query it
pub struct ResolvedGraph {
    graph: PointerGraph,
    fallback: Arc<dyn FallbackAliasAnalysis>,
    argument_rule: bool,
    local_tree_check: bool,
    reports: Vec<AnalysisReport>,
}

impl ResolvedGraph {
    pub fn new(
        graph: PointerGraph,
        fallback: Arc<dyn FallbackAliasAnalysis>,
        argument_rule: bool,
        local_tree_check: bool,
    ) -> Self {
        Self {
            graph,
            fallback,
            argument_rule,
            local_tree_check,
            reports: Vec::new(),
        }
    }

    pub(crate) fn with_reports(mut self, reports: Vec<AnalysisReport>) -> Self {
        self.reports = reports;
        self
    }

    #[inline]
    pub fn graph(&self) -> &PointerGraph {
        &self.graph
    }

    /// Diagnostic snapshots, one per stage (empty unless requested)
    pub fn reports(&self) -> &[AnalysisReport] {
        &self.reports
    }

    /// Final addresses of `entity`
    pub fn addresses_of(&self, entity: EntityId) -> Vec<&Address> {
        let Some(node) = self.graph.node_for(entity).and_then(|id| self.graph.node(id).ok()) else {
            return Vec::new();
        };
        node.out_addresses
            .iter()
            .filter_map(|&id| self.graph.address(id).ok())
            .collect()
    }

    pub fn alias(&self, first: EntityId, second: EntityId) -> AliasResult {
        self.explain_alias(first, second).result
    }

    /// Answer plus the stage that decided it
    pub fn explain_alias(&self, first: EntityId, second: EntityId) -> AliasVerdict {
        let nodes = self
            .graph
            .node_for(first)
            .zip(self.graph.node_for(second))
            .and_then(|(a, b)| Some((self.graph.node(a).ok()?, self.graph.node(b).ok()?)));
        let Some((p1, p2)) = nodes else {
            return self.defer(first, second, DecidedBy::NotInGraph);
        };

        if self.local_tree_check {
            if let Some((ancestor, o1, o2)) = nearest_common_ancestor(&p1.local_tree, &p2.local_tree) {
                if !o1.may_overlap(o2) {
                    trace!(%first, %second, %ancestor, "separated by local tree");
                    return AliasVerdict::new(AliasResult::NoAlias, DecidedBy::LocalTree);
                }
            }
        }

        if p1.out_addresses.is_empty() || p2.out_addresses.is_empty() {
            return self.defer(first, second, DecidedBy::NoAddresses);
        }

        for &i in &p1.out_addresses {
            for &j in &p2.out_addresses {
                let separated = match (self.graph.address(i), self.graph.address(j)) {
                    (Ok(a), Ok(b)) => self.disjoint(a, b),
                    _ => false,
                };
                if !separated {
                    return self.defer(first, second, DecidedBy::Fallback);
                }
            }
        }
        AliasVerdict::new(AliasResult::NoAlias, DecidedBy::PairwiseEdges)
    }

    /// Delegates to the fallback
    pub fn points_to_constant_memory(&self, entity: EntityId) -> bool {
        self.fallback.points_to_constant_memory(entity)
    }

    /// Answer a batch of queries
    #[cfg(feature = "parallel")]
    pub fn alias_many(&self, queries: &[(EntityId, EntityId)]) -> Vec<AliasResult> {
        use rayon::prelude::*;

        queries
            .par_iter()
            .map(|&(first, second)| self.alias(first, second))
            .collect()
    }

    /// Answer a batch of queries
    #[cfg(not(feature = "parallel"))]
    pub fn alias_many(&self, queries: &[(EntityId, EntityId)]) -> Vec<AliasResult> {
        queries
            .iter()
            .map(|&(first, second)| self.alias(first, second))
            .collect()
    }

    fn defer(&self, first: EntityId, second: EntityId, decided_by: DecidedBy) -> AliasVerdict {
        AliasVerdict::new(self.fallback.alias(first, second), decided_by)
    }

    fn kind(&self, node: NodeId) -> PointerKind {
        self.graph.kind(node).unwrap_or(PointerKind::Unknown)
    }

    fn is_argument(&self, address: &Address) -> bool {
        address.through_argument || self.kind(address.base) == PointerKind::Argument
    }

    /// True if the two addresses can never denote the same byte
    fn disjoint(&self, i: &Address, j: &Address) -> bool {
        if self.argument_rule {
            let (i_arg, j_arg) = (self.is_argument(i), self.is_argument(j));
            if i_arg != j_arg {
                let local = if i_arg { j } else { i };
                if !local.through_global && self.kind(local.base).is_concrete_base() {
                    return true;
                }
            }
        }

        if i.base != j.base {
            return self.kind(i.base).is_concrete_base() && self.kind(j.base).is_concrete_base();
        }
        i.offset.disjoint(&j.offset).unwrap_or(false)
    }
}
