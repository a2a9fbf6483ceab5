//! Graph Resolution Engine
//!
//! Rewrites the pointer dependence graph until every address hangs off a
//! concrete base, then refines the offsets with the collected operators.
//!
//! # Stages
//! ```text
//! Unresolved ──resolve_sccs──▶ SccResolved ──resolve_graph──▶ GraphResolved
//!                                                                │
//!                              close_self_addresses, apply_operators
//!                                                                ▼
//!                                                         OperatorsApplied
//! ```
//!
//! 1. **Per-SCC**: each SCC in roots-first order; only bases inside the same
//!    SCC are expanded, so a cycle is unrolled at most once before the
//!    `expanded` history turns it into a widening.
//! 2. **Whole graph**: every node that is not `Continuous` is re-seeded and
//!    any indirect base is expanded. Self edges are discarded.
//! 3. **Closure**: nodes left without addresses point at themselves.
//! 4. **Operators**: widen first, then narrow against a snapshot of the
//!    widened offsets. Both are recomputed from the unrefined offset, so the
//!    stage can be repeated.
//! 5. **Duplicates**: edges refined to the same triple are merged. This drops
//!    unrefined offsets, so it only runs once the graph is final.
//!
//! # Worklist
//! Successors of an expanded edge go to the front of the deque (depth-first,
//! as the expansion history is a path property). A widening spreads to every
//! edge of the current seed, pending or finalized.

use super::scc_detector::{kosaraju_scc, scc_visit_orders};
use crate::errors::{AliasError, Result};
use crate::features::offset_alias::domain::narrowing::merge_widening;
use crate::features::offset_alias::domain::{
    AddressId, ExpandOutcome, NodeId, Offset, PointerGraph, PointerKind,
};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, info, trace, warn};

/// Progress of one resolution run. Transitions are one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResolutionState {
    Unresolved,
    SccResolved,
    GraphResolved,
    OperatorsApplied,
}

/// Counters of one resolution run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionStats {
    pub scc_count: usize,
    pub largest_scc: usize,
    pub cyclic_sccs: usize,
    pub expansions: usize,
    pub widening_ops_created: usize,
    /// Edges whose offset was widened
    pub widening_applied: usize,
    /// Narrowing operators that found a bound
    pub narrowing_applied: usize,
    pub self_loops_pruned: usize,
    pub self_addresses_added: usize,
    /// Indirect bases without addresses to substitute
    pub unresolvable: usize,
    /// Edges that became identical after refinement
    pub duplicates_removed: usize,
}

/// Which bases a worklist run may expand
#[derive(Clone, Copy)]
enum Scope<'a> {
    Scc { id: usize, scc_of: &'a [usize] },
    Whole,
}

impl Scope<'_> {
    fn admits(&self, base: NodeId) -> bool {
        match self {
            Scope::Scc { id, scc_of } => scc_of.get(base.index()) == Some(id),
            Scope::Whole => true,
        }
    }
}

pub struct GraphResolver {
    max_worklist_len: usize,
    state: ResolutionState,
    stats: ResolutionStats,
    worklist_warned: bool,
}

impl GraphResolver {
    /// `max_worklist_len` only triggers a warning; the fixpoint is never cut
    pub fn new(max_worklist_len: usize) -> Self {
        Self {
            max_worklist_len,
            state: ResolutionState::Unresolved,
            stats: ResolutionStats::default(),
            worklist_warned: false,
        }
    }

    #[inline]
    pub fn state(&self) -> ResolutionState {
        self.state
    }

    #[inline]
    pub fn stats(&self) -> &ResolutionStats {
        &self.stats
    }

    /// All stages in order, for a graph that is not resolved again
    pub fn resolve(&mut self, graph: &mut PointerGraph) -> Result<ResolutionStats> {
        self.resolve_sccs(graph)?;
        self.resolve_graph(graph)?;
        self.close_self_addresses(graph)?;
        self.apply_operators(graph)?;
        self.remove_duplicate_addresses(graph)?;
        Ok(self.stats.clone())
    }

    fn require(&self, allowed: &[ResolutionState], stage: &str) -> Result<()> {
        if allowed.contains(&self.state) {
            return Ok(());
        }
        Err(AliasError::malformed(format!(
            "{} cannot run in state {:?}",
            stage, self.state
        )))
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Expansion
    // ═══════════════════════════════════════════════════════════════════════

    /// Expand the addresses of each SCC to a local fixpoint
    pub fn resolve_sccs(&mut self, graph: &mut PointerGraph) -> Result<()> {
        self.require(&[ResolutionState::Unresolved], "per-SCC resolution")?;
        prepare_run(graph);

        let sccs = kosaraju_scc(graph);
        let orders = scc_visit_orders(graph, &sccs);
        self.stats.scc_count = sccs.stats.scc_count;
        self.stats.largest_scc = sccs.stats.largest_scc;
        self.stats.cyclic_sccs = sccs.stats.cyclic_sccs;

        for (id, order) in orders.iter().enumerate() {
            if order.len() > 1 {
                debug!(scc = id, size = order.len(), "resolving cyclic SCC");
            }
            let scope = Scope::Scc {
                id,
                scc_of: &sccs.scc_of,
            };
            for &node in order {
                self.run_worklist(graph, node, scope)?;
            }
        }

        self.state = ResolutionState::SccResolved;
        debug!(
            sccs = self.stats.scc_count,
            expansions = self.stats.expansions,
            widenings = self.stats.widening_ops_created,
            "per-SCC resolution done"
        );
        Ok(())
    }

    /// Expand every remaining indirect base, seeded from non-Continuous nodes
    pub fn resolve_graph(&mut self, graph: &mut PointerGraph) -> Result<()> {
        self.require(&[ResolutionState::SccResolved], "whole-graph resolution")?;

        let seeds: Vec<NodeId> = graph
            .nodes()
            .filter(|node| node.kind != PointerKind::Continuous)
            .map(|node| node.id)
            .collect();
        for seed in seeds {
            self.run_worklist(graph, seed, Scope::Whole)?;
        }

        self.state = ResolutionState::GraphResolved;
        debug!(
            addresses = graph.address_count(),
            pruned = self.stats.self_loops_pruned,
            "whole-graph resolution done"
        );
        Ok(())
    }

    /// Drain the addresses of `seed`
    fn run_worklist(&mut self, graph: &mut PointerGraph, seed: NodeId, scope: Scope<'_>) -> Result<()> {
        let neutral = graph.domain().neutral();
        let seeded: Vec<AddressId> = graph.node(seed)?.out_addresses.iter().copied().collect();

        let mut pending: VecDeque<AddressId> = VecDeque::with_capacity(seeded.len());
        for id in seeded {
            graph
                .address_mut(id)?
                .expanded
                .entry(seed)
                .or_insert_with(|| neutral.clone());
            pending.push_back(id);
        }
        let mut finalized: Vec<AddressId> = Vec::new();

        while let Some(id) = pending.pop_front() {
            if pending.len() > self.max_worklist_len && !self.worklist_warned {
                warn!(
                    %seed,
                    pending = pending.len(),
                    limit = self.max_worklist_len,
                    "worklist exceeds configured length"
                );
                self.worklist_warned = true;
            }

            let (base, addressee) = {
                let address = graph.address(id)?;
                (address.base, address.addressee)
            };

            if matches!(scope, Scope::Whole) && base == addressee {
                graph.retire_address(id)?;
                self.stats.self_loops_pruned += 1;
                continue;
            }

            if !(graph.kind(base)?.is_indirect() && scope.admits(base)) {
                finalized.push(id);
                continue;
            }

            match graph.address(id)?.expand(graph)? {
                ExpandOutcome::Substitute(drafts) => {
                    trace!(address = %id, %base, successors = drafts.len(), "expanded");
                    graph.retire_address(id)?;
                    self.stats.expansions += 1;
                    for draft in drafts {
                        let (successor, created) = graph.insert_draft(draft)?;
                        if created {
                            pending.push_front(successor);
                        }
                    }
                }
                ExpandOutcome::Widen {
                    key,
                    op,
                    narrowing,
                    expanded,
                } => {
                    trace!(address = %id, %key, op = %op, "cycle closed; widening");
                    graph.retire_address(id)?;
                    self.stats.widening_ops_created += 1;
                    for &other in pending.iter().chain(finalized.iter()) {
                        let address = graph.address_mut(other)?;
                        address.attach_widening(key, op.clone());
                        address.merge_narrowing(&narrowing);
                        address.inherit_expanded(&expanded);
                    }
                }
                ExpandOutcome::Unresolvable => {
                    trace!(address = %id, %base, "base has no addresses");
                    self.stats.unresolvable += 1;
                    finalized.push(id);
                }
            }
        }
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Closure
    // ═══════════════════════════════════════════════════════════════════════

    /// Give every node without addresses a neutral address to itself
    pub fn close_self_addresses(&mut self, graph: &mut PointerGraph) -> Result<()> {
        self.require(&[ResolutionState::GraphResolved], "self-address closure")?;

        let empty: Vec<NodeId> = graph
            .nodes()
            .filter(|node| node.out_addresses.is_empty())
            .map(|node| node.id)
            .collect();
        for id in empty {
            let neutral = graph.domain().neutral();
            graph.create_address(id, id, neutral)?;
            let node = graph.node_mut(id)?;
            if !node.kind.is_terminal() {
                trace!(node = %id, kind = %node.kind, "self-addressed node is unknown");
                node.kind = PointerKind::Unknown;
            }
            self.stats.self_addresses_added += 1;
        }
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Operators
    // ═══════════════════════════════════════════════════════════════════════

    /// Widen, then narrow every edge; merge edges that became identical
    pub fn apply_operators(&mut self, graph: &mut PointerGraph) -> Result<()> {
        self.require(
            &[ResolutionState::GraphResolved, ResolutionState::OperatorsApplied],
            "operator application",
        )?;
        let ids: Vec<AddressId> = graph.addresses().map(|(id, _)| id).collect();
        let mut widened_edges = 0;
        let mut narrowed = 0;

        let mut widened: FxHashMap<AddressId, Offset> = FxHashMap::default();
        let mut snapshot: FxHashMap<NodeId, Vec<(NodeId, AddressId)>> = FxHashMap::default();
        for &id in &ids {
            let address = graph.address(id)?;
            let mut offset = address.resolved_offset().clone();
            for op in address.widening_ops.values().flatten() {
                offset = offset.widen(op)?;
            }
            if !address.widening_ops.is_empty() {
                widened_edges += 1;
            }
            snapshot
                .entry(address.addressee)
                .or_default()
                .push((address.base, id));
            widened.insert(id, offset);
        }

        let mut refined = Vec::with_capacity(ids.len());
        for &id in &ids {
            let address = graph.address(id)?;
            let mut offset = widened
                .get(&id)
                .cloned()
                .ok_or(AliasError::StaleAddress(id))?;
            for op in address.narrowing_ops.values() {
                let bounds: Vec<&Offset> = snapshot
                    .get(&op.compared)
                    .into_iter()
                    .flatten()
                    .filter(|(base, _)| *base == address.base)
                    .filter_map(|(_, other)| widened.get(other))
                    .collect();
                // Several addresses on the same base give no single bound
                if let [only] = bounds.as_slice() {
                    let bound = only.add(&op.context)?;
                    offset = offset.narrow_against(op.predicate, &bound)?;
                    narrowed += 1;
                }
            }
            refined.push((id, offset));
        }

        for (id, offset) in refined {
            let address = graph.address_mut(id)?;
            if address.unrefined.is_none() {
                address.unrefined = Some(address.offset.clone());
            }
            address.offset = offset;
        }

        self.stats.widening_applied = widened_edges;
        self.stats.narrowing_applied = narrowed;
        self.state = ResolutionState::OperatorsApplied;

        info!(
            addresses = graph.address_count(),
            widened = widened_edges,
            narrowed,
            "operators applied"
        );
        Ok(())
    }
}

/// Undo what a previous run left on the edges: refined offsets go back to
/// their unrefined value and the expansion history starts empty
fn prepare_run(graph: &mut PointerGraph) {
    let ids: Vec<AddressId> = graph.addresses().map(|(id, _)| id).collect();
    for id in ids {
        if let Ok(address) = graph.address_mut(id) {
            if let Some(offset) = address.unrefined.take() {
                address.offset = offset;
            }
            address.expanded.clear();
            address.inherited.clear();
        }
    }
}

impl GraphResolver {
    /// Retire edges that refined to the same triple as an earlier edge.
    ///
    /// The retired edge's unrefined offset is lost, so a graph must not be
    /// resolved again afterwards.
    pub fn remove_duplicate_addresses(&mut self, graph: &mut PointerGraph) -> Result<usize> {
        self.require(&[ResolutionState::OperatorsApplied], "duplicate removal")?;
        let removed = remove_duplicates(graph)?;
        self.stats.duplicates_removed += removed;
        debug!(removed, "duplicate addresses merged");
        Ok(removed)
    }
}

/// Retire edges whose triple equals an earlier edge of the same addressee.
/// Provenance and widening operators are merged into the survivor.
fn remove_duplicates(graph: &mut PointerGraph) -> Result<usize> {
    let mut removed = 0;
    let nodes: Vec<NodeId> = graph.node_ids().collect();
    for node in nodes {
        let ids: Vec<AddressId> = graph.node(node)?.out_addresses.iter().copied().collect();
        let mut kept: Vec<AddressId> = Vec::with_capacity(ids.len());
        for id in ids {
            let survivor = {
                let address = graph.address(id)?;
                kept.iter().copied().find(|&other| {
                    graph
                        .address(other)
                        .map(|o| o.base == address.base && o.offset.same_as(&address.offset))
                        .unwrap_or(false)
                })
            };
            match survivor {
                Some(survivor) => {
                    let retired = graph.retire_address(id)?;
                    let address = graph.address_mut(survivor)?;
                    merge_widening(&mut address.widening_ops, &retired.widening_ops);
                    address.widened |= retired.widened;
                    address.through_argument |= retired.through_argument;
                    address.through_global |= retired.through_global;
                    removed += 1;
                }
                None => kept.push(id),
            }
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::offset_alias::domain::{EntityId, EntityKind, NarrowingSpec, Predicate};
    use crate::features::offset_alias::infrastructure::entity_classifier::EntityClassifier;
    use crate::features::offset_alias::infrastructure::graph_builder::GraphBuilder;
    use crate::features::offset_alias::infrastructure::in_memory_source::InMemoryProgram;
    use crate::features::offset_alias::infrastructure::interval_offset::{IntRange, IntervalOffset};
    use crate::features::offset_alias::ports::EntitySource;

    fn build(program: InMemoryProgram) -> PointerGraph {
        let mut graph = PointerGraph::new(IntervalOffset::domain());
        let roots = program.entities();
        let mut classifier = EntityClassifier::new(program);
        GraphBuilder::new(&mut graph).build(roots, &mut classifier).unwrap();
        graph
    }

    /// (base, range) of every address of `entity`, sorted
    fn addresses(graph: &PointerGraph, entity: EntityId) -> Vec<(NodeId, IntRange)> {
        let node = graph.node(graph.node_for(entity).unwrap()).unwrap();
        let mut out: Vec<_> = node
            .out_addresses
            .iter()
            .map(|&id| {
                let address = graph.address(id).unwrap();
                let range = address.offset.representation::<IntervalOffset>().unwrap().range();
                (address.base, range)
            })
            .collect();
        out.sort_by_key(|(base, range)| (*base, range.to_string()));
        out
    }

    #[test]
    fn test_loop_stride_widens_once() {
        // p = phi(a, q); q = p + 8
        let mut program = InMemoryProgram::new();
        let a = program.add(EntityKind::StackAlloc);
        let p = EntityId(1);
        let q = EntityId(2);
        program.insert(
            p,
            EntityKind::Merge {
                incoming: vec![a, q],
            }
            .into(),
        );
        program.insert(
            q,
            EntityKind::Derived {
                base: p,
                offset: IntervalOffset::domain().constant(8),
            }
            .into(),
        );
        let mut graph = build(program);

        let stats = GraphResolver::new(1_000).resolve(&mut graph).unwrap();
        assert_eq!(stats.widening_ops_created, 1);
        assert_eq!(stats.cyclic_sccs, 1);

        let a_node = graph.node_for(a).unwrap();
        assert_eq!(
            addresses(&graph, p),
            vec![
                (a_node, IntRange::constant(0)),
                (a_node, IntRange::new(8, i64::MAX)),
            ]
        );
        assert_eq!(addresses(&graph, q), vec![(a_node, IntRange::new(8, i64::MAX))]);
        graph.verify().unwrap();
    }

    #[test]
    fn test_self_loop_terminates_as_unknown() {
        let mut program = InMemoryProgram::new();
        let l = EntityId(0);
        program.insert(
            l,
            EntityKind::Derived {
                base: l,
                offset: IntervalOffset::domain().constant(1),
            }
            .into(),
        );
        let mut graph = build(program);

        let stats = GraphResolver::new(1_000).resolve(&mut graph).unwrap();
        assert_eq!(stats.widening_ops_created, 1);
        assert_eq!(stats.self_addresses_added, 1);

        let node = graph.node_for(l).unwrap();
        assert_eq!(graph.kind(node).unwrap(), PointerKind::Unknown);
        assert_eq!(addresses(&graph, l), vec![(node, IntRange::constant(0))]);
    }

    #[test]
    fn test_whole_graph_expands_across_sccs() {
        let mut program = InMemoryProgram::new();
        let a = program.add(EntityKind::StackAlloc);
        let b = program.add(EntityKind::Global);
        let m = program.add(EntityKind::Merge {
            incoming: vec![a, b],
        });
        let x = program.add(EntityKind::Merge {
            incoming: vec![m, a],
        });
        let mut graph = build(program);

        let mut resolver = GraphResolver::new(1_000);
        resolver.resolve_sccs(&mut graph).unwrap();
        // Different SCCs: nothing expanded yet
        assert_eq!(resolver.stats().expansions, 0);

        resolver.resolve_graph(&mut graph).unwrap();
        assert_eq!(resolver.state(), ResolutionState::GraphResolved);
        let bases: Vec<NodeId> = addresses(&graph, x).into_iter().map(|(base, _)| base).collect();
        assert_eq!(bases, vec![graph.node_for(a).unwrap(), graph.node_for(b).unwrap()]);
        assert!(graph.counters().merged >= 1);
    }

    #[test]
    fn test_closure_keeps_terminal_kinds() {
        let mut program = InMemoryProgram::new();
        let a = program.add(EntityKind::StackAlloc);
        let c = program.add(EntityKind::Call { allocates: false });
        let mut graph = build(program);

        GraphResolver::new(1_000).resolve(&mut graph).unwrap();
        let a_node = graph.node_for(a).unwrap();
        let c_node = graph.node_for(c).unwrap();
        assert_eq!(graph.kind(a_node).unwrap(), PointerKind::Alloc);
        assert_eq!(graph.kind(c_node).unwrap(), PointerKind::Unknown);
        assert_eq!(addresses(&graph, c), vec![(c_node, IntRange::constant(0))]);
    }

    #[test]
    fn test_unresolvable_base_is_kept() {
        let mut graph = PointerGraph::new(IntervalOffset::domain());
        let p = graph.insert_node(EntityId(0)).0;
        let x = graph.insert_node(EntityId(1)).0;
        graph.node_mut(p).unwrap().kind = PointerKind::Phi;
        graph.node_mut(x).unwrap().kind = PointerKind::Phi;
        let edge = graph.create_address(p, x, graph.domain().constant(4)).unwrap();

        let stats = GraphResolver::new(1_000).resolve(&mut graph).unwrap();
        assert_eq!(stats.unresolvable, 1);
        assert!(graph.is_live(edge));
        // p itself had nothing and is closed over
        assert_eq!(graph.kind(p).unwrap(), PointerKind::Unknown);
    }

    #[test]
    fn test_narrowing_bounds_from_compared_pointer() {
        let domain = IntervalOffset::domain();
        let mut program = InMemoryProgram::new();
        let buf = program.add(EntityKind::StackAlloc);
        let end = program.add(EntityKind::Derived {
            base: buf,
            offset: domain.constant(64),
        });
        let any = program.add(EntityKind::Derived {
            base: buf,
            offset: domain.range(0, i64::MAX),
        });
        let r = program.add(EntityKind::Restricted {
            source: any,
            narrowing: NarrowingSpec {
                predicate: Predicate::Lt,
                compared: end,
            },
        });
        // Continuous nodes are not re-seeded; the merge pulls r through
        let m = program.add(EntityKind::Merge { incoming: vec![r] });
        let mut graph = build(program);

        let stats = GraphResolver::new(1_000).resolve(&mut graph).unwrap();
        assert_eq!(stats.narrowing_applied, 1);
        let buf_node = graph.node_for(buf).unwrap();
        assert_eq!(addresses(&graph, m), vec![(buf_node, IntRange::new(0, 63))]);
    }

    #[test]
    fn test_operators_are_idempotent() {
        let domain = IntervalOffset::domain();
        let mut program = InMemoryProgram::new();
        let a = program.add(EntityKind::StackAlloc);
        let p = EntityId(1);
        let q = EntityId(2);
        program.insert(p, EntityKind::Merge { incoming: vec![a, q] }.into());
        program.insert(
            q,
            EntityKind::Derived {
                base: p,
                offset: domain.constant(8),
            }
            .into(),
        );
        let end = program.add(EntityKind::Derived {
            base: a,
            offset: domain.constant(64),
        });
        let r = program.add(EntityKind::Restricted {
            source: p,
            narrowing: NarrowingSpec {
                predicate: Predicate::Lt,
                compared: end,
            },
        });
        let x = program.add(EntityKind::Merge { incoming: vec![r] });
        let mut graph = build(program);

        let mut resolver = GraphResolver::new(1_000);
        resolver.resolve(&mut graph).unwrap();
        let a_node = graph.node_for(a).unwrap();
        assert_eq!(
            addresses(&graph, x),
            vec![
                (a_node, IntRange::constant(0)),
                (a_node, IntRange::new(8, 63)),
            ]
        );
        let first: Vec<_> = [p, q, x].iter().map(|&e| addresses(&graph, e)).collect();

        resolver.apply_operators(&mut graph).unwrap();
        let second: Vec<_> = [p, q, x].iter().map(|&e| addresses(&graph, e)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_rerun_keeps_edges_refined_to_the_same_offset() {
        let mut graph = PointerGraph::new(IntervalOffset::domain());
        let a = graph.insert_node(EntityId(0)).0;
        let x = graph.insert_node(EntityId(1)).0;
        graph.node_mut(a).unwrap().kind = PointerKind::Alloc;
        graph.node_mut(x).unwrap().kind = PointerKind::Phi;
        let low = graph.create_address(a, x, graph.domain().constant(0)).unwrap();
        let high = graph.create_address(a, x, graph.domain().constant(4)).unwrap();

        // A previous run refined both edges to [0, 8]
        for id in [low, high] {
            let refined = graph.domain().range(0, 8);
            let address = graph.address_mut(id).unwrap();
            address.unrefined = Some(std::mem::replace(&mut address.offset, refined));
        }

        let mut resolver = GraphResolver::new(1_000);
        resolver.resolve_sccs(&mut graph).unwrap();
        resolver.resolve_graph(&mut graph).unwrap();
        resolver.close_self_addresses(&mut graph).unwrap();
        resolver.apply_operators(&mut graph).unwrap();
        assert_eq!(
            addresses(&graph, EntityId(1)),
            vec![(a, IntRange::constant(0)), (a, IntRange::constant(4))]
        );
        assert_eq!(resolver.stats().duplicates_removed, 0);

        // Once final, edges with equal triples collapse
        graph.address_mut(high).unwrap().offset = IntervalOffset::domain().constant(0);
        assert_eq!(resolver.remove_duplicate_addresses(&mut graph).unwrap(), 1);
        assert_eq!(addresses(&graph, EntityId(1)), vec![(a, IntRange::constant(0))]);
        graph.verify().unwrap();
    }

    #[test]
    fn test_duplicate_removal_requires_operators() {
        let mut graph = PointerGraph::new(IntervalOffset::domain());
        let mut resolver = GraphResolver::new(1_000);
        assert!(resolver.remove_duplicate_addresses(&mut graph).is_err());
    }

    #[test]
    fn test_stage_order_enforced() {
        let mut graph = PointerGraph::new(IntervalOffset::domain());
        let mut resolver = GraphResolver::new(1_000);
        assert!(resolver.resolve_graph(&mut graph).is_err());
        assert!(resolver.apply_operators(&mut graph).is_err());

        resolver.resolve(&mut graph).unwrap();
        assert_eq!(resolver.state(), ResolutionState::OperatorsApplied);
        assert!(resolver.resolve_sccs(&mut graph).is_err());
    }
}
