//! Strongly Connected Component Detection
//!
//! Kosaraju's two-pass algorithm over the pointer dependence graph.
//!
//! # Why SCC Detection?
//! Expanding an indirect address substitutes its base's addresses. Inside a
//! cycle of indirect pointers this never ends:
//!   p = phi(a, q), q = p + 8   (p → q → p → ...)
//!
//! Resolving one SCC at a time, and only expanding bases of the same SCC,
//! bounds the expansion; the `expanded` history on each edge turns the second
//! visit of a base into a widening.
//!
//! # Passes
//! 1. DFS over the transpose graph (base → addressee, via `in_addresses`),
//!    recording finish order
//! 2. DFS over the forward graph (addressee → base, via `out_addresses`) in
//!    reverse finish order; each tree is one SCC
//!
//! Both passes are iterative and keep color/assignment in pass-local arrays.
//!
//! # References
//! - Sharir, M. "A strong-connectivity algorithm and its applications in data
//!   flow analysis" (1981)

use crate::features::offset_alias::domain::pointer_graph::PointerGraph;
use crate::features::offset_alias::domain::pointer_node::NodeId;

/// Statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SCCStats {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub scc_count: usize,
    pub largest_scc: usize,
    /// SCCs with more than one member or a self edge
    pub cyclic_sccs: usize,
}

/// One component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scc {
    /// Root of the pass-2 DFS tree
    pub representative: NodeId,
    pub members: Vec<NodeId>,
}

impl Scc {
    #[inline]
    pub fn size(&self) -> usize {
        self.members.len()
    }
}

/// Result of SCC detection
#[derive(Debug, Clone)]
pub struct SCCResult {
    /// Node index → SCC id
    pub scc_of: Vec<usize>,
    /// SCCs in discovery order (reverse topological order of the condensation
    /// of the transpose graph)
    pub sccs: Vec<Scc>,
    pub stats: SCCStats,
}

impl SCCResult {
    #[inline]
    pub fn scc_id(&self, node: NodeId) -> Option<usize> {
        self.scc_of.get(node.index()).copied()
    }

    pub fn same_scc(&self, a: NodeId, b: NodeId) -> bool {
        matches!((self.scc_id(a), self.scc_id(b)), (Some(x), Some(y)) if x == y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DfsColor {
    White,
    Gray,
    Black,
}

/// Adjacency lists of both directions, built once per detection
struct Adjacency {
    forward: Vec<Vec<usize>>,
    transpose: Vec<Vec<usize>>,
}

impl Adjacency {
    fn of(graph: &PointerGraph) -> Self {
        let n = graph.node_count();
        let mut forward = vec![Vec::new(); n];
        let mut transpose = vec![Vec::new(); n];
        for (_, address) in graph.addresses() {
            forward[address.addressee.index()].push(address.base.index());
            transpose[address.base.index()].push(address.addressee.index());
        }
        Self { forward, transpose }
    }
}

/// Iterative DFS from `start` over `adj`, visiting only nodes accepted by
/// `admit`. Calls `finish` in post-order.
fn dfs_post_order(
    start: usize,
    adj: &[Vec<usize>],
    color: &mut [DfsColor],
    admit: impl Fn(usize) -> bool,
    mut finish: impl FnMut(usize),
) {
    let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
    color[start] = DfsColor::Gray;

    while let Some(top) = stack.last_mut() {
        let node = top.0;
        if let Some(&succ) = adj[node].get(top.1) {
            top.1 += 1;
            if color[succ] == DfsColor::White && admit(succ) {
                color[succ] = DfsColor::Gray;
                stack.push((succ, 0));
            }
        } else {
            color[node] = DfsColor::Black;
            finish(node);
            stack.pop();
        }
    }
}

/// Kosaraju's SCC algorithm
///
/// Time: O(V + E)
/// Space: O(V + E)
pub fn kosaraju_scc(graph: &PointerGraph) -> SCCResult {
    let n = graph.node_count();
    let adj = Adjacency::of(graph);

    // Pass 1: finish order over the transpose graph
    let mut color = vec![DfsColor::White; n];
    let mut finish_order = Vec::with_capacity(n);
    for start in 0..n {
        if color[start] == DfsColor::White {
            dfs_post_order(start, &adj.transpose, &mut color, |_| true, |v| {
                finish_order.push(v)
            });
        }
    }

    // Pass 2: forward DFS in reverse finish order
    let mut color = vec![DfsColor::White; n];
    let mut scc_of = vec![usize::MAX; n];
    let mut sccs = Vec::new();
    for &start in finish_order.iter().rev() {
        if color[start] != DfsColor::White {
            continue;
        }
        let id = sccs.len();
        let mut members = Vec::new();
        dfs_post_order(start, &adj.forward, &mut color, |_| true, |v| {
            scc_of[v] = id;
            members.push(NodeId(v as u32));
        });
        members.sort();
        sccs.push(Scc {
            representative: NodeId(start as u32),
            members,
        });
    }

    let cyclic_sccs = sccs
        .iter()
        .filter(|scc| {
            scc.size() > 1 || adj.forward[scc.representative.index()].contains(&scc.representative.index())
        })
        .count();

    SCCResult {
        stats: SCCStats {
            total_nodes: n,
            total_edges: graph.address_count(),
            scc_count: sccs.len(),
            largest_scc: sccs.iter().map(Scc::size).max().unwrap_or(0),
            cyclic_sccs,
        },
        scc_of,
        sccs,
    }
}

/// Order in which the members of every SCC are seeded during per-SCC
/// resolution: post-order of a transpose DFS restricted to the SCC, rooted at
/// its representative. Indexed by SCC id.
pub fn scc_visit_orders(graph: &PointerGraph, result: &SCCResult) -> Vec<Vec<NodeId>> {
    let adj = Adjacency::of(graph);
    let mut color = vec![DfsColor::White; graph.node_count()];

    result
        .sccs
        .iter()
        .enumerate()
        .map(|(scc, component)| {
            let mut order = Vec::with_capacity(component.size());
            let in_scc = |v: usize| result.scc_of.get(v) == Some(&scc);
            let roots = std::iter::once(component.representative).chain(component.members.iter().copied());
            for root in roots {
                if color[root.index()] == DfsColor::White {
                    dfs_post_order(root.index(), &adj.transpose, &mut color, in_scc, |v| {
                        order.push(NodeId(v as u32))
                    });
                }
            }
            order
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::offset_alias::domain::entity::EntityId;
    use crate::features::offset_alias::infrastructure::interval_offset::IntervalOffset;

    /// Graph with `n` nodes and `addressee → base` edges
    fn graph(n: u32, edges: &[(u32, u32)]) -> PointerGraph {
        let mut g = PointerGraph::new(IntervalOffset::domain());
        for i in 0..n {
            g.insert_node(EntityId(i));
        }
        for &(addressee, base) in edges {
            g.create_address(NodeId(base), NodeId(addressee), g.domain().neutral())
                .unwrap();
        }
        g
    }

    #[test]
    fn test_simple_cycle() {
        // 0 → 1 → 2 → 0
        let g = graph(3, &[(0, 1), (1, 2), (2, 0)]);
        let result = kosaraju_scc(&g);

        assert_eq!(result.stats.scc_count, 1);
        assert_eq!(result.stats.cyclic_sccs, 1);
        assert_eq!(result.sccs[0].members, vec![NodeId(0), NodeId(1), NodeId(2)]);
    }

    #[test]
    fn test_no_cycle() {
        // 0 → 1 → 2 (chain)
        let g = graph(3, &[(0, 1), (1, 2)]);
        let result = kosaraju_scc(&g);

        assert_eq!(result.stats.scc_count, 3);
        assert_eq!(result.stats.cyclic_sccs, 0);
        assert!(!result.same_scc(NodeId(0), NodeId(1)));
    }

    #[test]
    fn test_multiple_sccs() {
        // Two cycles (0,1,2) and (3,4) joined by 2 → 3
        let g = graph(5, &[(0, 1), (1, 2), (2, 0), (2, 3), (3, 4), (4, 3)]);
        let result = kosaraju_scc(&g);

        assert_eq!(result.stats.scc_count, 2);
        assert_eq!(result.stats.largest_scc, 3);
        assert!(result.same_scc(NodeId(0), NodeId(2)));
        assert!(result.same_scc(NodeId(3), NodeId(4)));
        assert!(!result.same_scc(NodeId(2), NodeId(3)));
    }

    #[test]
    fn test_self_loop_is_cyclic() {
        let g = graph(2, &[(0, 0), (1, 0)]);
        let result = kosaraju_scc(&g);

        assert_eq!(result.stats.scc_count, 2);
        assert_eq!(result.stats.cyclic_sccs, 1);
    }

    #[test]
    fn test_every_node_assigned() {
        let g = graph(6, &[(0, 1), (2, 3), (3, 2), (5, 5)]);
        let result = kosaraju_scc(&g);
        assert!(result.scc_of.iter().all(|&id| id < result.sccs.len()));
        let total: usize = result.sccs.iter().map(Scc::size).sum();
        assert_eq!(total, 6);
    }

    #[test]
    fn test_visit_order_stays_inside_scc() {
        let g = graph(4, &[(0, 1), (1, 0), (1, 2), (3, 0)]);
        let result = kosaraju_scc(&g);
        let scc = result.scc_id(NodeId(0)).unwrap();

        let mut order = scc_visit_orders(&g, &result)[scc].clone();
        order.sort();
        assert_eq!(order, vec![NodeId(0), NodeId(1)]);
    }
}
