//! Local Trees
//!
//! A node with exactly one address is fully determined by its base. Following
//! these single-address links gives a chain of ancestors ending at a local
//! root; two pointers under the same root are compared at their nearest common
//! ancestor without looking at the rest of the graph.
//!
//! ```text
//! buf ← p = buf + 4 ← q = p + 8
//!     ← r = buf + 0
//!
//! path(q) = { q: (0, 0), p: (1, 8), buf: (2, 12) }
//! path(r) = { r: (0, 0), buf: (1, 0) }
//! nca(q, r) = buf, 12 vs 0 ⇒ disjoint
//! ```
//!
//! Captured on the initial graph, before resolution rewrites any edge.

use crate::errors::Result;
use crate::features::offset_alias::domain::offset::Offset;
use crate::features::offset_alias::domain::pointer_graph::PointerGraph;
use crate::features::offset_alias::domain::pointer_node::{LocalTree, NodeId};
use rustc_hash::FxHashMap;
use tracing::debug;

/// Chain of single-address ancestors of `start`
pub fn capture(graph: &PointerGraph, start: NodeId) -> Result<LocalTree> {
    let mut path: FxHashMap<NodeId, (usize, Offset)> = FxHashMap::default();
    let mut current = start;
    let mut offset = graph.domain().neutral();
    let mut index = 0;

    let root = loop {
        path.insert(current, (index, offset.clone()));
        let node = graph.node(current)?;
        if node.out_addresses.len() != 1 {
            break current;
        }
        let Some(&only) = node.out_addresses.iter().next() else {
            break current;
        };
        let address = graph.address(only)?;
        let next = address.base;
        if path.contains_key(&next) {
            // A pure cycle: the root is the largest handle on it
            break path.keys().copied().max().unwrap_or(current);
        }
        offset = offset.add(&address.offset)?;
        index += 1;
        current = next;
    };

    Ok(LocalTree {
        root: Some(root),
        path,
    })
}

/// Capture the local tree of every node. Returns the number of nodes with at
/// least one ancestor.
pub fn capture_all(graph: &mut PointerGraph) -> Result<usize> {
    let ids: Vec<NodeId> = graph.node_ids().collect();
    let mut trees = Vec::with_capacity(ids.len());
    for &id in &ids {
        trees.push(capture(graph, id)?);
    }

    let mut chained = 0;
    for (id, tree) in ids.into_iter().zip(trees) {
        if tree.path.len() > 1 {
            chained += 1;
        }
        graph.node_mut(id)?.local_tree = tree;
    }
    debug!(chained, "captured local trees");
    Ok(chained)
}

/// Nearest common ancestor of two captured trees and the offsets of both
/// nodes from it. `None` if the roots differ or either tree is missing.
pub fn nearest_common_ancestor<'a>(
    first: &'a LocalTree,
    second: &'a LocalTree,
) -> Option<(NodeId, &'a Offset, &'a Offset)> {
    if first.root.is_none() || first.root != second.root {
        return None;
    }
    first
        .path
        .iter()
        .filter_map(|(node, (index, offset))| {
            second
                .path
                .get(node)
                .map(|(_, other)| (*index, *node, offset, other))
        })
        .min_by_key(|&(index, node, _, _)| (index, node))
        .map(|(_, node, a, b)| (node, a, b))
}
