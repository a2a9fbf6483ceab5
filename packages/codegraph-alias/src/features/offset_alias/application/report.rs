//! Stage Reports
//!
//! A serializable snapshot of the pointer graph, taken after each resolution
//! stage when `capture_stage_reports` is set.
//!
//! # DOT Format
//! - nodes are labelled `name: kind`; allocations and globals are boxes,
//!   unknown pointers are dashed
//! - an edge goes from the addressee to its base and is labelled with the
//!   offset; widened edges are bold, edges carrying narrowing operators blue
//!
//! Render with `dot -Tsvg stage.dot -o stage.svg`.

use crate::errors::Result;
use crate::features::offset_alias::domain::{PointerGraph, PointerKind};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// One node of a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeReport {
    pub id: String,
    pub entity: String,
    pub name: Option<String>,
    pub kind: PointerKind,
    pub local_root: Option<String>,
}

/// One address of a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeReport {
    pub id: String,
    pub addressee: String,
    pub base: String,
    pub offset: String,
    pub widened: bool,
    pub narrowing: Vec<String>,
    pub widening: Vec<String>,
    pub through_argument: bool,
    pub through_global: bool,
}

/// The graph as it stood after `stage`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub stage: String,
    pub nodes: Vec<NodeReport>,
    pub edges: Vec<EdgeReport>,
}

impl AnalysisReport {
    pub fn capture(stage: impl Into<String>, graph: &PointerGraph) -> Self {
        let nodes = graph
            .nodes()
            .map(|node| NodeReport {
                id: node.id.to_string(),
                entity: node.entity.to_string(),
                name: node.name.clone(),
                kind: node.kind,
                local_root: node.local_tree.root.map(|root| root.to_string()),
            })
            .collect();

        let edges = graph
            .addresses()
            .map(|(id, address)| EdgeReport {
                id: id.to_string(),
                addressee: address.addressee.to_string(),
                base: address.base.to_string(),
                offset: address.offset.to_string(),
                widened: address.widened,
                narrowing: address.narrowing_ops.values().map(|op| op.to_string()).collect(),
                widening: address
                    .widening_ops
                    .iter()
                    .flat_map(|(key, ops)| ops.iter().map(move |op| format!("{}: {}", key, op)))
                    .collect(),
                through_argument: address.through_argument,
                through_global: address.through_global,
            })
            .collect();

        Self {
            stage: stage.into(),
            nodes,
            edges,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_dot(&self) -> std::result::Result<String, std::fmt::Error> {
        let mut dot = String::new();
        writeln!(dot, "digraph \"{}\" {{", escape(&self.stage))?;
        writeln!(dot, "rankdir=BT;")?;
        writeln!(dot, "node [shape=ellipse];")?;

        for node in &self.nodes {
            let label = match &node.name {
                Some(name) => format!("{}: {}", name, node.kind),
                None => format!("{}: {}", node.entity, node.kind),
            };
            let style = match node.kind {
                PointerKind::Alloc | PointerKind::Global => ", shape=box",
                PointerKind::Unknown => ", style=dashed",
                _ => "",
            };
            writeln!(dot, "{} [label=\"{}\"{}];", node.id, escape(&label), style)?;
        }

        for edge in &self.edges {
            let mut attrs = format!("label=\"{}\"", escape(&edge.offset));
            if edge.widened {
                attrs.push_str(", style=bold");
            }
            if !edge.narrowing.is_empty() {
                attrs.push_str(", color=blue");
            }
            writeln!(dot, "{} -> {} [{}];", edge.addressee, edge.base, attrs)?;
        }

        writeln!(dot, "}}")?;
        Ok(dot)
    }
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::offset_alias::domain::EntityId;
    use crate::features::offset_alias::infrastructure::interval_offset::IntervalOffset;

    fn sample() -> AnalysisReport {
        let mut g = PointerGraph::new(IntervalOffset::domain());
        let buf = g.insert_node(EntityId(0)).0;
        let p = g.insert_node(EntityId(1)).0;
        g.node_mut(buf).unwrap().kind = PointerKind::Alloc;
        g.node_mut(buf).unwrap().name = Some("buf".to_string());
        g.node_mut(p).unwrap().kind = PointerKind::Continuous;
        g.create_address(buf, p, g.domain().constant(16)).unwrap();
        AnalysisReport::capture("initial", &g)
    }

    #[test]
    fn test_capture_lists_nodes_and_edges() {
        let report = sample();
        assert_eq!(report.nodes.len(), 2);
        assert_eq!(report.edges.len(), 1);
        assert_eq!(report.edges[0].offset, "(16)");
        assert_eq!(report.edges[0].addressee, "n1");
        assert_eq!(report.edges[0].base, "n0");
    }

    #[test]
    fn test_json_roundtrip() {
        let report = sample();
        let json = report.to_json().unwrap();
        let back: AnalysisReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn test_dot_output() {
        let dot = sample().to_dot().unwrap();
        assert!(dot.starts_with("digraph \"initial\" {"));
        assert!(dot.contains("n0 [label=\"buf: Allocation\", shape=box];"));
        assert!(dot.contains("n1 -> n0 [label=\"(16)\"];"));
        assert!(dot.trim_end().ends_with('}'));
    }
}
