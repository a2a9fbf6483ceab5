//! High-Level Offset Alias Analyzer
//!
//! Runs the whole pipeline for one program:
//! 1. Build the pointer graph through an `AddressMaterializer`
//! 2. Capture local trees on the unresolved graph
//! 3. Resolve (SCCs, whole graph, self-address closure, operators)
//! 4. Interprocedural mode only: link argument nodes to their call sites and
//!    resolve again
//!
//! # Usage
//! ```text
//! use codegraph_alias::config::AnalysisConfig;
//! use codegraph_alias::features::offset_alias::OffsetAliasAnalyzer;
//!
//! let analyzer = OffsetAliasAnalyzer::new(AnalysisConfig::default());
//! let (resolved, metrics) = analyzer.run_source(program)?;
//! resolved.alias(p, q);
//! ```

use crate::config::AnalysisConfig;
use crate::errors::Result;
use crate::features::offset_alias::domain::{AddressId, EntityId, NodeId, PointerGraph, PointerKind};
use crate::features::offset_alias::infrastructure::{
    local_tree, BuildStats, EntityClassifier, GraphBuilder, GraphResolver, ResolutionStats,
};
use crate::features::offset_alias::ports::{
    AddressMaterializer, ConservativeFallback, EntitySource, FallbackAliasAnalysis,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use super::alias_query::ResolvedGraph;
use super::report::AnalysisReport;

/// Counters and timings of one run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Metrics {
    pub nodes: usize,
    pub addresses: usize,
    pub addresses_created: usize,
    pub addresses_retired: usize,
    pub duplicate_merges: usize,
    pub classified: usize,
    pub downgraded: usize,
    pub insufficient_call_sites: usize,
    pub local_tree_chains: usize,
    pub arguments_linked: usize,

    /// First resolution
    pub resolution: ResolutionStats,
    /// Resolution after call sites were linked
    pub interprocedural: Option<ResolutionStats>,

    pub build_ms: f64,
    pub local_trees_ms: f64,
    pub resolution_ms: f64,
    pub interprocedural_ms: f64,
    pub total_ms: f64,
}

impl Metrics {
    fn add_build(&mut self, stats: BuildStats) {
        self.classified += stats.classified;
        self.downgraded += stats.downgraded;
        self.insufficient_call_sites += stats.insufficient_call_sites;
    }
}

/// Offset-based alias analysis over one program
pub struct OffsetAliasAnalyzer {
    config: AnalysisConfig,
    fallback: Arc<dyn FallbackAliasAnalysis>,
}

impl OffsetAliasAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            fallback: Arc::new(ConservativeFallback),
        }
    }

    /// Analysis consulted for every query this one cannot decide
    pub fn with_fallback(mut self, fallback: Arc<dyn FallbackAliasAnalysis>) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze a program described by an [`EntitySource`], classified by the
    /// reference [`EntityClassifier`]
    pub fn run_source<S: EntitySource>(&self, source: S) -> Result<(ResolvedGraph, Metrics)> {
        let roots = source.entities();
        // Call sites are linked by the second pass, never at classification
        let mut classifier = EntityClassifier::new(source).with_interprocedural(false);
        self.run(&mut classifier, roots)
    }

    /// Build and resolve the graph reachable from `roots`
    pub fn run(
        &self,
        materializer: &mut dyn AddressMaterializer,
        roots: impl IntoIterator<Item = EntityId>,
    ) -> Result<(ResolvedGraph, Metrics)> {
        self.config.validate()?;
        let total = Instant::now();
        let mut metrics = Metrics::default();
        let mut reports = Vec::new();
        let mut graph = PointerGraph::new(self.config.build_offset_domain());

        let started = Instant::now();
        let stats = {
            let mut builder = GraphBuilder::new(&mut graph);
            builder.build(roots, materializer)?;
            builder.stats()
        };
        metrics.add_build(stats);
        metrics.build_ms = elapsed_ms(started);
        self.snapshot(&mut reports, "initial", &graph);

        let started = Instant::now();
        metrics.local_tree_chains = local_tree::capture_all(&mut graph)?;
        metrics.local_trees_ms = elapsed_ms(started);

        let started = Instant::now();
        let last = !self.config.interprocedural;
        metrics.resolution = self.resolve(&mut graph, &mut reports, "", last)?;
        metrics.resolution_ms = elapsed_ms(started);

        if self.config.interprocedural {
            let started = Instant::now();
            let (linked, stats) = link_arguments(&mut graph, materializer)?;
            metrics.arguments_linked = linked;
            metrics.add_build(stats);
            self.snapshot(&mut reports, "interprocedural/linked", &graph);
            metrics.interprocedural =
                Some(self.resolve(&mut graph, &mut reports, "interprocedural/", true)?);
            metrics.interprocedural_ms = elapsed_ms(started);
        }

        let counters = graph.counters();
        metrics.nodes = graph.node_count();
        metrics.addresses = graph.address_count();
        metrics.addresses_created = counters.created;
        metrics.addresses_retired = counters.retired;
        metrics.duplicate_merges = counters.merged;
        metrics.total_ms = elapsed_ms(total);

        info!(
            nodes = metrics.nodes,
            addresses = metrics.addresses,
            sccs = metrics.resolution.scc_count,
            widenings = metrics.resolution.widening_applied,
            narrowings = metrics.resolution.narrowing_applied,
            total_ms = metrics.total_ms,
            "offset alias analysis finished"
        );

        // The argument rule assumes no call site links two arguments together
        let argument_rule = self.config.assume_distinct_arguments && !self.config.interprocedural;
        let resolved = ResolvedGraph::new(
            graph,
            Arc::clone(&self.fallback),
            argument_rule,
            self.config.local_tree_check,
        )
        .with_reports(reports);
        Ok((resolved, metrics))
    }

    fn resolve(
        &self,
        graph: &mut PointerGraph,
        reports: &mut Vec<AnalysisReport>,
        prefix: &str,
        last: bool,
    ) -> Result<ResolutionStats> {
        let mut resolver = GraphResolver::new(self.config.max_worklist_len);
        resolver.resolve_sccs(graph)?;
        self.snapshot(reports, &format!("{}scc-resolved", prefix), graph);
        resolver.resolve_graph(graph)?;
        resolver.close_self_addresses(graph)?;
        self.snapshot(reports, &format!("{}graph-resolved", prefix), graph);
        resolver.apply_operators(graph)?;
        if last {
            resolver.remove_duplicate_addresses(graph)?;
        }
        self.snapshot(reports, &format!("{}operators-applied", prefix), graph);
        Ok(resolver.stats().clone())
    }

    fn snapshot(&self, reports: &mut Vec<AnalysisReport>, stage: &str, graph: &PointerGraph) {
        if self.config.capture_stage_reports {
            reports.push(AnalysisReport::capture(stage, graph));
        }
    }
}

/// Re-materialize argument nodes against their call sites. Nodes the
/// materializer already linked (kind `Phi`) are skipped.
fn link_arguments(
    graph: &mut PointerGraph,
    materializer: &mut dyn AddressMaterializer,
) -> Result<(usize, BuildStats)> {
    let candidates: Vec<(NodeId, EntityId)> = graph
        .nodes()
        .filter(|node| node.entity_is_argument && node.kind != PointerKind::Phi)
        .map(|node| (node.id, node.entity))
        .collect();

    let mut builder = GraphBuilder::new(graph);
    let mut linked = 0;
    for (node, entity) in candidates {
        let Some(classification) = materializer.materialize_call_sites(node, entity, &mut builder)? else {
            continue;
        };
        if classification.kind == PointerKind::Phi {
            // Drop the self address left by the closure of the first pass
            let closure: Vec<AddressId> = builder
                .graph()
                .node(node)?
                .out_addresses
                .iter()
                .copied()
                .filter(|&id| matches!(builder.graph().address(id), Ok(a) if a.base == node))
                .collect();
            for id in closure {
                builder.graph_mut().retire_address(id)?;
            }
        }
        builder.apply(node, classification)?;
        linked += 1;
    }
    builder.drain(materializer)?;
    debug!(linked, "argument nodes linked to call sites");
    Ok((linked, builder.stats()))
}

#[inline]
fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}
