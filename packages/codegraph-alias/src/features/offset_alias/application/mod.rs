//! Application layer for Offset-Based Alias Analysis
//!
//! - **OffsetAliasAnalyzer**: build, resolve and (optionally) link call sites
//! - **ResolvedGraph**: alias queries over the frozen graph
//! - **AnalysisReport**: per-stage snapshots for JSON / DOT export

pub mod alias_query;
pub mod analyzer;
pub mod report;

pub use alias_query::ResolvedGraph;
pub use analyzer::{Metrics, OffsetAliasAnalyzer};
pub use report::{AnalysisReport, EdgeReport, NodeReport};
