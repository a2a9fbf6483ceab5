//! Infrastructure layer for Offset-Based Alias Analysis
//!
//! - **IntervalOffset / CongruenceOffset**: reference offset representations
//! - **TypeLayout**: byte offsets of element pointers into aggregates
//! - **SCC detection**: Kosaraju two-pass over the pointer graph
//! - **Local trees**: single-address ancestor chains
//! - **GraphBuilder**: lazy classification through an `AddressMaterializer`
//! - **GraphResolver**: per-SCC and whole-graph expansion, closure, operators
//! - **EntityClassifier**: reference materializer over `EntityKind`

pub mod congruence_offset;
pub mod entity_classifier;
pub mod graph_builder;
pub mod graph_resolver;
pub mod in_memory_source;
pub mod interval_offset;
pub mod local_tree;
pub mod primitive_layout;
pub mod scc_detector;

pub use congruence_offset::{CongruenceOffset, CONGRUENCE_REPRESENTATION};
pub use entity_classifier::EntityClassifier;
pub use graph_builder::{BuildStats, GraphBuilder};
pub use graph_resolver::{GraphResolver, ResolutionState, ResolutionStats};
pub use in_memory_source::InMemoryProgram;
pub use interval_offset::{IntRange, IntervalOffset, INTERVAL_REPRESENTATION};
pub use primitive_layout::{GepIndex, TypeLayout};
pub use scc_detector::{kosaraju_scc, SCCResult, SCCStats, Scc};
