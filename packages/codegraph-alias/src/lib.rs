/*
 * Codegraph Alias - Offset-Based Alias Analysis
 *
 * Feature-First Hexagonal Architecture:
 * - config/      : Presets, YAML overrides, validation
 * - features/    : Vertical slices (offset_alias: domain → ports → infrastructure → application)
 * - errors       : Crate-wide error type
 *
 * Performance:
 * - Arena graph with generation-checked handles
 * - Rayon work-stealing for batch alias queries
 */

// Crate-level lint configuration
#![allow(clippy::too_many_arguments)] // Complex analysis functions need many params
#![allow(clippy::type_complexity)] // Complex types are necessary for analysis
#![allow(clippy::collapsible_if)] // Readability over brevity
#![allow(clippy::new_without_default)] // Default impl not always needed
#![allow(clippy::module_inception)] // Module naming intentional
#![allow(clippy::upper_case_acronyms)] // SCC naming

// ═══════════════════════════════════════════════════════════════════════════
// Module Exports - Feature-First Architecture
// ═══════════════════════════════════════════════════════════════════════════

/// Analysis configuration (presets, YAML)
pub mod config;

/// Error types
pub mod errors;

/// Feature modules
pub mod features;

pub use config::{AnalysisConfig, Preset};
pub use errors::{AliasError, Result};
pub use features::offset_alias::{
    AliasResult, EntityId, InMemoryProgram, Metrics, OffsetAliasAnalyzer, ResolvedGraph,
};
