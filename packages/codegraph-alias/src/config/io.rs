//! Configuration I/O (YAML)
//!
//! Defines the YAML schema. Loading and saving live in `analysis_config.rs`.

use super::analysis_config::OffsetDomainKind;
use serde::{Deserialize, Serialize};

/// YAML Schema v1
///
/// ```yaml
/// version: 1
/// preset: balanced
/// overrides:
///   interprocedural: false
///   max_worklist_len: 50000
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigExportV1 {
    /// Schema version (always 1 for v1)
    pub version: u32,

    /// Base preset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,

    /// Field overrides applied on top of the preset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides: Option<ConfigOverrides>,
}

/// Configuration overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset_domain: Option<OffsetDomainKind>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub interprocedural: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub assume_distinct_arguments: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_tree_check: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture_stage_reports: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_worklist_len: Option<usize>,
}
