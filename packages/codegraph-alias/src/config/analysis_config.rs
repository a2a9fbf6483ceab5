//! Analysis configuration
//!
//! Explicit input of every analysis run; there is no process-wide state.

use super::error::{ConfigError, ConfigResult};
use super::io::{ConfigExportV1, ConfigOverrides};
use super::preset::Preset;
use crate::features::offset_alias::domain::offset::OffsetDomain;
use crate::features::offset_alias::infrastructure::congruence_offset::CongruenceOffset;
use crate::features::offset_alias::infrastructure::interval_offset::IntervalOffset;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Supported schema versions
pub const SUPPORTED_VERSIONS: &[u32] = &[1];

/// Offset representations registered for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffsetDomainKind {
    /// Intervals only
    Interval,
    /// Intervals and congruences
    IntervalCongruence,
}

impl OffsetDomainKind {
    pub fn build(self) -> OffsetDomain {
        match self {
            Self::Interval => IntervalOffset::domain(),
            Self::IntervalCongruence => CongruenceOffset::domain_with_intervals(),
        }
    }
}

/// Configuration of one analysis run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Representations carried by every offset
    pub offset_domain: OffsetDomainKind,

    /// Resolve arguments through their call sites in a second pass
    pub interprocedural: bool,

    /// Pointers reached through an argument never alias local memory
    pub assume_distinct_arguments: bool,

    /// Answer queries from local trees before looking at address sets
    pub local_tree_check: bool,

    /// Keep a report of the graph after every resolution stage
    pub capture_stage_reports: bool,

    /// Worklist length above which a warning is logged (never truncates)
    pub max_worklist_len: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self::preset(Preset::default())
    }
}

impl AnalysisConfig {
    pub const MAX_WORKLIST_LEN_RANGE: (usize, usize) = (1, 10_000_000);

    /// Complete configuration for a preset
    pub fn preset(preset: Preset) -> Self {
        let base = Self {
            offset_domain: OffsetDomainKind::IntervalCongruence,
            interprocedural: false,
            assume_distinct_arguments: true,
            local_tree_check: true,
            capture_stage_reports: false,
            max_worklist_len: 100_000,
        };
        match preset {
            Preset::Fast => Self {
                offset_domain: OffsetDomainKind::Interval,
                max_worklist_len: 10_000,
                ..base
            },
            Preset::Balanced => base,
            Preset::Thorough => Self {
                interprocedural: true,
                assume_distinct_arguments: false,
                max_worklist_len: 1_000_000,
                ..base
            },
        }
    }

    pub fn with_offset_domain(mut self, kind: OffsetDomainKind) -> Self {
        self.offset_domain = kind;
        self
    }

    pub fn with_interprocedural(mut self, enabled: bool) -> Self {
        self.interprocedural = enabled;
        self
    }

    pub fn with_distinct_arguments(mut self, enabled: bool) -> Self {
        self.assume_distinct_arguments = enabled;
        self
    }

    pub fn with_local_tree_check(mut self, enabled: bool) -> Self {
        self.local_tree_check = enabled;
        self
    }

    pub fn with_stage_reports(mut self, enabled: bool) -> Self {
        self.capture_stage_reports = enabled;
        self
    }

    pub fn with_max_worklist_len(mut self, len: usize) -> Self {
        self.max_worklist_len = len;
        self
    }

    /// Range and consistency checks
    pub fn validate(&self) -> ConfigResult<()> {
        let (min, max) = Self::MAX_WORKLIST_LEN_RANGE;
        if !(min..=max).contains(&self.max_worklist_len) {
            return Err(ConfigError::range_with_hint(
                "max_worklist_len",
                self.max_worklist_len,
                min,
                max,
                "The bound only triggers a warning; pick a generous value",
            ));
        }
        if self.interprocedural && self.assume_distinct_arguments {
            return Err(ConfigError::Conflict {
                issue: "assume_distinct_arguments cannot hold once arguments are resolved through call sites"
                    .to_string(),
                fix: "set assume_distinct_arguments: false or interprocedural: false".to_string(),
            });
        }
        Ok(())
    }

    /// Offset domain described by `offset_domain`
    pub fn build_offset_domain(&self) -> OffsetDomain {
        self.offset_domain.build()
    }

    fn apply(&mut self, overrides: ConfigOverrides) {
        if let Some(v) = overrides.offset_domain {
            self.offset_domain = v;
        }
        if let Some(v) = overrides.interprocedural {
            self.interprocedural = v;
        }
        if let Some(v) = overrides.assume_distinct_arguments {
            self.assume_distinct_arguments = v;
        }
        if let Some(v) = overrides.local_tree_check {
            self.local_tree_check = v;
        }
        if let Some(v) = overrides.capture_stage_reports {
            self.capture_stage_reports = v;
        }
        if let Some(v) = overrides.max_worklist_len {
            self.max_worklist_len = v;
        }
    }

    /// Parse and validate a YAML document (schema v1)
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let export: ConfigExportV1 = serde_yaml::from_str(content)?;

        if !SUPPORTED_VERSIONS.contains(&export.version) {
            return Err(ConfigError::UnsupportedVersion {
                found: export.version,
                supported: SUPPORTED_VERSIONS.to_vec(),
            });
        }

        let preset = match export.preset.as_deref() {
            Some(name) => Preset::parse(name).map_err(|_| ConfigError::UnknownPreset(name.to_string()))?,
            None => Preset::default(),
        };

        let mut config = Self::preset(preset);
        if let Some(overrides) = export.overrides {
            config.apply(overrides);
        }
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file (schema v1)
    pub fn from_yaml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Serialize as a complete schema v1 document
    pub fn to_yaml(&self) -> ConfigResult<String> {
        let export = ConfigExportV1 {
            version: 1,
            preset: None,
            overrides: Some(ConfigOverrides {
                offset_domain: Some(self.offset_domain),
                interprocedural: Some(self.interprocedural),
                assume_distinct_arguments: Some(self.assume_distinct_arguments),
                local_tree_check: Some(self.local_tree_check),
                capture_stage_reports: Some(self.capture_stage_reports),
                max_worklist_len: Some(self.max_worklist_len),
            }),
        };
        Ok(serde_yaml::to_string(&export)?)
    }
}
