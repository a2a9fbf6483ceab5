//! Configuration
//!
//! Two tiers:
//! - Level 1: Preset (`fast`, `balanced`, `thorough`)
//! - Level 2: Field overrides, in code or through a versioned YAML file
//!
//! # Examples
//!
//! ```rust,ignore
//! use codegraph_alias::config::{AnalysisConfig, Preset};
//!
//! let config = AnalysisConfig::preset(Preset::Fast).with_local_tree_check(false);
//! let config = AnalysisConfig::from_yaml_file("alias.yaml")?;
//! ```

pub mod analysis_config;
pub mod error;
pub mod io;
pub mod preset;

pub use analysis_config::{AnalysisConfig, OffsetDomainKind, SUPPORTED_VERSIONS};
pub use error::{ConfigError, ConfigResult};
pub use io::{ConfigExportV1, ConfigOverrides};
pub use preset::Preset;
