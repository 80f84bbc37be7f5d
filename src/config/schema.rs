//! Configuration data structures for Composter.
//!
//! Defines the YAML config format: Git invocation settings, staged-file
//! resolution defaults, recursive search exclusions, and the list of action
//! packages whose hooks make up the registry.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root configuration for Composter.
///
/// Loaded from YAML files and environment variables, then adjusted by CLI
/// flags. Multiple sources are merged with well-defined priority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposterConfig {
    /// Config format version (currently "1.0").
    #[serde(default = "default_version")]
    pub version: String,

    /// How Git is invoked.
    #[serde(default)]
    pub git: GitConfig,

    /// Staged-file resolution defaults.
    #[serde(default)]
    pub staged: StagedConfig,

    /// Recursive pattern search settings.
    #[serde(default)]
    pub glob: GlobConfig,

    /// Action packages contributing hook entries.
    #[serde(default)]
    pub packages: Vec<PackageConfig>,
}

impl Default for ComposterConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            git: GitConfig::default(),
            staged: StagedConfig::default(),
            glob: GlobConfig::default(),
            packages: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// GitConfig
// ---------------------------------------------------------------------------

/// Settings for the Git subprocess bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitConfig {
    /// Git executable, looked up on `PATH` when not absolute.
    #[serde(default = "default_git_binary")]
    pub binary: String,

    /// Value exported as `LC_ALL` for every Git call.
    #[serde(default = "default_locale")]
    pub locale: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            binary: default_git_binary(),
            locale: default_locale(),
        }
    }
}

// ---------------------------------------------------------------------------
// StagedConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagedConfig {
    /// Whether actions see staged content through a mirror by default.
    /// `None` means no layer set it; read it through [`StagedConfig::mirror`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mirror: Option<bool>,

    /// Chunk size in bytes for streamed file comparison.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

impl Default for StagedConfig {
    fn default() -> Self {
        Self {
            mirror: None,
            chunk_size: default_chunk_size(),
        }
    }
}

impl StagedConfig {
    /// Effective mirror default; on unless some layer turned it off.
    pub fn mirror(&self) -> bool {
        self.mirror.unwrap_or(true)
    }
}

// ---------------------------------------------------------------------------
// GlobConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobConfig {
    /// Directories directly under the repository root that recursive search
    /// never enters.
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,
}

impl Default for GlobConfig {
    fn default() -> Self {
        Self {
            exclude_dirs: default_exclude_dirs(),
        }
    }
}

// ---------------------------------------------------------------------------
// PackageConfig
// ---------------------------------------------------------------------------

/// One action package and the hooks it contributes.
///
/// `hooks` maps a prioritized hook key (`"20.pre-commit"` or just
/// `"pre-commit"`) to an `"Action::method"` reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageConfig {
    pub name: String,

    #[serde(default)]
    pub hooks: BTreeMap<String, String>,
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_version() -> String {
    "1.0".to_string()
}

fn default_git_binary() -> String {
    "git".to_string()
}

fn default_locale() -> String {
    "en_US.UTF-8".to_string()
}

pub(crate) fn default_chunk_size() -> usize {
    8192
}

fn default_exclude_dirs() -> Vec<String> {
    vec!["vendor".to_string()]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
