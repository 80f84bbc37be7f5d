//! Multi-source config loading with priority merging.
//!
//! Priority order (highest wins):
//!   CLI flags > Environment vars > Project config > User config > Defaults
//!
//! CLI flags are applied by the binary after [`load_config`] returns.

use std::path::Path;

use super::schema::ComposterConfig;
use crate::error::ComposterError;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Load configuration from all available sources and merge them.
///
/// Sources (low → high priority):
///   1. Built-in defaults
///   2. User config  (`~/.config/composter/config.yaml`)
///   3. Project config (`.composter.yaml` in `project_dir`)
///   4. Environment variables (`COMPOSTER_GIT_BINARY`, `COMPOSTER_MIRROR_STAGED`, etc.)
pub fn load_config(project_dir: Option<&Path>) -> Result<ComposterConfig, ComposterError> {
    let mut config = ComposterConfig::default();

    if let Some(user) = load_user_config() {
        config = merge_configs(config, user);
    }

    if let Some(dir) = project_dir {
        if let Some(project) = load_project_config(dir) {
            config = merge_configs(config, project);
        }
    }

    load_env_overrides(&mut config);

    Ok(config)
}

/// Load user config from the platform-specific config directory.
///
/// - macOS: `~/Library/Application Support/dev.composter.composter/config.yaml`
/// - Linux: `~/.config/composter/config.yaml`
/// - Windows: `%APPDATA%\composter\composter\config\config.yaml`
///
/// Returns `None` if the file does not exist or is unparseable.
pub fn load_user_config() -> Option<ComposterConfig> {
    let path = user_config_path()?;
    load_config_file(&path)
}

/// Load project config from `.composter.yaml` in the given directory.
///
/// Returns `None` if the file does not exist or is unparseable.
pub fn load_project_config(dir: &Path) -> Option<ComposterConfig> {
    load_config_file(&dir.join(".composter.yaml"))
}

/// Apply environment variable overrides to a config in place.
///
/// Supported variables:
/// - `COMPOSTER_GIT_BINARY`: Git executable to run
/// - `COMPOSTER_LOCALE`: value pinned as `LC_ALL` for Git
/// - `COMPOSTER_MIRROR_STAGED`: `1`/`true`/`yes` or `0`/`false`/`no`
/// - `COMPOSTER_EXCLUDE_DIRS`: comma-separated directories skipped by recursive search
pub fn load_env_overrides(config: &mut ComposterConfig) {
    apply_env_overrides(config, |key| std::env::var(key).ok());
}

/// Same as [`load_env_overrides`] with an injectable variable lookup.
pub fn apply_env_overrides<F>(config: &mut ComposterConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup("COMPOSTER_GIT_BINARY").filter(|v| !v.trim().is_empty()) {
        config.git.binary = val.trim().to_string();
    }

    if let Some(val) = lookup("COMPOSTER_LOCALE").filter(|v| !v.trim().is_empty()) {
        config.git.locale = val.trim().to_string();
    }

    if let Some(val) = lookup("COMPOSTER_MIRROR_STAGED") {
        match val.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" => config.staged.mirror = Some(true),
            "0" | "false" | "no" => config.staged.mirror = Some(false),
            other => {
                tracing::warn!(value = other, "ignoring invalid COMPOSTER_MIRROR_STAGED");
            }
        }
    }

    if let Some(val) = lookup("COMPOSTER_EXCLUDE_DIRS") {
        config.glob.exclude_dirs = val
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Platform-specific user config path via the `directories` crate.
fn user_config_path() -> Option<std::path::PathBuf> {
    directories::ProjectDirs::from("dev", "composter", "composter")
        .map(|dirs| dirs.config_dir().join("config.yaml"))
}

/// Try to load and parse a YAML config file. Returns `None` on any error.
fn load_config_file(path: &Path) -> Option<ComposterConfig> {
    let contents = std::fs::read_to_string(path).ok()?;
    match serde_yaml::from_str(&contents) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), "ignoring unparsable config: {e}");
            None
        }
    }
}

/// Merge two configs: `overlay` fields take priority over `base`.
fn merge_configs(mut base: ComposterConfig, overlay: ComposterConfig) -> ComposterConfig {
    let defaults = ComposterConfig::default();

    if overlay.version != defaults.version {
        base.version = overlay.version;
    }

    // Git: overlay wins on non-default values
    if overlay.git.binary != defaults.git.binary {
        base.git.binary = overlay.git.binary;
    }
    if overlay.git.locale != defaults.git.locale {
        base.git.locale = overlay.git.locale;
    }

    // Staged: any value the overlay sets wins, in either direction
    if overlay.staged.mirror.is_some() {
        base.staged.mirror = overlay.staged.mirror;
    }
    if overlay.staged.chunk_size != defaults.staged.chunk_size {
        base.staged.chunk_size = overlay.staged.chunk_size;
    }

    if overlay.glob.exclude_dirs != defaults.glob.exclude_dirs {
        base.glob.exclude_dirs = overlay.glob.exclude_dirs;
    }

    // Packages accumulate: user-level packages run in every repository
    base.packages.extend(overlay.packages);

    base
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
