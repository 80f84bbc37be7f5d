//! Configuration system: YAML config files and environment overrides.

pub mod loader;
pub mod schema;

// Re-export the most commonly used types.
pub use loader::{load_config, load_env_overrides};
pub use schema::{ComposterConfig, GitConfig, GlobConfig, PackageConfig, StagedConfig};
