//! Install-time registry builder.
//!
//! `install` turns the configured action packages into a persisted registry
//! and writes one entry-point script per supported hook. Every run starts
//! from an empty control directory, so the registry always reflects the
//! current configuration and nothing from an earlier install survives.

pub mod git_hooks;
pub mod manifest;

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{ComposterConfig, PackageConfig};
use crate::error::{ComposterError, Result};
use crate::hook::HookName;
use crate::paths::ControlPaths;
use crate::registry::{persist, ActionReference, Registry, RegistryBuilder};

pub use git_hooks::HookInstall;
pub use manifest::parse_hook_key;

/// Summary of an [`install`] run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub registry_file: PathBuf,
    /// Number of registry entries written.
    pub entries: usize,
    /// Hook entry points written.
    pub hooks: Vec<(HookName, HookInstall)>,
}

impl InstallReport {
    /// User hooks moved aside during this install.
    pub fn backups(&self) -> impl Iterator<Item = &Path> + '_ {
        self.hooks.iter().filter_map(|(_, outcome)| match outcome {
            HookInstall::BackedUp(path) => Some(path.as_path()),
            _ => None,
        })
    }
}

/// Summary of an [`uninstall`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UninstallReport {
    /// Hooks whose pre-existing user script was put back.
    pub restored: Vec<HookName>,
    pub removed_control_dir: bool,
}

/// Fold every package's hook map into a registry.
///
/// Entries are added package by package in configuration order; within a
/// package, keys are visited in sorted order.
pub fn build_registry(packages: &[PackageConfig]) -> Result<Registry> {
    let mut builder = RegistryBuilder::new();

    for package in packages {
        for (key, reference) in &package.hooks {
            let (hook, priority) = parse_hook_key(key).map_err(|e| {
                ComposterError::Configuration(format!("package '{}': {e}", package.name))
            })?;
            tracing::debug!(
                package = %package.name,
                hook = %hook,
                priority,
                "registering {reference}"
            );
            builder.add_entry(hook, ActionReference::new(reference.as_str()), priority);
        }
    }

    Ok(builder.build())
}

/// Install Composter into the repository at `root`.
///
/// `binary` is the command the hook scripts exec, normally the path of the
/// running executable.
pub fn install(root: &Path, binary: &str, config: &ComposterConfig) -> Result<InstallReport> {
    let paths = ControlPaths::new(root);
    if !paths.git_dir().is_dir() {
        return Err(ComposterError::NotAGitRepository {
            root: root.to_path_buf(),
        });
    }

    // A bad package must leave the previous install untouched.
    let registry = build_registry(&config.packages)?;

    let control_dir = paths.composter_dir();
    if control_dir.exists() {
        fs::remove_dir_all(&control_dir)?;
    }
    fs::create_dir_all(&control_dir)?;

    let registry_file = paths.registry_file();
    persist::save(&registry, &registry_file)?;

    let hooks = HookName::ALL
        .iter()
        .map(|&hook| git_hooks::install_hook(&paths, hook, binary).map(|done| (hook, done)))
        .collect::<Result<Vec<_>>>()?;

    tracing::info!(
        root = %root.display(),
        entries = registry.len(),
        hooks = hooks.len(),
        "installed"
    );

    Ok(InstallReport {
        registry_file,
        entries: registry.len(),
        hooks,
    })
}

/// Remove our hook entry points and the control directory from `root`.
pub fn uninstall(root: &Path) -> Result<UninstallReport> {
    let paths = ControlPaths::new(root);
    if !paths.git_dir().is_dir() {
        return Err(ComposterError::NotAGitRepository {
            root: root.to_path_buf(),
        });
    }

    let mut report = UninstallReport::default();
    for hook in HookName::ALL {
        if git_hooks::uninstall_hook(&paths, hook)? {
            report.restored.push(hook);
        }
    }

    let control_dir = paths.composter_dir();
    if control_dir.exists() {
        fs::remove_dir_all(&control_dir)?;
        report.removed_control_dir = true;
    }

    tracing::info!(root = %root.display(), restored = report.restored.len(), "uninstalled");
    Ok(report)
}
