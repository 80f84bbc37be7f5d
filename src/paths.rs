//! Paths Composter owns inside a repository.
//!
//! Everything lives under the repository's `.git` control directory so that
//! nothing Composter generates can end up in a commit.

use std::path::{Path, PathBuf};

use crate::hook::HookName;

const GIT_FOLDER: &str = ".git";
const HOOKS_FOLDER: &str = "hooks";
const COMPOSTER_FOLDER: &str = "composter";
const REGISTRY_FILE: &str = "registry.yaml";
const MIRROR_FOLDER: &str = "staged";
const PROJECT_CONFIG: &str = ".composter.yaml";

/// Resolved control-directory layout for one repository root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlPaths {
    root: PathBuf,
}

impl ControlPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/.git`
    pub fn git_dir(&self) -> PathBuf {
        self.root.join(GIT_FOLDER)
    }

    /// `<root>/.git/hooks`
    pub fn hooks_dir(&self) -> PathBuf {
        self.git_dir().join(HOOKS_FOLDER)
    }

    /// `<root>/.git/composter`
    pub fn composter_dir(&self) -> PathBuf {
        self.git_dir().join(COMPOSTER_FOLDER)
    }

    /// `<root>/.git/composter/registry.yaml`
    pub fn registry_file(&self) -> PathBuf {
        self.composter_dir().join(REGISTRY_FILE)
    }

    /// `<root>/.git/composter/staged`
    pub fn mirror_dir(&self) -> PathBuf {
        self.composter_dir().join(MIRROR_FOLDER)
    }

    /// `<root>/.composter.yaml`
    pub fn project_config(&self) -> PathBuf {
        self.root.join(PROJECT_CONFIG)
    }

    /// `<root>/.git/hooks/<hook>`
    pub fn hook_path(&self, hook: HookName) -> PathBuf {
        self.hooks_dir().join(hook.as_str())
    }
}
