//! The closed set of Git lifecycle events Composter dispatches.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ComposterError;

/// A Git hook that actions can be registered against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HookName {
    ApplypatchMsg,
    PreApplypatch,
    PostApplypatch,
    PreCommit,
    PrepareCommitMsg,
    CommitMsg,
    PostCommit,
    PreRebase,
    PostCheckout,
    PostMerge,
    PostUpdate,
    PreAutoGc,
    PostRewrite,
    PrePush,
}

impl HookName {
    /// Every supported hook, in the canonical order used for the persisted
    /// registry and for installing entry points.
    pub const ALL: [HookName; 14] = [
        HookName::ApplypatchMsg,
        HookName::PreApplypatch,
        HookName::PostApplypatch,
        HookName::PreCommit,
        HookName::PrepareCommitMsg,
        HookName::CommitMsg,
        HookName::PostCommit,
        HookName::PreRebase,
        HookName::PostCheckout,
        HookName::PostMerge,
        HookName::PostUpdate,
        HookName::PreAutoGc,
        HookName::PostRewrite,
        HookName::PrePush,
    ];

    /// The file name Git uses for this hook under `.git/hooks/`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApplypatchMsg => "applypatch-msg",
            Self::PreApplypatch => "pre-applypatch",
            Self::PostApplypatch => "post-applypatch",
            Self::PreCommit => "pre-commit",
            Self::PrepareCommitMsg => "prepare-commit-msg",
            Self::CommitMsg => "commit-msg",
            Self::PostCommit => "post-commit",
            Self::PreRebase => "pre-rebase",
            Self::PostCheckout => "post-checkout",
            Self::PostMerge => "post-merge",
            Self::PostUpdate => "post-update",
            Self::PreAutoGc => "pre-auto-gc",
            Self::PostRewrite => "post-rewrite",
            Self::PrePush => "pre-push",
        }
    }

    /// Look up a hook by its Git name. Returns `None` for anything outside the
    /// supported set.
    pub fn from_git_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|h| h.as_str() == name.trim())
    }
}

impl fmt::Display for HookName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HookName {
    type Err = ComposterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_git_name(s)
            .ok_or_else(|| ComposterError::Configuration(format!("unknown git hook '{s}'")))
    }
}
