//! Unified error type for Composter.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComposterError {
    #[error("Not a git repository: {}", root.display())]
    NotAGitRepository { root: PathBuf },

    #[error("git {command} exited with code {code}: {stderr}")]
    UnexpectedGit {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("Fetching staged files returned an error: {stderr}")]
    DiffIndex { stderr: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Cannot read hook registry at {}: {reason}", path.display())]
    RegistryUnreadable { path: PathBuf, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ComposterError>;
