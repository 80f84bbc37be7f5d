//! Staged file resolution.
//!
//! Turns "the files staged for this commit" into absolute paths an action can
//! read directly. In cheap mode the paths point into the working tree. In
//! mirror mode the staged index is checked out into a scratch directory and,
//! file by file, the caller gets the working-tree copy when it is
//! byte-identical to what is staged and the mirror copy when it is not.

pub mod compare;
pub mod search;

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::git::GitBridge;

pub use compare::files_equal;
pub use search::recursive_glob;

// ---------------------------------------------------------------------------
// StagedMirror
// ---------------------------------------------------------------------------

/// Scratch directory holding a checkout of the staged index.
///
/// The directory is emptied on creation and removed when the value is
/// dropped, on every exit path.
#[derive(Debug)]
pub struct StagedMirror {
    dir: PathBuf,
}

impl StagedMirror {
    /// Create (or empty) the mirror directory at `dir`.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
        }
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Mirror location of a repository-relative path.
    pub fn join(&self, relative: &str) -> PathBuf {
        self.dir.join(relative)
    }
}

impl Drop for StagedMirror {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_dir_all(&self.dir) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    dir = %self.dir.display(),
                    "failed to remove staged mirror: {e}"
                );
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Options for one staged-file lookup.
#[derive(Debug, Clone)]
pub struct StagedQuery<'a> {
    /// Filter applied to the staged path list; `None` or empty keeps all.
    pub pattern: Option<&'a str>,
    /// Reconcile against a mirror of the staged index.
    pub mirror: bool,
    /// Chunk size for byte comparison.
    pub chunk_size: usize,
}

impl Default for StagedQuery<'_> {
    fn default() -> Self {
        Self {
            pattern: None,
            mirror: true,
            chunk_size: crate::config::schema::default_chunk_size(),
        }
    }
}

/// Resolve staged files to readable absolute paths.
///
/// When `query.mirror` is set, `mirror_slot` receives the (re)created
/// [`StagedMirror`] at `mirror_dir`; the caller owns it and its lifetime
/// bounds the validity of any mirror paths returned.
pub fn resolve_staged_files(
    git: &GitBridge,
    query: &StagedQuery<'_>,
    mirror_dir: &Path,
    mirror_slot: &mut Option<StagedMirror>,
) -> Result<Vec<PathBuf>> {
    let diff_base = git.resolve_diff_base()?;
    let staged = git.list_staged_paths(&diff_base, query.pattern)?;
    let root = git.root();

    if !query.mirror {
        return Ok(staged.iter().map(|rel| root.join(rel)).collect());
    }

    // Drop any previous mirror before recreating the directory in place.
    mirror_slot.take();
    let mirror = StagedMirror::create(mirror_dir)?;
    if let Err(e) = git.checkout_index_to(mirror.path()) {
        tracing::warn!("checkout of staged index failed, using working tree: {e}");
    }

    let resolved = staged
        .iter()
        .map(|rel| pick_copy(&root.join(rel), &mirror.join(rel), query.chunk_size))
        .collect();

    *mirror_slot = Some(mirror);
    Ok(resolved)
}

/// Choose between the working-tree copy and the mirrored staged copy.
///
/// Identical content keeps the working-tree path, and so does a missing mirror
/// copy. Otherwise the mirror path wins, including when the working-tree file
/// was deleted after staging.
fn pick_copy(working: &Path, mirrored: &Path, chunk_size: usize) -> PathBuf {
    if !mirrored.is_file() || files_equal(working, mirrored, chunk_size) {
        working.to_path_buf()
    } else {
        mirrored.to_path_buf()
    }
}
