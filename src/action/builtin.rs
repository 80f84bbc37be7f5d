//! Actions shipped with the binary.
//!
//! Registered in [`ActionCatalog::with_builtins`] under the keys below, so a
//! project can wire them up from `.composter.yaml` without writing Rust.

use std::fs;
use std::path::Path;

use super::{ActionContext, ActionError, ActionResult, Flow, HookAction};
use crate::dispatch::ActionCatalog;

/// Register every built-in action on `catalog`.
pub fn register_builtins(catalog: &mut ActionCatalog) {
    catalog.register(StagedFiles::KEY, || Box::new(StagedFiles));
    catalog.register(ConflictMarkers::KEY, || Box::new(ConflictMarkers));
    catalog.register(CommitMessage::KEY, || Box::new(CommitMessage));
}

// ── StagedFiles ─────────────────────────────────────────────────────────

/// `StagedFiles::list` prints each staged path, one per line.
#[derive(Debug, Default)]
pub struct StagedFiles;

impl StagedFiles {
    pub const KEY: &'static str = "StagedFiles";
}

impl HookAction for StagedFiles {
    fn invoke(&mut self, method: &str, ctx: &mut ActionContext, _args: &[String]) -> ActionResult {
        match method {
            "list" => {
                for path in ctx.staged_files_default(None)? {
                    ctx.write_line(&path.display().to_string());
                }
                Ok(Flow::Continue)
            }
            other => Err(ActionError::unknown_method(other)),
        }
    }
}

// ── ConflictMarkers ─────────────────────────────────────────────────────

/// `ConflictMarkers::check` rejects commits that still carry merge markers.
#[derive(Debug, Default)]
pub struct ConflictMarkers;

impl ConflictMarkers {
    pub const KEY: &'static str = "ConflictMarkers";
}

impl HookAction for ConflictMarkers {
    fn invoke(&mut self, method: &str, ctx: &mut ActionContext, _args: &[String]) -> ActionResult {
        if method != "check" {
            return Err(ActionError::unknown_method(method));
        }

        let mut found = 0usize;
        for path in ctx.staged_files_default(None)? {
            let bytes = match fs::read(&path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::debug!(path = %path.display(), "skipping unreadable file: {e}");
                    continue;
                }
            };
            for line in marker_lines(&String::from_utf8_lossy(&bytes)) {
                ctx.write_line(&format!(
                    "{}:{line}: unresolved conflict marker",
                    display_relative(&path, ctx.root(), ctx.mirror_path())
                ));
                found += 1;
            }
        }

        if found > 0 {
            Ok(ctx.error(&format!("{found} conflict marker(s) found, commit aborted"), Some(1)))
        } else {
            Ok(Flow::Continue)
        }
    }
}

/// 1-based line numbers carrying a conflict marker.
fn marker_lines(content: &str) -> Vec<usize> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            line.starts_with("<<<<<<< ") || *line == "=======" || line.starts_with(">>>>>>> ")
        })
        .map(|(i, _)| i + 1)
        .collect()
}

/// Strip the root or mirror prefix so reports show repository paths.
fn display_relative(path: &Path, root: &Path, mirror: Option<&Path>) -> String {
    mirror
        .and_then(|m| path.strip_prefix(m).ok())
        .or_else(|| path.strip_prefix(root).ok())
        .unwrap_or(path)
        .display()
        .to_string()
}

// ── CommitMessage ───────────────────────────────────────────────────────

/// `CommitMessage::require_nonempty` for `commit-msg`: the message file,
/// passed as the first hook argument, must hold at least one line that is
/// neither blank nor a `#` comment.
#[derive(Debug, Default)]
pub struct CommitMessage;

impl CommitMessage {
    pub const KEY: &'static str = "CommitMessage";
}

impl HookAction for CommitMessage {
    fn invoke(&mut self, method: &str, ctx: &mut ActionContext, args: &[String]) -> ActionResult {
        if method != "require_nonempty" {
            return Err(ActionError::unknown_method(method));
        }

        let message_file = args
            .first()
            .ok_or_else(|| ActionError::Failed("no commit message file was passed".into()))?;
        let message = fs::read_to_string(ctx.root().join(message_file))?;

        if has_content(&message) {
            Ok(Flow::Continue)
        } else {
            Ok(ctx.error("Aborting commit due to empty commit message.", Some(1)))
        }
    }
}

fn has_content(message: &str) -> bool {
    message
        .lines()
        .any(|line| !line.trim().is_empty() && !line.starts_with('#'))
}
