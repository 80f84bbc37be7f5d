//! Git bridge: the single point of contact with the `git` binary.
//!
//! Uses `std::process::Command` to call the git CLI (no git2 dependency).
//! Every invocation pins `LC_ALL` and passes explicit `--git-dir` and
//! `--work-tree` flags, so output is locale-independent and never depends on
//! the process working directory. `core.quotePath` is switched off so path
//! listings carry raw UTF-8 names instead of C-quoted escapes. Calls block
//! until git exits.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use regex::Regex;

use crate::config::GitConfig;
use crate::error::{ComposterError, Result};

// ── Constants ───────────────────────────────────────────────────────────

/// Symbolic reference used as the diff base once a commit exists.
pub const HEAD: &str = "HEAD";

/// Object hash of the empty tree; the diff base before the first commit.
pub const EMPTY_TREE_OBJECT_HASH: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

/// Exit code git uses for fatal errors, including "not a git repository".
const EXIT_FATAL: i32 = 128;

/// `diff-index` exit code meaning "nothing found".
const DIFF_INDEX_NO_FILES_FOUND: i32 = 1;

/// `diff-index` exit code meaning the listing itself failed.
const DIFF_INDEX_ERROR: i32 = 2;

/// `rev-parse --verify --quiet` exit code when the ref does not resolve.
const REV_PARSE_UNRESOLVED: i32 = 1;

// ── Bridge ──────────────────────────────────────────────────────────────

/// Git subprocess wrapper pinned to one repository root.
#[derive(Debug, Clone)]
pub struct GitBridge {
    root: PathBuf,
    binary: String,
    locale: String,
}

impl GitBridge {
    /// Bridge using the default `git` binary and locale.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_config(root, &GitConfig::default())
    }

    pub fn with_config(root: impl Into<PathBuf>, config: &GitConfig) -> Self {
        Self {
            root: root.into(),
            binary: config.binary.clone(),
            locale: config.locale.clone(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Build a git command with the locale and repository pinned.
    pub fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.env("LC_ALL", &self.locale)
            .args(["-c", "core.quotePath=false"])
            .arg(format!("--git-dir={}", self.root.join(".git").display()))
            .arg(format!("--work-tree={}", self.root.display()))
            .args(args);
        cmd
    }

    /// Run git and hand back the raw output regardless of exit status.
    fn output(&self, args: &[&str]) -> Result<Output> {
        tracing::debug!(root = %self.root.display(), "git {}", args.join(" "));
        self.command(args).output().map_err(|e| {
            ComposterError::Other(format!("Failed to run {}: {e}", self.binary))
        })
    }

    /// Resolve the tree-ish the index should be compared against.
    ///
    /// Returns [`HEAD`] when the repository has at least one commit and
    /// [`EMPTY_TREE_OBJECT_HASH`] before the first commit.
    pub fn resolve_diff_base(&self) -> Result<String> {
        let output = self.output(&["rev-parse", "--verify", "--quiet", HEAD])?;
        let stdout = String::from_utf8_lossy(&output.stdout);

        match output.status.code() {
            Some(0) if !stdout.trim().is_empty() => Ok(HEAD.to_string()),
            Some(0) | Some(REV_PARSE_UNRESOLVED) => Ok(EMPTY_TREE_OBJECT_HASH.to_string()),
            Some(EXIT_FATAL) => Err(ComposterError::NotAGitRepository {
                root: self.root.clone(),
            }),
            code => Err(unexpected("rev-parse", code, &output)),
        }
    }

    /// List paths staged relative to `diff_base` (added, copied, modified,
    /// renamed), optionally keeping only lines that match `filter`.
    ///
    /// `filter` is a regular expression; if it does not compile it is matched
    /// as a literal substring. An empty filter keeps everything.
    pub fn list_staged_paths(
        &self,
        diff_base: &str,
        filter: Option<&str>,
    ) -> Result<Vec<String>> {
        let output = self.output(&[
            "diff-index",
            "--name-only",
            "--diff-filter=ACMR",
            diff_base,
        ])?;

        match output.status.code() {
            Some(0) => {}
            Some(DIFF_INDEX_NO_FILES_FOUND) => return Ok(Vec::new()),
            Some(DIFF_INDEX_ERROR) => {
                return Err(ComposterError::DiffIndex {
                    stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                })
            }
            code => return Err(unexpected("diff-index", code, &output)),
        }

        let matcher = filter
            .filter(|f| !f.is_empty())
            .map(line_filter)
            .transpose()?;
        let stdout = String::from_utf8_lossy(&output.stdout);

        Ok(stdout
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter(|line| matcher.as_ref().map_or(true, |re| re.is_match(line)))
            .map(str::to_string)
            .collect())
    }

    /// Materialize the full staged index under `mirror_dir`.
    pub fn checkout_index_to(&self, mirror_dir: &Path) -> Result<()> {
        let prefix = format!("--prefix={}/", mirror_dir.display());
        let output = self.output(&["checkout-index", &prefix, "-af"])?;

        if output.status.success() {
            Ok(())
        } else {
            Err(unexpected("checkout-index", output.status.code(), &output))
        }
    }
}

// ── Helpers ─────────────────────────────────────────────────────────────

fn line_filter(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .or_else(|_| Regex::new(&regex::escape(pattern)))
        .map_err(|e| ComposterError::Configuration(format!("invalid staged-file filter: {e}")))
}

fn unexpected(command: &str, code: Option<i32>, output: &Output) -> ComposterError {
    ComposterError::UnexpectedGit {
        command: command.to_string(),
        code: code.unwrap_or(-1),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn args_of(cmd: &Command) -> Vec<String> {
        cmd.get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn command_pins_repository_and_locale() {
        let git = GitBridge::new("/some/repo");
        let cmd = git.command(&["positional", "arguments", "--parameter", "42"]);

        assert_eq!(cmd.get_program(), "git");
        assert_eq!(
            args_of(&cmd),
            vec![
                "-c",
                "core.quotePath=false",
                "--git-dir=/some/repo/.git",
                "--work-tree=/some/repo",
                "positional",
                "arguments",
                "--parameter",
                "42",
            ]
        );

        let lc_all = cmd
            .get_envs()
            .find(|(k, _)| *k == "LC_ALL")
            .and_then(|(_, v)| v)
            .map(|v| v.to_string_lossy().into_owned());
        assert_eq!(lc_all.as_deref(), Some("en_US.UTF-8"));
    }

    #[test]
    fn command_honours_configured_binary_and_locale() {
        let config = GitConfig {
            binary: "/opt/git".into(),
            locale: "C.UTF-8".into(),
        };
        let cmd = GitBridge::with_config("/r", &config).command(&["status"]);
        assert_eq!(cmd.get_program(), "/opt/git");
        assert!(cmd
            .get_envs()
            .any(|(k, v)| k == "LC_ALL" && v.map_or(false, |v| v == "C.UTF-8")));
    }

    #[test]
    fn line_filter_uses_regex_when_valid() {
        let re = line_filter(r"\.rs$").unwrap();
        assert!(re.is_match("src/lib.rs"));
        assert!(!re.is_match("src/lib.rs.orig"));
    }

    #[test]
    fn line_filter_falls_back_to_literal() {
        let re = line_filter("a[b").unwrap();
        assert!(re.is_match("xa[by"));
        assert!(!re.is_match("ab"));
    }

    #[test]
    fn missing_binary_is_reported() {
        let config = GitConfig {
            binary: "/definitely/not/a/git/binary".into(),
            locale: "C".into(),
        };
        let git = GitBridge::with_config("/tmp", &config);
        assert!(matches!(
            git.resolve_diff_base(),
            Err(ComposterError::Other(_))
        ));
    }

    // ── Exit-code classification ──

    /// A bridge whose "git" is a shell script that prints to stderr and exits
    /// with `code`, whatever it is asked to do.
    #[cfg(unix)]
    fn scripted_git(code: i32) -> (tempfile::TempDir, GitBridge) {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::TempDir::new().unwrap();
        let script = tmp.path().join("fake-git");
        std::fs::write(&script, format!("#!/bin/sh\necho 'scripted failure' >&2\nexit {code}\n"))
            .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let config = GitConfig {
            binary: script.display().to_string(),
            locale: "C".into(),
        };
        let git = GitBridge::with_config(tmp.path(), &config);
        (tmp, git)
    }

    #[cfg(unix)]
    #[test]
    fn diff_index_error_exit_is_reported_with_stderr() {
        let (_tmp, git) = scripted_git(2);
        match git.list_staged_paths(HEAD, None) {
            Err(ComposterError::DiffIndex { stderr }) => assert_eq!(stderr, "scripted failure"),
            other => panic!("expected DiffIndex, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn diff_index_nothing_found_is_empty() {
        let (_tmp, git) = scripted_git(1);
        assert_eq!(git.list_staged_paths(HEAD, Some(".")).unwrap(), Vec::<String>::new());
    }

    #[cfg(unix)]
    #[test_case(5 ; "unknown exit")]
    #[test_case(128 ; "fatal exit")]
    fn diff_index_other_exits_are_unexpected(code: i32) {
        let (_tmp, git) = scripted_git(code);
        match git.list_staged_paths(HEAD, None) {
            Err(ComposterError::UnexpectedGit {
                command,
                code: got,
                stderr,
            }) => {
                assert_eq!(command, "diff-index");
                assert_eq!(got, code);
                assert_eq!(stderr, "scripted failure");
            }
            other => panic!("expected UnexpectedGit, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn unresolved_head_falls_back_to_empty_tree() {
        let (_tmp, git) = scripted_git(REV_PARSE_UNRESOLVED);
        assert_eq!(git.resolve_diff_base().unwrap(), EMPTY_TREE_OBJECT_HASH);
    }

    #[cfg(unix)]
    #[test]
    fn fatal_rev_parse_means_not_a_repository() {
        let (tmp, git) = scripted_git(EXIT_FATAL);
        match git.resolve_diff_base() {
            Err(ComposterError::NotAGitRepository { root }) => assert_eq!(root.as_path(), tmp.path()),
            other => panic!("expected NotAGitRepository, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn unknown_rev_parse_exit_is_unexpected() {
        let (_tmp, git) = scripted_git(5);
        assert!(matches!(
            git.resolve_diff_base(),
            Err(ComposterError::UnexpectedGit { ref command, code: 5, .. }) if command == "rev-parse"
        ));
    }

    #[cfg(unix)]
    #[test]
    fn failed_checkout_index_is_unexpected() {
        let (tmp, git) = scripted_git(1);
        assert!(matches!(
            git.checkout_index_to(&tmp.path().join("mirror")),
            Err(ComposterError::UnexpectedGit { code: 1, .. })
        ));
    }
}
