//! Per-action execution context.

use std::cell::RefCell;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use super::Flow;
use crate::config::{ComposterConfig, GitConfig, GlobConfig, StagedConfig};
use crate::error::Result;
use crate::git::GitBridge;
use crate::hook::HookName;
use crate::paths::ControlPaths;
use crate::staged::{self, StagedMirror, StagedQuery};

// ---------------------------------------------------------------------------
// Console
// ---------------------------------------------------------------------------

/// Output handle actions report through. Defaults to stdout.
#[derive(Clone)]
pub struct Console {
    out: Rc<RefCell<dyn Write>>,
}

impl Console {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }

    pub fn new(writer: impl Write + 'static) -> Self {
        Self {
            out: Rc::new(RefCell::new(writer)),
        }
    }

    /// Wrap a writer the caller keeps a handle to, e.g. a buffer in tests.
    pub fn shared<W: Write + 'static>(writer: Rc<RefCell<W>>) -> Self {
        Self { out: writer }
    }

    /// Write one line. Console failures never fail the action.
    pub fn write_line(&self, message: &str) {
        let mut out = self.out.borrow_mut();
        let _ = writeln!(out, "{message}");
        let _ = out.flush();
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::stdout()
    }
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Console")
    }
}

// ---------------------------------------------------------------------------
// ActionSettings
// ---------------------------------------------------------------------------

/// The slice of configuration an action context needs.
#[derive(Debug, Clone, Default)]
pub struct ActionSettings {
    pub git: GitConfig,
    pub staged: StagedConfig,
    pub glob: GlobConfig,
}

impl From<&ComposterConfig> for ActionSettings {
    fn from(config: &ComposterConfig) -> Self {
        Self {
            git: config.git.clone(),
            staged: config.staged.clone(),
            glob: config.glob.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// ActionContext
// ---------------------------------------------------------------------------

/// State owned by a single action for the length of one dispatch entry.
///
/// Holds the hook and repository root, a Git bridge pinned to that root, and
/// the staged mirror if one was created. Dropping the context removes the
/// mirror.
#[derive(Debug)]
pub struct ActionContext {
    hook: HookName,
    paths: ControlPaths,
    git: GitBridge,
    settings: ActionSettings,
    console: Console,
    mirror: Option<StagedMirror>,
}

impl ActionContext {
    pub fn new(hook: HookName, root: impl Into<PathBuf>, settings: &ActionSettings) -> Self {
        let root = root.into();
        Self {
            hook,
            git: GitBridge::with_config(root.clone(), &settings.git),
            paths: ControlPaths::new(root),
            settings: settings.clone(),
            console: Console::stdout(),
            mirror: None,
        }
    }

    pub fn with_console(mut self, console: Console) -> Self {
        self.console = console;
        self
    }

    pub fn hook(&self) -> HookName {
        self.hook
    }

    pub fn root(&self) -> &Path {
        self.paths.root()
    }

    pub fn git(&self) -> &GitBridge {
        &self.git
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    /// Path of the live staged mirror, if this context created one.
    pub fn mirror_path(&self) -> Option<&Path> {
        self.mirror.as_ref().map(StagedMirror::path)
    }

    /// `HEAD`, or the empty-tree hash before the first commit.
    pub fn diff_base(&self) -> Result<String> {
        self.git.resolve_diff_base()
    }

    /// Absolute paths of the staged files, optionally filtered by `pattern`.
    ///
    /// With `mirror` off every path points into the working tree. With it on,
    /// files whose working copy drifted since staging resolve into the staged
    /// mirror, which stays alive until this context is dropped.
    pub fn staged_files(&mut self, pattern: Option<&str>, mirror: bool) -> Result<Vec<PathBuf>> {
        let query = StagedQuery {
            pattern,
            mirror,
            chunk_size: self.settings.staged.chunk_size,
        };
        let mirror_dir = self.paths.mirror_dir();
        staged::resolve_staged_files(&self.git, &query, &mirror_dir, &mut self.mirror)
    }

    /// [`staged_files`](Self::staged_files) using the configured mirror default.
    pub fn staged_files_default(&mut self, pattern: Option<&str>) -> Result<Vec<PathBuf>> {
        let mirror = self.settings.staged.mirror();
        self.staged_files(pattern, mirror)
    }

    /// Recursive pattern search. Relative patterns are taken from the root.
    pub fn recursive_glob(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        let pattern = self.root().join(pattern);
        staged::recursive_glob(&pattern, self.root(), &self.settings.glob.exclude_dirs)
    }

    pub fn write_line(&self, message: &str) {
        self.console.write_line(message);
    }

    /// Report a failure. With `Some(code)` the hook stops and exits with
    /// `code`; with `None` dispatch continues.
    pub fn error(&self, message: &str, exit: Option<i32>) -> Flow {
        self.console.write_line(message);
        exit.map_or(Flow::Continue, Flow::Abort)
    }

    /// Report success. Same exit semantics as [`error`](Self::error).
    pub fn success(&self, message: &str, exit: Option<i32>) -> Flow {
        self.console.write_line(message);
        exit.map_or(Flow::Continue, Flow::Abort)
    }
}
