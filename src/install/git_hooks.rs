//! Hook entry points: the small shell scripts Git runs, each of which hands
//! the event to `composter dispatch`.
//!
//! A script carries [`MARKER`] so we can tell our hooks from user-written
//! ones. A foreign hook is moved aside to `<hook>.pre-composter` before ours
//! replaces it, and moved back on uninstall.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::hook::HookName;
use crate::paths::ControlPaths;

/// Marker comment embedded in every generated hook script.
pub const MARKER: &str = "# composter-dispatch";

/// Suffix for a user hook we moved out of the way.
pub const BACKUP_SUFFIX: &str = ".pre-composter";

/// What [`install_hook`] did to the hook file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookInstall {
    Created,
    /// Our script was already there and has been rewritten.
    Refreshed,
    /// A foreign hook was moved to the contained backup path.
    BackedUp(PathBuf),
}

/// Render the entry-point script for `hook`.
///
/// The repository top level is resolved when the hook runs, so the script
/// keeps working after the checkout is moved.
pub fn hook_script(hook: HookName, binary: &str) -> String {
    format!(
        "#!/bin/sh\n\
         {MARKER}\n\
         # Generated by composter install. Do not edit.\n\
         exec {} dispatch {hook} \"$(git rev-parse --show-toplevel)\" \"$@\"\n",
        sh_quote(binary)
    )
}

/// Whether the file at `path` is one of our generated scripts.
pub fn is_ours(path: &Path) -> bool {
    fs::read_to_string(path)
        .map(|content| content.contains(MARKER))
        .unwrap_or(false)
}

pub fn backup_path(hook_path: &Path) -> PathBuf {
    let mut name = hook_path.as_os_str().to_owned();
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}

/// Write the entry point for `hook`, backing up a foreign hook first.
pub fn install_hook(paths: &ControlPaths, hook: HookName, binary: &str) -> Result<HookInstall> {
    let hooks_dir = paths.hooks_dir();
    fs::create_dir_all(&hooks_dir)?;

    let hook_path = paths.hook_path(hook);
    let outcome = if !hook_path.exists() {
        HookInstall::Created
    } else if is_ours(&hook_path) {
        HookInstall::Refreshed
    } else {
        let backup = backup_path(&hook_path);
        fs::rename(&hook_path, &backup)?;
        tracing::info!(
            hook = %hook,
            "moved existing hook to {}",
            backup.display()
        );
        HookInstall::BackedUp(backup)
    };

    fs::write(&hook_path, hook_script(hook, binary))?;
    make_executable(&hook_path)?;
    Ok(outcome)
}

/// Remove our entry point for `hook`, restoring a backed-up user hook.
///
/// Returns `true` when a user hook was restored. A hook file without our
/// marker is left alone.
pub fn uninstall_hook(paths: &ControlPaths, hook: HookName) -> Result<bool> {
    let hook_path = paths.hook_path(hook);

    if hook_path.exists() {
        if !is_ours(&hook_path) {
            return Ok(false);
        }
        fs::remove_file(&hook_path)?;
    }

    let backup = backup_path(&hook_path);
    if backup.exists() {
        fs::rename(&backup, &hook_path)?;
        return Ok(true);
    }
    Ok(false)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

/// Single-quote `value` for POSIX sh.
fn sh_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_git_dir(tmp: &TempDir) -> ControlPaths {
        fs::create_dir_all(tmp.path().join(".git").join("hooks")).unwrap();
        ControlPaths::new(tmp.path())
    }

    #[test]
    fn script_execs_dispatch_with_hook_and_args() {
        let script = hook_script(HookName::CommitMsg, "/usr/local/bin/composter");
        assert!(script.starts_with("#!/bin/sh\n"));
        assert!(script.contains(MARKER));
        assert!(script.contains(
            "exec '/usr/local/bin/composter' dispatch commit-msg \
             \"$(git rev-parse --show-toplevel)\" \"$@\""
        ));
    }

    #[test]
    fn binary_path_is_shell_quoted() {
        assert_eq!(sh_quote("/opt/my tools/composter"), "'/opt/my tools/composter'");
        assert_eq!(sh_quote("it's"), r"'it'\''s'");
    }

    #[test]
    fn install_creates_executable_hook() {
        let tmp = TempDir::new().unwrap();
        let paths = make_git_dir(&tmp);

        let outcome = install_hook(&paths, HookName::PreCommit, "composter").unwrap();
        assert_eq!(outcome, HookInstall::Created);

        let hook = paths.hook_path(HookName::PreCommit);
        assert!(is_ours(&hook));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&hook).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }

    #[test]
    fn install_creates_missing_hooks_dir() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join(".git")).unwrap();
        let paths = ControlPaths::new(tmp.path());

        install_hook(&paths, HookName::PrePush, "composter").unwrap();
        assert!(paths.hook_path(HookName::PrePush).is_file());
    }

    #[test]
    fn install_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let paths = make_git_dir(&tmp);

        install_hook(&paths, HookName::PreCommit, "composter").unwrap();
        let second = install_hook(&paths, HookName::PreCommit, "composter").unwrap();
        assert_eq!(second, HookInstall::Refreshed);

        let hook = paths.hook_path(HookName::PreCommit);
        let content = fs::read_to_string(&hook).unwrap();
        assert_eq!(content.matches(MARKER).count(), 1);
        assert!(!backup_path(&hook).exists(), "our own hook is never backed up");
    }

    #[test]
    fn install_backs_up_foreign_hook_and_uninstall_restores_it() {
        let tmp = TempDir::new().unwrap();
        let paths = make_git_dir(&tmp);
        let hook = paths.hook_path(HookName::PreCommit);
        fs::write(&hook, "#!/bin/sh\necho 'user hook'\n").unwrap();

        let outcome = install_hook(&paths, HookName::PreCommit, "composter").unwrap();
        let backup = backup_path(&hook);
        assert_eq!(outcome, HookInstall::BackedUp(backup.clone()));
        assert_eq!(
            fs::read_to_string(&backup).unwrap(),
            "#!/bin/sh\necho 'user hook'\n"
        );

        assert!(uninstall_hook(&paths, HookName::PreCommit).unwrap());
        assert!(!backup.exists());
        assert_eq!(
            fs::read_to_string(&hook).unwrap(),
            "#!/bin/sh\necho 'user hook'\n"
        );
    }

    #[test]
    fn uninstall_removes_our_hook() {
        let tmp = TempDir::new().unwrap();
        let paths = make_git_dir(&tmp);
        install_hook(&paths, HookName::PostMerge, "composter").unwrap();

        assert!(!uninstall_hook(&paths, HookName::PostMerge).unwrap());
        assert!(!paths.hook_path(HookName::PostMerge).exists());
    }

    #[test]
    fn uninstall_leaves_foreign_hook_alone() {
        let tmp = TempDir::new().unwrap();
        let paths = make_git_dir(&tmp);
        let hook = paths.hook_path(HookName::PreCommit);
        fs::write(&hook, "#!/bin/sh\necho hello\n").unwrap();

        assert!(!uninstall_hook(&paths, HookName::PreCommit).unwrap());
        assert!(fs::read_to_string(&hook).unwrap().contains("echo hello"));
    }

    #[test]
    fn uninstall_is_noop_when_no_hook_file() {
        let tmp = TempDir::new().unwrap();
        let paths = make_git_dir(&tmp);
        assert!(!uninstall_hook(&paths, HookName::PreRebase).unwrap());
    }
}
