//! Shared helpers for integration tests that drive a real `git` binary.

#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

/// Build a git command isolated from the machine's global configuration.
pub fn git_command(root: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::new("git");
    cmd.current_dir(root)
        .env("HOME", root)
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .env_remove("XDG_CONFIG_HOME")
        .args([
            "-c",
            "user.name=Composter Test",
            "-c",
            "user.email=test@example.com",
            "-c",
            "commit.gpgsign=false",
            "-c",
            "init.defaultBranch=main",
        ])
        .args(args);
    cmd
}

/// Run git and return its output, whatever the exit status.
pub fn git_output(root: &Path, args: &[&str]) -> Output {
    git_command(root, args).output().unwrap()
}

/// Run git and require success.
pub fn git(root: &Path, args: &[&str]) {
    let output = git_output(root, args);
    assert!(
        output.status.success(),
        "git {} failed: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stderr)
    );
}

/// A freshly initialized repository with no commits.
pub fn init_repo() -> TempDir {
    let tmp = TempDir::new().unwrap();
    git(tmp.path(), &["init", "--quiet"]);
    tmp
}

pub fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

pub fn commit_file(root: &Path, relative: &str, contents: &str) {
    write(root, relative, contents);
    git(root, &["add", relative]);
    git(root, &["commit", "--quiet", "--no-verify", "-m", "fixture"]);
}
