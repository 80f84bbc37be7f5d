//! Persisted registry form.
//!
//! The registry file is YAML, machine-owned, and regenerated wholesale on every
//! install. Each of the supported hooks appears as a top-level key, even when
//! nothing is registered for it, so the file doubles as a readable inventory:
//!
//! ```yaml
//! # Composter registry file.
//! # Do not edit, this file is generated automatically.
//! # Timestamp: 2026/10/16 12:00:00
//! applypatch-msg: {}
//! pre-commit:
//!   5:
//!   - ConflictMarkers::check
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::{ActionReference, Priority, Registry, RegistryBuilder};
use crate::error::{ComposterError, Result};
use crate::hook::HookName;

/// On-disk shape: hook name → priority → ordered references.
type RawRegistry = BTreeMap<String, BTreeMap<Priority, Vec<String>>>;

/// Render the registry file contents, stamped with the current local time.
pub fn render(registry: &Registry) -> Result<String> {
    let timestamp = chrono::Local::now().format("%Y/%m/%d %H:%M:%S");
    render_with_timestamp(registry, &timestamp.to_string())
}

/// Render with an explicit timestamp line.
pub fn render_with_timestamp(registry: &Registry, timestamp: &str) -> Result<String> {
    let mut out = String::new();
    out.push_str("# Composter registry file.\n");
    out.push_str("# Do not edit, this file is generated automatically.\n");
    out.push_str(&format!("# Timestamp: {timestamp}\n"));

    // serde_yaml would sort the hook keys; emit them one at a time to keep the
    // canonical hook order.
    for hook in HookName::ALL {
        let raw: BTreeMap<Priority, Vec<&str>> = registry
            .entries(hook)
            .iter()
            .map(|(priority, refs)| (*priority, refs.iter().map(|r| r.as_str()).collect()))
            .collect();

        let mut section = BTreeMap::new();
        section.insert(hook.as_str(), raw);
        out.push_str(&serde_yaml::to_string(&section)?);
    }

    Ok(out)
}

/// Parse registry file contents.
///
/// Keys that are not supported hook names are skipped with a warning; an
/// empty document yields an empty registry.
pub fn parse(contents: &str) -> Result<Registry> {
    if contents.lines().all(|l| l.trim().is_empty() || l.trim_start().starts_with('#')) {
        return Ok(Registry::empty());
    }

    let raw: RawRegistry = serde_yaml::from_str(contents)?;
    let mut builder = RegistryBuilder::new();

    for (name, buckets) in raw {
        let Some(hook) = HookName::from_git_name(&name) else {
            tracing::warn!(hook = %name, "ignoring unknown hook in registry file");
            continue;
        };
        for (priority, refs) in buckets {
            for r in refs {
                builder.add_entry(hook, ActionReference::new(r), priority);
            }
        }
    }

    Ok(builder.build())
}

/// Load a registry snapshot from `path`.
///
/// Any failure (missing file, unreadable, unparsable) is reported as
/// [`ComposterError::RegistryUnreadable`] so callers can fail open.
pub fn load(path: &Path) -> Result<Registry> {
    let contents = fs::read_to_string(path).map_err(|e| ComposterError::RegistryUnreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    parse(&contents).map_err(|e| ComposterError::RegistryUnreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Write the registry file to `path`, creating parent directories.
pub fn save(registry: &Registry, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, render(registry)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Registry {
        let mut builder = RegistryBuilder::new();
        builder.add_entry(HookName::PreCommit, "Lint::check".into(), 20);
        builder.add_entry(HookName::PreCommit, "ConflictMarkers::check".into(), 5);
        builder.add_entry(HookName::PreCommit, "StagedFiles::list".into(), 5);
        builder.add_entry(HookName::CommitMsg, "CommitMessage::require_nonempty".into(), -1);
        builder.build()
    }

    #[test]
    fn rendered_file_carries_header_and_every_hook() {
        let text = render_with_timestamp(&sample(), "2026/10/16 12:00:00").unwrap();

        assert!(text.starts_with("# Composter registry file.\n"));
        assert!(text.contains("# Do not edit, this file is generated automatically."));
        assert!(text.contains("# Timestamp: 2026/10/16 12:00:00"));
        for hook in HookName::ALL {
            assert!(
                text.contains(&format!("{}:", hook.as_str())),
                "missing {hook}"
            );
        }
    }

    #[test]
    fn hooks_are_rendered_in_canonical_order() {
        let text = render_with_timestamp(&Registry::empty(), "t").unwrap();
        let positions: Vec<usize> = HookName::ALL
            .iter()
            .map(|h| text.find(&format!("\n{}:", h.as_str())).unwrap())
            .collect();
        let mut sorted = positions.clone();
        sorted.sort();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn parse_restores_rendered_registry() {
        let registry = sample();
        let text = render_with_timestamp(&registry, "t").unwrap();
        assert_eq!(parse(&text).unwrap(), registry);
    }

    #[test]
    fn parse_accepts_hand_written_yaml() {
        let text = r#"
pre-push:
  10:
    - "Tests::run"
  -5:
    - "Fetch::verify"
"#;
        let registry = parse(text).unwrap();
        let order: Vec<&str> = registry
            .ordered(HookName::PrePush)
            .map(|(_, r)| r.as_str())
            .collect();
        assert_eq!(order, vec!["Fetch::verify", "Tests::run"]);
    }

    #[test]
    fn parse_skips_unknown_hooks() {
        let text = "pre-receive:\n  10:\n    - A::b\npost-merge:\n  1:\n    - C::d\n";
        let registry = parse(text).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.entries(HookName::PostMerge).len(), 1);
    }

    #[test]
    fn parse_keeps_malformed_references_verbatim() {
        let registry = parse("pre-commit:\n  10:\n    - NotARef\n").unwrap();
        let (_, r) = registry.ordered(HookName::PreCommit).next().unwrap();
        assert_eq!(r.as_str(), "NotARef");
    }

    #[test]
    fn header_only_file_is_empty_registry() {
        let registry = parse("# Composter registry file.\n\n").unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn load_missing_file_is_registry_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("registry.yaml")).unwrap_err();
        assert!(matches!(err, ComposterError::RegistryUnreadable { .. }));
    }

    #[test]
    fn load_garbage_is_registry_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.yaml");
        fs::write(&path, "pre-commit: [[[not yaml").unwrap();
        let err = load(&path).unwrap_err();
        assert!(matches!(err, ComposterError::RegistryUnreadable { .. }));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("registry.yaml");
        save(&sample(), &path).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.len(), sample().len());
        assert_eq!(
            loaded.entries(HookName::PreCommit).keys().copied().collect::<Vec<_>>(),
            vec![5, 20]
        );
    }
}
