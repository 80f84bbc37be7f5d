//! Priority-ordered hook registry.
//!
//! Install-time code accumulates entries in a [`RegistryBuilder`] and freezes
//! it into an immutable [`Registry`] snapshot. The snapshot is what gets
//! persisted (see [`persist`]) and what every dispatch run loads fresh.
//!
//! Within a hook, priorities iterate in ascending numeric order and entries
//! that share a priority keep their insertion order.

pub mod persist;

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{ComposterError, Result};
use crate::hook::HookName;

/// Ordering key for actions within a hook. Lower runs first.
pub type Priority = i64;

/// Priority used when a package does not specify one.
pub const DEFAULT_PRIORITY: Priority = 10;

/// Priority buckets for a single hook.
pub type Buckets = BTreeMap<Priority, Vec<ActionReference>>;

static NO_ENTRIES: Buckets = BTreeMap::new();

// ---------------------------------------------------------------------------
// ActionReference
// ---------------------------------------------------------------------------

/// A `"Action::method"` reference as written by an action package.
///
/// The raw string is kept verbatim; it is only split into its two halves when
/// the dispatcher resolves it, so a malformed reference costs one skipped
/// entry rather than an unreadable registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActionReference {
    raw: String,
}

/// The two halves of a well-formed [`ActionReference`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionTarget<'a> {
    pub action: &'a str,
    pub method: &'a str,
}

impl ActionReference {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Split into action key and method name.
    ///
    /// Fails with [`ComposterError::Configuration`] unless the reference has
    /// exactly two non-empty parts around a single `::`.
    pub fn target(&self) -> Result<ActionTarget<'_>> {
        let parts: Vec<&str> = self.raw.split("::").collect();
        match parts.as_slice() {
            [action, method] if !action.trim().is_empty() && !method.trim().is_empty() => {
                Ok(ActionTarget {
                    action: action.trim(),
                    method: method.trim(),
                })
            }
            _ => Err(ComposterError::Configuration(format!(
                "could not parse method '{}'",
                self.raw
            ))),
        }
    }
}

impl fmt::Display for ActionReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for ActionReference {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Mutable accumulator used while action packages are being installed.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    hooks: BTreeMap<HookName, Buckets>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `action` to `hook` at `priority`.
    ///
    /// No deduplication: adding the same reference twice makes it run twice.
    pub fn add_entry(&mut self, hook: HookName, action: ActionReference, priority: Priority) {
        self.hooks
            .entry(hook)
            .or_default()
            .entry(priority)
            .or_default()
            .push(action);
    }

    /// Shorthand for [`add_entry`](Self::add_entry) at [`DEFAULT_PRIORITY`].
    pub fn add_default(&mut self, hook: HookName, action: ActionReference) {
        self.add_entry(hook, action, DEFAULT_PRIORITY);
    }

    /// Same lookup as [`Registry::entries`], for inspection mid-build.
    pub fn entries(&self, hook: HookName) -> &Buckets {
        self.hooks.get(&hook).unwrap_or(&NO_ENTRIES)
    }

    pub fn build(self) -> Registry {
        Registry { hooks: self.hooks }
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Immutable registry snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    hooks: BTreeMap<HookName, Buckets>,
}

impl Registry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Priority buckets for `hook`; an empty map when nothing is registered.
    pub fn entries(&self, hook: HookName) -> &Buckets {
        self.hooks.get(&hook).unwrap_or(&NO_ENTRIES)
    }

    /// Flattened dispatch order for `hook`: ascending priority, then
    /// insertion order.
    pub fn ordered(
        &self,
        hook: HookName,
    ) -> impl Iterator<Item = (Priority, &ActionReference)> + '_ {
        self.entries(hook)
            .iter()
            .flat_map(|(priority, refs)| refs.iter().map(move |r| (*priority, r)))
    }

    /// Total number of registered references across all hooks.
    pub fn len(&self) -> usize {
        self.hooks
            .values()
            .flat_map(|buckets| buckets.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn refs(names: &[&str]) -> Vec<ActionReference> {
        names.iter().map(|n| ActionReference::from(*n)).collect()
    }

    #[test]
    fn unregistered_hook_has_no_entries() {
        let registry = RegistryBuilder::new().build();
        assert!(registry.entries(HookName::PreCommit).is_empty());
        assert!(registry.is_empty());
    }

    #[test]
    fn buckets_sort_ascending_and_keep_insertion_order() {
        let mut builder = RegistryBuilder::new();
        builder.add_entry(HookName::PreCommit, "A::a".into(), 15);
        assert_eq!(
            builder.entries(HookName::PreCommit),
            &Buckets::from([(15, refs(&["A::a"]))])
        );

        builder.add_entry(HookName::PreCommit, "B::b".into(), 5);
        builder.add_entry(HookName::PreCommit, "C::c".into(), 5);
        let registry = builder.build();

        assert_eq!(
            registry.entries(HookName::PreCommit),
            &Buckets::from([(5, refs(&["B::b", "C::c"])), (15, refs(&["A::a"]))])
        );
        assert!(registry.entries(HookName::PostCommit).is_empty());
    }

    #[test]
    fn negative_priorities_run_before_default() {
        let mut builder = RegistryBuilder::new();
        builder.add_default(HookName::PrePush, "Late::run".into());
        builder.add_entry(HookName::PrePush, "Early::run".into(), -3);
        builder.add_entry(HookName::PrePush, "Middle::run".into(), 0);
        let registry = builder.build();

        let order: Vec<(Priority, &str)> = registry
            .ordered(HookName::PrePush)
            .map(|(p, r)| (p, r.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![(-3, "Early::run"), (0, "Middle::run"), (10, "Late::run")]
        );
    }

    #[test]
    fn duplicates_are_kept() {
        let mut builder = RegistryBuilder::new();
        builder.add_default(HookName::CommitMsg, "Lint::check".into());
        builder.add_default(HookName::CommitMsg, "Lint::check".into());
        let registry = builder.build();
        assert_eq!(registry.ordered(HookName::CommitMsg).count(), 2);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn ordering_is_stable_for_arbitrary_insertions() {
        let inserts: [(Priority, &str); 8] = [
            (20, "a"),
            (10, "b"),
            (20, "c"),
            (-1, "d"),
            (10, "e"),
            (-1, "f"),
            (99, "g"),
            (10, "h"),
        ];
        let mut builder = RegistryBuilder::new();
        for (priority, name) in inserts {
            builder.add_entry(HookName::PostMerge, ActionReference::new(name), priority);
        }
        let registry = builder.build();

        let mut expected: Vec<(Priority, &str)> = inserts.to_vec();
        expected.sort_by_key(|(p, _)| *p); // stable sort
        let actual: Vec<(Priority, &str)> = registry
            .ordered(HookName::PostMerge)
            .map(|(p, r)| (p, r.as_str()))
            .collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn target_splits_action_and_method() {
        let reference = ActionReference::new("ConflictMarkers::check");
        let target = reference.target().unwrap();
        assert_eq!(target.action, "ConflictMarkers");
        assert_eq!(target.method, "check");
    }

    #[test]
    fn target_rejects_wrong_arity() {
        for raw in ["NoMethod", "a::b::c", "::check", "Action::", ""] {
            let err = ActionReference::new(raw).target().unwrap_err();
            assert!(
                matches!(err, ComposterError::Configuration(_)),
                "{raw:?} should be a configuration error"
            );
        }
    }
}
