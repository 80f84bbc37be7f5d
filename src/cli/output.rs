//! Styled summaries for install, uninstall and registry listings.

use std::path::Path;

use console::style;
use serde_json::{json, Map, Value};

use crate::hook::HookName;
use crate::install::{HookInstall, InstallReport, UninstallReport};
use crate::registry::Registry;

/// Print the post-install summary.
pub fn print_install_summary(root: &Path, report: &InstallReport) {
    println!();
    println!("  {} {}", style("Project:").bold(), root.display());
    println!();
    println!(
        "  {} Wrote {} registry entr{} to {}",
        style("✓").green(),
        report.entries,
        if report.entries == 1 { "y" } else { "ies" },
        report.registry_file.display()
    );
    println!(
        "  {} Installed {} hook entry points",
        style("✓").green(),
        report.hooks.len()
    );
    for (hook, outcome) in &report.hooks {
        if let HookInstall::BackedUp(backup) = outcome {
            println!(
                "  {} Existing {hook} hook moved to {}",
                style("!").yellow().bold(),
                backup.display()
            );
        }
    }
    println!();
}

pub fn print_uninstall_summary(root: &Path, report: &UninstallReport) {
    println!("  {} Removed composter hooks from {}", style("✓").green(), root.display());
    for hook in &report.restored {
        println!("  {} Restored original {hook} hook", style("✓").green());
    }
    if !report.removed_control_dir {
        println!("  {}", style("No control directory was present.").dim());
    }
}

/// Human-readable registry listing.
///
/// Without a filter only hooks with entries are shown; an empty registry
/// renders a single notice line.
pub fn render_registry(registry: &Registry, only: Option<HookName>) -> String {
    let hooks: Vec<HookName> = match only {
        Some(hook) => vec![hook],
        None => HookName::ALL
            .into_iter()
            .filter(|hook| !registry.entries(*hook).is_empty())
            .collect(),
    };

    if hooks.is_empty() {
        return format!("{}\n", style("No actions registered.").dim());
    }

    let mut out = String::new();
    for hook in hooks {
        out.push_str(&format!("{}\n", style(hook).cyan().bold()));
        let mut any = false;
        for (priority, reference) in registry.ordered(hook) {
            out.push_str(&format!("  {:>5}  {reference}\n", style(priority).dim()));
            any = true;
        }
        if !any {
            out.push_str(&format!("  {}\n", style("(none)").dim()));
        }
    }
    out
}

/// Registry as JSON: `{ hook: { priority: [reference, ...] } }`.
pub fn registry_json(registry: &Registry, only: Option<HookName>) -> Value {
    let hooks: Vec<HookName> = only.map_or_else(|| HookName::ALL.to_vec(), |hook| vec![hook]);

    let mut root = Map::new();
    for hook in hooks {
        let buckets: Map<String, Value> = registry
            .entries(hook)
            .iter()
            .map(|(priority, refs)| {
                let refs: Vec<&str> = refs.iter().map(|r| r.as_str()).collect();
                (priority.to_string(), json!(refs))
            })
            .collect();
        root.insert(hook.to_string(), Value::Object(buckets));
    }
    Value::Object(root)
}
