//! The dispatcher Git runs for every hook event.
//!
//! One call handles one hook invocation: load the registry snapshot, walk the
//! hook's entries in priority order, and run each action's lifecycle inside a
//! fresh [`ActionContext`]. A broken entry is logged and skipped. Only an
//! explicit [`Flow::Abort`] from an action changes the hook's exit code.

pub mod catalog;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use serde::Serialize;

use crate::action::{ActionContext, ActionError, ActionResult, ActionSettings, Console, Flow};
use crate::hook::HookName;
use crate::paths::ControlPaths;
use crate::registry::{persist, Registry};

pub use catalog::{ActionCatalog, ActionFactory};

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Outcome of one dispatch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    /// Exit code for the hook process.
    pub exit_code: i32,
    /// Entries whose lifecycle ran to completion.
    pub executed: usize,
    /// Entries skipped as misconfigured (bad reference, unknown action or method).
    pub skipped: usize,
    /// Entries that returned an error or panicked.
    pub failed: usize,
}

/// How a single registry entry ended.
enum Outcome {
    Completed,
    Aborted(i32),
    Skipped(String),
    Failed(ActionError),
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Dispatcher {
    catalog: ActionCatalog,
    settings: ActionSettings,
    console: Console,
}

impl Dispatcher {
    pub fn new(catalog: ActionCatalog, settings: ActionSettings) -> Self {
        Self {
            catalog,
            settings,
            console: Console::stdout(),
        }
    }

    /// Route action output somewhere other than stdout.
    pub fn with_console(mut self, console: Console) -> Self {
        self.console = console;
        self
    }

    /// Handle one hook event for the repository at `root`.
    ///
    /// Unknown hook names and unreadable registries both end with exit code 0
    /// and nothing run.
    pub fn dispatch(&self, hook_name: &str, root: &Path, args: &[String]) -> DispatchReport {
        let Some(hook) = HookName::from_git_name(hook_name) else {
            tracing::debug!(hook = hook_name, "not a supported hook, nothing to do");
            return DispatchReport::default();
        };

        let registry_file = ControlPaths::new(root).registry_file();
        let registry = match persist::load(&registry_file) {
            Ok(registry) => registry,
            Err(e) => {
                tracing::warn!("{e}; no actions will run");
                return DispatchReport::default();
            }
        };

        self.dispatch_with_registry(hook, root, &registry, args)
    }

    /// Run `hook`'s entries from an already loaded registry snapshot.
    pub fn dispatch_with_registry(
        &self,
        hook: HookName,
        root: &Path,
        registry: &Registry,
        args: &[String],
    ) -> DispatchReport {
        let mut report = DispatchReport::default();

        for (priority, reference) in registry.ordered(hook) {
            let target = match reference.target() {
                Ok(target) => target,
                Err(e) => {
                    tracing::warn!(hook = %hook, priority, "{e}");
                    report.skipped += 1;
                    continue;
                }
            };

            let Some(factory) = self.catalog.resolve(target.action) else {
                tracing::warn!(
                    hook = %hook,
                    priority,
                    "could not resolve action '{}' for '{reference}'",
                    target.action
                );
                report.skipped += 1;
                continue;
            };

            tracing::debug!(hook = %hook, priority, "running {reference}");
            let mut ctx = ActionContext::new(hook, root, &self.settings)
                .with_console(self.console.clone());
            let outcome = run_entry(factory, target.method, &mut ctx, args);
            // Release the context, and with it any staged mirror, before
            // acting on the outcome.
            drop(ctx);

            match outcome {
                Outcome::Completed => report.executed += 1,
                Outcome::Aborted(code) => {
                    tracing::debug!(hook = %hook, code, "{reference} aborted the hook");
                    report.executed += 1;
                    report.exit_code = code;
                    return report;
                }
                Outcome::Skipped(reason) => {
                    tracing::warn!(hook = %hook, "skipping {reference}: {reason}");
                    report.skipped += 1;
                }
                Outcome::Failed(e) => {
                    tracing::warn!(hook = %hook, "{reference} failed: {e}");
                    report.failed += 1;
                }
            }
        }

        report
    }
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Build the action and run init, the target method and shutdown.
///
/// Shutdown only runs once the method returned normally.
fn run_entry(
    factory: &ActionFactory,
    method: &str,
    ctx: &mut ActionContext,
    args: &[String],
) -> Outcome {
    let mut action = match panic::catch_unwind(AssertUnwindSafe(|| factory())) {
        Ok(action) => action,
        Err(payload) => return Outcome::Failed(ActionError::Panicked(panic_message(&*payload))),
    };

    match guarded(|| action.init(ctx)) {
        Ok(Flow::Continue) => {}
        Ok(Flow::Abort(code)) => return Outcome::Aborted(code),
        Err(e) => return Outcome::Failed(e),
    }

    match guarded(|| action.invoke(method, ctx, args)) {
        Ok(Flow::Continue) => {}
        Ok(Flow::Abort(code)) => return Outcome::Aborted(code),
        Err(ActionError::UnknownMethod { method }) => {
            return Outcome::Skipped(format!("action has no method '{method}'"))
        }
        Err(e) => return Outcome::Failed(e),
    }

    match guarded(|| action.shutdown(ctx)) {
        Ok(Flow::Continue) => Outcome::Completed,
        Ok(Flow::Abort(code)) => Outcome::Aborted(code),
        Err(e) => Outcome::Failed(e),
    }
}

/// Run one lifecycle step, turning a panic into [`ActionError::Panicked`].
fn guarded<F>(step: F) -> ActionResult
where
    F: FnOnce() -> ActionResult,
{
    panic::catch_unwind(AssertUnwindSafe(step))
        .unwrap_or_else(|payload| Err(ActionError::Panicked(panic_message(&*payload))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
