//! The contract every hook action implements.
//!
//! An action is registered under a stable key in an
//! [`ActionCatalog`](crate::dispatch::ActionCatalog) and referenced from the
//! registry as `"Key::method"`. For each reference the dispatcher builds a
//! fresh action and a fresh [`ActionContext`], then runs
//! [`init`](HookAction::init), [`invoke`](HookAction::invoke) and
//! [`shutdown`](HookAction::shutdown) in that order.
//!
//! Actions never exit the process themselves. To veto the Git operation they
//! return [`Flow::Abort`] (usually via [`ActionContext::error`]) and the
//! dispatcher stops with that exit code.

pub mod builtin;
pub mod context;

use thiserror::Error;

use crate::error::ComposterError;

pub use context::{ActionContext, ActionSettings, Console};

/// What the dispatcher should do after an action step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Carry on with the next step or the next action.
    Continue,
    /// Stop dispatching and exit the hook with this code.
    Abort(i32),
}

/// Failures an action step can report.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("unknown method '{method}'")]
    UnknownMethod { method: String },

    #[error("{0}")]
    Failed(String),

    #[error("action panicked: {0}")]
    Panicked(String),

    #[error(transparent)]
    Composter(#[from] ComposterError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ActionError {
    pub fn unknown_method(method: &str) -> Self {
        Self::UnknownMethod {
            method: method.to_string(),
        }
    }
}

pub type ActionResult = std::result::Result<Flow, ActionError>;

/// A unit of hook behaviour contributed by an action package.
pub trait HookAction {
    /// Runs once before the target method.
    fn init(&mut self, _ctx: &mut ActionContext) -> ActionResult {
        Ok(Flow::Continue)
    }

    /// Run `method` with the arguments Git passed to the hook.
    ///
    /// Implementations return [`ActionError::UnknownMethod`] for method names
    /// they do not provide.
    fn invoke(&mut self, method: &str, ctx: &mut ActionContext, args: &[String]) -> ActionResult;

    /// Runs once after the target method completed normally.
    fn shutdown(&mut self, _ctx: &mut ActionContext) -> ActionResult {
        Ok(Flow::Continue)
    }
}
