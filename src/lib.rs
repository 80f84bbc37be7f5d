//! Composter: Git hook installation and dispatch.
//!
//! Action packages declare which hooks they handle and at what priority.
//! `install` folds those declarations into a persisted registry and writes a
//! small entry point per hook. When Git fires a hook, the entry point calls
//! the dispatcher, which runs every registered action in order and isolates
//! failures between them. Actions see the staged content of the commit
//! through the staged-file resolver.

pub mod action;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod git;
pub mod hook;
pub mod install;
pub mod observability;
pub mod paths;
pub mod registry;
pub mod staged;
