//! Terminal output for the `composter` binary.

pub mod output;
