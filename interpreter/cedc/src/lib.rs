//! Cedilla interpreter CLI.
//!
//! Wires the pipeline crates into a [`session::Session`] and exposes the
//! `ced` subcommands on top of it.

pub mod builtins;
pub mod commands;
pub mod repl;
pub mod reporting;
pub mod session;
