//! CLI support for the `qe` binary.

pub mod args;
pub mod commands;
pub mod context;

pub use context::CommandContext;
