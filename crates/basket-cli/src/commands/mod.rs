//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod infer;
pub mod process;
