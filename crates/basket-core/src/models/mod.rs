//! Data models: input cell grids, normalized catalog records and configuration.

pub mod catalog;
pub mod config;
pub mod grid;
pub mod spec;
